/// Battery monitor seam over the RC charge-timing circuit. The loop runs the
/// 16-tick measurement cycle; the driver owns the pins and the
/// count-to-voltage calibration curve.
pub trait BatteryMonitor {
    fn start_discharge(&mut self);
    fn start_charge(&mut self);
    /// Latest measured voltage in centivolts, before the user offset.
    fn read_voltage(&mut self) -> i16;
}
