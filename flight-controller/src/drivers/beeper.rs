/// Piezo beeper seam. `beep_hz` is fire-and-forget; the alarm tone latches
/// until `alarm_off`. The composite patterns are the user-visible status
/// vocabulary of the controller.
pub trait Beeper {
    fn beep_hz(&mut self, freq_hz: u32, duration_ms: u32);
    fn alarm_on(&mut self, freq_hz: u32);
    fn alarm_off(&mut self);

    /// Single chirp: something was rejected.
    fn chirp(&mut self) {
        self.beep_hz(5000, 80);
    }

    /// Two beeps: acknowledged.
    fn double_beep(&mut self) {
        self.beep_hz(5000, 80);
        self.beep_hz(5000, 80);
    }

    /// Three beeps: disarmed / defaults restored.
    fn triple_beep(&mut self) {
        self.beep_hz(5000, 80);
        self.beep_hz(5000, 80);
        self.beep_hz(5000, 80);
    }

    /// Rising tune played once arming completes.
    fn arm_tune(&mut self) {
        self.beep_hz(3000, 100);
        self.beep_hz(4000, 100);
        self.beep_hz(5000, 150);
    }
}
