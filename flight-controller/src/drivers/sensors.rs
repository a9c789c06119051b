use shared_definitions::controller::RADIO_CHANNELS;

use crate::shared_core_values::{SensorFrame, MOTOR_COUNT};

/// Inertial/barometric sensor acquisition, pumped by the sensor task into
/// the shared sensor region.
pub trait SensorSource {
    fn read_frame(&mut self) -> SensorFrame;
}

/// Radio receiver decode (PWM or S-BUS); yields raw channel words whenever a
/// new frame arrives.
pub trait RadioReceiver {
    fn poll_channels(&mut self) -> Option<[i16; RADIO_CHANNELS]>;
}

/// ESC pulse generation; consumes the shared motor words at the servo rate.
pub trait EscOutput {
    fn write_pulses(&mut self, pulses: [i32; MOTOR_COUNT]);
}

/// Calibration controls exposed by the sensor driver. Preferences are pushed
/// down through the setters at startup and whenever new settings arrive; the
/// zero/reset pairs back the ground station's sensor-test commands.
pub trait SensorCalibration {
    fn set_drift_values(&mut self, scale: &[i32; 3]);
    fn set_accel_offset_values(&mut self, offsets: &[i32; 3]);
    fn set_magnetometer_scale_offsets(&mut self, scale_offsets: &[i32; 9]);

    fn temp_zero_drift_values(&mut self);
    fn reset_drift_values(&mut self);
    fn temp_zero_accel_offset_values(&mut self);
    fn reset_accel_offset_values(&mut self);
}
