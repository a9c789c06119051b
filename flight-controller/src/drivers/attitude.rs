use shared_definitions::controller::RadioFrame;

use crate::shared_core_values::SensorFrame;

/// Quaternion attitude estimator contract. The estimator may run on its own
/// execution unit: `update`/`update_controls` kick off a step, and
/// `wait_for_completion` is the barrier the loop crosses before reading any
/// of the query methods.
///
/// Angles come back as fixed-point orientation differences (desired minus
/// current) ready to feed the attitude PIDs; altitude is millimeters and
/// vertical velocity millimeters per second.
pub trait AttitudeEstimator {
    fn set_initial_altitude_guess(&mut self, altitude_mm: i32);
    fn set_gyro_zero(&mut self, x: i32, y: i32, z: i32);

    fn set_roll_correction(&mut self, correction: [f32; 2]);
    fn set_pitch_correction(&mut self, correction: [f32; 2]);
    fn set_auto_level_rates(&mut self, roll_pitch: i32, yaw: i32);
    fn set_manual_rates(&mut self, roll_pitch: i32, yaw: i32);

    /// Starts an orientation/altitude update from a fresh sensor snapshot.
    fn update(&mut self, frame: &SensorFrame);
    /// Advances the desired-orientation (control) quaternion from pilot input.
    fn update_controls(&mut self, radio: &RadioFrame, manual_mode: bool);
    fn wait_for_completion(&mut self);

    fn roll_difference(&self) -> i32;
    fn pitch_difference(&self) -> i32;
    fn yaw_difference(&self) -> i32;
    fn altitude_estimate(&self) -> i32;
    fn vertical_velocity_estimate(&self) -> i32;
    /// Tilt compensation factor; 256 means level.
    fn thrust_factor(&self) -> i32;

    fn reset_desired_orientation(&mut self);
    fn reset_desired_yaw(&mut self);

    fn quaternion(&self) -> [f32; 4];
    fn desired_quaternion(&self) -> [f32; 4];
}
