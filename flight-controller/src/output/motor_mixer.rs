//! X-configuration motor mixing. Attitude authority is scaled by `thro_mix`
//! (0..=64, derived from stick throttle) so PID output cannot whip the
//! motors around near idle.

use nalgebra::Vector4;

use crate::shared_core_values::MOTOR_COUNT;

// Motor order matches the output pin table: FL, FR, BR, BL.
pub const OUT_FL: usize = 0;
pub const OUT_FR: usize = 1;
pub const OUT_BR: usize = 2;
pub const OUT_BL: usize = 3;

pub fn mix(
    throttle: i32,
    pitch: i32,
    roll: i32,
    yaw: i32,
    thro_mix: i32,
) -> [i32; MOTOR_COUNT] {
    let attitude = Vector4::new(
        pitch + roll - yaw,
        pitch - roll + yaw,
        -pitch - roll - yaw,
        -pitch + roll + yaw,
    );
    let output = attitude.map(|axis_sum| (axis_sum * thro_mix) >> 7).add_scalar(throttle);
    [output[0], output[1], output[2], output[3]]
}
