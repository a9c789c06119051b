/// Flight loop rate. Everything tick-counted (gesture delays, telemetry
/// phases, the battery ticker) assumes this value.
pub const UPDATE_RATE_HZ: u32 = 250;

/// ESC pulse refresh rate used by the servo task.
pub const ESC_RATE_HZ: u32 = 400;

/// Sensor task publish rate; must stay at or above the loop rate.
pub const SENSOR_RATE_HZ: u32 = 500;

/// Raw accelerometer counts at one gravity (+/-8 g range).
pub const ONE_G: i32 = 4096;

/// Stick deadband around center throttle inside which altitude hold engages.
pub const ALTI_THROTTLE_DEADBAND: i32 = 100;

/// Accelerometer-Z hover damping strength, 0..64 == 0..1.0.
pub const ACCEL_ASSIST_Z_FACTOR: i32 = 32;

/// Fixed throttle used when the ground station nudges a single motor.
pub const MOTOR_TEST_THROTTLE: i32 = 9500;

/// Ticks a port keeps streaming telemetry after its last heartbeat.
pub const LINK_PULSE_TICKS: i16 = 500;

/// Per-byte timeout while receiving a preferences upload.
pub const UPLOAD_BYTE_TIMEOUT_MS: u32 = 50;
