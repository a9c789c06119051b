use shared_definitions::preferences::Preferences;

use crate::shared_core_values::{AtomicMotorOutputs, MOTOR_COUNT};

/// Owns the four motor words: clamps flight outputs into the armed range,
/// preloads the disarmed low-throttle point, and passes raw test values
/// through for the ground station's motor nudge.
pub struct MotorsStateManager<'a> {
    outputs: &'a AtomicMotorOutputs,
    min_throttle: i32,
    min_throttle_armed: i32,
    max_throttle: i32,
    motors_enabled: bool,
    last: [i32; MOTOR_COUNT],
}

impl<'a> MotorsStateManager<'a> {
    pub fn new(outputs: &'a AtomicMotorOutputs, prefs: &Preferences) -> Self {
        let mut manager = MotorsStateManager {
            outputs,
            min_throttle: 0,
            min_throttle_armed: 0,
            max_throttle: 0,
            motors_enabled: true,
            last: [0; MOTOR_COUNT],
        };
        manager.apply_limits(prefs);
        manager
    }

    pub fn apply_limits(&mut self, prefs: &Preferences) {
        self.min_throttle = prefs.min_throttle as i32;
        self.min_throttle_armed = prefs.min_throttle_armed as i32;
        self.max_throttle = prefs.max_throttle as i32;
        self.motors_enabled = prefs.disable_motors == 0;
    }

    /// Disarmed/startup state: every ESC held at the low-throttle point.
    pub fn preload_min(&mut self) {
        for motor in 0..MOTOR_COUNT {
            self.last[motor] = self.min_throttle;
            self.outputs.store(motor, self.min_throttle);
        }
    }

    /// Clamps mixed outputs into the armed range and dispatches them. The
    /// low clamp keeps ESCs from ever seeing near-zero throttle in flight,
    /// which some interpret as "stop". Returns the clamped values.
    pub fn set_armed_outputs(&mut self, values: [i32; MOTOR_COUNT]) -> [i32; MOTOR_COUNT] {
        for (motor, value) in values.into_iter().enumerate() {
            let clamped = value.clamp(self.min_throttle_armed, self.max_throttle);
            self.last[motor] = clamped;
            if self.motors_enabled {
                self.outputs.store(motor, clamped);
            }
        }
        self.last
    }

    /// Unclamped single-motor write for bench testing.
    pub fn set_raw(&mut self, motor: usize, value: i32) {
        self.last[motor] = value;
        self.outputs.store(motor, value);
    }

    pub fn set_all_raw(&mut self, value: i32) {
        for motor in 0..MOTOR_COUNT {
            self.set_raw(motor, value);
        }
    }

    pub fn min_throttle(&self) -> i32 {
        self.min_throttle
    }

    pub fn max_throttle(&self) -> i32 {
        self.max_throttle
    }

    pub fn last_outputs(&self) -> [i32; MOTOR_COUNT] {
        self.last
    }
}
