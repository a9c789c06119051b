/// Integer PID with a configurable fixed-point precision. Gains are applied
/// in Q-format: `output = (P*Ep + I*Ei + D*Dm + round) >> precision`.
///
/// The proportional input (and everything the integrator sees) is clamped to
/// `pi_max`, so extreme deflections bound windup and saturation by
/// construction rather than by the output clamp alone. The derivative is
/// taken on the measured input, not the error, so setpoint steps cannot kick
/// the output; it runs through a single-pole low-pass with coefficient
/// `derivative_filter / 256`.
pub struct IntPid {
    kp: i32,
    ki: i32,
    kd: i32,
    sample_rate: i32,
    precision: u32,
    round_offset: i32,
    max_output: i32,
    pi_max: i32,
    max_integral: i32,
    derivative_filter: i32,
    integral: i32,
    last_measured: i32,
    filtered_delta: i32,
}

impl IntPid {
    /// The I and D gains are given per second and divided down by the update
    /// rate, so call sites can state them independently of loop speed.
    pub fn new(p_gain: i32, i_gain: i32, d_gain: i32, sample_rate: i32) -> Self {
        IntPid {
            kp: p_gain,
            ki: i_gain / sample_rate,
            kd: d_gain / sample_rate,
            sample_rate,
            precision: 16,
            round_offset: 1 << 15,
            max_output: 1000,
            pi_max: 1 << 24,
            max_integral: 1 << 24,
            derivative_filter: 256,
            integral: 0,
            last_measured: 0,
            filtered_delta: 0,
        }
    }

    pub fn set_precision(&mut self, bits: u32) {
        self.precision = bits;
        self.round_offset = 1 << (bits - 1);
    }

    pub fn set_max_output(&mut self, max_output: i32) {
        self.max_output = max_output;
    }

    pub fn set_pi_max(&mut self, pi_max: i32) {
        self.pi_max = pi_max;
    }

    pub fn set_max_integral(&mut self, max_integral: i32) {
        self.max_integral = max_integral;
    }

    /// 256 passes the derivative through unfiltered; smaller values filter
    /// harder.
    pub fn set_derivative_filter(&mut self, filter: i32) {
        self.derivative_filter = filter;
    }

    pub fn set_p_gain(&mut self, p_gain: i32) {
        self.kp = p_gain;
    }

    pub fn set_i_gain(&mut self, i_gain: i32) {
        self.ki = i_gain / self.sample_rate;
    }

    pub fn reset_integral_error(&mut self) {
        self.integral = 0;
    }

    pub fn calculate(&mut self, setpoint: i32, measured: i32, allow_integral: bool) -> i32 {
        let error = setpoint - measured;
        let p_error = error.clamp(-self.pi_max, self.pi_max);

        if allow_integral {
            self.integral =
                (self.integral + p_error).clamp(-self.max_integral, self.max_integral);
        }

        let delta = self.last_measured - measured;
        self.last_measured = measured;
        self.filtered_delta += ((delta - self.filtered_delta) * self.derivative_filter) >> 8;

        let sum =
            self.kp * p_error + self.ki * self.integral + self.kd * self.filtered_delta;
        ((sum + self.round_offset) >> self.precision).clamp(-self.max_output, self.max_output)
    }
}
