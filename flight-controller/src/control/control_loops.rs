//! The 250 Hz master flight loop: sensor intake, attitude update, pilot
//! input, mode and arming state machines, the cascade PID controllers, motor
//! mixing, and the periodic housekeeping (battery ticker, LED status, ground
//! link service).

use std::thread;
use std::time::Duration;

use shared_definitions::controller::{RadioFrame, RADIO_CHANNELS};
use shared_definitions::preferences::Preferences;

use crate::communication_interfaces::ground_station::LinkState;
use crate::config::constants::{
    ACCEL_ASSIST_Z_FACTOR, ALTI_THROTTLE_DEADBAND, ONE_G, UPDATE_RATE_HZ,
};
use crate::config::store::PreferencesStore;
use crate::control::gyro_bias::{BiasCapture, CaptureStep};
use crate::control::led_status::{self, colors};
use crate::control::pid::IntPid;
use crate::drivers::attitude::AttitudeEstimator;
use crate::drivers::battery::BatteryMonitor;
use crate::drivers::beeper::Beeper;
use crate::drivers::sensors::SensorCalibration;
use crate::drivers::serial::CommandPort;
use crate::output::motor_mixer;
use crate::output::motors_state_manager::MotorsStateManager;
use crate::shared_core_values::{SensorFrame, SharedRegions};
use crate::util::time::{get_current_system_time_us, LoopTimer};

/// Stick deflection that counts as "pushed" for the arm/disarm gestures.
const GESTURE_THRESHOLD: i16 = 750;
/// Ticks the compass-calibration gesture must be held.
const COMPASS_GESTURE_TICKS: i16 = 250;
/// Below this throttle the PID integrators are frozen.
const INTEGRATE_THROTTLE_FLOOR: i16 = -800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FlightMode {
    Assisted = 0,
    Automatic = 1,
    Manual = 2,
    CalibrateCompass = 3,
}

/// Everything the loop owns and mutates; drivers only ever see their own
/// shared regions.
pub struct FlightState {
    pub flight_enabled: bool,
    pub flight_mode: FlightMode,
    pub is_holding: bool,
    pub desired_altitude: i32,
    pub desired_ascent_rate: i32,
    pub alti_est: i32,
    pub ascent_est: i32,
    pub roll_difference: i32,
    pub pitch_difference: i32,
    pub yaw_difference: i32,
    pub flight_enable_step: i16,
    pub compass_config_step: i16,
    pub battery_monitor_delay: i16,
    pub battery_volts: i16,
    pub loop_cycles_us: i32,
    pub peak_cycles_us: i32,
    pub counter: i32,
    pub led_color: u32,
}

impl FlightState {
    fn new() -> Self {
        FlightState {
            flight_enabled: false,
            flight_mode: FlightMode::Assisted,
            is_holding: false,
            desired_altitude: 0,
            desired_ascent_rate: 0,
            alti_est: 0,
            ascent_est: 0,
            roll_difference: 0,
            pitch_difference: 0,
            yaw_difference: 0,
            flight_enable_step: 0,
            compass_config_step: 0,
            // Give the ESCs two seconds to arm before the monitor starts
            // pulling charge, rounded to whole 16-tick measurement cycles.
            battery_monitor_delay: ((UPDATE_RATE_HZ * 2) & !15) as i16,
            battery_volts: 0,
            loop_cycles_us: 0,
            peak_cycles_us: 0,
            counter: 0,
            led_color: 0,
        }
    }
}

pub struct FlightPids {
    pub roll: IntPid,
    pub pitch: IntPid,
    pub yaw: IntPid,
    pub alt: IntPid,
    pub ascent: IntPid,
}

impl FlightPids {
    fn new() -> Self {
        let rate = UPDATE_RATE_HZ as i32;

        // Baseline gains; roll/pitch share a tuning.
        let roll_pitch_p = 8000;
        let roll_pitch_d = 20000 * rate;

        let mut roll = IntPid::new(roll_pitch_p, 0, roll_pitch_d, rate);
        roll.set_precision(12);
        roll.set_max_output(3000);
        roll.set_pi_max(100);
        roll.set_max_integral(1900);
        roll.set_derivative_filter(128);

        let mut pitch = IntPid::new(roll_pitch_p, 0, roll_pitch_d, rate);
        pitch.set_precision(12);
        pitch.set_max_output(3000);
        pitch.set_pi_max(100);
        pitch.set_max_integral(1900);
        pitch.set_derivative_filter(128);

        let mut yaw = IntPid::new(15000, 200 * rate, 10000 * rate, rate);
        yaw.set_precision(12);
        yaw.set_max_output(5000);
        yaw.set_pi_max(100);
        yaw.set_max_integral(2000);
        yaw.set_derivative_filter(192);

        // Altitude hold feeds ascent-rate setpoints into the ascent PID;
        // its output clamp is the fastest climb it will ever ask for.
        let mut alt = IntPid::new(600, 500 * rate, 0, rate);
        alt.set_precision(14);
        alt.set_max_output(5000);
        alt.set_pi_max(1000);
        alt.set_max_integral(4000);

        // The ascent PID turns rate error into throttle delta.
        let mut ascent = IntPid::new(1100, 0, 0, rate);
        ascent.set_precision(12);
        ascent.set_max_output(4000);
        ascent.set_pi_max(500);
        ascent.set_max_integral(2000);

        FlightPids {
            roll,
            pitch,
            yaw,
            alt,
            ascent,
        }
    }
}

/// Out-of-scope peripheral seams, bundled for wiring.
pub struct Peripherals {
    pub beeper: Box<dyn Beeper>,
    pub battery: Box<dyn BatteryMonitor>,
    pub sensor_control: Box<dyn SensorCalibration>,
    pub usb: Box<dyn CommandPort>,
    pub modem: Box<dyn CommandPort>,
}

/// Compass-calibration scratchpad: quadrant coverage tracking plus per-axis
/// extremes. The capture math is still a placeholder, matching the entry
/// gesture which is wired but leads nowhere yet.
#[allow(dead_code)]
#[derive(Default)]
pub(crate) struct CompassCalibration {
    start_quadrant: u8,
    quadrants: u8,
    step: u8,
    x_min: i32,
    x_max: i32,
    y_min: i32,
    y_max: i32,
    z_min: i32,
    z_max: i32,
}

pub struct FlightLoop<'a, E> {
    pub(crate) prefs: Preferences,
    pub(crate) store: PreferencesStore,
    pub(crate) estimator: E,
    pub(crate) beeper: Box<dyn Beeper>,
    pub(crate) battery: Box<dyn BatteryMonitor>,
    pub(crate) sensor_control: Box<dyn SensorCalibration>,
    pub(crate) usb: Box<dyn CommandPort>,
    pub(crate) modem: Box<dyn CommandPort>,
    pub(crate) regions: &'a SharedRegions,
    pub(crate) motors: MotorsStateManager<'a>,
    pub(crate) link: LinkState,
    pub(crate) state: FlightState,
    pub(crate) pids: FlightPids,
    pub(crate) timer: LoopTimer,
    pub(crate) sens: SensorFrame,
    pub(crate) radio: RadioFrame,
    gyro_zero: [i32; 3],
    gyro_roll: i32,
    gyro_pitch: i32,
    gyro_yaw: i32,
    gyro_rp_filter: i32,
    gyro_yaw_filter: i32,
    accel_z_smooth: i32,
    compass_cal: CompassCalibration,
}

impl<'a, E> FlightLoop<'a, E>
where
    E: AttitudeEstimator,
{
    pub fn new(
        estimator: E,
        peripherals: Peripherals,
        store: PreferencesStore,
        regions: &'a SharedRegions,
    ) -> Self {
        let prefs = store.load();
        let motors = MotorsStateManager::new(&regions.motors, &prefs);

        let mut flight_loop = FlightLoop {
            prefs,
            store,
            estimator,
            beeper: peripherals.beeper,
            battery: peripherals.battery,
            sensor_control: peripherals.sensor_control,
            usb: peripherals.usb,
            modem: peripherals.modem,
            regions,
            motors,
            link: LinkState::new(),
            state: FlightState::new(),
            pids: FlightPids::new(),
            timer: LoopTimer::new(UPDATE_RATE_HZ),
            sens: SensorFrame::default(),
            radio: RadioFrame::default(),
            gyro_zero: [0; 3],
            gyro_roll: 0,
            gyro_pitch: 0,
            gyro_yaw: 0,
            // Damping for gyro noise, 1 (heavy) to 256 (none).
            gyro_rp_filter: 192,
            gyro_yaw_filter: 192,
            accel_z_smooth: 0,
            compass_cal: CompassCalibration::default(),
        };
        flight_loop.motors.preload_min();
        flight_loop.apply_prefs();
        flight_loop
    }

    pub fn state(&self) -> &FlightState {
        &self.state
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    pub fn estimator_mut(&mut self) -> &mut E {
        &mut self.estimator
    }

    /// Pushes the active preferences down into every consumer.
    pub fn apply_prefs(&mut self) {
        self.sensor_control.set_drift_values(&self.prefs.drift_scale);
        self.sensor_control
            .set_accel_offset_values(&self.prefs.accel_offset);
        self.sensor_control
            .set_magnetometer_scale_offsets(&self.prefs.mag_scale_ofs);

        self.estimator.set_roll_correction(self.prefs.roll_correct);
        self.estimator.set_pitch_correction(self.prefs.pitch_correct);
        self.estimator.set_auto_level_rates(
            self.prefs.auto_level_roll_pitch,
            self.prefs.auto_level_yaw_rate,
        );
        self.estimator
            .set_manual_rates(self.prefs.manual_roll_pitch_rate, self.prefs.manual_yaw_rate);

        self.motors.apply_limits(&self.prefs);
    }

    /// One-time startup: seed the altitude estimate from the first sensor
    /// frame and capture the gyro zeros before anything can spin.
    pub fn startup(&mut self) {
        self.sens = self.regions.sensors.snapshot();
        self.estimator.set_initial_altitude_guess(self.sens.altitude_mm);
        self.find_gyro_zero();
        log::info!("flight loop ready");
    }

    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
            self.timer.wait_next();
        }
    }

    /// One full loop iteration.
    pub fn tick(&mut self) {
        let tick_start_us = get_current_system_time_us();

        // Snapshot all sensor inputs once; the copy is this tick's truth.
        self.sens = self.regions.sensors.snapshot();

        // Kick the estimator early so it runs while the rest of the tick
        // does its work; the barrier comes later.
        self.estimator.update(&self.sens);

        self.accel_z_smooth += (self.sens.accel_z - self.accel_z_smooth)
            * self.prefs.accel_correction_filter as i32
            / 256;

        self.radio = scale_radio_channels(self.regions, &self.prefs);

        if self.state.flight_mode == FlightMode::CalibrateCompass {
            self.update_compass_calibration();
        } else {
            self.arbitrate_flight_mode();
            self.update_flight_loop();
        }

        self.battery_monitor_tick();
        self.regions.leds.store(self.state.led_color);

        self.estimator.wait_for_completion();
        self.estimator
            .update_controls(&self.radio, self.state.flight_mode == FlightMode::Manual);
        self.estimator.wait_for_completion();

        self.state.pitch_difference = self.estimator.pitch_difference();
        self.state.roll_difference = self.estimator.roll_difference();
        self.state.yaw_difference = -self.estimator.yaw_difference();
        self.state.alti_est = self.estimator.altitude_estimate();
        self.state.ascent_est = self.estimator.vertical_velocity_estimate();

        self.check_link_input();
        self.do_link_output();

        self.state.loop_cycles_us = (get_current_system_time_us() - tick_start_us) as i32;
        self.state.peak_cycles_us = self.state.peak_cycles_us.max(self.state.loop_cycles_us);
        self.state.counter = self.state.counter.wrapping_add(1);
    }

    /// Three-position gear switch picks the flight mode each tick.
    fn arbitrate_flight_mode(&mut self) {
        let new_mode = if self.radio.gear() > 512 {
            FlightMode::Assisted
        } else if self.radio.gear() < -512 {
            FlightMode::Manual
        } else {
            FlightMode::Automatic
        };

        if new_mode != self.state.flight_mode {
            if new_mode == FlightMode::Manual {
                self.estimator.reset_desired_orientation();
            } else {
                // Sync the heading when acquiring auto-level, or yaw snaps.
                self.estimator.reset_desired_yaw();
            }

            if new_mode == FlightMode::Automatic {
                self.state.desired_altitude = self.state.alti_est;
            }

            // Any mode change means altitude hold starts over.
            self.state.is_holding = false;
            self.state.flight_mode = new_mode;
            log::info!("flight mode {:?}", new_mode);
        }
    }

    fn update_flight_loop(&mut self) {
        self.update_flight_led_color();

        if !self.state.flight_enabled {
            self.check_arming_gestures();
        } else {
            // Sticks down and away from center disarms.
            if self.radio.rudd() < -GESTURE_THRESHOLD
                && self.radio.aile() > GESTURE_THRESHOLD
                && self.radio.thro() < -GESTURE_THRESHOLD
                && self.radio.elev() < -GESTURE_THRESHOLD
            {
                self.state.flight_enable_step += 1;
                self.state.led_color = colors::YELLOW & colors::HALF;
                if self.state.flight_enable_step >= self.prefs.disarm_delay as i16 {
                    self.disarm();
                    // Leave the zeroed motor outputs untouched this tick.
                    return;
                }
            } else {
                self.state.flight_enable_step = 0;
            }

            self.run_armed_controllers();
        }

        self.low_voltage_alarm_tick();
    }

    /// Arming and compass-calibration gestures, only while disarmed.
    fn check_arming_gestures(&mut self) {
        if self.radio.thro() < -GESTURE_THRESHOLD && self.radio.elev() < -GESTURE_THRESHOLD {
            if self.radio.rudd() > GESTURE_THRESHOLD && self.radio.aile() < -GESTURE_THRESHOLD {
                self.state.flight_enable_step += 1;
                self.state.compass_config_step = 0;
                self.state.led_color = colors::YELLOW & colors::HALF;
                if self.state.flight_enable_step >= self.prefs.arm_delay as i16 {
                    self.arm();
                }
            } else if self.radio.rudd() > GESTURE_THRESHOLD
                && self.radio.aile() > GESTURE_THRESHOLD
            {
                self.state.compass_config_step += 1;
                self.state.flight_enable_step = 0;
                self.state.led_color = (colors::BLUE | colors::RED) & colors::HALF;
                if self.state.compass_config_step == COMPASS_GESTURE_TICKS {
                    self.start_compass_calibration();
                }
            } else {
                self.state.compass_config_step = 0;
                self.state.flight_enable_step = 0;
            }
        } else {
            self.state.compass_config_step = 0;
            self.state.flight_enable_step = 0;
        }
    }

    /// The armed control law: filtered rates, cascade PIDs, throttle
    /// shaping, and the X mixer.
    fn run_armed_controllers(&mut self) {
        // Remap gyro axes into body roll/pitch/yaw rates, bias removed.
        let gr = self.sens.gyro_y - self.gyro_zero[1];
        let gp = -(self.sens.gyro_x - self.gyro_zero[0]);
        let gy = -(self.sens.gyro_z - self.gyro_zero[2]);

        self.gyro_roll += ((gr - self.gyro_roll) * self.gyro_rp_filter) >> 8;
        self.gyro_pitch += ((gp - self.gyro_pitch) * self.gyro_rp_filter) >> 8;
        self.gyro_yaw += ((gy - self.gyro_yaw) * self.gyro_yaw_filter) >> 8;

        let do_integrate = if self.radio.thro() < INTEGRATE_THROTTLE_FLOOR {
            // Throttle essentially zero: no control authority, no windup.
            if self.state.flight_mode == FlightMode::Manual {
                self.estimator.reset_desired_orientation();
            } else {
                // Zeroing the yaw target here makes liftoff more stable.
                self.estimator.reset_desired_yaw();
            }
            false
        } else {
            true
        };

        let roll_out =
            self.pids
                .roll
                .calculate(self.state.roll_difference, self.gyro_roll, do_integrate);
        let pitch_out =
            self.pids
                .pitch
                .calculate(self.state.pitch_difference, self.gyro_pitch, do_integrate);
        let yaw_out =
            self.pids
                .yaw
                .calculate(self.state.yaw_difference, self.gyro_yaw, do_integrate);

        let thro = self.radio.thro() as i32;
        // Attitude authority ramps in over the first 1/8 of throttle travel.
        let thro_mix = ((thro + 1024) >> 2).clamp(0, 64);
        // Re-center the stick range onto the servo output scale.
        let mut thro_out = (thro << 2) + 12000;

        if self.state.flight_mode != FlightMode::Manual {
            if self.state.flight_mode == FlightMode::Automatic {
                thro_out = self.altitude_cascade(do_integrate);
            }

            if ACCEL_ASSIST_Z_FACTOR > 0
                && (self.radio.aile() as i32).abs() < 300
                && (self.radio.elev() as i32).abs() < 300
                && thro_mix > 32
            {
                // Hovering hands-off: damp height flutter with smoothed
                // vertical acceleration.
                thro_out -= (self.accel_z_smooth - ONE_G) * ACCEL_ASSIST_Z_FACTOR / 64;
            }

            if self.prefs.thrust_correction_scale > 0 {
                let scale = self.prefs.thrust_correction_scale as i32;
                let thrust_mul =
                    (256 + (self.estimator.thrust_factor() - 256) * scale / 256).clamp(256, 384);
                let min_throttle = self.motors.min_throttle();
                thro_out = min_throttle + (((thro_out - min_throttle) * thrust_mul) >> 8);
            }
        }

        let mixed = motor_mixer::mix(thro_out, pitch_out, roll_out, yaw_out, thro_mix);
        self.motors.set_armed_outputs(mixed);
    }

    /// Automatic-mode altitude/ascent cascade; returns the shaped throttle.
    fn altitude_cascade(&mut self, do_integrate: bool) -> i32 {
        let thro = self.radio.thro() as i32;
        let mut adjusted_throttle = 0;

        if thro.abs() > ALTI_THROTTLE_DEADBAND {
            // Stick is commanding a climb or descent; drop out of hold.
            self.state.is_holding = false;

            // Remove the deadband span so leaving it doesn't step the rate.
            adjusted_throttle = if thro > 0 {
                thro - ALTI_THROTTLE_DEADBAND
            } else {
                thro + ALTI_THROTTLE_DEADBAND
            };
            self.state.desired_ascent_rate =
                adjusted_throttle * 6000 / (1024 - ALTI_THROTTLE_DEADBAND);
        } else {
            if !self.state.is_holding {
                // Just entered hold: lock the current altitude.
                self.state.is_holding = true;
                self.state.desired_altitude = self.state.alti_est;
                self.pids.alt.reset_integral_error();
            }

            self.state.desired_ascent_rate = self.pids.alt.calculate(
                self.state.desired_altitude,
                self.state.alti_est,
                do_integrate,
            );
        }

        // In-flight tuning of the ascent controller from the aux knobs.
        self.pids.ascent.set_p_gain(1024 + self.radio.aux2() as i32);
        self.pids
            .ascent
            .set_i_gain((1024 + self.radio.aux3() as i32) * UPDATE_RATE_HZ as i32);

        let alti_thrust = self.pids.ascent.calculate(
            self.state.desired_ascent_rate,
            self.state.ascent_est,
            do_integrate,
        );

        // A slice of the raw stick comes back in so throttle changes feel
        // immediate instead of waiting on the cascade.
        self.prefs.center_throttle as i32 + alti_thrust + adjusted_throttle
    }

    pub(crate) fn arm(&mut self) {
        self.state.flight_enabled = true;
        self.state.flight_enable_step = 0;
        self.state.compass_config_step = 0;
        self.beeper.double_beep();

        self.regions.leds.store(colors::RED & colors::HALF);
        self.find_gyro_zero();

        self.regions.leds.store(colors::BLUE & colors::HALF);
        self.beeper.arm_tune();

        self.state.desired_altitude = self.state.alti_est;
        self.timer.reset();
        log::info!("armed");
    }

    pub(crate) fn disarm(&mut self) {
        self.motors.preload_min();
        self.state.flight_enabled = false;
        self.state.flight_enable_step = 0;
        self.state.compass_config_step = 0;
        self.beeper.triple_beep();
        self.regions.leds.store(colors::GREEN & colors::HALF);
        self.timer.reset();
        log::info!("disarmed");
    }

    /// Captures gyro zeros from the live sensor region. Deliberately
    /// monopolizes the loop; the deadline is re-based on exit.
    pub(crate) fn find_gyro_zero(&mut self) {
        // Let any buzzer vibration die out first; the gyro really is
        // sensitive enough to pick it up.
        thread::sleep(Duration::from_millis(20));

        let mut capture = BiasCapture::new();
        loop {
            let sample = [
                self.regions.sensors.gyro_axis(0),
                self.regions.sensors.gyro_axis(1),
                self.regions.sensors.gyro_axis(2),
            ];
            match capture.feed(sample) {
                CaptureStep::Sampling => {}
                CaptureStep::WindowDone { tries } => {
                    // Every 4th window, let the pilot know we're still at it.
                    if tries % 4 == 0 {
                        self.beeper.beep_hz(4000, 80);
                    }
                }
                CaptureStep::Settled(zero) => {
                    self.gyro_zero = zero;
                    self.estimator.set_gyro_zero(zero[0], zero[1], zero[2]);
                    log::info!(
                        "gyro zero {:?}, variance {:?} after {} tries",
                        zero,
                        capture.best_variance(),
                        capture.tries()
                    );
                    break;
                }
            }
            thread::sleep(Duration::from_millis(2));
        }

        self.timer.reset();
    }

    fn update_flight_led_color(&mut self) {
        let low_battery = self.prefs.use_batt_mon != 0
            && self.state.battery_volts < self.prefs.low_voltage_alarm_threshold
            && self.state.battery_volts > 200;

        self.state.led_color = led_status::flight_status_color(
            self.state.flight_mode,
            self.state.flight_enabled,
            self.state.is_holding,
            low_battery,
            self.state.counter,
        );
    }

    /// 16-tick RC charge-timing cycle for the battery monitor.
    fn battery_monitor_tick(&mut self) {
        if self.prefs.use_batt_mon == 0 {
            return;
        }

        if self.state.battery_monitor_delay > 0 {
            self.state.battery_monitor_delay -= 1;
            self.state.led_color = colors::BLUE;
            return;
        }

        match self.state.counter & 15 {
            0 => self.battery.start_discharge(),
            2 => self.battery.start_charge(),
            15 => {
                self.state.battery_volts =
                    self.battery.read_voltage() + self.prefs.voltage_offset;
            }
            _ => {}
        }
    }

    fn low_voltage_alarm_tick(&mut self) {
        if self.prefs.use_batt_mon == 0 || self.prefs.low_voltage_alarm == 0 {
            return;
        }

        // The >200 floor rejects a disconnected or unreadable monitor.
        if self.state.battery_volts < self.prefs.low_voltage_alarm_threshold
            && self.state.battery_volts > 200
            && (self.state.counter & 63) == 0
        {
            self.beeper.alarm_on(5000);
        } else if (self.state.counter & 63) > 32 {
            self.beeper.alarm_off();
        }
    }

    fn start_compass_calibration(&mut self) {
        // Placeholder
        self.compass_cal = CompassCalibration::default();
        self.state.compass_config_step = 0;
        log::warn!("compass calibration is not implemented");
    }

    fn update_compass_calibration(&mut self) {
        // Placeholder
    }
}

/// Applies the per-channel index/center/scale mapping from the raw receiver
/// words to the scaled frame the loop flies on.
pub(crate) fn scale_radio_channels(
    regions: &SharedRegions,
    prefs: &Preferences,
) -> RadioFrame {
    let mut frame = RadioFrame::default();
    for channel in 0..RADIO_CHANNELS {
        let raw = regions.radio.get(prefs.channel_index[channel] as usize) as i32;
        let scaled =
            (raw - prefs.channel_center[channel] as i32) * prefs.channel_scale[channel] as i32
                / 1024;
        frame.channels[channel] = scaled as i16;
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_core_values::SharedRegions;

    #[test]
    fn identity_mapping_passes_raw_channels_through() {
        let regions = SharedRegions::new();
        let raw = [100, -200, 300, -400, 512, 0, -1024, 1024];
        regions.radio.store_all(&raw);

        let frame = scale_radio_channels(&regions, &Preferences::default());
        assert_eq!(frame.channels, raw);
    }

    #[test]
    fn center_and_scale_are_applied_per_channel() {
        let regions = SharedRegions::new();
        regions.radio.store_all(&[600, 0, 0, 0, 0, 0, 0, 0]);

        let mut prefs = Preferences::default();
        prefs.channel_center[0] = 100;
        prefs.channel_scale[0] = 512;
        let frame = scale_radio_channels(&regions, &prefs);
        assert_eq!(frame.thro(), 250);
    }

    #[test]
    fn channel_index_remaps_inputs() {
        let regions = SharedRegions::new();
        regions.radio.store_all(&[11, 22, 33, 44, 55, 66, 77, 88]);

        let mut prefs = Preferences::default();
        prefs.channel_index = [3, 2, 1, 0, 7, 6, 5, 4];
        let frame = scale_radio_channels(&regions, &prefs);
        assert_eq!(frame.thro(), 44);
        assert_eq!(frame.rudd(), 11);
        assert_eq!(frame.gear(), 88);
    }
}
