//! Bench entry point: wires the flight loop to a rig of loopback drivers so
//! the whole stack runs end-to-end on a development machine. Real hardware
//! replaces each bench struct with its device driver behind the same seam.

use flight_controller::config::constants::ONE_G;
use flight_controller::config::store::PreferencesStore;
use flight_controller::control::control_loops::{FlightLoop, Peripherals};
use flight_controller::drivers::attitude::AttitudeEstimator;
use flight_controller::drivers::battery::BatteryMonitor;
use flight_controller::drivers::beeper::Beeper;
use flight_controller::drivers::sensors::{
    EscOutput, RadioReceiver, SensorCalibration, SensorSource,
};
use flight_controller::drivers::serial::NullPort;
use flight_controller::shared_core_values::{SensorFrame, MOTOR_COUNT, SHARED_REGIONS};
use flight_controller::threads;
use shared_definitions::controller::{RadioFrame, RADIO_CHANNELS};

/// Level-and-still estimator: zero orientation error, altitude tracked
/// straight off the barometer field.
#[derive(Default)]
struct BenchEstimator {
    altitude_mm: i32,
    gyro_zero: [i32; 3],
}

impl AttitudeEstimator for BenchEstimator {
    fn set_initial_altitude_guess(&mut self, altitude_mm: i32) {
        self.altitude_mm = altitude_mm;
    }

    fn set_gyro_zero(&mut self, x: i32, y: i32, z: i32) {
        self.gyro_zero = [x, y, z];
    }

    fn set_roll_correction(&mut self, _correction: [f32; 2]) {}
    fn set_pitch_correction(&mut self, _correction: [f32; 2]) {}
    fn set_auto_level_rates(&mut self, _roll_pitch: i32, _yaw: i32) {}
    fn set_manual_rates(&mut self, _roll_pitch: i32, _yaw: i32) {}

    fn update(&mut self, frame: &SensorFrame) {
        self.altitude_mm = frame.altitude_mm;
    }

    fn update_controls(&mut self, _radio: &RadioFrame, _manual_mode: bool) {}
    fn wait_for_completion(&mut self) {}

    fn roll_difference(&self) -> i32 {
        0
    }

    fn pitch_difference(&self) -> i32 {
        0
    }

    fn yaw_difference(&self) -> i32 {
        0
    }

    fn altitude_estimate(&self) -> i32 {
        self.altitude_mm
    }

    fn vertical_velocity_estimate(&self) -> i32 {
        0
    }

    fn thrust_factor(&self) -> i32 {
        256
    }

    fn reset_desired_orientation(&mut self) {}
    fn reset_desired_yaw(&mut self) {}

    fn quaternion(&self) -> [f32; 4] {
        [1.0, 0.0, 0.0, 0.0]
    }

    fn desired_quaternion(&self) -> [f32; 4] {
        [1.0, 0.0, 0.0, 0.0]
    }
}

/// Motionless airframe at one gravity.
struct BenchSensors;

impl SensorSource for BenchSensors {
    fn read_frame(&mut self) -> SensorFrame {
        SensorFrame {
            temperature: 250,
            accel_z: ONE_G,
            ..SensorFrame::default()
        }
    }
}

/// Sticks at rest: throttle low, gear up in Assisted.
struct BenchRadio;

impl RadioReceiver for BenchRadio {
    fn poll_channels(&mut self) -> Option<[i16; RADIO_CHANNELS]> {
        let mut channels = [0_i16; RADIO_CHANNELS];
        channels[0] = -1024;
        channels[4] = 1024;
        Some(channels)
    }
}

/// Logs the motor words once a second instead of driving pulses.
#[derive(Default)]
struct LoggingEsc {
    refreshes: u32,
}

impl EscOutput for LoggingEsc {
    fn write_pulses(&mut self, pulses: [i32; MOTOR_COUNT]) {
        if self.refreshes % 400 == 0 {
            log::info!("motor outputs {:?}", pulses);
        }
        self.refreshes = self.refreshes.wrapping_add(1);
    }
}

struct LoggingBeeper;

impl Beeper for LoggingBeeper {
    fn beep_hz(&mut self, freq_hz: u32, duration_ms: u32) {
        log::info!("beep {} Hz for {} ms", freq_hz, duration_ms);
    }

    fn alarm_on(&mut self, freq_hz: u32) {
        log::warn!("alarm on at {} Hz", freq_hz);
    }

    fn alarm_off(&mut self) {}
}

/// Healthy 3S pack.
struct BenchBattery;

impl BatteryMonitor for BenchBattery {
    fn start_discharge(&mut self) {}
    fn start_charge(&mut self) {}

    fn read_voltage(&mut self) -> i16 {
        1180
    }
}

struct NullSensorCalibration;

impl SensorCalibration for NullSensorCalibration {
    fn set_drift_values(&mut self, _scale: &[i32; 3]) {}
    fn set_accel_offset_values(&mut self, _offsets: &[i32; 3]) {}
    fn set_magnetometer_scale_offsets(&mut self, _scale_offsets: &[i32; 9]) {}
    fn temp_zero_drift_values(&mut self) {}
    fn reset_drift_values(&mut self) {}
    fn temp_zero_accel_offset_values(&mut self) {}
    fn reset_accel_offset_values(&mut self) {}
}

fn main() {
    env_logger::init();

    threads::spawn_sensor_task(BenchSensors, &SHARED_REGIONS)
        .expect("failed to spawn the sensor task");
    threads::spawn_radio_task(BenchRadio, &SHARED_REGIONS)
        .expect("failed to spawn the radio task");
    threads::spawn_servo_task(LoggingEsc::default(), &SHARED_REGIONS)
        .expect("failed to spawn the servo task");

    let peripherals = Peripherals {
        beeper: Box::new(LoggingBeeper),
        battery: Box::new(BenchBattery),
        sensor_control: Box::new(NullSensorCalibration),
        usb: Box::new(NullPort),
        modem: Box::new(NullPort),
    };

    let store = PreferencesStore::new("preferences.bin");
    let mut flight_loop =
        FlightLoop::new(BenchEstimator::default(), peripherals, store, &SHARED_REGIONS);

    flight_loop.startup();
    flight_loop.run();
}
