//! End-to-end flight loop scenarios against mock drivers: arming, altitude
//! hold entry, throttle kill, disarm, the low-battery alarm, and the ground
//! station link.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use flight_controller::config::store::PreferencesStore;
use flight_controller::control::control_loops::{FlightLoop, FlightMode, Peripherals};
use flight_controller::drivers::attitude::AttitudeEstimator;
use flight_controller::drivers::battery::BatteryMonitor;
use flight_controller::drivers::beeper::Beeper;
use flight_controller::drivers::sensors::SensorCalibration;
use flight_controller::drivers::serial::CommandPort;
use flight_controller::shared_core_values::{SensorFrame, SharedRegions};
use shared_definitions::controller::RadioFrame;
use shared_definitions::preferences::{Preferences, PREFERENCES_SIZE};
use shared_definitions::telemetry::{commands, packets, parse_frame};

// ── Mock estimator ───────────────────────────────────────────────────────────

#[derive(Default)]
struct ImuState {
    altitude_mm: i32,
    ascent_mm_s: i32,
    roll_difference: i32,
    pitch_difference: i32,
    yaw_difference: i32,
    thrust_factor: i32,
    gyro_zero: [i32; 3],
    orientation_resets: u32,
    yaw_resets: u32,
}

#[derive(Clone)]
struct MockImu(Rc<RefCell<ImuState>>);

impl MockImu {
    fn new() -> Self {
        MockImu(Rc::new(RefCell::new(ImuState {
            thrust_factor: 256,
            ..ImuState::default()
        })))
    }

    fn set_altitude(&self, altitude_mm: i32) {
        self.0.borrow_mut().altitude_mm = altitude_mm;
    }

    fn yaw_resets(&self) -> u32 {
        self.0.borrow().yaw_resets
    }

    fn orientation_resets(&self) -> u32 {
        self.0.borrow().orientation_resets
    }

    fn gyro_zero(&self) -> [i32; 3] {
        self.0.borrow().gyro_zero
    }
}

impl AttitudeEstimator for MockImu {
    fn set_initial_altitude_guess(&mut self, altitude_mm: i32) {
        self.0.borrow_mut().altitude_mm = altitude_mm;
    }

    fn set_gyro_zero(&mut self, x: i32, y: i32, z: i32) {
        self.0.borrow_mut().gyro_zero = [x, y, z];
    }

    fn set_roll_correction(&mut self, _correction: [f32; 2]) {}
    fn set_pitch_correction(&mut self, _correction: [f32; 2]) {}
    fn set_auto_level_rates(&mut self, _roll_pitch: i32, _yaw: i32) {}
    fn set_manual_rates(&mut self, _roll_pitch: i32, _yaw: i32) {}

    fn update(&mut self, _frame: &SensorFrame) {}
    fn update_controls(&mut self, _radio: &RadioFrame, _manual_mode: bool) {}
    fn wait_for_completion(&mut self) {}

    fn roll_difference(&self) -> i32 {
        self.0.borrow().roll_difference
    }

    fn pitch_difference(&self) -> i32 {
        self.0.borrow().pitch_difference
    }

    fn yaw_difference(&self) -> i32 {
        self.0.borrow().yaw_difference
    }

    fn altitude_estimate(&self) -> i32 {
        self.0.borrow().altitude_mm
    }

    fn vertical_velocity_estimate(&self) -> i32 {
        self.0.borrow().ascent_mm_s
    }

    fn thrust_factor(&self) -> i32 {
        self.0.borrow().thrust_factor
    }

    fn reset_desired_orientation(&mut self) {
        self.0.borrow_mut().orientation_resets += 1;
    }

    fn reset_desired_yaw(&mut self) {
        self.0.borrow_mut().yaw_resets += 1;
    }

    fn quaternion(&self) -> [f32; 4] {
        [1.0, 0.0, 0.0, 0.0]
    }

    fn desired_quaternion(&self) -> [f32; 4] {
        [1.0, 0.0, 0.0, 0.0]
    }
}

// ── Mock peripherals ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Beep {
    Tone(u32, u32),
    AlarmOn(u32),
    AlarmOff,
}

#[derive(Clone, Default)]
struct RecordingBeeper(Rc<RefCell<Vec<Beep>>>);

impl RecordingBeeper {
    fn events(&self) -> Vec<Beep> {
        self.0.borrow().clone()
    }

    fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Beeper for RecordingBeeper {
    fn beep_hz(&mut self, freq_hz: u32, duration_ms: u32) {
        self.0.borrow_mut().push(Beep::Tone(freq_hz, duration_ms));
    }

    fn alarm_on(&mut self, freq_hz: u32) {
        self.0.borrow_mut().push(Beep::AlarmOn(freq_hz));
    }

    fn alarm_off(&mut self) {
        self.0.borrow_mut().push(Beep::AlarmOff);
    }
}

#[derive(Clone)]
struct MockBattery(Rc<Cell<i16>>);

impl BatteryMonitor for MockBattery {
    fn start_discharge(&mut self) {}
    fn start_charge(&mut self) {}

    fn read_voltage(&mut self) -> i16 {
        self.0.get()
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

#[derive(Clone, Default)]
struct ScriptedPort {
    rx: Rc<RefCell<VecDeque<u8>>>,
    tx: Rc<RefCell<Vec<u8>>>,
}

impl ScriptedPort {
    fn push(&self, bytes: &[u8]) {
        self.rx.borrow_mut().extend(bytes.iter().copied());
    }

    fn sent(&self) -> Vec<u8> {
        self.tx.borrow().clone()
    }

    fn clear_sent(&self) {
        self.tx.borrow_mut().clear();
    }
}

impl CommandPort for ScriptedPort {
    fn check(&mut self) -> Option<u8> {
        self.rx.borrow_mut().pop_front()
    }

    fn get_timed(&mut self, _timeout_ms: u32) -> Option<u8> {
        self.rx.borrow_mut().pop_front()
    }

    fn write(&mut self, bytes: &[u8]) {
        self.tx.borrow_mut().extend_from_slice(bytes);
    }
}

// ── Rig ──────────────────────────────────────────────────────────────────────

struct Rig {
    regions: &'static SharedRegions,
    imu: MockImu,
    beeper: RecordingBeeper,
    battery_volts: Rc<Cell<i16>>,
    usb: ScriptedPort,
    flight: FlightLoop<'static, MockImu>,
}

static RIG_SEQ: AtomicU32 = AtomicU32::new(0);

fn rig_with_prefs(mut prefs: Preferences) -> Rig {
    let regions: &'static SharedRegions = Box::leak(Box::new(SharedRegions::new()));

    let mut path = std::env::temp_dir();
    path.push(format!(
        "fc-rig-{}-{}.bin",
        std::process::id(),
        RIG_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = std::fs::remove_file(&path);
    let store = PreferencesStore::new(&path);
    store.save(&mut prefs).unwrap();

    let imu = MockImu::new();
    let beeper = RecordingBeeper::default();
    let battery_volts = Rc::new(Cell::new(1180));
    let usb = ScriptedPort::default();

    let peripherals = Peripherals {
        beeper: Box::new(beeper.clone()),
        battery: Box::new(MockBattery(battery_volts.clone())),
        sensor_control: Box::new(NullSensorCalibration),
        usb: Box::new(usb.clone()),
        modem: Box::new(ScriptedPort::default()),
    };

    let flight = FlightLoop::new(imu.clone(), peripherals, store, regions);
    Rig {
        regions,
        imu,
        beeper,
        battery_volts,
        usb,
        flight,
    }
}

fn quick_arm_prefs() -> Preferences {
    let mut prefs = Preferences::default();
    prefs.arm_delay = 4;
    prefs.disarm_delay = 3;
    prefs
}

impl Rig {
    fn set_radio(&self, thro: i16, aile: i16, elev: i16, rudd: i16, gear: i16) {
        self.regions
            .radio
            .store_all(&[thro, aile, elev, rudd, gear, 0, 0, 0]);
    }

    fn neutral_sticks(&self) {
        self.set_radio(-1024, 0, 0, 0, 0);
    }

    fn hold_arming_gesture(&self) {
        self.set_radio(-1024, -1024, -1024, 1024, 0);
    }

    fn hold_disarm_gesture(&self) {
        self.set_radio(-1024, 1024, -1024, -1024, 0);
    }

    fn tick_n(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.flight.tick();
        }
    }

    /// Drives the arming gesture to completion.
    fn arm(&mut self) {
        self.hold_arming_gesture();
        let delay = self.flight.preferences().arm_delay as u32;
        self.tick_n(delay + 1);
        assert!(self.flight.state().flight_enabled, "rig failed to arm");
        self.neutral_sticks();
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn cold_start_arm_then_hover_locks_altitude() {
    let mut rig = rig_with_prefs(quick_arm_prefs());
    rig.imu.set_altitude(2500);
    // A slightly biased but still gyro, for the arming-time zero capture.
    rig.regions.sensors.store(&SensorFrame {
        gyro_x: 15,
        gyro_y: -8,
        gyro_z: 3,
        accel_z: 4096,
        ..SensorFrame::default()
    });

    // Gear centered: first tick drops into Automatic and syncs the target.
    rig.neutral_sticks();
    rig.tick_n(2);
    assert_eq!(rig.flight.state().flight_mode, FlightMode::Automatic);
    assert!(!rig.flight.state().flight_enabled);

    // Hold the arming gesture one tick short: still disarmed.
    rig.hold_arming_gesture();
    rig.tick_n(3);
    assert!(!rig.flight.state().flight_enabled);

    rig.tick_n(1);
    assert!(rig.flight.state().flight_enabled);
    assert_eq!(rig.flight.state().desired_altitude, 2500);
    // Arming re-ran the gyro zero capture against the live (still) sensors.
    assert_eq!(rig.imu.gyro_zero(), [15, -8, 3]);

    // Raise throttle into the deadband: altitude hold engages within a tick
    // and locks the estimate the loop was flying on.
    rig.set_radio(0, 0, 0, 0, 0);
    rig.imu.set_altitude(2600);
    rig.tick_n(1);
    assert!(rig.flight.state().is_holding);
    assert_eq!(rig.flight.state().desired_altitude, 2500);

    // The lock does not chase the estimate while holding.
    rig.tick_n(2);
    assert_eq!(rig.flight.state().desired_altitude, 2500);

    // Armed motor outputs stay inside the armed envelope.
    let prefs = rig.flight.preferences();
    let (low, high) = (prefs.min_throttle_armed as i32, prefs.max_throttle as i32);
    for output in rig.regions.motors.read_all() {
        assert!(output >= low && output <= high, "output {} out of range", output);
    }
}

#[test]
fn throttle_kill_freezes_integrators_but_keeps_flying() {
    let mut rig = rig_with_prefs(quick_arm_prefs());
    rig.arm();

    let resets_before = rig.imu.yaw_resets();
    rig.set_radio(-900, 0, 0, 0, 0);
    rig.tick_n(1);

    // Still armed, still producing bounded output.
    assert!(rig.flight.state().flight_enabled);
    let low = rig.flight.preferences().min_throttle_armed as i32;
    for output in rig.regions.motors.read_all() {
        assert!(output >= low);
    }
    // The integrate gate also re-syncs the yaw target every killed tick.
    assert!(rig.imu.yaw_resets() > resets_before);
}

#[test]
fn interrupted_arming_gesture_starts_over() {
    let mut prefs = quick_arm_prefs();
    prefs.arm_delay = 10;
    let mut rig = rig_with_prefs(prefs);

    rig.hold_arming_gesture();
    rig.tick_n(5);
    assert_eq!(rig.flight.state().flight_enable_step, 5);

    rig.neutral_sticks();
    rig.tick_n(1);
    assert_eq!(rig.flight.state().flight_enable_step, 0);

    rig.hold_arming_gesture();
    rig.tick_n(9);
    assert!(!rig.flight.state().flight_enabled);
    rig.tick_n(1);
    assert!(rig.flight.state().flight_enabled);
}

#[test]
fn disarm_gesture_parks_the_motors() {
    let mut rig = rig_with_prefs(quick_arm_prefs());
    rig.arm();
    rig.tick_n(2);

    rig.hold_disarm_gesture();
    rig.tick_n(4);

    assert!(!rig.flight.state().flight_enabled);
    let min = rig.flight.preferences().min_throttle as i32;
    assert_eq!(rig.regions.motors.read_all(), [min; 4]);
}

#[test]
fn mode_switch_into_automatic_syncs_the_altitude_target() {
    let mut rig = rig_with_prefs(quick_arm_prefs());
    rig.imu.set_altitude(3000);

    // Gear high: Assisted.
    rig.set_radio(-1024, 0, 0, 0, 1024);
    rig.tick_n(2);
    assert_eq!(rig.flight.state().flight_mode, FlightMode::Assisted);

    // Gear low: Manual, which re-seats the desired orientation.
    let resets_before = rig.imu.orientation_resets();
    rig.set_radio(-1024, 0, 0, 0, -1024);
    rig.tick_n(1);
    assert_eq!(rig.flight.state().flight_mode, FlightMode::Manual);
    assert!(rig.imu.orientation_resets() > resets_before);

    // Gear centered: Automatic grabs the current estimate.
    rig.set_radio(-1024, 0, 0, 0, 0);
    rig.tick_n(1);
    assert_eq!(rig.flight.state().flight_mode, FlightMode::Automatic);
    assert_eq!(rig.flight.state().desired_altitude, 3000);
    assert!(!rig.flight.state().is_holding);
}

#[test]
fn low_battery_raises_the_alarm_and_flashes_orange() {
    let mut prefs = quick_arm_prefs();
    prefs.low_voltage_alarm_threshold = 700;
    let mut rig = rig_with_prefs(prefs);
    rig.battery_volts.set(600);
    rig.neutral_sticks();

    let orange = 0xFF_00_00 | (0xFF_FF_00 & 0x7F_7F_7F);
    let mut saw_orange = false;
    let mut saw_alarm_on = false;

    for _ in 0..576 {
        rig.flight.tick();
        if rig.flight.state().led_color == orange {
            saw_orange = true;
        }
    }
    for event in rig.beeper.events() {
        if event == Beep::AlarmOn(5000) {
            saw_alarm_on = true;
        }
    }

    assert!(saw_alarm_on, "no low-voltage alarm tone");
    assert!(saw_orange, "no orange battery flash");
    assert!(rig.beeper.events().contains(&Beep::AlarmOff));
}

// ── Ground-station link ──────────────────────────────────────────────────────

#[test]
fn ping_gets_the_magic_reply() {
    let mut rig = rig_with_prefs(Preferences::default());
    rig.neutral_sticks();
    rig.usb.push(&[commands::PING]);
    rig.tick_n(1);
    assert_eq!(rig.usb.sent(), vec![commands::PING_REPLY]);
}

#[test]
fn preferences_query_then_upload_is_a_no_op() {
    let mut rig = rig_with_prefs(Preferences::default());
    rig.neutral_sticks();

    rig.usb.push(&[commands::QUERY_PREFERENCES]);
    rig.tick_n(1);

    let sent = rig.usb.sent();
    let (packet_type, payload) = parse_frame(&sent).expect("bad preferences frame");
    assert_eq!(packet_type, packets::PREFERENCES);
    assert_eq!(payload.len(), PREFERENCES_SIZE);

    let echoed = Preferences::from_bytes(payload).unwrap();
    assert!(echoed.checksum_valid());

    let before = rig.flight.preferences().as_bytes().to_vec();
    rig.beeper.clear();

    // Feed the echoed blob straight back.
    rig.usb.push(&[commands::UPLOAD_PREFERENCES]);
    rig.usb.push(payload);
    rig.tick_n(1);

    assert_eq!(rig.flight.preferences().as_bytes(), &before[..]);
    assert!(rig.flight.preferences().checksum_valid());
    // Success pattern: alarm cleared plus the double acknowledge beep.
    assert_eq!(
        rig.beeper.events(),
        vec![Beep::AlarmOff, Beep::Tone(5000, 80), Beep::Tone(5000, 80)]
    );
}

#[test]
fn upload_with_bad_checksum_changes_nothing() {
    let mut rig = rig_with_prefs(Preferences::default());
    rig.neutral_sticks();

    let before = rig.flight.preferences().as_bytes().to_vec();
    let mut blob = before.clone();
    blob[5] ^= 0x40; // corrupt one byte, checksum now stale

    rig.beeper.clear();
    rig.usb.push(&[commands::UPLOAD_PREFERENCES]);
    rig.usb.push(&blob);
    rig.tick_n(1);

    assert_eq!(rig.flight.preferences().as_bytes(), &before[..]);
    assert_eq!(rig.beeper.events(), vec![Beep::Tone(5000, 80)]);
}

#[test]
fn truncated_upload_times_out_and_changes_nothing() {
    let mut rig = rig_with_prefs(Preferences::default());
    rig.neutral_sticks();

    let before = rig.flight.preferences().as_bytes().to_vec();
    rig.beeper.clear();
    rig.usb.push(&[commands::UPLOAD_PREFERENCES]);
    rig.usb.push(&before[..PREFERENCES_SIZE / 2]);
    rig.tick_n(1);

    assert_eq!(rig.flight.preferences().as_bytes(), &before[..]);
    assert_eq!(rig.beeper.events(), vec![Beep::Tone(5000, 80)]);
}

#[test]
fn sensor_test_mode_streams_telemetry_over_usb() {
    let mut rig = rig_with_prefs(Preferences::default());
    rig.neutral_sticks();

    rig.usb.push(&[0x02]); // select sensor-test mode
    rig.usb.clear_sent();
    rig.tick_n(8);

    let sent = rig.usb.sent();
    assert!(!sent.is_empty(), "no telemetry streamed");

    // The first slot of the cycle is the radio+battery packet.
    let first_len = 18 + 6;
    let (packet_type, payload) = parse_frame(&sent[..first_len]).expect("bad telemetry frame");
    assert_eq!(packet_type, packets::RADIO_AND_BATTERY);
    assert_eq!(payload.len(), 18);
}

#[test]
fn restore_defaults_requires_the_confirmation_byte() {
    let mut custom = Preferences::default();
    custom.max_throttle = 15000;
    let mut rig = rig_with_prefs(custom);
    rig.neutral_sticks();

    // Single byte: ignored.
    rig.usb.push(&[commands::RESTORE_DEFAULTS]);
    rig.tick_n(1);
    assert_eq!(rig.flight.preferences().max_throttle, 15000);

    // Confirmed: wiped back to defaults and persisted.
    rig.usb.push(&[commands::RESTORE_DEFAULTS, commands::RESTORE_DEFAULTS]);
    rig.tick_n(1);
    assert_eq!(rig.flight.preferences().max_throttle, 16000);
}
