//! Ground-station link service. Both serial ports are polled once per tick
//! with non-blocking reads; the first byte of anything received selects a
//! command. Telemetry streams to whichever port has sent a heartbeat
//! recently, full-rate over USB and half-rate over the radio modem.

use std::thread;
use std::time::Duration;

use shared_definitions::controller::RADIO_CHANNELS;
use shared_definitions::preferences::{Preferences, PREFERENCES_SIZE};
use shared_definitions::telemetry::{commands, packets, DisplayMode, Packet};

use crate::config::constants::{
    LINK_PULSE_TICKS, MOTOR_TEST_THROTTLE, UPLOAD_BYTE_TIMEOUT_MS,
};
use crate::control::control_loops::FlightLoop;
use crate::drivers::attitude::AttitudeEstimator;
use crate::drivers::serial::CommandPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPort {
    Usb,
    Modem,
}

pub struct LinkState {
    pub mode: DisplayMode,
    pub nudge_motor: Option<u8>,
    /// Countdown ticks since the last heartbeat on each port.
    pub usb_pulse: i16,
    pub modem_pulse: i16,
}

impl LinkState {
    pub fn new() -> Self {
        LinkState {
            mode: DisplayMode::None,
            nudge_motor: None,
            usb_pulse: 0,
            modem_pulse: 0,
        }
    }
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, E> FlightLoop<'a, E>
where
    E: AttitudeEstimator,
{
    fn port_mut(&mut self, port: LinkPort) -> &mut dyn CommandPort {
        match port {
            LinkPort::Usb => self.usb.as_mut(),
            LinkPort::Modem => self.modem.as_mut(),
        }
    }

    /// Polls both ports and dispatches at most one command per tick.
    pub(crate) fn check_link_input(&mut self) {
        let (port, command) = if let Some(byte) = self.usb.check() {
            (LinkPort::Usb, byte)
        } else if let Some(byte) = self.modem.check() {
            (LinkPort::Modem, byte)
        } else {
            return;
        };

        // Any byte at or below the last display mode is a mode change and a
        // heartbeat for the sending port.
        if command <= DisplayMode::LAST {
            self.link.mode = DisplayMode::try_from(command).unwrap_or(DisplayMode::None);
            match port {
                LinkPort::Usb => {
                    self.link.usb_pulse = LINK_PULSE_TICKS;
                    self.link.modem_pulse = 0;
                }
                LinkPort::Modem => {
                    self.link.modem_pulse = LINK_PULSE_TICKS;
                    self.link.usb_pulse = 0;
                }
            }
            return;
        }

        // Motor nudges are only honored over the wired port.
        if port == LinkPort::Usb && (command & commands::NUDGE_MASK) == commands::NUDGE_BASE {
            self.link.nudge_motor = Some(command & 7);
            return;
        }

        if (command & 0xF8) == 0x10 && self.link.mode == DisplayMode::SensorTest {
            match command {
                commands::TEMP_ZERO_GYRO_DRIFT => self.sensor_control.temp_zero_drift_values(),
                commands::RESET_GYRO_DRIFT => self.sensor_control.reset_drift_values(),
                commands::RESET_CHANNEL_MAPPING => {
                    self.prefs.channel_scale = [1024; RADIO_CHANNELS];
                    self.prefs.channel_center = [0; RADIO_CHANNELS];
                    self.beeper.double_beep();
                    self.timer.reset();
                }
                commands::TEMP_ZERO_ACCEL_OFFSET => {
                    self.sensor_control.temp_zero_accel_offset_values()
                }
                commands::RESET_ACCEL_OFFSET => self.sensor_control.reset_accel_offset_values(),
                _ => {}
            }
        }

        match command {
            commands::QUERY_PREFERENCES => self.send_preferences(port),
            commands::UPLOAD_PREFERENCES => self.receive_preferences(port),
            commands::RESTORE_DEFAULTS => self.restore_default_preferences(port),
            commands::PING => self.port_mut(port).write(&[commands::PING_REPLY]),
            _ => {}
        }
    }

    /// Streams the telemetry slot for this tick and services motor tests.
    pub(crate) fn do_link_output(&mut self) {
        let mut stream = None;

        if self.link.usb_pulse > 0 {
            self.link.usb_pulse -= 1;
            if self.link.usb_pulse == 0 {
                self.link.mode = DisplayMode::None;
                return;
            }
            // Full cycle every 8 ticks.
            stream = Some((LinkPort::Usb, self.state.counter & 7));
        } else if self.link.modem_pulse > 0 {
            self.link.modem_pulse -= 1;
            if self.link.modem_pulse == 0 {
                self.link.mode = DisplayMode::None;
                return;
            }
            // Half rate: a slot only on even ticks, full cycle every 16.
            if self.state.counter & 1 == 0 {
                stream = Some((LinkPort::Modem, (self.state.counter >> 1) & 7));
            }
        }

        if self.link.mode == DisplayMode::None {
            return;
        }

        if self.link.mode == DisplayMode::SensorTest {
            if let Some((port, phase)) = stream {
                match phase {
                    0 => self.send_radio_and_battery(port),
                    1 => self.send_debug(port),
                    2 => self.send_raw_sensors(port),
                    4 => self.send_quaternion(port),
                    5 => self.send_motor_outputs(port),
                    6 => self.send_computed(port),
                    7 => self.send_desired_quaternion(port),
                    _ => {}
                }
            }
        }

        self.service_motor_nudge();
    }

    fn send_radio_and_battery(&mut self, port: LinkPort) {
        let mut packet = Packet::new(packets::RADIO_AND_BATTERY, 18);
        packet.add(&self.radio.to_le_bytes());
        packet.add(&self.state.battery_volts.to_le_bytes());
        let frame = packet.finish();
        self.port_mut(port).write(frame);
    }

    fn send_debug(&mut self, port: LinkPort) {
        let mut packet = Packet::new(packets::DEBUG, 8);
        packet.add(&self.state.loop_cycles_us.to_le_bytes());
        packet.add(&self.state.peak_cycles_us.to_le_bytes());
        let frame = packet.finish();
        self.port_mut(port).write(frame);
    }

    fn send_raw_sensors(&mut self, port: LinkPort) {
        let words = [
            self.sens.temperature as i16,
            self.sens.gyro_x as i16,
            self.sens.gyro_y as i16,
            self.sens.gyro_z as i16,
            self.sens.accel_x as i16,
            self.sens.accel_y as i16,
            self.sens.accel_z as i16,
            self.sens.mag_x as i16,
            self.sens.mag_y as i16,
            self.sens.mag_z as i16,
        ];
        let mut packet = Packet::new(packets::RAW_SENSORS, 20);
        for word in words {
            packet.add(&word.to_le_bytes());
        }
        let frame = packet.finish();
        self.port_mut(port).write(frame);
    }

    fn send_quaternion(&mut self, port: LinkPort) {
        let quaternion = self.estimator.quaternion();
        let mut packet = Packet::new(packets::QUATERNION, 16);
        for component in quaternion {
            packet.add(&component.to_le_bytes());
        }
        let frame = packet.finish();
        self.port_mut(port).write(frame);
    }

    fn send_motor_outputs(&mut self, port: LinkPort) {
        let outputs = self.motors.last_outputs();
        let mut packet = Packet::new(packets::MOTOR_OUTPUTS, 8);
        for output in outputs {
            packet.add(&(output as i16).to_le_bytes());
        }
        let frame = packet.finish();
        self.port_mut(port).write(frame);
    }

    fn send_computed(&mut self, port: LinkPort) {
        let values = [
            self.state.pitch_difference,
            self.state.roll_difference,
            self.state.yaw_difference,
            self.sens.altitude_mm,
            self.sens.alt_temperature,
            self.state.alti_est,
        ];
        let mut packet = Packet::new(packets::COMPUTED, 24);
        for value in values {
            packet.add(&value.to_le_bytes());
        }
        let frame = packet.finish();
        self.port_mut(port).write(frame);
    }

    fn send_desired_quaternion(&mut self, port: LinkPort) {
        let quaternion = self.estimator.desired_quaternion();
        let mut packet = Packet::new(packets::DESIRED_QUATERNION, 16);
        for component in quaternion {
            packet.add(&component.to_le_bytes());
        }
        let frame = packet.finish();
        self.port_mut(port).write(frame);
    }

    fn send_preferences(&mut self, port: LinkPort) {
        self.prefs.update_checksum();
        let mut packet = Packet::new(packets::PREFERENCES, PREFERENCES_SIZE as u8);
        packet.add(self.prefs.as_bytes());
        let frame = packet.finish();
        self.port_mut(port).write(frame);
        self.timer.reset();
    }

    /// Receives a full preferences blob and swaps it in atomically: the
    /// record only replaces the active one after every byte arrived and the
    /// checksum verified. Anything less leaves the active record untouched.
    fn receive_preferences(&mut self, port: LinkPort) {
        let mut buffer = [0_u8; PREFERENCES_SIZE];
        let mut complete = true;
        for byte in buffer.iter_mut() {
            match self.port_mut(port).get_timed(UPLOAD_BYTE_TIMEOUT_MS) {
                Some(value) => *byte = value,
                None => {
                    complete = false;
                    break;
                }
            }
        }

        let candidate = if complete {
            Preferences::from_bytes(&buffer).filter(Preferences::checksum_valid)
        } else {
            None
        };

        match candidate {
            Some(prefs) => {
                self.prefs = prefs;
                match self.store.save(&mut self.prefs) {
                    Ok(()) => {
                        self.beeper.alarm_off();
                        self.beeper.double_beep();
                        self.apply_prefs();
                        log::info!("new preferences applied");
                    }
                    Err(error) => {
                        log::error!("{}", error);
                        self.beeper.chirp();
                    }
                }
            }
            None => {
                log::warn!("rejected preferences upload");
                self.beeper.chirp();
            }
        }
        self.timer.reset();
    }

    fn restore_default_preferences(&mut self, port: LinkPort) {
        // Double-byte confirmation so line noise can't wipe a tune.
        if self.port_mut(port).get_timed(UPLOAD_BYTE_TIMEOUT_MS)
            == Some(commands::RESTORE_DEFAULTS)
        {
            self.prefs = Preferences::default();
            match self.store.save(&mut self.prefs) {
                Ok(()) => self.beeper.triple_beep(),
                Err(error) => {
                    log::error!("{}", error);
                    self.beeper.chirp();
                }
            }
        }
        self.timer.reset();
    }

    /// Bench-test actions requested over USB. These block the loop on
    /// purpose; the deadline is re-based afterwards.
    fn service_motor_nudge(&mut self) {
        let Some(nudge) = self.link.nudge_motor.take() else {
            return;
        };

        match nudge {
            0..=3 => self.motors.set_raw(nudge as usize, MOTOR_TEST_THROTTLE),
            4 => {
                self.beeper.beep_hz(4500, 50);
                thread::sleep(Duration::from_millis(60));
                self.beeper.beep_hz(3500, 50);
            }
            5 => self.run_led_rainbow(),
            6 => self.calibrate_esc_throttle_range(),
            7 => {
                let min = self.motors.min_throttle();
                self.motors.set_all_raw(min);
            }
            _ => {}
        }
        self.timer.reset();
    }

    fn run_led_rainbow(&mut self) {
        for step in 0_u32..256 {
            self.regions.leds.store(((255 - step) << 16) + (step << 8));
            thread::sleep(Duration::from_millis(2));
        }
        for step in 0_u32..256 {
            self.regions.leds.store(step + ((255 - step) << 8));
            thread::sleep(Duration::from_millis(2));
        }
        for step in 0_u32..256 {
            self.regions.leds.store((255 - step) + (step << 16));
            thread::sleep(Duration::from_millis(2));
        }
    }

    /// Walks the ESCs through their throttle-range learning sequence. Both
    /// handshakes are bounded reads so a dropped ground station cannot leave
    /// the loop wedged at full throttle forever.
    fn calibrate_esc_throttle_range(&mut self) {
        for _ in 0..4 {
            self.beeper.beep_hz(4500, 100);
            thread::sleep(Duration::from_millis(60));
        }

        // The operator confirms with a ping byte; anything else aborts.
        if self.usb.get_timed(10_000) == Some(commands::PING) {
            let max = self.motors.max_throttle();
            self.motors.set_all_raw(max);

            let _ = self.usb.get_timed(10_000);
            let min = self.motors.min_throttle();
            self.motors.set_all_raw(min);
        }
    }
}
