//! Driver task harness. Every peripheral gets its own thread that pumps one
//! shared region, keeping the single-writer contract: the sensor and radio
//! tasks write, the servo task reads, and the flight loop sits on the other
//! side of each region.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::constants::{ESC_RATE_HZ, SENSOR_RATE_HZ};
use crate::drivers::sensors::{EscOutput, RadioReceiver, SensorSource};
use crate::shared_core_values::SharedRegions;

const DRIVER_STACK_SIZE: usize = 64 * 1024;

pub fn spawn_sensor_task(
    mut source: impl SensorSource + Send + 'static,
    regions: &'static SharedRegions,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("sensors".into())
        .stack_size(DRIVER_STACK_SIZE)
        .spawn(move || {
            let period = Duration::from_micros(1_000_000 / SENSOR_RATE_HZ as u64);
            loop {
                regions.sensors.store(&source.read_frame());
                thread::sleep(period);
            }
        })
}

pub fn spawn_radio_task(
    mut receiver: impl RadioReceiver + Send + 'static,
    regions: &'static SharedRegions,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("radio".into())
        .stack_size(DRIVER_STACK_SIZE)
        .spawn(move || loop {
            if let Some(channels) = receiver.poll_channels() {
                regions.radio.store_all(&channels);
            }
            thread::sleep(Duration::from_millis(2));
        })
}

pub fn spawn_servo_task(
    mut output: impl EscOutput + Send + 'static,
    regions: &'static SharedRegions,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("servos".into())
        .stack_size(DRIVER_STACK_SIZE)
        .spawn(move || {
            let period = Duration::from_micros(1_000_000 / ESC_RATE_HZ as u64);
            loop {
                output.write_pulses(regions.motors.read_all());
                thread::sleep(period);
            }
        })
}
