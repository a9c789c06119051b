//! Single-writer shared regions between the peripheral driver tasks and the
//! flight loop. Every region is a struct of word-sized atomics: the owning
//! task stores with Release, readers load with Acquire, and nobody locks.

use core::sync::atomic::{AtomicI16, AtomicI32, AtomicU32, Ordering};

use shared_definitions::controller::RADIO_CHANNELS;

pub const MOTOR_COUNT: usize = 4;

/// One snapshot of the raw sensor outputs, in driver units. Field order is
/// fixed so the raw-sensor telemetry packet can walk it front to back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct SensorFrame {
    pub temperature: i32,
    pub gyro_x: i32,
    pub gyro_y: i32,
    pub gyro_z: i32,
    pub accel_x: i32,
    pub accel_y: i32,
    pub accel_z: i32,
    pub mag_x: i32,
    pub mag_y: i32,
    pub mag_z: i32,
    /// Pressure altitude, millimeters.
    pub altitude_mm: i32,
    pub alt_temperature: i32,
}

/// Sensor region: written whole-frame by the sensor task, snapshotted once
/// per tick by the flight loop.
pub struct AtomicSensorFrame {
    temperature: AtomicI32,
    gyro: [AtomicI32; 3],
    accel: [AtomicI32; 3],
    mag: [AtomicI32; 3],
    altitude_mm: AtomicI32,
    alt_temperature: AtomicI32,
}

impl AtomicSensorFrame {
    pub const fn new() -> Self {
        const ZERO: AtomicI32 = AtomicI32::new(0);
        AtomicSensorFrame {
            temperature: ZERO,
            gyro: [ZERO; 3],
            accel: [ZERO; 3],
            mag: [ZERO; 3],
            altitude_mm: ZERO,
            alt_temperature: ZERO,
        }
    }

    pub fn store(&self, frame: &SensorFrame) {
        self.temperature.store(frame.temperature, Ordering::Relaxed);
        self.gyro[0].store(frame.gyro_x, Ordering::Relaxed);
        self.gyro[1].store(frame.gyro_y, Ordering::Relaxed);
        self.gyro[2].store(frame.gyro_z, Ordering::Relaxed);
        self.accel[0].store(frame.accel_x, Ordering::Relaxed);
        self.accel[1].store(frame.accel_y, Ordering::Relaxed);
        self.accel[2].store(frame.accel_z, Ordering::Relaxed);
        self.mag[0].store(frame.mag_x, Ordering::Relaxed);
        self.mag[1].store(frame.mag_y, Ordering::Relaxed);
        self.mag[2].store(frame.mag_z, Ordering::Relaxed);
        self.altitude_mm.store(frame.altitude_mm, Ordering::Relaxed);
        // Release on the last field publishes the whole frame.
        self.alt_temperature.store(frame.alt_temperature, Ordering::Release);
    }

    pub fn snapshot(&self) -> SensorFrame {
        let alt_temperature = self.alt_temperature.load(Ordering::Acquire);
        SensorFrame {
            temperature: self.temperature.load(Ordering::Relaxed),
            gyro_x: self.gyro[0].load(Ordering::Relaxed),
            gyro_y: self.gyro[1].load(Ordering::Relaxed),
            gyro_z: self.gyro[2].load(Ordering::Relaxed),
            accel_x: self.accel[0].load(Ordering::Relaxed),
            accel_y: self.accel[1].load(Ordering::Relaxed),
            accel_z: self.accel[2].load(Ordering::Relaxed),
            mag_x: self.mag[0].load(Ordering::Relaxed),
            mag_y: self.mag[1].load(Ordering::Relaxed),
            mag_z: self.mag[2].load(Ordering::Relaxed),
            altitude_mm: self.altitude_mm.load(Ordering::Relaxed),
            alt_temperature,
        }
    }

    /// Direct read of one gyro axis (0 = x, 1 = y, 2 = z), used by the bias
    /// capture which samples faster than the loop snapshots.
    pub fn gyro_axis(&self, axis: usize) -> i32 {
        self.gyro[axis].load(Ordering::Relaxed)
    }
}

/// Raw receiver channels as published by the radio task. Single words, so
/// per-channel reads are racy across the frame but coherent per value.
pub struct AtomicRadioChannels {
    channels: [AtomicI16; RADIO_CHANNELS],
}

impl AtomicRadioChannels {
    pub const fn new() -> Self {
        const ZERO: AtomicI16 = AtomicI16::new(0);
        AtomicRadioChannels {
            channels: [ZERO; RADIO_CHANNELS],
        }
    }

    pub fn store_all(&self, values: &[i16; RADIO_CHANNELS]) {
        for (cell, value) in self.channels.iter().zip(values) {
            cell.store(*value, Ordering::Release);
        }
    }

    pub fn get(&self, index: usize) -> i16 {
        self.channels[index & (RADIO_CHANNELS - 1)].load(Ordering::Relaxed)
    }
}

/// Motor output words, written by the flight loop and consumed continuously
/// by the servo task.
pub struct AtomicMotorOutputs {
    outputs: [AtomicI32; MOTOR_COUNT],
}

impl AtomicMotorOutputs {
    pub const fn new() -> Self {
        const ZERO: AtomicI32 = AtomicI32::new(0);
        AtomicMotorOutputs {
            outputs: [ZERO; MOTOR_COUNT],
        }
    }

    pub fn store(&self, motor: usize, value: i32) {
        self.outputs[motor].store(value, Ordering::Release);
    }

    pub fn read_all(&self) -> [i32; MOTOR_COUNT] {
        [
            self.outputs[0].load(Ordering::Relaxed),
            self.outputs[1].load(Ordering::Relaxed),
            self.outputs[2].load(Ordering::Relaxed),
            self.outputs[3].load(Ordering::Relaxed),
        ]
    }
}

/// Composite RGB word consumed by the LED driver.
pub struct AtomicLedColor(AtomicU32);

impl AtomicLedColor {
    pub const fn new() -> Self {
        AtomicLedColor(AtomicU32::new(0))
    }

    pub fn store(&self, color: u32) {
        self.0.store(color, Ordering::Release);
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

/// All shared regions, bundled so the loop and the task harness can be wired
/// from one place.
pub struct SharedRegions {
    pub sensors: AtomicSensorFrame,
    pub radio: AtomicRadioChannels,
    pub motors: AtomicMotorOutputs,
    pub leds: AtomicLedColor,
}

impl SharedRegions {
    pub const fn new() -> Self {
        SharedRegions {
            sensors: AtomicSensorFrame::new(),
            radio: AtomicRadioChannels::new(),
            motors: AtomicMotorOutputs::new(),
            leds: AtomicLedColor::new(),
        }
    }
}

pub static SHARED_REGIONS: SharedRegions = SharedRegions::new();
