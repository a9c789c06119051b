use core::mem::{size_of, MaybeUninit};
use core::ptr;
use core::slice;

use crate::controller::RADIO_CHANNELS;

/// Size of the serialized preferences record, checksum included.
pub const PREFERENCES_SIZE: usize = size_of::<Preferences>();

/// User-tunable configuration record, stored as a raw checksummed blob and
/// shipped over the link byte-for-byte. The field layout is fixed; the
/// trailing checksum covers every 32-bit word before it.
///
/// Field groups are ordered widest-first so the record carries no implicit
/// padding and its size stays a multiple of four.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Preferences {
    // Sensor-driver calibration, handed to the sensor task at startup.
    pub drift_scale: [i32; 3],
    pub accel_offset: [i32; 3],
    pub mag_scale_ofs: [i32; 9],

    // Estimator trim and rates.
    pub roll_correct: [f32; 2],
    pub pitch_correct: [f32; 2],
    pub auto_level_roll_pitch: i32,
    pub auto_level_yaw_rate: i32,
    pub manual_roll_pitch_rate: i32,
    pub manual_yaw_rate: i32,

    // Throttle points, in servo output units.
    pub min_throttle: i16,
    pub min_throttle_armed: i16,
    pub max_throttle: i16,
    pub center_throttle: i16,

    // Receiver channel mapping: scaled = (raw[index] - center) * scale / 1024.
    pub channel_center: [i16; RADIO_CHANNELS],
    pub channel_scale: [i16; RADIO_CHANNELS],

    pub accel_correction_filter: i16,
    pub thrust_correction_scale: i16,
    pub voltage_offset: i16,
    pub low_voltage_alarm_threshold: i16,

    // Stick-gesture hold times, in loop ticks.
    pub arm_delay: u16,
    pub disarm_delay: u16,

    pub channel_index: [u8; RADIO_CHANNELS],
    pub use_sbus: u8,
    pub use_batt_mon: u8,
    pub disable_motors: u8,
    pub low_voltage_alarm: u8,

    pub checksum: u32,
}

impl Preferences {
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self as *const Self as *const u8, PREFERENCES_SIZE) }
    }

    /// Rebuilds a record from a raw blob. Every bit pattern is a valid
    /// `Preferences`, so this only has to reject wrong-sized input; checksum
    /// validity is the caller's concern.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != PREFERENCES_SIZE {
            return None;
        }
        let mut prefs = MaybeUninit::<Self>::uninit();
        unsafe {
            ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                prefs.as_mut_ptr() as *mut u8,
                PREFERENCES_SIZE,
            );
            Some(prefs.assume_init())
        }
    }

    /// Word-wise rotate-and-xor hash over the record, trailing checksum word
    /// excluded.
    pub fn calculate_checksum(&self) -> u32 {
        let bytes = self.as_bytes();
        let mut hash = 0x5555_5555_u32;
        for word in bytes[..PREFERENCES_SIZE - 4].chunks_exact(4) {
            hash = hash.rotate_left(7) ^ u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
        }
        hash
    }

    pub fn update_checksum(&mut self) {
        self.checksum = self.calculate_checksum();
    }

    pub fn checksum_valid(&self) -> bool {
        self.checksum == self.calculate_checksum()
    }
}

impl Default for Preferences {
    fn default() -> Self {
        let mut prefs = Self {
            drift_scale: [0; 3],
            accel_offset: [0; 3],
            mag_scale_ofs: [0; 9],
            roll_correct: [0.0, 1.0],
            pitch_correct: [0.0, 1.0],
            auto_level_roll_pitch: 1000,
            auto_level_yaw_rate: 1400,
            manual_roll_pitch_rate: 1500,
            manual_yaw_rate: 1500,
            min_throttle: 8000,
            min_throttle_armed: 8600,
            max_throttle: 16000,
            center_throttle: 12000,
            channel_center: [0; RADIO_CHANNELS],
            channel_scale: [1024; RADIO_CHANNELS],
            accel_correction_filter: 64,
            thrust_correction_scale: 128,
            voltage_offset: 0,
            low_voltage_alarm_threshold: 1050,
            arm_delay: 250,
            disarm_delay: 250,
            channel_index: [0, 1, 2, 3, 4, 5, 6, 7],
            use_sbus: 0,
            use_batt_mon: 1,
            disable_motors: 0,
            low_voltage_alarm: 1,
            checksum: 0,
        };
        prefs.update_checksum();
        prefs
    }
}
