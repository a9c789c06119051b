//! Serial link protocol between the flight controller and the ground
//! station: command opcodes, telemetry packet types, and the wire framing.
//!
//! A frame is `<sig0><sig1><type><len><payload...><chk_lo><chk_hi>`; the
//! checksum is the 16-bit complement-of-sum over everything after the
//! signature, so a receiver can validate with one pass.

use crate::preferences::PREFERENCES_SIZE;

pub const LINK_SIGNATURE: [u8; 2] = [0x55, 0xAA];
pub const FRAME_OVERHEAD: usize = 6;
pub const MAX_PAYLOAD: usize = PREFERENCES_SIZE;

/// First-byte command set consumed by the flight controller.
pub mod commands {
    /// 0x08..=0x0F over USB only; low three bits select the test target.
    pub const NUDGE_BASE: u8 = 0x08;
    pub const NUDGE_MASK: u8 = 0xF8;

    pub const TEMP_ZERO_GYRO_DRIFT: u8 = 0x10;
    pub const RESET_GYRO_DRIFT: u8 = 0x11;
    pub const RESET_CHANNEL_MAPPING: u8 = 0x13;
    pub const TEMP_ZERO_ACCEL_OFFSET: u8 = 0x14;
    pub const RESET_ACCEL_OFFSET: u8 = 0x15;

    pub const QUERY_PREFERENCES: u8 = 0x18;
    pub const UPLOAD_PREFERENCES: u8 = 0x19;
    /// Sent twice in a row as a confirmation.
    pub const RESTORE_DEFAULTS: u8 = 0x1A;

    pub const PING: u8 = 0xFF;
    pub const PING_REPLY: u8 = 0xE8;
}

/// Telemetry packet type identifiers, with payload sizes in bytes.
pub mod packets {
    /// Radio frame (16) + battery voltage (2).
    pub const RADIO_AND_BATTERY: u8 = 1;
    /// Temperature, gyro, accel, mag as ten 16-bit words.
    pub const RAW_SENSORS: u8 = 2;
    /// Current orientation quaternion, four f32.
    pub const QUATERNION: u8 = 3;
    /// Pitch/roll/yaw differences + raw altitude, altimeter temp, estimate.
    pub const COMPUTED: u8 = 4;
    /// Four motor outputs as 16-bit words.
    pub const MOTOR_OUTPUTS: u8 = 5;
    /// Desired (control) quaternion, four f32.
    pub const DESIRED_QUATERNION: u8 = 6;
    /// Loop time and peak loop time, microseconds.
    pub const DEBUG: u8 = 7;
    /// Preferences blob echo, checksum included.
    pub const PREFERENCES: u8 = 0x18;
}

/// Live display modes the ground station can select. Any first byte at or
/// below `MotorTest` is a mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DisplayMode {
    None = 0,
    RadioTest = 1,
    SensorTest = 2,
    MotorTest = 3,
}

impl DisplayMode {
    pub const LAST: u8 = DisplayMode::MotorTest as u8;
}

impl TryFrom<u8> for DisplayMode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DisplayMode::None),
            1 => Ok(DisplayMode::RadioTest),
            2 => Ok(DisplayMode::SensorTest),
            3 => Ok(DisplayMode::MotorTest),
            _ => Err(()),
        }
    }
}

pub fn wire_checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0xFFFF_u16, |sum, byte| sum.wrapping_sub(*byte as u16))
}

/// Incrementally built outbound frame.
pub struct Packet {
    buffer: [u8; MAX_PAYLOAD + FRAME_OVERHEAD],
    length: usize,
}

impl Packet {
    pub fn new(packet_type: u8, payload_length: u8) -> Self {
        let mut buffer = [0_u8; MAX_PAYLOAD + FRAME_OVERHEAD];
        buffer[0] = LINK_SIGNATURE[0];
        buffer[1] = LINK_SIGNATURE[1];
        buffer[2] = packet_type;
        buffer[3] = payload_length;
        Packet { buffer, length: 4 }
    }

    pub fn add(&mut self, bytes: &[u8]) -> &mut Self {
        debug_assert!(self.length + bytes.len() + 2 <= self.buffer.len());
        self.buffer[self.length..self.length + bytes.len()].copy_from_slice(bytes);
        self.length += bytes.len();
        self
    }

    /// Appends the checksum and returns the finished frame.
    pub fn finish(&mut self) -> &[u8] {
        let checksum = wire_checksum(&self.buffer[2..self.length]);
        self.buffer[self.length..self.length + 2].copy_from_slice(&checksum.to_le_bytes());
        &self.buffer[..self.length + 2]
    }
}

/// Validates a received frame, returning its type and payload.
pub fn parse_frame(frame: &[u8]) -> Option<(u8, &[u8])> {
    if frame.len() < FRAME_OVERHEAD || frame[..2] != LINK_SIGNATURE {
        return None;
    }
    let payload_length = frame[3] as usize;
    if frame.len() != payload_length + FRAME_OVERHEAD {
        return None;
    }
    let body_end = frame.len() - 2;
    let received = u16::from_le_bytes([frame[body_end], frame[body_end + 1]]);
    if wire_checksum(&frame[2..body_end]) != received {
        return None;
    }
    Some((frame[2], &frame[4..body_end]))
}
