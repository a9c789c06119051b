//! Data definitions shared between the flight controller and the
//! ground-station application: the radio frame, the user-preferences record,
//! and the serial link protocol (opcodes, packet types, framing).

pub mod controller;
pub mod preferences;
pub mod telemetry;
