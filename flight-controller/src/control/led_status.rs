//! Status LED color selection. The LED driver consumes a single composite
//! RGB word from the shared region; everything here is a pure function of
//! flight state and the loop counter so the displayed pattern is exactly
//! reproducible.

use super::control_loops::FlightMode;

pub mod colors {
    pub const RED: u32 = 0xFF_00_00;
    pub const GREEN: u32 = 0x00_FF_00;
    pub const BLUE: u32 = 0x00_00_FF;
    pub const YELLOW: u32 = RED | GREEN;
    pub const CYAN: u32 = GREEN | BLUE;
    pub const VIOLET: u32 = RED | BLUE;
    pub const WHITE: u32 = RED | GREEN | BLUE;
    /// And-mask that halves every channel.
    pub const HALF: u32 = 0x7F_7F_7F;
}

/// Global brightness attenuation: each channel is masked and right-shifted
/// by this amount. Zero is full brightness.
pub const BRIGHT_SHIFT: u32 = 0;
const SINGLE_MASK: u32 = 0xFF - ((1 << BRIGHT_SHIFT) - 1);
pub const BRIGHT_MASK: u32 = SINGLE_MASK | (SINGLE_MASK << 8) | (SINGLE_MASK << 16);

/// Mode colors, indexed by `FlightMode`.
const MODE_COLORS: [u32; 4] = [colors::CYAN, colors::WHITE, colors::YELLOW, colors::VIOLET];
/// Disarmed / armed.
const ARM_COLORS: [u32; 2] = [colors::GREEN, colors::RED];

fn attenuate(color: u32) -> u32 {
    (color & BRIGHT_MASK) >> BRIGHT_SHIFT
}

/// Base color for one tick. Low battery alternates the mode color with
/// bright orange; otherwise a short slice of each cycle shows the mode color
/// (longer while holding altitude) and the rest shows the arm state.
pub fn flight_status_color(
    mode: FlightMode,
    armed: bool,
    holding: bool,
    low_battery: bool,
    counter: i32,
) -> u32 {
    if low_battery {
        if (counter >> 3) & 7 < 4 {
            attenuate(MODE_COLORS[mode as usize & 3])
        } else {
            attenuate(colors::RED | (colors::YELLOW & colors::HALF))
        }
    } else if (counter >> 3) & 15 < 3 || holding {
        attenuate(MODE_COLORS[mode as usize & 3])
    } else {
        attenuate(ARM_COLORS[armed as usize])
    }
}
