//! Editing keys expanded into modifier chords.
//!
//! The left-hand block of a Sun keyboard (Stop, Again, Props, Undo,
//! Front, Copy, Open, Paste, Find, Cut) has no equivalent on a PC, and
//! the keyboard does not reliably report their release. A press of one
//! of them is turned into a momentary chord such as Ctrl+C: it is
//! injected into the report and withdrawn again after one transmission.

use super::{
    KEY_AGAIN, KEY_COPY, KEY_CUT, KEY_FIND, KEY_FRONT, KEY_OPEN, KEY_PASTE, KEY_PROPS, KEY_STOP,
    KEY_UNDO,
};
use crate::hid::{MOD_LEFT_ALT, MOD_LEFT_CTRL};

/// A modifier + key combination injected for one report cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacroChord {
    /// Modifier bits (report byte 0 layout).
    pub modifiers: u8,
    /// Keyboard page usage.
    pub usage: u8,
}

const fn chord(modifiers: u8, usage: u8) -> MacroChord {
    MacroChord { modifiers, usage }
}

// Keyboard page usages used by the chords.
const USAGE_C: u8 = 0x06;
const USAGE_F: u8 = 0x09;
const USAGE_O: u8 = 0x12;
const USAGE_V: u8 = 0x19;
const USAGE_X: u8 = 0x1B;
const USAGE_Y: u8 = 0x1C;
const USAGE_Z: u8 = 0x1D;
const USAGE_ENTER: u8 = 0x28;
const USAGE_TAB: u8 = 0x2B;
const USAGE_F4: u8 = 0x3D;

/// Key position → chord. Only press bytes match.
static MACRO_TABLE: [(u8, MacroChord); 10] = [
    (KEY_STOP, chord(MOD_LEFT_ALT, USAGE_F4)),
    (KEY_AGAIN, chord(MOD_LEFT_CTRL, USAGE_Y)),
    (KEY_PROPS, chord(MOD_LEFT_ALT, USAGE_ENTER)),
    (KEY_UNDO, chord(MOD_LEFT_CTRL, USAGE_Z)),
    (KEY_FRONT, chord(MOD_LEFT_ALT, USAGE_TAB)),
    (KEY_COPY, chord(MOD_LEFT_CTRL, USAGE_C)),
    (KEY_OPEN, chord(MOD_LEFT_CTRL, USAGE_O)),
    (KEY_PASTE, chord(MOD_LEFT_CTRL, USAGE_V)),
    (KEY_FIND, chord(MOD_LEFT_CTRL, USAGE_F)),
    (KEY_CUT, chord(MOD_LEFT_CTRL, USAGE_X)),
];

/// Look up the chord for a raw scan byte.
///
/// Release bytes never match; they fall through to the normal
/// translation where they are harmless no-ops.
pub fn try_expand(raw: u8) -> Option<MacroChord> {
    MACRO_TABLE
        .iter()
        .find(|(code, _)| *code == raw)
        .map(|(_, chord)| *chord)
}
