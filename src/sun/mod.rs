//! Sun Type 4/5 keyboard serial protocol.
//!
//! The keyboard talks 1200 baud 8N1. Every key transition is a single
//! byte:
//!
//! ```text
//! bit 7     : 1 = key released, 0 = key pressed
//! bits 0..6 : key position (0x00-0x7E)
//! ```
//!
//! A few byte values are not key transitions: `0x7F` means "all keys are
//! up", and `0xFF` / `0xFE` prefix a parameter byte answering a reset or
//! layout request. The host drives the keyboard with short commands such
//! as `CMD_SET_LED <bits>`.
//!
//! - [`decoder`] splits the incoming byte stream into link events.
//! - [`keymap`] translates key positions into USB HID usages.
//! - [`macro_keys`] turns the editing keys (Copy, Paste, ...) into
//!   modifier chords.

pub mod decoder;
pub mod keymap;
pub mod macro_keys;

// Commands (host → keyboard)

/// Reset the keyboard; it answers with `RESPONSE_RESET <type>`.
pub const CMD_RESET: u8 = 0x01;
/// Set the LEDs; followed by one byte of `LED_*` bits.
pub const CMD_SET_LED: u8 = 0x0E;
/// Ask for the DIP-switch layout; answered with `RESPONSE_LAYOUT <layout>`.
pub const CMD_LAYOUT: u8 = 0x0F;

// Responses (keyboard → host)

/// Reset acknowledgement, followed by the keyboard type byte.
pub const RESPONSE_RESET: u8 = 0xFF;
/// Layout response, followed by the layout byte.
pub const RESPONSE_LAYOUT: u8 = 0xFE;
/// Sent after the last key has been released.
pub const IDLE: u8 = 0x7F;

// Native LED bits. The order differs from the USB LED report.

pub const LED_NUM_LOCK: u8 = 0x01;
pub const LED_COMPOSE: u8 = 0x02;
pub const LED_SCROLL_LOCK: u8 = 0x04;
pub const LED_CAPS_LOCK: u8 = 0x08;

// Key positions with special handling

pub const KEY_STOP: u8 = 0x01;
pub const KEY_VOLUME_DOWN: u8 = 0x02;
pub const KEY_AGAIN: u8 = 0x03;
pub const KEY_VOLUME_UP: u8 = 0x04;
pub const KEY_PROPS: u8 = 0x19;
pub const KEY_UNDO: u8 = 0x1A;
pub const KEY_MUTE: u8 = 0x2D;
pub const KEY_POWER: u8 = 0x30;
pub const KEY_FRONT: u8 = 0x31;
pub const KEY_COPY: u8 = 0x33;
pub const KEY_COMPOSE: u8 = 0x43;
pub const KEY_OPEN: u8 = 0x48;
pub const KEY_PASTE: u8 = 0x49;
pub const KEY_FIND: u8 = 0x5F;
pub const KEY_CUT: u8 = 0x61;
pub const KEY_HELP: u8 = 0x76;

/// Release flag in a raw scan byte.
const RELEASE_BIT: u8 = 0x80;

/// A raw key-transition byte from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanCode(pub u8);

impl ScanCode {
    /// Key position (table index, 0-127).
    pub const fn index(self) -> u8 {
        self.0 & !RELEASE_BIT
    }

    /// `true` for a key-up transition.
    pub const fn is_release(self) -> bool {
        self.0 & RELEASE_BIT != 0
    }

    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Command that makes the keyboard reset and report its type.
pub const fn reset_command() -> [u8; 1] {
    [CMD_RESET]
}

/// Command that asks the keyboard for its layout DIP switches.
pub const fn layout_command() -> [u8; 1] {
    [CMD_LAYOUT]
}

/// Command that sets the keyboard LEDs to `native` (`LED_*` bits).
pub const fn set_led_command(native: u8) -> [u8; 2] {
    [CMD_SET_LED, native]
}
