//! Sun Type 5 key position → USB HID usage translation.
//!
//! The table is indexed by the low seven bits of a scan byte. Entries of
//! 0 are positions with no physical key (or the `0x7F` idle marker) and
//! are dropped by [`translate`].
//!
//! The volume keys map to F17/F18 and Mute to F16 here. With consumer
//! control enabled they are intercepted first by [`consumer_usage`].

use super::{ScanCode, KEY_MUTE, KEY_VOLUME_DOWN, KEY_VOLUME_UP};

/// Consumer page usages for the keys [`consumer_usage`] intercepts.
pub const CONSUMER_MUTE: u16 = 0x00E2;
pub const CONSUMER_VOLUME_UP: u16 = 0x00E9;
pub const CONSUMER_VOLUME_DOWN: u16 = 0x00EA;

#[rustfmt::skip]
pub static TRANSLATION_TABLE: [u8; 128] = [
/*  ?       Stop    VolDn   Again   VolUp   F1      F2      F10         */
    0,      0x78,   0x6C,   0x79,   0x6D,   0x3A,   0x3B,   0x43,   /* 0x00-0x07 */
/*  F3      F11     F4      F12     F5      AltGr   F6      -           */
    0x3C,   0x44,   0x3D,   0x45,   0x3E,   0xE6,   0x3F,   0,      /* 0x08-0x0f */
/*  F7      F8      F9      Alt     Up      Pause   PrtSc   ScrLk       */
    0x40,   0x41,   0x42,   0xE2,   0x52,   0x48,   0x46,   0x47,   /* 0x10-0x17 */
/*  Left    Props   Undo    Down    Right   Esc     1       2           */
    0x50,   0x76,   0x7A,   0x51,   0x4F,   0x29,   0x1E,   0x1F,   /* 0x18-0x1f */
/*  3       4       5       6       7       8       9       0           */
    0x20,   0x21,   0x22,   0x23,   0x24,   0x25,   0x26,   0x27,   /* 0x20-0x27 */
/*  -       =       `       BkSp    Insert  Mute    KP/     KP*         */
    0x2D,   0x2E,   0x35,   0x2A,   0x49,   0x6B,   0x54,   0x55,   /* 0x28-0x2f */
/*  Power   Front   KP.     Copy    Home    Tab     Q       W           */
    0x6E,   0x77,   0x63,   0x7C,   0x4A,   0x2B,   0x14,   0x1A,   /* 0x30-0x37 */
/*  E       R       T       Y       U       I       O       P           */
    0x08,   0x15,   0x17,   0x1C,   0x18,   0x0C,   0x12,   0x13,   /* 0x38-0x3f */
/*  [       ]       Delete  Compose KP7     KP8     KP9     KP-         */
    0x2F,   0x30,   0x4C,   0x65,   0x5F,   0x60,   0x61,   0x56,   /* 0x40-0x47 */
/*  Open    Paste   End     -       Ctrl    A       S       D           */
    0x74,   0x7D,   0x4D,   0,      0xE0,   0x04,   0x16,   0x07,   /* 0x48-0x4f */
/*  F       G       H       J       K       L       ;       '           */
    0x09,   0x0A,   0x0B,   0x0D,   0x0E,   0x0F,   0x33,   0x34,   /* 0x50-0x57 */
/*  \       Return  KPEnter KP4     KP5     KP6     KP0     Find        */
    0x31,   0x28,   0x58,   0x5C,   0x5D,   0x5E,   0x62,   0x7E,   /* 0x58-0x5f */
/*  PgUp    Cut     NumLk   LShift  Z       X       C       V           */
    0x4B,   0x7B,   0x53,   0xE1,   0x1D,   0x1B,   0x06,   0x19,   /* 0x60-0x67 */
/*  B       N       M       ,       .       /       RShift  -           */
    0x05,   0x11,   0x10,   0x36,   0x37,   0x38,   0xE5,   0,      /* 0x68-0x6f */
/*  KP1     KP2     KP3     -       -       -       Help    CapsLk      */
    0x59,   0x5A,   0x5B,   0,      0,      0,      0x3A,   0x39,   /* 0x70-0x77 */
/*  LMeta   Space   RMeta   PgDn    -       KP+     -       Idle        */
    0xE3,   0x2C,   0xE7,   0x4E,   0,      0x57,   0,      0,      /* 0x78-0x7f */
];

/// A translated key transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    /// USB HID usage (keyboard page), never 0.
    pub usage: u8,
    /// `true` for key-up.
    pub released: bool,
}

/// Translate a scan byte into a HID key event.
///
/// Returns `None` for positions without a mapping.
pub fn translate(code: ScanCode) -> Option<KeyEvent> {
    let usage = TRANSLATION_TABLE[code.index() as usize];
    if usage == 0 {
        log_trace!("keymap: unmapped scan code {=u8:#x}", code.raw());
        return None;
    }
    Some(KeyEvent {
        usage,
        released: code.is_release(),
    })
}

/// Consumer-control usage for the volume and mute keys.
pub fn consumer_usage(code: ScanCode) -> Option<u16> {
    match code.index() {
        KEY_VOLUME_DOWN => Some(CONSUMER_VOLUME_DOWN),
        KEY_VOLUME_UP => Some(CONSUMER_VOLUME_UP),
        KEY_MUTE => Some(CONSUMER_MUTE),
        _ => None,
    }
}
