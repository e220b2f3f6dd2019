//! Byte-stream decoder for the keyboard → host direction.
//!
//! Most bytes are key transitions, but a reset answer (`0xFF <type>`)
//! and a layout answer (`0xFE <layout>`) carry a parameter byte that
//! would otherwise be mistaken for a key press.

use super::{ScanCode, IDLE, RESPONSE_LAYOUT, RESPONSE_RESET};

/// Something the keyboard told us.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// A key went down or up.
    Key(ScanCode),
    /// All keys are up.
    AllUp,
    /// The keyboard finished a reset.
    Reset { keyboard_type: u8 },
    /// Layout DIP-switch setting.
    Layout(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Expect {
    Any,
    KeyboardType,
    LayoutId,
}

/// Streaming decoder; feed it one byte at a time.
#[derive(Clone, Copy, Debug)]
pub struct LinkDecoder {
    expect: Expect,
}

impl LinkDecoder {
    pub const fn new() -> Self {
        Self { expect: Expect::Any }
    }

    /// Consume one byte. Returns `None` for prefix bytes whose parameter
    /// has not arrived yet.
    pub fn feed(&mut self, byte: u8) -> Option<LinkEvent> {
        match self.expect {
            Expect::KeyboardType => {
                self.expect = Expect::Any;
                Some(LinkEvent::Reset {
                    keyboard_type: byte,
                })
            }
            Expect::LayoutId => {
                self.expect = Expect::Any;
                Some(LinkEvent::Layout(byte))
            }
            Expect::Any => match byte {
                RESPONSE_RESET => {
                    self.expect = Expect::KeyboardType;
                    None
                }
                RESPONSE_LAYOUT => {
                    self.expect = Expect::LayoutId;
                    None
                }
                IDLE => Some(LinkEvent::AllUp),
                _ => Some(LinkEvent::Key(ScanCode(byte))),
            },
        }
    }
}

impl Default for LinkDecoder {
    fn default() -> Self {
        Self::new()
    }
}
