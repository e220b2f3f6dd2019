//! USB HID report types for the keyboard and consumer-control interfaces.

pub mod consumer;
pub mod keyboard;

#[cfg(test)]
mod tests;

pub use consumer::ConsumerReport;
pub use keyboard::KeyboardReport;

// Modifier bits in report byte 0 (usage 0xE0 + bit index).

pub const MOD_LEFT_CTRL: u8 = 1 << 0;
pub const MOD_LEFT_SHIFT: u8 = 1 << 1;
pub const MOD_LEFT_ALT: u8 = 1 << 2;
pub const MOD_LEFT_GUI: u8 = 1 << 3;
pub const MOD_RIGHT_CTRL: u8 = 1 << 4;
pub const MOD_RIGHT_SHIFT: u8 = 1 << 5;
pub const MOD_RIGHT_ALT: u8 = 1 << 6;
pub const MOD_RIGHT_GUI: u8 = 1 << 7;

/// First and last modifier usages on the keyboard page.
const USAGE_MODIFIER_FIRST: u8 = 0xE0;
const USAGE_MODIFIER_LAST: u8 = 0xE7;

/// `true` for Left Ctrl .. Right GUI.
pub const fn is_modifier(usage: u8) -> bool {
    usage >= USAGE_MODIFIER_FIRST && usage <= USAGE_MODIFIER_LAST
}

/// Report byte 0 bit for a modifier usage, 0 for any other usage.
pub const fn modifier_bit(usage: u8) -> u8 {
    if is_modifier(usage) {
        1 << (usage - USAGE_MODIFIER_FIRST)
    } else {
        0
    }
}

/// Which interface a report belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportKind {
    Keyboard,
    Consumer,
}

/// A report ready to be handed to the USB transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidReport {
    Keyboard(KeyboardReport),
    Consumer(ConsumerReport),
}

impl HidReport {
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        match self {
            HidReport::Keyboard(k) => k.serialize(buf),
            HidReport::Consumer(c) => c.serialize(buf),
        }
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            HidReport::Keyboard(_) => ReportKind::Keyboard,
            HidReport::Consumer(_) => ReportKind::Consumer,
        }
    }
}
