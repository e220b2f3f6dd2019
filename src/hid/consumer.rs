//! Consumer Control HID support - volume and mute keys.
//!
//! Consumer Control is a separate HID usage page (0x0C). It is exposed
//! on its own USB interface with report ID 2, so the keyboard interface
//! keeps the plain 8-byte boot layout.

/// Report ID of the consumer collection.
pub const CONSUMER_REPORT_ID: u8 = 2;

/// Consumer control report size (report ID + 2 bytes for usage ID).
pub const CONSUMER_REPORT_SIZE: usize = 3;

/// Consumer Control HID report.
///
/// Simple report containing a single usage code.
/// Multiple simultaneous keys are not supported in this implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConsumerReport {
    /// Active consumer control usage (little-endian u16).
    pub usage: u16,
}

impl ConsumerReport {
    /// Create an empty (no keys pressed) report.
    pub const fn empty() -> Self {
        Self { usage: 0 }
    }

    /// Record a press of `usage`. Returns `true` if the report changed.
    pub fn press(&mut self, usage: u16) -> bool {
        let changed = self.usage != usage;
        self.usage = usage;
        changed
    }

    /// Record a release of `usage`. Releasing anything other than the
    /// active usage is a no-op.
    pub fn release(&mut self, usage: u16) -> bool {
        if self.usage == usage && usage != 0 {
            self.usage = 0;
            true
        } else {
            false
        }
    }

    /// Serialize to USB HID report bytes.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < CONSUMER_REPORT_SIZE {
            return 0;
        }
        let bytes = self.usage.to_le_bytes();
        buf[0] = CONSUMER_REPORT_ID;
        buf[1] = bytes[0];
        buf[2] = bytes[1];
        CONSUMER_REPORT_SIZE
    }

    /// Check if any key is pressed.
    pub fn is_empty(&self) -> bool {
        self.usage == 0
    }
}

/// USB HID Report Descriptor for Consumer Control.
///
/// This is a minimal descriptor for a single 16-bit usage.
pub const CONSUMER_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x0C, // Usage Page (Consumer)
    0x09, 0x01, // Usage (Consumer Control)
    0xA1, 0x01, // Collection (Application)
    0x85, CONSUMER_REPORT_ID, //   Report ID (2)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x03, //   Logical Maximum (1023)
    0x19, 0x00, //   Usage Minimum (0)
    0x2A, 0xFF, 0x03, //   Usage Maximum (1023)
    0x75, 0x10, //   Report Size (16)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x00, //   Input (Data, Array, Absolute)
    0xC0, // End Collection
];
