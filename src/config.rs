//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

// Sun keyboard link

/// Serial link speed of the Sun Type 4/5 keyboard (8N1).
pub const SUN_BAUD: u32 = 1200;

/// Route the volume and mute keys to the consumer-control interface.
/// When disabled they arrive as F17/F18/F16 on the keyboard interface.
pub const CONSUMER_CONTROL_ENABLED: bool = true;

// Timing

/// Idle/repeat timer cadence (ms). USB HID idle rates are expressed in
/// 4 ms units, so one tick is one unit.
pub const IDLE_TICK_MS: u64 = 4;

/// Hardware watchdog timeout (seconds).
pub const WATCHDOG_TIMEOUT_SECS: u32 = 1;

/// Maximum time the poller sleeps between watchdog pets (ms).
pub const WATCHDOG_PET_MS: u64 = 250;

/// Upper bound on a command write to the keyboard (ms). Two bytes take
/// about 17 ms at 1200 baud.
pub const SERIAL_WRITE_TIMEOUT_MS: u64 = 100;

/// Pause between the boot-time reset and layout commands (ms); the
/// keyboard runs its self-test in between.
pub const KEYBOARD_RESET_SETTLE_MS: u64 = 500;

/// How long the poller waits for the IN endpoint to accept a report
/// before giving up on this cycle (ms).
pub const TRANSPORT_READY_TIMEOUT_MS: u64 = 100;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x5355;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "sun2usb";
pub const USB_PRODUCT: &str = "Sun Keyboard USB Adapter";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 10;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Keyboard RXD (from keyboard)  → P0.08
//   Keyboard TXD (to keyboard)    → P0.06
//
// The Sun keyboard speaks inverted RS-232 levels; a level shifter or
// transistor inverter is expected between the pins and the mini-DIN.
