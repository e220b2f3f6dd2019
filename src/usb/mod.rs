//! USB Device subsystem - presents a composite HID device to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`.  We create a **composite device** with two HID
//! interfaces:
//!
//! - Interface 0: Keyboard (8-byte boot layout, LED output)
//! - Interface 1: Consumer control (volume/mute, report ID 2)
//!
//! The report poller drains the shared bridge and writes each report to
//! the matching HID endpoint.

pub mod hid_device;
