//! Sun keyboard → USB HID protocol translation.
//!
//! This crate holds the pure logic of the sun2usb adapter: decoding the
//! keyboard's serial byte stream, translating scan codes into HID
//! usages, accumulating the keyboard report, idle-rate repeats and the
//! LED command bridge. It has no hardware dependencies and runs its
//! tests on the host.
//!
//! Usage: `cargo test`
//!
//! The firmware binary (`src/main.rs`, `embedded` feature) wires these
//! pieces to the nRF52840 UART, USB controller and watchdog.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

pub mod bridge;
pub mod config;
pub mod error;
pub mod hid;
pub mod idle;
pub mod led;
pub mod sun;

pub use bridge::Bridge;
pub use error::Error;
