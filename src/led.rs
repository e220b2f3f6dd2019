//! Host LED state → keyboard LED command.
//!
//! The host writes the USB LED report (Num, Caps, Scroll, Compose, Kana
//! in bits 0-4). The Sun keyboard wants its own bit order, sent as
//! `CMD_SET_LED <bits>`. Only changes are forwarded.

use crate::sun::{
    set_led_command, LED_CAPS_LOCK, LED_COMPOSE, LED_NUM_LOCK, LED_SCROLL_LOCK,
};

// USB LED report bits.
pub const USB_LED_NUM_LOCK: u8 = 0x01;
pub const USB_LED_CAPS_LOCK: u8 = 0x02;
pub const USB_LED_SCROLL_LOCK: u8 = 0x04;
pub const USB_LED_COMPOSE: u8 = 0x08;

const REMAP: [(u8, u8); 4] = [
    (USB_LED_NUM_LOCK, LED_NUM_LOCK),
    (USB_LED_CAPS_LOCK, LED_CAPS_LOCK),
    (USB_LED_SCROLL_LOCK, LED_SCROLL_LOCK),
    (USB_LED_COMPOSE, LED_COMPOSE),
];

/// Remap a USB LED byte into the keyboard's LED bits. Kana is dropped.
pub fn to_native(usb_leds: u8) -> u8 {
    REMAP
        .iter()
        .filter(|(usb, _)| usb_leds & usb != 0)
        .fold(0, |acc, (_, native)| acc | native)
}

/// Edge-triggered LED forwarder.
#[derive(Clone, Copy, Debug, Default)]
pub struct LedBridge {
    last: Option<u8>,
}

impl LedBridge {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Handle a host LED write. Returns the command to send to the
    /// keyboard, or `None` if the state did not change.
    pub fn update(&mut self, usb_leds: u8) -> Option<[u8; 2]> {
        if self.last == Some(usb_leds) {
            return None;
        }
        self.last = Some(usb_leds);
        let native = to_native(usb_leds);
        log_debug!("led: usb {=u8:#x} -> native {=u8:#x}", usb_leds, native);
        Some(set_led_command(native))
    }

    /// Last state received from the host.
    pub fn state(&self) -> Option<u8> {
        self.last
    }
}
