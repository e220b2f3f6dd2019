//! Unit tests for the HID reports and the keyboard accumulator.
//!
//! These tests run on the host (not embedded) and verify the pure
//! logic of report accumulation and serialization.

use super::consumer::{ConsumerReport, CONSUMER_REPORT_DESCRIPTOR, CONSUMER_REPORT_ID};
use super::keyboard::{KeyboardReport, KEYBOARD_REPORT_DESCRIPTOR, KEY_SLOTS};
use super::*;
use crate::sun::keymap::KeyEvent;
use crate::sun::macro_keys::MacroChord;
use usbd_hid::descriptor::KeyboardUsage;

fn press(usage: u8) -> KeyEvent {
    KeyEvent {
        usage,
        released: false,
    }
}

fn release(usage: u8) -> KeyEvent {
    KeyEvent {
        usage,
        released: true,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Modifier helpers
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn modifier_range_is_e0_to_e7() {
    assert!(!is_modifier(0xDF));
    assert!(is_modifier(0xE0));
    assert!(is_modifier(0xE7));
    assert!(!is_modifier(0xE8));
    assert!(!is_modifier(0x04));
}

#[test]
fn modifier_bits_follow_usage_order() {
    assert_eq!(modifier_bit(KeyboardUsage::KeyboardLeftControl as u8), MOD_LEFT_CTRL);
    assert_eq!(modifier_bit(KeyboardUsage::KeyboardLeftShift as u8), MOD_LEFT_SHIFT);
    assert_eq!(modifier_bit(KeyboardUsage::KeyboardLeftAlt as u8), MOD_LEFT_ALT);
    assert_eq!(modifier_bit(0xE3), MOD_LEFT_GUI);
    assert_eq!(modifier_bit(KeyboardUsage::KeyboardRightControl as u8), MOD_RIGHT_CTRL);
    assert_eq!(modifier_bit(0xE5), MOD_RIGHT_SHIFT);
    assert_eq!(modifier_bit(KeyboardUsage::KeyboardRightAlt as u8), MOD_RIGHT_ALT);
    assert_eq!(modifier_bit(0xE7), MOD_RIGHT_GUI);
    assert_eq!(modifier_bit(0x04), 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Keyboard accumulator
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn keyboard_report_empty() {
    let report = KeyboardReport::empty();
    assert!(report.is_empty());
    assert_eq!(report.modifier, 0);
    assert_eq!(report.keycodes, [0; 6]);
}

#[test]
fn modifier_press_and_release() {
    let mut report = KeyboardReport::empty();
    assert!(report.apply(press(0xE1)));
    assert_eq!(report.modifier, MOD_LEFT_SHIFT);
    assert!(report.apply(release(0xE1)));
    assert_eq!(report.modifier, 0);
    assert!(report.is_empty());
}

#[test]
fn redundant_modifier_edges_still_report_change() {
    let mut report = KeyboardReport::empty();
    assert!(report.apply(release(0xE0)));
    assert!(report.apply(press(0xE0)));
    assert!(report.apply(press(0xE0)));
    assert_eq!(report.modifier, MOD_LEFT_CTRL);
}

#[test]
fn keys_fill_slots_in_press_order() {
    let mut report = KeyboardReport::empty();
    assert!(report.apply(press(0x06)));
    assert!(report.apply(press(0x04)));
    assert!(report.apply(press(0x05)));
    assert_eq!(report.keycodes, [0x06, 0x04, 0x05, 0, 0, 0]);
}

#[test]
fn released_slot_is_reused_first() {
    let mut report = KeyboardReport::empty();
    report.apply(press(0x04));
    report.apply(press(0x05));
    report.apply(press(0x06));
    assert!(report.apply(release(0x05)));
    assert_eq!(report.keycodes, [0x04, 0, 0x06, 0, 0, 0]);
    assert!(report.apply(press(0x07)));
    assert_eq!(report.keycodes, [0x04, 0x07, 0x06, 0, 0, 0]);
}

#[test]
fn press_then_release_restores_previous_state() {
    let mut report = KeyboardReport::empty();
    report.apply(press(0x04));
    report.apply(press(0xE0));
    let before = report;

    report.apply(press(0x2F));
    report.apply(release(0x2F));
    assert_eq!(report, before);
}

#[test]
fn pressing_held_key_does_not_duplicate() {
    let mut report = KeyboardReport::empty();
    assert!(report.apply(press(0x04)));
    assert!(!report.apply(press(0x04)));
    assert_eq!(report.keycodes.iter().filter(|&&k| k == 0x04).count(), 1);
}

#[test]
fn release_of_unpressed_key_is_noop() {
    let mut report = KeyboardReport::empty();
    report.apply(press(0x04));
    let before = report;
    assert!(!report.apply(release(0x05)));
    assert_eq!(report, before);
}

#[test]
fn rollover_overflow_is_dropped() {
    let mut report = KeyboardReport::empty();
    for usage in 0x04..0x04 + KEY_SLOTS as u8 {
        assert!(report.apply(press(usage)));
    }
    assert!(!report.apply(press(0x20)));
    assert_eq!(report.keycodes, [0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);
    assert!(!report.contains(0x20));

    // A dropped key's release is a no-op too.
    assert!(!report.apply(release(0x20)));
}

#[test]
fn uniqueness_holds_for_any_press_interleaving() {
    let sequence = [0x04, 0x05, 0x04, 0x06, 0x05, 0x07, 0x04, 0x08, 0x09, 0x0A, 0x06];
    let mut report = KeyboardReport::empty();
    for usage in sequence {
        report.apply(press(usage));
        for &k in report.keycodes.iter().filter(|&&k| k != 0) {
            assert_eq!(report.keycodes.iter().filter(|&&x| x == k).count(), 1);
        }
    }
    assert_eq!(report.keycodes, [0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);
}

#[test]
fn chord_overlay_adds_modifier_and_key() {
    let mut report = KeyboardReport::empty();
    let chord = MacroChord {
        modifiers: MOD_LEFT_CTRL,
        usage: 0x06,
    };
    assert!(report.overlay_chord(chord));
    assert_eq!(report.modifier, MOD_LEFT_CTRL);
    assert_eq!(report.keycodes, [0x06, 0, 0, 0, 0, 0]);
}

#[test]
fn chord_overlay_shares_held_key_and_modifier() {
    let mut report = KeyboardReport::empty();
    report.apply(press(0xE0));
    report.apply(press(0x19));
    let chord = MacroChord {
        modifiers: MOD_LEFT_CTRL,
        usage: 0x19,
    };
    assert!(report.overlay_chord(chord));
    assert_eq!(report.modifier, MOD_LEFT_CTRL);
    assert_eq!(report.keycodes, [0x19, 0, 0, 0, 0, 0]);
}

#[test]
fn chord_dropped_when_slots_full() {
    let mut report = KeyboardReport::empty();
    for usage in 0x04..0x0A {
        report.apply(press(usage));
    }
    let before = report;
    let chord = MacroChord {
        modifiers: MOD_LEFT_CTRL,
        usage: 0x06 + 0x20,
    };
    assert!(!report.overlay_chord(chord));
    assert_eq!(report, before);
}

#[test]
fn keyboard_report_serialize() {
    let report = KeyboardReport {
        modifier: 0x05,
        reserved: 0x00,
        keycodes: [0x04, 0x05, 0x06, 0x00, 0x00, 0x00],
    };
    let mut buf = [0u8; 8];
    let written = report.serialize(&mut buf);

    assert_eq!(written, 8);
    assert_eq!(buf, [0x05, 0x00, 0x04, 0x05, 0x06, 0x00, 0x00, 0x00]);
}

#[test]
fn keyboard_report_serialize_buffer_too_small() {
    let report = KeyboardReport::empty();
    let mut small_buf = [0u8; 4];
    let written = report.serialize(&mut small_buf);
    assert_eq!(written, 0); // Should fail gracefully
}

#[test]
fn keyboard_descriptor_declares_six_key_bytes() {
    // Report Count (6), Report Size (8), Input (Data, Array)
    let tail = &KEYBOARD_REPORT_DESCRIPTOR[KEYBOARD_REPORT_DESCRIPTOR.len() - 7..];
    assert_eq!(tail, &[0x95, KEY_SLOTS as u8, 0x75, 0x08, 0x81, 0x00, 0xC0]);
    assert_eq!(&KEYBOARD_REPORT_DESCRIPTOR[..6], &[0x05, 0x01, 0x09, 0x06, 0xA1, 0x01]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Consumer Control Report Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn consumer_press_and_release() {
    let mut report = ConsumerReport::empty();
    assert!(report.press(0x00E9));
    assert!(!report.press(0x00E9));
    assert!(!report.release(0x00EA));
    assert_eq!(report.usage, 0x00E9);
    assert!(report.release(0x00E9));
    assert!(report.is_empty());
}

#[test]
fn consumer_release_of_nothing_is_noop() {
    let mut report = ConsumerReport::empty();
    assert!(!report.release(0));
    assert!(!report.release(0x00E2));
}

#[test]
fn consumer_report_serialize_with_report_id() {
    let report = ConsumerReport { usage: 0x00E2 };
    let mut buf = [0u8; 3];
    let len = report.serialize(&mut buf);
    assert_eq!(len, 3);
    assert_eq!(buf, [CONSUMER_REPORT_ID, 0xE2, 0x00]);
}

#[test]
fn consumer_report_serialize_buffer_too_small() {
    let report = ConsumerReport { usage: 0x00E9 };
    let mut buf = [0u8; 2];
    assert_eq!(report.serialize(&mut buf), 0);
}

#[test]
fn consumer_descriptor_carries_report_id() {
    let pos = CONSUMER_REPORT_DESCRIPTOR
        .windows(2)
        .position(|w| w == [0x85, CONSUMER_REPORT_ID]);
    assert!(pos.is_some());
}

// ═══════════════════════════════════════════════════════════════════════════
// HidReport Enum Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn hid_report_kind_and_serialize() {
    let kb = HidReport::Keyboard(KeyboardReport::empty());
    assert_eq!(kb.kind(), ReportKind::Keyboard);
    let mut buf = [0xAAu8; 8];
    assert_eq!(kb.serialize(&mut buf), 8);
    assert_eq!(buf, [0; 8]);

    let cc = HidReport::Consumer(ConsumerReport { usage: 0x00EA });
    assert_eq!(cc.kind(), ReportKind::Consumer);
    assert_eq!(cc.serialize(&mut buf), 3);
    assert_eq!(&buf[..3], &[CONSUMER_REPORT_ID, 0xEA, 0x00]);
}
