//! The keyboard bridge state machine.
//!
//! [`Bridge`] owns everything the serial side and the USB side share:
//! the keys physically held, pending macro pulses, the consumer report,
//! their "new data" flags and the idle timer. The firmware keeps a single
//! instance behind a critical-section mutex; the receive path calls
//! [`Bridge::ingest`], the 4 ms ticker calls [`Bridge::tick`], and the
//! poller drains [`Bridge::next_report`].
//!
//! Macro chords are never folded into the held-key report. The report
//! sent to the host is composed from the held keys with every live chord
//! overlaid, so withdrawing a chord cannot take away a modifier or key
//! that the user, or another chord, still holds.
//!
//! Pulses live through three stages: `pending` (queued, not yet captured
//! in a report), `in_flight` (captured in the report being transmitted)
//! and withdrawn once [`Bridge::report_sent`] confirms the transfer.
//! Withdrawing raises the keyboard flag again so the host sees the
//! release. A pulse queued while an identical usage is in flight is
//! deferred by one report so the host gets the release edge in between.

use heapless::Vec;

use crate::hid::keyboard::KEY_SLOTS;
use crate::hid::{ConsumerReport, HidReport, KeyboardReport, ReportKind};
use crate::idle::IdleTimer;
use crate::sun::decoder::{LinkDecoder, LinkEvent};
use crate::sun::keymap::{self, KeyEvent};
use crate::sun::macro_keys::{self, MacroChord};
use crate::sun::ScanCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct Pulse {
    chord: MacroChord,
    /// Held back until a report without this usage has been sent.
    deferred: bool,
}

impl Pulse {
    const fn new(chord: MacroChord) -> Self {
        Self {
            chord,
            deferred: false,
        }
    }
}

type Pulses = Vec<Pulse, KEY_SLOTS>;

pub struct Bridge {
    /// Keys and modifiers physically held, as the keyboard reported them.
    held: KeyboardReport,
    consumer: ConsumerReport,
    decoder: LinkDecoder,
    idle: IdleTimer,
    pending: Pulses,
    in_flight: Pulses,
    keyboard_changed: bool,
    consumer_changed: bool,
    idle_due: bool,
    consumer_keys: bool,
}

impl Bridge {
    /// `consumer_keys` routes volume/mute to the consumer interface.
    pub const fn new(consumer_keys: bool) -> Self {
        Self {
            held: KeyboardReport::empty(),
            consumer: ConsumerReport::empty(),
            decoder: LinkDecoder::new(),
            idle: IdleTimer::new(),
            pending: Vec::new(),
            in_flight: Vec::new(),
            keyboard_changed: false,
            consumer_changed: false,
            idle_due: false,
            consumer_keys,
        }
    }

    /// Handle one byte from the keyboard. Returns `true` if it produced
    /// new data for the host.
    pub fn ingest(&mut self, byte: u8) -> bool {
        match self.decoder.feed(byte) {
            Some(LinkEvent::Key(code)) => self.key(code),
            Some(LinkEvent::AllUp) => {
                log_trace!("bridge: all keys up");
                false
            }
            Some(LinkEvent::Reset { keyboard_type }) => {
                log_info!("bridge: keyboard reset, type {=u8}", keyboard_type);
                false
            }
            Some(LinkEvent::Layout(layout)) => {
                log_info!("bridge: keyboard layout {=u8:#x}", layout);
                false
            }
            None => false,
        }
    }

    fn key(&mut self, code: ScanCode) -> bool {
        if let Some(chord) = macro_keys::try_expand(code.raw()) {
            return self.fire_chord(chord);
        }

        if self.consumer_keys {
            if let Some(usage) = keymap::consumer_usage(code) {
                let changed = if code.is_release() {
                    self.consumer.release(usage)
                } else {
                    self.consumer.press(usage)
                };
                self.consumer_changed |= changed;
                return changed;
            }
        }

        match keymap::translate(code) {
            Some(event) => self.apply(event),
            None => false,
        }
    }

    fn apply(&mut self, event: KeyEvent) -> bool {
        let changed = self.held.apply(event);
        self.keyboard_changed |= changed;
        changed
    }

    fn fire_chord(&mut self, chord: MacroChord) -> bool {
        // Queued twice before a report: the host would see one chord anyway.
        if self.pending.iter().any(|p| p.chord == chord) {
            return false;
        }
        let mut trial = self.keyboard_report();
        if !trial.overlay_chord(chord) || self.pending.push(Pulse::new(chord)).is_err() {
            return false;
        }
        log_debug!(
            "bridge: chord mods {=u8:#x} usage {=u8:#x}",
            chord.modifiers,
            chord.usage
        );
        self.keyboard_changed = true;
        true
    }

    /// Advance the idle timer by one 4 ms tick. Returns `true` when a
    /// repeat of the keyboard report became due.
    pub fn tick(&mut self) -> bool {
        let due = self.idle.tick();
        self.idle_due |= due;
        due
    }

    /// Set the host idle rate (4 ms units, 0 disables repeats).
    pub fn set_idle_rate(&mut self, rate: u8) {
        log_info!("bridge: idle rate {=u8}", rate);
        self.idle.set_rate(rate);
        self.idle_due = false;
    }

    pub fn idle_rate(&self) -> u8 {
        self.idle.rate()
    }

    /// `true` if a report is waiting for the transport.
    ///
    /// [`next_report`](Self::next_report) makes the same check, so a
    /// poller may call it directly.
    pub fn update_needed(&self) -> bool {
        self.keyboard_changed || self.idle_due || self.consumer_changed
    }

    /// Take the next report to transmit and clear its flag. The keyboard
    /// interface goes first. Returns `None` when
    /// [`update_needed`](Self::update_needed) is `false`.
    ///
    /// Every report returned must be followed by [`report_sent`] or
    /// [`report_dropped`] before the next call for the same kind.
    ///
    /// [`report_sent`]: Self::report_sent
    /// [`report_dropped`]: Self::report_dropped
    pub fn next_report(&mut self) -> Option<HidReport> {
        if !self.update_needed() {
            return None;
        }
        if self.keyboard_changed || self.idle_due {
            self.keyboard_changed = false;
            self.idle_due = false;
            let report = self.keyboard_report();
            let mut waiting = Pulses::new();
            for pulse in self.pending.iter() {
                // Both vectors share one capacity and `in_flight` is empty here.
                let _ = if pulse.deferred {
                    waiting.push(*pulse)
                } else {
                    self.in_flight.push(*pulse)
                };
            }
            self.pending = waiting;
            return Some(HidReport::Keyboard(report));
        }
        self.consumer_changed = false;
        Some(HidReport::Consumer(self.consumer))
    }

    /// The transport accepted a report.
    ///
    /// For the keyboard this completes any macro pulse carried by the
    /// report and restarts the idle countdown.
    pub fn report_sent(&mut self, kind: ReportKind) {
        if kind != ReportKind::Keyboard {
            return;
        }
        self.idle.restart();
        if self.in_flight.is_empty() && self.pending.is_empty() {
            return;
        }
        let in_flight = &self.in_flight;
        for pulse in self.pending.iter_mut() {
            pulse.deferred = in_flight.iter().any(|f| f.chord.usage == pulse.chord.usage);
        }
        self.in_flight.clear();
        self.keyboard_changed = true;
    }

    /// The transport could not take the report; send it again next cycle.
    pub fn report_dropped(&mut self, kind: ReportKind) {
        match kind {
            ReportKind::Keyboard => {
                self.keyboard_changed = true;
                let mut restored = Pulses::new();
                for pulse in self.in_flight.iter().chain(self.pending.iter()) {
                    if restored.push(*pulse).is_err() {
                        log_debug!("bridge: pulse queue full, dropping chord");
                        break;
                    }
                }
                self.pending = restored;
                self.in_flight.clear();
            }
            ReportKind::Consumer => self.consumer_changed = true,
        }
    }

    /// Current keyboard report (GET_REPORT): held keys with every live
    /// chord overlaid.
    pub fn keyboard_report(&self) -> KeyboardReport {
        let mut report = self.held;
        let live = self.pending.iter().filter(|p| !p.deferred);
        for pulse in self.in_flight.iter().chain(live) {
            report.overlay_chord(pulse.chord);
        }
        report
    }

    /// Current consumer report (GET_REPORT).
    pub fn consumer_report(&self) -> ConsumerReport {
        self.consumer
    }

    /// `true` while a macro chord is queued or not yet withdrawn.
    pub fn pulse_active(&self) -> bool {
        !self.pending.is_empty() || !self.in_flight.is_empty()
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new(crate::config::CONSUMER_CONTROL_ENABLED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::MOD_LEFT_CTRL;
    use crate::sun::{KEY_COPY, KEY_PASTE};

    fn send(bridge: &mut Bridge) -> Option<HidReport> {
        let report = bridge.next_report()?;
        bridge.report_sent(report.kind());
        Some(report)
    }

    #[test]
    fn fresh_bridge_has_nothing_to_send() {
        let mut bridge = Bridge::new(true);
        assert!(!bridge.update_needed());
        assert_eq!(bridge.next_report(), None);
    }

    #[test]
    fn key_press_raises_new_data() {
        let mut bridge = Bridge::new(true);
        assert!(bridge.ingest(0x4D));
        assert!(bridge.update_needed());
        match bridge.next_report() {
            Some(HidReport::Keyboard(r)) => assert_eq!(r.keycodes[0], 0x04),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!bridge.update_needed());
    }

    #[test]
    fn unmapped_byte_changes_nothing() {
        let mut bridge = Bridge::new(true);
        assert!(!bridge.ingest(0x0F));
        assert!(!bridge.update_needed());
        assert!(bridge.keyboard_report().is_empty());
    }

    #[test]
    fn change_during_transfer_is_not_lost() {
        let mut bridge = Bridge::new(true);
        bridge.ingest(0x4D);
        let first = bridge.next_report().unwrap();
        // A byte arrives while the transfer is in progress.
        bridge.ingest(0x4E);
        bridge.report_sent(first.kind());
        assert!(bridge.update_needed());
        match bridge.next_report() {
            Some(HidReport::Keyboard(r)) => assert_eq!(r.keycodes[..2], [0x04, 0x16]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn macro_pulse_clears_after_transmission() {
        let mut bridge = Bridge::new(true);
        assert!(bridge.ingest(KEY_COPY));
        assert!(bridge.pulse_active());
        assert_eq!(bridge.keyboard_report().modifier, MOD_LEFT_CTRL);

        let sent = send(&mut bridge).unwrap();
        match sent {
            HidReport::Keyboard(r) => {
                assert_eq!(r.modifier, MOD_LEFT_CTRL);
                assert_eq!(r.keycodes, [0x06, 0, 0, 0, 0, 0]);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(!bridge.pulse_active());
        assert!(bridge.keyboard_report().is_empty());
        // The release edge is queued for the host.
        assert_eq!(
            send(&mut bridge),
            Some(HidReport::Keyboard(KeyboardReport::empty()))
        );
        assert_eq!(send(&mut bridge), None);
    }

    #[test]
    fn macro_pulse_survives_dropped_transfer() {
        let mut bridge = Bridge::new(true);
        bridge.ingest(KEY_COPY);
        let report = bridge.next_report().unwrap();
        bridge.report_dropped(report.kind());
        assert!(bridge.pulse_active());
        assert_eq!(bridge.keyboard_report().keycodes[0], 0x06);

        send(&mut bridge).unwrap();
        assert!(bridge.keyboard_report().is_empty());
    }

    #[test]
    fn chord_injected_mid_transfer_waits_for_its_own_report() {
        let mut bridge = Bridge::new(true);
        bridge.ingest(0x4D);
        let first = bridge.next_report().unwrap();
        bridge.ingest(KEY_PASTE);
        bridge.report_sent(first.kind());

        // Paste was never transmitted, so it must still be held.
        assert_eq!(bridge.keyboard_report().keycodes[..2], [0x04, 0x19]);
        send(&mut bridge).unwrap();
        assert_eq!(bridge.keyboard_report().keycodes[..2], [0x04, 0]);
    }

    #[test]
    fn second_chord_during_transfer_keeps_its_modifier() {
        let mut bridge = Bridge::new(true);
        bridge.ingest(KEY_COPY);
        let first = bridge.next_report().unwrap();
        bridge.ingest(KEY_COPY | 0x80);
        bridge.ingest(KEY_PASTE);
        bridge.report_sent(first.kind());

        match send(&mut bridge) {
            Some(HidReport::Keyboard(r)) => {
                assert_eq!(r.modifier, MOD_LEFT_CTRL);
                assert_eq!(r.keycodes, [0x19, 0, 0, 0, 0, 0]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            send(&mut bridge),
            Some(HidReport::Keyboard(KeyboardReport::empty()))
        );
    }

    #[test]
    fn held_ctrl_outlives_a_chord() {
        let mut bridge = Bridge::new(true);
        bridge.ingest(KEY_COPY);
        let first = bridge.next_report().unwrap();
        bridge.ingest(0x4C);
        bridge.report_sent(first.kind());

        match send(&mut bridge) {
            Some(HidReport::Keyboard(r)) => {
                assert_eq!(r.modifier, MOD_LEFT_CTRL);
                assert_eq!(r.keycodes, [0; 6]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(bridge.keyboard_report().modifier, MOD_LEFT_CTRL);
    }

    #[test]
    fn held_key_outlives_a_chord_using_it() {
        let mut bridge = Bridge::new(true);
        // Physical C, then Copy (Ctrl+C) on top of it.
        bridge.ingest(0x66);
        send(&mut bridge).unwrap();
        bridge.ingest(KEY_COPY);
        send(&mut bridge).unwrap();

        match send(&mut bridge) {
            Some(HidReport::Keyboard(r)) => {
                assert_eq!(r.modifier, 0);
                assert_eq!(r.keycodes, [0x06, 0, 0, 0, 0, 0]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn repeated_chord_gets_a_release_in_between() {
        let mut bridge = Bridge::new(true);
        bridge.ingest(KEY_COPY);
        let first = bridge.next_report().unwrap();
        bridge.ingest(KEY_COPY | 0x80);
        bridge.ingest(KEY_COPY);
        bridge.report_sent(first.kind());

        let ctrl_c = HidReport::Keyboard(KeyboardReport {
            modifier: MOD_LEFT_CTRL,
            reserved: 0,
            keycodes: [0x06, 0, 0, 0, 0, 0],
        });
        let empty = HidReport::Keyboard(KeyboardReport::empty());
        assert_eq!(send(&mut bridge), Some(empty));
        assert_eq!(send(&mut bridge), Some(ctrl_c));
        assert_eq!(send(&mut bridge), Some(empty));
        assert_eq!(send(&mut bridge), None);
    }

    #[test]
    fn next_report_is_none_without_update() {
        let mut bridge = Bridge::new(true);
        bridge.ingest(0x4D);
        send(&mut bridge).unwrap();
        assert!(!bridge.update_needed());
        assert_eq!(bridge.next_report(), None);
    }

    #[test]
    fn idle_repeat_resends_unchanged_report() {
        let mut bridge = Bridge::new(true);
        bridge.set_idle_rate(2);
        bridge.ingest(0x4D);
        send(&mut bridge).unwrap();

        assert!(!bridge.tick());
        assert!(!bridge.update_needed());
        assert!(bridge.tick());
        assert!(bridge.update_needed());
        match send(&mut bridge) {
            Some(HidReport::Keyboard(r)) => assert_eq!(r.keycodes[0], 0x04),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn idle_rate_zero_sends_only_on_change() {
        let mut bridge = Bridge::new(true);
        for _ in 0..1000 {
            assert!(!bridge.tick());
        }
        assert!(!bridge.update_needed());
        assert_eq!(bridge.idle_rate(), 0);
    }

    #[test]
    fn consumer_keys_go_to_consumer_report() {
        let mut bridge = Bridge::new(true);
        assert!(bridge.ingest(0x04));
        assert!(bridge.keyboard_report().is_empty());
        assert_eq!(bridge.consumer_report().usage, 0x00E9);
        assert_eq!(
            send(&mut bridge),
            Some(HidReport::Consumer(ConsumerReport { usage: 0x00E9 }))
        );
        assert!(bridge.ingest(0x84));
        assert_eq!(
            send(&mut bridge),
            Some(HidReport::Consumer(ConsumerReport::empty()))
        );
    }

    #[test]
    fn consumer_keys_disabled_fall_back_to_function_keys() {
        let mut bridge = Bridge::new(false);
        assert!(bridge.ingest(0x04));
        assert_eq!(bridge.keyboard_report().keycodes[0], 0x6D);
        assert!(bridge.consumer_report().is_empty());
    }

    #[test]
    fn keyboard_is_sent_before_consumer() {
        let mut bridge = Bridge::new(true);
        bridge.ingest(0x2D);
        bridge.ingest(0x4D);
        assert_eq!(send(&mut bridge).map(|r| r.kind()), Some(ReportKind::Keyboard));
        assert_eq!(send(&mut bridge).map(|r| r.kind()), Some(ReportKind::Consumer));
        assert_eq!(send(&mut bridge), None);
    }

    #[test]
    fn reset_answer_is_not_a_key() {
        let mut bridge = Bridge::new(true);
        // FF 04 7F: reset ack, type 4, all up. 0x04 would be Volume Up.
        assert!(!bridge.ingest(0xFF));
        assert!(!bridge.ingest(0x04));
        assert!(!bridge.ingest(0x7F));
        assert!(!bridge.update_needed());
        assert!(bridge.consumer_report().is_empty());
    }
}
