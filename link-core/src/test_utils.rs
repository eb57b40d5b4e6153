//! Test utilities for driving the scheduler from host-based tests
//!
//! The harness plays the role of the interrupt sources: it raises flags,
//! advances virtual time in timer-interrupt-sized steps and answers radio
//! transmissions with scripted ACK outcomes.

use crate::hal::mock::{CountingWait, MockButtons, MockRadio, MockTimer};
use crate::hal::regs;
use crate::irq::IrqFlags;
use crate::scheduler::Scheduler;
use crate::types::LinkConfig;

use std::boxed::Box;

type MockScheduler = Scheduler<'static, MockRadio, MockButtons, MockTimer, CountingWait>;

/// Scheduler plus simulated interrupt sources
pub struct Harness {
    pub flags: &'static IrqFlags,
    pub sched: MockScheduler,
}

impl Harness {
    /// Build a started harness; the scheduler begins in Sleep mode
    pub fn new(config: LinkConfig) -> Self {
        let flags: &'static IrqFlags = Box::leak(Box::new(IrqFlags::new()));
        let mut sched = Scheduler::new(
            flags,
            config,
            MockRadio::new(),
            MockButtons::new(),
            MockTimer::new(),
            CountingWait::new(),
        );
        sched.start();
        Self { flags, sched }
    }

    /// Set the sampled button state and raise the input-changed edge
    pub fn press(&mut self, sample: u8) {
        self.sched.buttons_mut().set(sample);
        self.flags.note_input_changed();
        self.sched.step();
    }

    /// Advance virtual time, firing the timer interrupt at the currently
    /// configured hardware interval and draining after each interrupt
    pub fn advance_ms(&mut self, millis: u16) {
        let (interval, _divider) = self
            .sched
            .timer_mut()
            .current()
            .expect("timer interval never configured");
        let interval = interval.max(1);

        let mut remaining = millis;
        while remaining > 0 {
            let step = remaining.min(interval);
            self.flags.note_timer(step);
            self.sched.step();
            remaining -= step;
        }
    }

    /// Deliver a radio IRQ with the given status byte
    pub fn radio_irq(&mut self, status: u8) {
        self.sched.radio_mut().script_status(status);
        self.flags.note_radio_irq();
        self.sched.step();
    }

    /// Acknowledge the most recent transmission
    pub fn ack(&mut self) {
        self.radio_irq(regs::STATUS_TX_DS);
    }

    /// Report the most recent transmission as unacknowledged
    pub fn nack(&mut self) {
        self.radio_irq(regs::STATUS_MAX_RT);
    }

    /// Advance time while ACKing every transmission the instant it is sent,
    /// emulating a receiver in good range
    pub fn advance_with_ack(&mut self, millis: u16) {
        let mut remaining = millis;
        while remaining > 0 {
            let step = remaining.min(10);
            self.advance_ms(step);
            remaining -= step;

            while self.pending_sends() > 0 {
                self.take_send();
                self.ack();
            }
        }
    }

    fn pending_sends(&mut self) -> usize {
        self.sched.radio_mut().ce_pulses()
    }

    /// Consume recorded bus traffic so the next assertion starts clean
    pub fn take_send(&mut self) {
        self.sched.radio_mut().clear_ops();
    }
}
