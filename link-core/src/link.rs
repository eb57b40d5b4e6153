//! Reliable link state machine (Awake mode)
//!
//! Drives the ACK-based radio transaction until the local button state and
//! the last-acknowledged receiver state converge. Retries are governed
//! here, not by the radio's own retry counter: isolated packet loss is
//! retried immediately, sustained loss backs off exponentially up to a cap.

use crate::hal::{regs, ButtonInput, RadioLink};
use crate::types::{LinkConfig, LinkState};

/// Per-activation link session; reset on every Sleep-to-Awake transition
pub struct LinkSession {
    state: LinkState,
    local_state: u8,
    in_flight_state: u8,
    acked_state: u8,
    acked_valid: bool,
    state_millis: u16,
    wait_time_ms: u16,
    consecutive_failures: u8,
}

impl LinkSession {
    /// Create a fresh session from the current button sample
    pub fn new(initial_sample: u8) -> Self {
        Self {
            state: LinkState::Idle,
            local_state: initial_sample,
            in_flight_state: 0,
            acked_state: 0,
            acked_valid: false,
            state_millis: 0,
            wait_time_ms: 0,
            consecutive_failures: 0,
        }
    }

    /// Current state machine state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Latest sampled local button state
    pub fn local_state(&self) -> u8 {
        self.local_state
    }

    /// Last state the receiver is known to have applied, if certain
    pub fn acked_state(&self) -> Option<u8> {
        self.acked_valid.then_some(self.acked_state)
    }

    /// Current backoff duration; meaningful only in `Wait`
    pub fn wait_time_ms(&self) -> u16 {
        self.wait_time_ms
    }

    /// Consecutive unacknowledged sends, saturating
    pub fn consecutive_failures(&self) -> u8 {
        self.consecutive_failures
    }

    /// True when nothing is pending and the receiver mirrors an all-released
    /// local state
    pub fn is_quiescent(&self) -> bool {
        self.state == LinkState::Idle
            && self.local_state == 0
            && self.acked_valid
            && self.acked_state == 0
    }

    /// Start a fresh send attempt chain
    pub fn send_packet<R: RadioLink>(&mut self, radio: &mut R) {
        self.consecutive_failures = 0;
        self.resend_packet(radio);
    }

    /// Transmit the current local state without touching the failure count
    pub fn resend_packet<R: RadioLink>(&mut self, radio: &mut R) {
        self.state = LinkState::Sending;
        self.state_millis = 0;
        self.in_flight_state = self.local_state;

        radio.write_tx_payload(&[self.in_flight_state]);
        radio.pulse_chip_enable();
    }

    /// Handle a debounced input edge
    pub fn on_button_change<R, B>(&mut self, radio: &mut R, buttons: &mut B)
    where
        R: RadioLink,
        B: ButtonInput,
    {
        self.local_state = buttons.sample();

        // From Wait this abandons the remaining backoff: user input always
        // gets a fresh attempt.
        if self.state.accepts_fresh_send()
            && (!self.acked_valid || self.local_state != self.acked_state)
        {
            self.send_packet(radio);
        }
    }

    /// Handle an asserted radio IRQ line
    pub fn on_radio_irq<R: RadioLink>(&mut self, config: &LinkConfig, radio: &mut R) {
        let status = radio.read_status();

        if status & regs::STATUS_MAX_RT != 0 {
            radio.flush_tx();
            radio.write_register_byte(regs::STATUS, regs::STATUS_IRQ_BITS);
            self.on_tx_failed(config, radio);
        } else if status & regs::STATUS_TX_DS != 0 {
            radio.write_register_byte(regs::STATUS, regs::STATUS_IRQ_BITS);
            self.on_tx_succeeded(radio);
        } else {
            // Spurious wake from some other IRQ source
            #[cfg(feature = "defmt")]
            defmt::trace!("spurious radio IRQ, status {=u8:x}", status);
            radio.write_register_byte(regs::STATUS, regs::STATUS_IRQ_BITS);
        }
    }

    fn on_tx_failed<R: RadioLink>(&mut self, config: &LinkConfig, radio: &mut R) {
        // The receiver may have applied the payload and only the ACK was
        // lost, so its state is now unknown.
        self.acked_valid = false;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);

        if self.consecutive_failures < config.fast_retry_limit {
            self.resend_packet(radio);
        } else if self.consecutive_failures == config.fast_retry_limit {
            self.wait_time_ms = config.backoff_initial_ms;
            self.enter_wait();
        } else {
            self.wait_time_ms = self
                .wait_time_ms
                .saturating_mul(2)
                .min(config.backoff_cap_ms);
            self.enter_wait();
        }
    }

    fn on_tx_succeeded<R: RadioLink>(&mut self, radio: &mut R) {
        self.acked_state = self.in_flight_state;
        self.acked_valid = true;

        if self.local_state != self.acked_state {
            // Input changed mid-flight; ship the newer state right away
            self.send_packet(radio);
        } else {
            self.state = LinkState::Idle;
            self.state_millis = 0;
        }
    }

    fn enter_wait(&mut self) {
        self.state = LinkState::Wait;
        self.state_millis = 0;
    }

    /// Logical tick driven by the Awake-mode task table
    pub fn tick<R: RadioLink>(&mut self, config: &LinkConfig, radio: &mut R, delta_ms: u16) {
        self.state_millis = self.state_millis.saturating_add(delta_ms);

        match self.state {
            // Heartbeat: guard against an undetected missed state update
            LinkState::Idle if self.state_millis > config.heartbeat_ms => {
                self.send_packet(radio);
            }
            LinkState::Wait if self.state_millis >= self.wait_time_ms => {
                self.resend_packet(radio);
            }
            _ => {}
        }
    }
}
