//! Power-mode controller
//!
//! Two-state supervisor over the whole system: Sleep polls the buttons at a
//! slow rate with the radio powered down, Awake runs the link state machine
//! on a fast tick. Mode entry owns which handlers the scheduler routes and
//! what the task table contains. Transition requests are deferred so the
//! switch never mutates the task table while it is being walked.

use crate::hal::{regs, ButtonInput, RadioLink, TimerControl};
use crate::link::LinkSession;
use crate::tasks::{TaskId, TaskTable};
use crate::types::{LinkConfig, PowerMode};

/// Receiver-side address the transmitter sends to; auto-ACK requires
/// listening on the same address on pipe 0
const DEST_ADDR: [u8; 3] = [0xE7, 0xE7, 0xE7];
/// Our own receive address on pipe 1
const SRC_ADDR: [u8; 3] = [0xC2, 0xC2, 0xC2];
/// RF channel 3 = 2403 MHz
const RF_CHANNEL: u8 = 3;

/// Configure and power up the radio for ACKed transmission
///
/// Hardware auto-retransmit stays at zero: retries are governed by the link
/// state machine, not the radio's own retry counter.
pub fn radio_wake<R: RadioLink>(radio: &mut R) {
    // Power up as primary TX, CRC enabled, 2-byte CRC
    radio.write_register_byte(
        regs::CONFIG,
        regs::CONFIG_EN_CRC | regs::CONFIG_CRCO | regs::CONFIG_PWR_UP,
    );

    // Auto ack and receive on pipes 0,1
    radio.write_register_byte(regs::EN_AA, 0b11);
    radio.write_register_byte(regs::EN_RXADDR, 0b11);

    // 3-byte address width
    radio.write_register_byte(regs::SETUP_AW, 1);

    // 250 usec retransmit delay, zero hardware auto-retries
    radio.write_register_byte(regs::SETUP_RETR, 0x00);

    radio.write_register_byte(regs::RF_CH, RF_CHANNEL);
    radio.write_register_byte(regs::RF_SETUP, regs::RF_SETUP_1MBPS_0DBM);

    radio.write_register(regs::RX_ADDR_P0, &DEST_ADDR);
    radio.write_register(regs::RX_ADDR_P1, &SRC_ADDR);
    radio.write_register(regs::TX_ADDR, &DEST_ADDR);

    // Dynamic payload length on pipes 0,1
    radio.write_register_byte(regs::DYNPD, 0b11);
    radio.write_register_byte(regs::FEATURE, regs::FEATURE_EN_DPL);

    // Start from empty queues with no stale interrupt bits
    radio.flush_tx();
    radio.flush_rx();
    radio.write_register_byte(regs::STATUS, regs::STATUS_IRQ_BITS);
}

/// Power the radio down and discard anything pending
pub fn radio_sleep<R: RadioLink>(radio: &mut R) {
    radio.write_register_byte(regs::CONFIG, 0);
    radio.flush_tx();
    radio.flush_rx();
    radio.write_register_byte(regs::STATUS, regs::STATUS_IRQ_BITS);
}

/// Drain a stale radio IRQ that fires while asleep
pub fn radio_drain_irq<R: RadioLink>(radio: &mut R) {
    radio.flush_tx();
    radio.write_register_byte(regs::STATUS, regs::STATUS_IRQ_BITS);
}

/// Two-state power supervisor with deferred transition requests
pub struct PowerController {
    current: PowerMode,
    requested: Option<PowerMode>,
}

impl PowerController {
    pub const fn new() -> Self {
        Self {
            current: PowerMode::Sleep,
            requested: None,
        }
    }

    pub fn mode(&self) -> PowerMode {
        self.current
    }

    /// Request a deferred transition; re-entering the current mode is not a
    /// supported input and is ignored
    pub fn request(&mut self, mode: PowerMode) {
        if mode != self.current {
            self.requested = Some(mode);
        }
    }

    /// Take the pending transition target, if any
    pub fn take_request(&mut self) -> Option<PowerMode> {
        self.requested.take().filter(|mode| *mode != self.current)
    }

    /// Enter Sleep: radio down, slow poll task, radio IRQs drained
    pub fn enter_sleep<R, T>(
        &mut self,
        config: &LinkConfig,
        radio: &mut R,
        timer: &mut T,
        tasks: &mut TaskTable,
    ) where
        R: RadioLink,
        T: TimerControl,
    {
        self.current = PowerMode::Sleep;
        self.requested = None;

        radio_sleep(radio);
        timer.set_interval(config.sleep_poll_ms, 1);
        tasks.clear();
        tasks.add(TaskId::PollButtons, config.sleep_poll_ms);

        #[cfg(feature = "defmt")]
        defmt::debug!("entered Sleep mode");
    }

    /// Enter Awake: radio up, fresh link session, fast tick
    pub fn enter_awake<R, T, B>(
        &mut self,
        config: &LinkConfig,
        radio: &mut R,
        timer: &mut T,
        buttons: &mut B,
        session: &mut LinkSession,
        tasks: &mut TaskTable,
    ) where
        R: RadioLink,
        T: TimerControl,
        B: ButtonInput,
    {
        self.current = PowerMode::Awake;
        self.requested = None;

        radio_wake(radio);
        *session = LinkSession::new(buttons.sample());

        timer.set_interval(config.awake_timer_ms, config.awake_tick_divider);
        tasks.clear();
        tasks.add(TaskId::LinkTick, config.link_tick_ms());
        tasks.add(TaskId::IdleWatch, config.idle_return_ms);

        // The receiver's state is unknown on every wake; sync it right away
        session.send_packet(radio);

        #[cfg(feature = "defmt")]
        defmt::debug!("entered Awake mode, buttons {=u8:x}", session.local_state());
    }
}

impl Default for PowerController {
    fn default() -> Self {
        Self::new()
    }
}
