//! Hardware Abstraction Layer for the transmitter core
//!
//! All bus transactions are synchronous, fixed-latency and infallible at
//! this boundary; byte-level SPI framing lives below these traits.

use embedded_hal::digital::InputPin;

/// Radio link driver: register-level transactions against the transceiver
pub trait RadioLink {
    /// Write a single-byte register
    fn write_register_byte(&mut self, reg: u8, value: u8);

    /// Write a multi-byte register (addresses)
    fn write_register(&mut self, reg: u8, bytes: &[u8]);

    /// Read a single-byte register
    fn read_register_byte(&mut self, reg: u8) -> u8;

    /// Read the status register
    fn read_status(&mut self) -> u8;

    /// Load a payload into the TX FIFO
    fn write_tx_payload(&mut self, bytes: &[u8]);

    /// Flush the TX FIFO
    fn flush_tx(&mut self);

    /// Flush the RX FIFO
    fn flush_rx(&mut self);

    /// Pulse chip enable to start an over-the-air transmission
    fn pulse_chip_enable(&mut self);
}

/// Debounced button sampler
pub trait ButtonInput {
    /// Sample the current debounced button bitmask
    fn sample(&mut self) -> u8;
}

/// Periodic hardware timer control
pub trait TimerControl {
    /// Set the tick interrupt interval; the divider derives the slower
    /// keypoll tick from the same hardware timer
    fn set_interval(&mut self, millis: u16, divider: u16);
}

/// Low-power wait entered by the scheduler when no work is pending
///
/// The only unbounded wait in the system; any interrupt source ends it.
pub trait LowPowerWait {
    fn wait_for_event(&mut self);
}

/// Radio register map and status bits (nRF24-style transceiver)
pub mod regs {
    pub const CONFIG: u8 = 0x00;
    pub const EN_AA: u8 = 0x01;
    pub const EN_RXADDR: u8 = 0x02;
    pub const SETUP_AW: u8 = 0x03;
    pub const SETUP_RETR: u8 = 0x04;
    pub const RF_CH: u8 = 0x05;
    pub const RF_SETUP: u8 = 0x06;
    pub const STATUS: u8 = 0x07;
    pub const RX_ADDR_P0: u8 = 0x0A;
    pub const RX_ADDR_P1: u8 = 0x0B;
    pub const TX_ADDR: u8 = 0x10;
    pub const DYNPD: u8 = 0x1C;
    pub const FEATURE: u8 = 0x1D;

    /// CONFIG: enable CRC
    pub const CONFIG_EN_CRC: u8 = 1 << 3;
    /// CONFIG: 2-byte CRC
    pub const CONFIG_CRCO: u8 = 1 << 2;
    /// CONFIG: power up
    pub const CONFIG_PWR_UP: u8 = 1 << 1;

    /// STATUS: payload received
    pub const STATUS_RX_DR: u8 = 1 << 6;
    /// STATUS: transmit complete, ACK received
    pub const STATUS_TX_DS: u8 = 1 << 5;
    /// STATUS: hardware retransmit limit exhausted without ACK
    pub const STATUS_MAX_RT: u8 = 1 << 4;
    /// All interrupt bits; write 1s to clear
    pub const STATUS_IRQ_BITS: u8 = STATUS_RX_DR | STATUS_TX_DS | STATUS_MAX_RT;

    /// RF_SETUP: 1 Mbps, 0 dBm
    pub const RF_SETUP_1MBPS_0DBM: u8 = (1 << 2) | (1 << 1);
    /// FEATURE: enable dynamic payload length
    pub const FEATURE_EN_DPL: u8 = 1 << 2;
}

/// Button sampler over a bank of embedded-hal input pins
///
/// Bit i of the sample mirrors pin i, active high. A pin read fault reads
/// as released.
pub struct PortButtons<P, const N: usize> {
    pins: [P; N],
}

impl<P, const N: usize> PortButtons<P, N>
where
    P: InputPin,
{
    pub fn new(pins: [P; N]) -> Self {
        Self { pins }
    }
}

impl<P, const N: usize> ButtonInput for PortButtons<P, N>
where
    P: InputPin,
{
    fn sample(&mut self) -> u8 {
        let mut mask = 0u8;
        for (i, pin) in self.pins.iter_mut().enumerate() {
            if pin.is_high().unwrap_or(false) {
                mask |= 1 << i;
            }
        }
        mask
    }
}


#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock hardware implementations for testing

    use super::*;
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// One recorded bus transaction
    #[derive(Clone, PartialEq, Eq, Debug)]
    pub enum BusOp {
        WriteRegByte(u8, u8),
        WriteReg(u8, Vec<u8>),
        ReadRegByte(u8),
        ReadStatus,
        TxPayload(Vec<u8>),
        FlushTx,
        FlushRx,
        PulseCe,
    }

    /// Radio mock recording every transaction and serving scripted statuses
    #[derive(Default)]
    pub struct MockRadio {
        ops: Vec<BusOp>,
        status_script: VecDeque<u8>,
    }

    impl MockRadio {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a status byte for the next `read_status`
        pub fn script_status(&mut self, status: u8) {
            self.status_script.push_back(status);
        }

        pub fn ops(&self) -> &[BusOp] {
            &self.ops
        }

        pub fn clear_ops(&mut self) {
            self.ops.clear();
        }

        /// Payloads loaded into the TX FIFO, in order
        pub fn tx_payloads(&self) -> Vec<Vec<u8>> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    BusOp::TxPayload(bytes) => Some(bytes.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn ce_pulses(&self) -> usize {
            self.ops.iter().filter(|op| **op == BusOp::PulseCe).count()
        }

        pub fn count_writes(&self, reg: u8) -> usize {
            self.ops
                .iter()
                .filter(|op| matches!(op, BusOp::WriteRegByte(r, _) if *r == reg))
                .count()
        }

        /// Last value written to a single-byte register
        pub fn last_write(&self, reg: u8) -> Option<u8> {
            self.ops.iter().rev().find_map(|op| match op {
                BusOp::WriteRegByte(r, v) if *r == reg => Some(*v),
                _ => None,
            })
        }
    }

    impl RadioLink for MockRadio {
        fn write_register_byte(&mut self, reg: u8, value: u8) {
            self.ops.push(BusOp::WriteRegByte(reg, value));
        }

        fn write_register(&mut self, reg: u8, bytes: &[u8]) {
            self.ops.push(BusOp::WriteReg(reg, bytes.to_vec()));
        }

        fn read_register_byte(&mut self, reg: u8) -> u8 {
            self.ops.push(BusOp::ReadRegByte(reg));
            0
        }

        fn read_status(&mut self) -> u8 {
            self.ops.push(BusOp::ReadStatus);
            self.status_script.pop_front().unwrap_or(0)
        }

        fn write_tx_payload(&mut self, bytes: &[u8]) {
            self.ops.push(BusOp::TxPayload(bytes.to_vec()));
        }

        fn flush_tx(&mut self) {
            self.ops.push(BusOp::FlushTx);
        }

        fn flush_rx(&mut self) {
            self.ops.push(BusOp::FlushRx);
        }

        fn pulse_chip_enable(&mut self) {
            self.ops.push(BusOp::PulseCe);
        }
    }

    /// Button sampler with a settable sample
    #[derive(Default)]
    pub struct MockButtons {
        sample: u8,
    }

    impl MockButtons {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set(&mut self, sample: u8) {
            self.sample = sample;
        }
    }

    impl ButtonInput for MockButtons {
        fn sample(&mut self) -> u8 {
            self.sample
        }
    }

    /// Timer recording every interval reconfiguration
    #[derive(Default)]
    pub struct MockTimer {
        intervals: Vec<(u16, u16)>,
    }

    impl MockTimer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn intervals(&self) -> &[(u16, u16)] {
            &self.intervals
        }

        pub fn current(&self) -> Option<(u16, u16)> {
            self.intervals.last().copied()
        }
    }

    impl TimerControl for MockTimer {
        fn set_interval(&mut self, millis: u16, divider: u16) {
            self.intervals.push((millis, divider));
        }
    }

    /// Wait stub counting how many times the scheduler went idle
    #[derive(Default)]
    pub struct CountingWait {
        pub waits: usize,
    }

    impl CountingWait {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl LowPowerWait for CountingWait {
        fn wait_for_event(&mut self) {
            self.waits += 1;
        }
    }
}
