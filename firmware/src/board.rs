//! Loopback bench board
//!
//! Host-runnable stand-ins for the transmitter's peripherals. The radio
//! behaves like a transceiver paired with a receiver in good range: every
//! chip-enable pulse while powered up completes with an immediate ACK. The
//! clock advances virtual time by one timer interval whenever the scheduler
//! would otherwise sleep, so the bench system free-runs deterministically.

use core::sync::atomic::{AtomicU16, Ordering};

use heapless::Vec;

use link_core::hal::{regs, ButtonInput, LowPowerWait, RadioLink, TimerControl};
use link_core::irq::IrqFlags;

/// Shared virtual timebase for the bench timer and waiter
pub struct BenchClock {
    interval_ms: AtomicU16,
    flags: &'static IrqFlags,
}

impl BenchClock {
    pub fn new(flags: &'static IrqFlags) -> Self {
        Self {
            interval_ms: AtomicU16::new(0),
            flags,
        }
    }
}

/// Timer control writing into the shared bench clock
pub struct BenchTimer {
    clock: &'static BenchClock,
}

impl BenchTimer {
    pub fn new(clock: &'static BenchClock) -> Self {
        Self { clock }
    }
}

impl TimerControl for BenchTimer {
    fn set_interval(&mut self, millis: u16, _divider: u16) {
        self.clock.interval_ms.store(millis, Ordering::Release);
    }
}

/// Low-power wait that advances virtual time instead of halting
pub struct BenchWait {
    clock: &'static BenchClock,
}

impl BenchWait {
    pub fn new(clock: &'static BenchClock) -> Self {
        Self { clock }
    }
}

impl LowPowerWait for BenchWait {
    fn wait_for_event(&mut self) {
        let interval = self.clock.interval_ms.load(Ordering::Acquire).max(1);
        self.clock.flags.note_timer(interval);
    }
}

/// Radio that loops every transmission back as an immediate ACK
pub struct LoopbackRadio {
    flags: &'static IrqFlags,
    status: u8,
    config: u8,
}

impl LoopbackRadio {
    pub fn new(flags: &'static IrqFlags) -> Self {
        Self {
            flags,
            status: 0,
            config: 0,
        }
    }

    fn powered_up(&self) -> bool {
        self.config & regs::CONFIG_PWR_UP != 0
    }
}

impl RadioLink for LoopbackRadio {
    fn write_register_byte(&mut self, reg: u8, value: u8) {
        match reg {
            regs::CONFIG => self.config = value,
            // Interrupt bits are write-1-to-clear
            regs::STATUS => self.status &= !(value & regs::STATUS_IRQ_BITS),
            _ => {}
        }
    }

    fn write_register(&mut self, _reg: u8, _bytes: &[u8]) {}

    fn read_register_byte(&mut self, reg: u8) -> u8 {
        match reg {
            regs::CONFIG => self.config,
            regs::STATUS => self.status,
            _ => 0,
        }
    }

    fn read_status(&mut self) -> u8 {
        self.status
    }

    fn write_tx_payload(&mut self, _bytes: &[u8]) {}

    fn flush_tx(&mut self) {}

    fn flush_rx(&mut self) {}

    fn pulse_chip_enable(&mut self) {
        if self.powered_up() {
            self.status |= regs::STATUS_TX_DS;
            self.flags.note_radio_irq();
        }
    }
}

/// Button sampler replaying a fixed script, holding the last sample
pub struct ScriptedButtons {
    script: Vec<u8, 16>,
    pos: usize,
}

impl ScriptedButtons {
    pub fn new(samples: &[u8]) -> Self {
        Self {
            script: Vec::from_slice(samples).unwrap_or_else(|_| Vec::new()),
            pos: 0,
        }
    }

    /// A board with no buttons ever pressed
    pub fn quiet() -> Self {
        Self::new(&[0])
    }
}

impl ButtonInput for ScriptedButtons {
    fn sample(&mut self) -> u8 {
        let sample = self.script.get(self.pos).copied().unwrap_or(0);
        if self.pos + 1 < self.script.len() {
            self.pos += 1;
        }
        sample
    }
}
