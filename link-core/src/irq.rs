//! Interrupt-to-main-loop handoff primitives
//!
//! Interrupt handlers only set bits and accumulate elapsed time here; the
//! scheduler drains both with a single atomic exchange per loop iteration.
//! Multiple same-source interrupts between drains coalesce into one flag.

use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};

const SRC_TIMER: u8 = 1 << 0;
const SRC_RADIO_IRQ: u8 = 1 << 1;
const SRC_INPUT_CHANGED: u8 = 1 << 2;

/// Snapshot of interrupt sources taken by one scheduler drain
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct EventSet(u8);

impl EventSet {
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn timer(&self) -> bool {
        self.0 & SRC_TIMER != 0
    }

    pub const fn radio_irq(&self) -> bool {
        self.0 & SRC_RADIO_IRQ != 0
    }

    pub const fn input_changed(&self) -> bool {
        self.0 & SRC_INPUT_CHANGED != 0
    }
}

/// Shared flag region written from interrupt context
///
/// Safe to share between interrupt handlers and the main loop; every access
/// is a single atomic operation.
pub struct IrqFlags {
    sources: AtomicU8,
    elapsed_ms: AtomicU16,
}

impl IrqFlags {
    pub const fn new() -> Self {
        Self {
            sources: AtomicU8::new(0),
            elapsed_ms: AtomicU16::new(0),
        }
    }

    /// Record a periodic timer interrupt (called from interrupt context)
    ///
    /// The accumulator saturates rather than wrapping; a drain delayed past
    /// saturation loses time, which consumers tolerate because they react to
    /// "at least this much time passed".
    pub fn note_timer(&self, interval_ms: u16) {
        let _ = self
            .elapsed_ms
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.checked_add(interval_ms).unwrap_or(u16::MAX))
            });
        self.sources.fetch_or(SRC_TIMER, Ordering::Release);
    }

    /// Record a radio IRQ line assertion (called from interrupt context)
    pub fn note_radio_irq(&self) {
        self.sources.fetch_or(SRC_RADIO_IRQ, Ordering::Release);
    }

    /// Record a debounced input edge (called from interrupt context)
    pub fn note_input_changed(&self) {
        self.sources.fetch_or(SRC_INPUT_CHANGED, Ordering::Release);
    }

    /// Atomically take and clear all pending sources and elapsed time
    ///
    /// Time is taken before the source bits. A timer interrupt landing
    /// between the two swaps then leaves its milliseconds behind together
    /// with its flag, so elapsed time never arrives in a drain whose event
    /// set lacks the timer bit.
    pub fn drain(&self) -> (EventSet, u16) {
        let elapsed = self.elapsed_ms.swap(0, Ordering::AcqRel);
        let sources = self.sources.swap(0, Ordering::AcqRel);
        (EventSet(sources), elapsed)
    }
}

impl Default for IrqFlags {
    fn default() -> Self {
        Self::new()
    }
}
