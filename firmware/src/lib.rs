#![no_std]

//! Transmitter firmware composition
//!
//! Wires the link core to a board. Real peripheral bring-up (clock, GPIO,
//! SPI, linker/startup) lives in a board support crate; this crate carries
//! the composition root plus a loopback bench board that exercises the full
//! scheduler on the host, standing in for a receiver in good range.

pub use static_cell::StaticCell;

pub use link_core::*;

pub mod board;

use board::{BenchClock, BenchTimer, BenchWait, LoopbackRadio, ScriptedButtons};

static FLAGS: StaticCell<IrqFlags> = StaticCell::new();
static CLOCK: StaticCell<BenchClock> = StaticCell::new();

/// One-time bring-up, then hand control to the event scheduler
///
/// Never returns; the scheduler's low-power wait is the only place the
/// system rests.
pub fn start() -> ! {
    let flags: &'static IrqFlags = FLAGS.init(IrqFlags::new());
    let clock: &'static BenchClock = CLOCK.init(BenchClock::new(flags));

    let mut scheduler = Scheduler::new(
        flags,
        default_config(),
        LoopbackRadio::new(flags),
        ScriptedButtons::quiet(),
        BenchTimer::new(clock),
        BenchWait::new(clock),
    );

    #[cfg(feature = "defmt")]
    defmt::info!("padlink core {=str} starting", VERSION);

    scheduler.run()
}
