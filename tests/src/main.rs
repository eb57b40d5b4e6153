//! Bench-board smoke run: free-run the full transmitter stack on the host
//! and print every power-mode transition.

use link_core::{default_config, IrqFlags, PowerMode, Scheduler};
use padlink_firmware::board::{BenchClock, BenchTimer, BenchWait, LoopbackRadio, ScriptedButtons};

fn main() {
    let flags: &'static IrqFlags = Box::leak(Box::new(IrqFlags::new()));
    let clock: &'static BenchClock = Box::leak(Box::new(BenchClock::new(flags)));

    let mut scheduler = Scheduler::new(
        flags,
        default_config(),
        LoopbackRadio::new(flags),
        // One poll worth of button activity, then silence
        ScriptedButtons::new(&[0x05, 0x00]),
        BenchTimer::new(clock),
        BenchWait::new(clock),
    );
    scheduler.start();

    println!("padlink bench run, core v{}", link_core::VERSION);

    let mut mode = scheduler.mode();
    println!("start: {:?}", mode);

    for step in 0..400_000u32 {
        scheduler.step();
        if scheduler.mode() != mode {
            mode = scheduler.mode();
            println!("step {}: -> {:?}", step, mode);
            if mode == PowerMode::Sleep {
                break;
            }
        }
    }

    println!(
        "final: {:?}, acked state {:?}",
        scheduler.mode(),
        scheduler.session().acked_state()
    );
}
