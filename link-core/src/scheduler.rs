//! Event scheduler / power loop
//!
//! The process-wide cooperative loop. Each iteration drains the interrupt
//! flag region with one atomic exchange, then either enters the low-power
//! wait (nothing fired) or dispatches the bottom-half handlers in fixed
//! priority order: input change, timer (which drives the task table), radio
//! IRQ. Deferred power-mode transitions are applied at the end of the
//! iteration, never while the task table is being walked.

use crate::hal::{ButtonInput, LowPowerWait, RadioLink, TimerControl};
use crate::irq::IrqFlags;
use crate::link::LinkSession;
use crate::power::{self, PowerController};
use crate::tasks::{TaskId, TaskOutcome, TaskTable};
use crate::types::{LinkConfig, PowerMode};

/// The cooperative scheduler; owns all system state and the hardware
pub struct Scheduler<'a, R, B, T, W> {
    flags: &'a IrqFlags,
    config: LinkConfig,
    radio: R,
    buttons: B,
    timer: T,
    waiter: W,
    power: PowerController,
    session: LinkSession,
    tasks: TaskTable,
}

impl<'a, R, B, T, W> Scheduler<'a, R, B, T, W>
where
    R: RadioLink,
    B: ButtonInput,
    T: TimerControl,
    W: LowPowerWait,
{
    pub fn new(flags: &'a IrqFlags, config: LinkConfig, radio: R, buttons: B, timer: T, waiter: W) -> Self {
        Self {
            flags,
            config,
            radio,
            buttons,
            timer,
            waiter,
            power: PowerController::new(),
            session: LinkSession::new(0),
            tasks: TaskTable::new(),
        }
    }

    /// Perform the initial Sleep entry; called once before the loop
    pub fn start(&mut self) {
        self.power
            .enter_sleep(&self.config, &mut self.radio, &mut self.timer, &mut self.tasks);
    }

    /// Run forever; the low-power wait is the only unbounded wait and any
    /// interrupt source ends it
    pub fn run(&mut self) -> ! {
        self.start();
        loop {
            self.step();
        }
    }

    /// One scheduler iteration; exposed for host-based testing
    pub fn step(&mut self) {
        let (events, elapsed_ms) = self.flags.drain();

        if events.is_empty() {
            // Pure wait-for-next-interrupt, not a work unit
            self.waiter.wait_for_event();
            return;
        }

        if events.input_changed() {
            self.on_input_changed();
        }
        if events.timer() {
            self.on_timer(elapsed_ms);
        }
        if events.radio_irq() {
            self.on_radio_irq();
        }

        self.apply_pending_transition();
    }

    fn on_input_changed(&mut self) {
        match self.power.mode() {
            PowerMode::Sleep => self.power.request(PowerMode::Awake),
            PowerMode::Awake => self
                .session
                .on_button_change(&mut self.radio, &mut self.buttons),
        }
    }

    fn on_timer(&mut self, elapsed_ms: u16) {
        let Self {
            config,
            radio,
            buttons,
            power,
            session,
            tasks,
            ..
        } = self;

        let link_tick_ms = config.link_tick_ms();
        tasks.run(elapsed_ms, |id| match id {
            TaskId::PollButtons => {
                if buttons.sample() != 0 {
                    power.request(PowerMode::Awake);
                    // The pending transition invalidates this table
                    return TaskOutcome::StopSweep;
                }
                TaskOutcome::Continue
            }
            TaskId::LinkTick => {
                session.tick(config, radio, link_tick_ms);
                TaskOutcome::Continue
            }
            TaskId::IdleWatch => {
                if session.is_quiescent() {
                    power.request(PowerMode::Sleep);
                    return TaskOutcome::StopSweep;
                }
                TaskOutcome::Continue
            }
        });
    }

    fn on_radio_irq(&mut self) {
        match self.power.mode() {
            // A stale IRQ while asleep is drained, nothing more
            PowerMode::Sleep => power::radio_drain_irq(&mut self.radio),
            PowerMode::Awake => self.session.on_radio_irq(&self.config, &mut self.radio),
        }
    }

    fn apply_pending_transition(&mut self) {
        if let Some(next) = self.power.take_request() {
            match next {
                PowerMode::Sleep => self.power.enter_sleep(
                    &self.config,
                    &mut self.radio,
                    &mut self.timer,
                    &mut self.tasks,
                ),
                PowerMode::Awake => self.power.enter_awake(
                    &self.config,
                    &mut self.radio,
                    &mut self.timer,
                    &mut self.buttons,
                    &mut self.session,
                    &mut self.tasks,
                ),
            }
        }
    }

    /// Current power mode
    pub fn mode(&self) -> PowerMode {
        self.power.mode()
    }

    /// Current link session state
    pub fn session(&self) -> &LinkSession {
        &self.session
    }

    /// Active configuration
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Access the radio driver (diagnostics and testing)
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Access the button sampler (diagnostics and testing)
    pub fn buttons_mut(&mut self) -> &mut B {
        &mut self.buttons
    }

    /// Access the timer (diagnostics and testing)
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Access the low-power waiter (diagnostics and testing)
    pub fn waiter_mut(&mut self) -> &mut W {
        &mut self.waiter
    }
}
