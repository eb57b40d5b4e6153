//! Fixed-capacity periodic task table
//!
//! Cleared and repopulated on every power-mode transition. Tasks are a
//! closed set of tagged variants dispatched by match, so the table is
//! exhaustive and carries no callback pointers.

use heapless::Vec;

/// Maximum number of concurrently registered tasks
pub const MAX_TASKS: usize = 4;

/// The closed set of periodic work items
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TaskId {
    /// Sleep mode: sample buttons, wake on any activity
    PollButtons,
    /// Awake mode: drive the link state machine's logical tick
    LinkTick,
    /// Awake mode: return to Sleep after a quiescent window
    IdleWatch,
}

/// Result of dispatching one task
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TaskOutcome {
    Continue,
    /// Stop walking the table this drain; used when a dispatch requested a
    /// mode transition that invalidates the remaining entries.
    StopSweep,
}

#[derive(Copy, Clone, Debug)]
struct Task {
    id: TaskId,
    interval_ms: u16,
    remaining_ms: u16,
}

/// Ordered fixed-capacity list of periodic tasks
pub struct TaskTable {
    tasks: Vec<Task, MAX_TASKS>,
}

impl TaskTable {
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Register a task; returns false when the table is full
    pub fn add(&mut self, id: TaskId, interval_ms: u16) -> bool {
        self.tasks
            .push(Task {
                id,
                interval_ms,
                remaining_ms: interval_ms,
            })
            .is_ok()
    }

    /// Advance all tasks by the elapsed time and dispatch those that are due
    pub fn run<F>(&mut self, delta_ms: u16, mut dispatch: F)
    where
        F: FnMut(TaskId) -> TaskOutcome,
    {
        for task in self.tasks.iter_mut() {
            if task.remaining_ms <= delta_ms {
                if dispatch(task.id) == TaskOutcome::StopSweep {
                    return;
                }
                task.remaining_ms = task.interval_ms;
            } else {
                task.remaining_ms -= delta_ms;
            }
        }
    }
}

impl Default for TaskTable {
    fn default() -> Self {
        Self::new()
    }
}
