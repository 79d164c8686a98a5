//! A minimal cooperative scheduler: one per execution context.
//!
//! Tasks are resumable state machines.  Each call to [Task::resume] does a
//! bounded amount of work (draw a segment, analyze a block, check a flag) and
//! returns; the scheduler resumes every live task once per round, in the
//! order they were added.  Nothing is preempted, so a task that blocks in
//! `resume` blocks its whole context.

use arrayvec::ArrayVec;

/// Result of resuming a task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The task has more to do
    Yielded,
    /// The task is done and will not be resumed again
    Finished,
}

/// A cooperatively scheduled task
pub trait Task {
    /// A short name, for logging
    fn name(&self) -> &'static str;
    /// Do the next bounded piece of work
    fn resume(&mut self) -> Step;
}

struct Slot<'a> {
    task: &'a mut dyn Task,
    background: bool,
    finished: bool,
}

/// Round-robin scheduler for up to `N` tasks
pub struct Scheduler<'a, const N: usize> {
    slots: ArrayVec<Slot<'a>, N>,
}

impl<'a, const N: usize> Scheduler<'a, N> {
    /// An empty scheduler
    pub fn new() -> Self {
        Self {
            slots: ArrayVec::new(),
        }
    }
    fn push(&mut self, task: &'a mut dyn Task, background: bool) -> Result<(), &'static str> {
        self.slots
            .try_push(Slot {
                task,
                background,
                finished: false,
            })
            .map_err(|_| "Scheduler is full")
    }
    /// Add a task.  The scheduler keeps running until every task added this
    /// way has finished.
    pub fn add(&mut self, task: &'a mut dyn Task) -> Result<(), &'static str> {
        self.push(task, false)
    }
    /// Add a task that is serviced every round but does not keep the
    /// scheduler alive on its own (for example the spectral task, which
    /// never finishes)
    pub fn add_background(&mut self, task: &'a mut dyn Task) -> Result<(), &'static str> {
        self.push(task, true)
    }
    /// Number of tasks that have not yet finished
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|s| !s.finished).count()
    }
    fn has_foreground_work(&self) -> bool {
        self.slots.iter().any(|s| !s.finished && !s.background)
    }
    /// Resume every live task once, in registration order
    pub fn round(&mut self) {
        for slot in self.slots.iter_mut().filter(|s| !s.finished) {
            if slot.task.resume() == Step::Finished {
                log::debug!("Task {} finished", slot.task.name());
                slot.finished = true;
            }
        }
    }
    /// Run rounds until every foreground task has finished or `limit`
    /// rounds have run.  Returns the number of rounds run.
    pub fn run_rounds(&mut self, limit: usize) -> usize {
        let mut rounds = 0;
        while rounds < limit && self.has_foreground_work() {
            self.round();
            rounds += 1;
        }
        rounds
    }
    /// Run forever
    pub fn run(&mut self) -> ! {
        loop {
            self.round();
        }
    }
}

impl<const N: usize> Default for Scheduler<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
