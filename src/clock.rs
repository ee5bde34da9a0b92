//! Frame clock driving per-frame tasks.
//!
//! Tasks registered with [`FrameClock::on_next_frame`] run once on the next call to
//! [`FrameClock::advance`] and are rescheduled for the following one for as long as
//! they return [`ControlFlow::Continue`] and their [`CancelHandle`] hasn't been
//! cancelled. The clock itself doesn't sleep; whoever owns it decides when a display
//! refresh happens, which lets tests single-step frames.

use log::*;
use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::time::Duration;

/// Shared cancellation flag of a scheduled task
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Rc<Cell<bool>>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the task before its next tick. A tick already in progress completes.
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Information about the frame being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Number of the frame, starting at 0
    pub number: u64,
    /// Time elapsed since the previous frame
    pub delta: Duration,
}

/// Work performed once per display refresh over a shared context `C`
pub trait FrameTask<C> {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Runs one tick. Returning [`ControlFlow::Break`] unschedules the task.
    fn tick(&mut self, ctx: &mut C, frame: &FrameInfo) -> ControlFlow<()>;
}

struct Scheduled<C> {
    task: Box<dyn FrameTask<C>>,
    cancel: CancelHandle,
}

pub struct FrameClock<C> {
    tasks: Vec<Scheduled<C>>,
    frame: u64,
}

impl<C> Default for FrameClock<C> {
    fn default() -> Self {
        FrameClock {
            tasks: Vec::new(),
            frame: 0,
        }
    }
}

impl<C> FrameClock<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` for the next frame
    pub fn on_next_frame(&mut self, task: impl FrameTask<C> + 'static) -> CancelHandle {
        let cancel = CancelHandle::new();
        debug!("Scheduling frame task `{}`", task.name());
        self.tasks.push(Scheduled {
            task: Box::new(task),
            cancel: cancel.clone(),
        });
        cancel
    }

    /// Produces one frame: every live task ticks once, in the order it was scheduled.
    /// Returns the number of tasks that ran.
    pub fn advance(&mut self, ctx: &mut C, delta: Duration) -> usize {
        let frame = FrameInfo {
            number: self.frame,
            delta,
        };
        self.frame += 1;

        let mut ran = 0;
        self.tasks.retain_mut(|scheduled| {
            if scheduled.cancel.is_cancelled() {
                debug!("Frame task `{}` cancelled", scheduled.task.name());
                return false;
            }

            ran += 1;
            match scheduled.task.tick(ctx, &frame) {
                ControlFlow::Continue(()) => !scheduled.cancel.is_cancelled(),
                ControlFlow::Break(()) => {
                    debug!("Frame task `{}` finished", scheduled.task.name());
                    false
                }
            }
        });
        ran
    }

    /// Number of frames produced so far
    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Number of tasks waiting for the next frame
    pub fn pending(&self) -> usize {
        self.tasks
            .iter()
            .filter(|scheduled| !scheduled.cancel.is_cancelled())
            .count()
    }

    /// True once every task has been cancelled or has finished
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}
