//! Cancellable cooperative task primitive.
//!
//! A [`Task`] wraps one outstanding asynchronous hardware operation
//! (BLE connect, sensor mode change, motor command) so it can be
//! polled from a single-threaded event loop and cancelled from an
//! interrupt-like context. Cancellation is a request, not a
//! transition: after `cancel()` the caller keeps polling while the
//! driver unwinds (for example sending a disconnect command and
//! waiting for its acknowledgment) until a terminal status appears.

use std::time::Duration;

use axle_traits::{Clock, Operation, OperationError, OperationStatus};

use crate::error::AxleError;

/// Externally visible task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Still in flight; poll again later.
    Running,
    Success,
    Error(OperationError),
    /// Terminated early after a cancel request.
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    /// Cancel requested; draining the driver's teardown sequence.
    Cancelling,
    Finished(TaskStatus),
}

/// One cancellable unit of asynchronous work.
#[derive(Debug)]
pub struct Task<O: Operation> {
    op: O,
    phase: Phase,
}

impl<O: Operation> Task<O> {
    /// Begin the operation. The caller owns the task until it observes
    /// a terminal status; dropping it mid-flight leaks the underlying
    /// hardware resource in an undefined state.
    pub fn start(op: O) -> Self {
        Self {
            op,
            phase: Phase::Running,
        }
    }

    /// Non-blocking status check. Once a terminal status has been
    /// observed it is cached; repeated polls keep returning it without
    /// touching the operation again.
    pub fn poll(&mut self) -> TaskStatus {
        if let Phase::Finished(status) = self.phase {
            return status;
        }
        match self.op.status() {
            OperationStatus::Again => TaskStatus::Running,
            OperationStatus::Complete => self.finish(TaskStatus::Success),
            OperationStatus::Failed(OperationError::Cancelled) => {
                self.finish(TaskStatus::Cancelled)
            }
            OperationStatus::Failed(e) => self.finish(TaskStatus::Error(e)),
        }
    }

    fn finish(&mut self, status: TaskStatus) -> TaskStatus {
        self.phase = Phase::Finished(status);
        status
    }

    /// Request early termination. Idempotent: the operation's cancel
    /// hook runs exactly once, and calling this after a terminal
    /// status is a no-op.
    pub fn cancel(&mut self) {
        if self.phase == Phase::Running {
            tracing::debug!("task cancel requested");
            self.op.cancel();
            self.phase = Phase::Cancelling;
        }
    }

    /// Whether a cancel has been requested but not yet observed.
    pub fn is_cancelling(&self) -> bool {
        self.phase == Phase::Cancelling
    }
}

/// One-task-per-resource guard.
///
/// Each hardware resource (motor channel, radio connection, port) is
/// exclusively owned by at most one active task; starting a new one
/// while the previous is still in flight is rejected, never silently
/// interleaved.
#[derive(Debug, Default)]
pub struct TaskSlot<O: Operation> {
    current: Option<Task<O>>,
}

impl<O: Operation> TaskSlot<O> {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Start a new task, unless the slot is still busy.
    pub fn begin(&mut self, op: O) -> Result<(), AxleError> {
        if let Some(task) = &mut self.current
            && !task.poll().is_terminal()
        {
            return Err(AxleError::Busy);
        }
        self.current = Some(Task::start(op));
        Ok(())
    }

    /// The outstanding task, if any was ever started.
    pub fn task_mut(&mut self) -> Option<&mut Task<O>> {
        self.current.as_mut()
    }

    /// Poll the outstanding task; an empty slot reads as terminal.
    pub fn poll(&mut self) -> Option<TaskStatus> {
        self.current.as_mut().map(Task::poll)
    }

    pub fn cancel(&mut self) {
        if let Some(task) = &mut self.current {
            task.cancel();
        }
    }
}

/// Poll a task to completion, cooperatively yielding between polls.
///
/// Used at boundaries where a higher-level call must look synchronous.
/// On timeout the task is cancelled and *drained* to a terminal status
/// before `Timeout` is reported — the operation is never abandoned
/// mid-flight, as that would leak the owned resource.
pub fn wait<O: Operation>(
    task: &mut Task<O>,
    clock: &dyn Clock,
    poll_interval: Duration,
    timeout: Option<Duration>,
) -> Result<(), AxleError> {
    let epoch = clock.now();
    loop {
        match task.poll() {
            TaskStatus::Success => return Ok(()),
            TaskStatus::Cancelled => return Err(AxleError::Cancelled),
            TaskStatus::Error(e) => return Err(e.into()),
            TaskStatus::Running => {}
        }
        if let Some(limit) = timeout
            && Duration::from_millis(clock.ms_since(epoch)) >= limit
        {
            task.cancel();
            while !task.poll().is_terminal() {
                clock.sleep(poll_interval);
            }
            tracing::warn!(?limit, "task timed out and was drained");
            return Err(AxleError::Timeout);
        }
        clock.sleep(poll_interval);
    }
}
