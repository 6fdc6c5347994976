//! Task lifecycle, cancellation and blocking-wait semantics.

use std::time::Duration;

use rstest::rstest;

use axle_core::error::AxleError;
use axle_core::mocks::ScriptedOperation;
use axle_core::task::{Task, TaskSlot, TaskStatus, wait};
use axle_traits::{ManualClock, OperationError};

#[test]
fn polls_report_running_until_the_operation_ends() {
    let mut task = Task::start(ScriptedOperation::succeeding_after(3));
    assert_eq!(task.poll(), TaskStatus::Running);
    assert_eq!(task.poll(), TaskStatus::Running);
    assert_eq!(task.poll(), TaskStatus::Running);
    assert_eq!(task.poll(), TaskStatus::Success);
}

#[test]
fn terminal_status_is_cached_and_the_operation_left_alone() {
    let mut task = Task::start(ScriptedOperation::succeeding_after(1));
    assert_eq!(task.poll(), TaskStatus::Running);
    assert_eq!(task.poll(), TaskStatus::Success);
    // Further polls return the cached status without touching the
    // underlying operation again.
    assert_eq!(task.poll(), TaskStatus::Success);
    assert_eq!(task.poll(), TaskStatus::Success);
}

#[rstest]
#[case(OperationError::NoDevice)]
#[case(OperationError::Timeout)]
#[case(OperationError::Protocol)]
fn driver_failures_surface_as_errors(#[case] error: OperationError) {
    let mut task = Task::start(ScriptedOperation::failing_after(2, error));
    assert_eq!(task.poll(), TaskStatus::Running);
    assert_eq!(task.poll(), TaskStatus::Running);
    assert_eq!(task.poll(), TaskStatus::Error(error));
}

#[test]
fn cancel_drains_the_teardown_before_reporting_cancelled() {
    let mut task = Task::start(ScriptedOperation::succeeding_after(100).with_teardown(2));
    assert_eq!(task.poll(), TaskStatus::Running);
    task.cancel();
    assert!(task.is_cancelling());
    // The driver still needs two polls to unwind.
    assert_eq!(task.poll(), TaskStatus::Running);
    assert_eq!(task.poll(), TaskStatus::Running);
    assert_eq!(task.poll(), TaskStatus::Cancelled);
    assert!(!task.is_cancelling());
}

#[test]
fn cancel_is_idempotent() {
    let mut task = Task::start(ScriptedOperation::succeeding_after(100).with_teardown(1));
    task.cancel();
    task.cancel();
    task.cancel();
    assert_eq!(task.poll(), TaskStatus::Running);
    assert_eq!(task.poll(), TaskStatus::Cancelled);
    // Cancelling after completion stays a no-op.
    task.cancel();
    assert_eq!(task.poll(), TaskStatus::Cancelled);
}

#[test]
fn cancel_before_first_poll_still_terminates() {
    let mut task = Task::start(ScriptedOperation::succeeding_after(100));
    task.cancel();
    assert_eq!(task.poll(), TaskStatus::Cancelled);
}

#[test]
fn slot_rejects_a_second_task_while_busy() {
    let mut slot = TaskSlot::new();
    slot.begin(ScriptedOperation::succeeding_after(2))
        .expect("empty slot accepts");
    assert!(matches!(
        slot.begin(ScriptedOperation::succeeding_after(1)),
        Err(AxleError::Busy)
    ));
    // Drive the first task to completion; the slot frees up.
    assert_eq!(slot.poll(), Some(TaskStatus::Running));
    assert_eq!(slot.poll(), Some(TaskStatus::Success));
    slot.begin(ScriptedOperation::succeeding_after(1))
        .expect("slot frees after terminal status");
}

#[test]
fn slot_cancel_reaches_the_outstanding_task() {
    let mut slot = TaskSlot::new();
    slot.begin(ScriptedOperation::succeeding_after(100))
        .expect("empty slot accepts");
    slot.cancel();
    assert_eq!(slot.poll(), Some(TaskStatus::Cancelled));
    // An empty slot has nothing to cancel or poll.
    let mut empty: TaskSlot<ScriptedOperation> = TaskSlot::new();
    empty.cancel();
    assert_eq!(empty.poll(), None);
}

#[test]
fn wait_returns_ok_on_success() {
    let clock = ManualClock::new();
    let mut task = Task::start(ScriptedOperation::succeeding_after(5));
    wait(&mut task, &clock, Duration::from_millis(10), None).expect("completes");
}

#[test]
fn wait_maps_driver_errors() {
    let clock = ManualClock::new();
    let mut task = Task::start(ScriptedOperation::failing_after(3, OperationError::Protocol));
    let err = wait(&mut task, &clock, Duration::from_millis(10), None)
        .expect_err("must fail");
    assert!(matches!(err, AxleError::Protocol));
}

#[test]
fn wait_timeout_cancels_and_drains_before_returning() {
    let clock = ManualClock::new();
    // Would take 1000 polls; the timeout fires long before that, and
    // the teardown still runs to completion.
    let mut task = Task::start(ScriptedOperation::succeeding_after(1_000).with_teardown(4));
    let err = wait(
        &mut task,
        &clock,
        Duration::from_millis(10),
        Some(Duration::from_millis(50)),
    )
    .expect_err("must time out");
    assert!(matches!(err, AxleError::Timeout));
    // Drained: the task holds a cached terminal status.
    assert_eq!(task.poll(), TaskStatus::Cancelled);
    assert!(!task.is_cancelling());
}

#[test]
fn wait_reports_cancellation_from_elsewhere() {
    let clock = ManualClock::new();
    let mut task = Task::start(ScriptedOperation::succeeding_after(100));
    task.cancel();
    let err = wait(&mut task, &clock, Duration::from_millis(10), None)
        .expect_err("cancelled");
    assert!(matches!(err, AxleError::Cancelled));
}
