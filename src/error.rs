use std::time::Duration;

use thiserror::Error;

/// Errors reported by [`CyclicBarrier`](crate::CyclicBarrier).
///
/// 由 [`CyclicBarrier`](crate::CyclicBarrier) 报告的错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BarrierError {
    /// A barrier needs at least one participant.
    #[error("a barrier needs at least one participant")]
    NoParticipants,

    /// The generation this caller joined can no longer be released, because a
    /// waiter timed out or a participant abandoned the barrier.
    #[error("barrier is broken")]
    Broken,

    /// This caller's timed wait elapsed before its generation was released.
    /// The barrier is broken as a consequence.
    #[error("barrier wait timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors reported by [`RoundRunner`](crate::RoundRunner).
///
/// 由 [`RoundRunner`](crate::RoundRunner) 报告的错误。
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("round runner has no tasks")]
    NoTasks,

    #[error("round runner needs at least one round")]
    NoRounds,

    #[error("task id {0} is used more than once")]
    DuplicateTask(usize),

    #[error("task {task_id} panicked during its work")]
    WorkerPanicked { task_id: usize },

    #[error(transparent)]
    Barrier(#[from] BarrierError),
}
