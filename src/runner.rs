use crate::barrier::CyclicBarrier;
use crate::error::{BarrierError, RunnerError};
use std::collections::HashSet;
use std::thread;
use std::time::{Duration, Instant};

/// Rounds run when the builder is not told otherwise.
/// 构建器未指定时运行的轮数。
pub(crate) const DEFAULT_ROUNDS: usize = 5;

// Default scenario: four tasks with staggered costs and a one second soft deadline.
// 默认场景：四个任务，执行开销递增，软截止时间为一秒。
const SCENARIO_TASKS: usize = 4;
const SCENARIO_BASE_COST_MS: u64 = 200;
const SCENARIO_COST_STEP_MS: u64 = 150;
const SCENARIO_DEADLINE_MS: u64 = 1000;

/// One participant of a run: identity, simulated cost and soft deadline.
///
/// Owned by the runner and only read by the worker thread it is handed to.
///
/// 一次运行中的一个参与者：标识、模拟开销和软截止时间。
/// 由运行器拥有，只被分配到的工作线程读取。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescriptor {
    id: usize,
    execution_cost: Duration,
    deadline: Duration,
}

impl TaskDescriptor {
    pub fn new(id: usize, execution_cost: Duration, deadline: Duration) -> Self {
        Self {
            id,
            execution_cost,
            deadline,
        }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Time the simulated work of one round takes.
    #[inline]
    pub fn execution_cost(&self) -> Duration {
        self.execution_cost
    }

    /// Soft per-round deadline. Exceeding it is reported, never enforced.
    /// 每轮的软截止时间。超出只会被报告，不会被强制执行。
    #[inline]
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

/// A round whose work took longer than the task's soft deadline.
/// 工作耗时超过任务软截止时间的一轮。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineMiss {
    pub task_id: usize,
    /// 1-based round number.
    pub round: usize,
    pub elapsed: Duration,
    pub deadline: Duration,
}

/// Summary of a completed run.
/// 一次完成运行的汇总。
#[derive(Debug, Clone)]
pub struct RunReport {
    rounds: usize,
    releases: usize,
    deadline_misses: Vec<DeadlineMiss>,
    completed: Vec<(usize, usize)>,
}

impl RunReport {
    /// Rounds every task was asked to run.
    #[inline]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Generations the shared barrier released.
    /// 共享屏障释放的代数。
    #[inline]
    pub fn releases(&self) -> usize {
        self.releases
    }

    /// Deadline misses ordered by round, then task id.
    /// 截止时间错过记录，按轮次排序，其次按任务 id。
    #[inline]
    pub fn deadline_misses(&self) -> &[DeadlineMiss] {
        &self.deadline_misses
    }

    /// Rounds the given task got through, or `None` for an unknown id.
    pub fn completed_rounds(&self, task_id: usize) -> Option<usize> {
        self.completed
            .iter()
            .find(|(id, _)| *id == task_id)
            .map(|(_, rounds)| *rounds)
    }
}

/// Builder for configuring a `RoundRunner`.
///
/// # Example
/// ```
/// use cyclic_barrier::{RoundRunner, TaskDescriptor};
/// use std::time::Duration;
///
/// let runner = RoundRunner::builder()
///     .rounds(3)
///     .tasks((0..2).map(|id| {
///         TaskDescriptor::new(id, Duration::from_millis(1), Duration::from_secs(1))
///     }))
///     .build()
///     .unwrap();
/// let report = runner.run_simulated().unwrap();
/// assert_eq!(report.releases(), 3);
/// ```
///
/// 用于配置 `RoundRunner` 的构建器。
pub struct RoundRunnerBuilder {
    rounds: usize,
    tasks: Vec<TaskDescriptor>,
    name: Option<String>,
}

impl RoundRunnerBuilder {
    #[inline]
    pub fn new() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            tasks: Vec::new(),
            name: None,
        }
    }

    /// Set how many rounds every task runs.
    ///
    /// Default: `5`
    ///
    /// 设置每个任务运行的轮数。
    #[inline]
    pub fn rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Add one participant.
    #[inline]
    pub fn task(mut self, task: TaskDescriptor) -> Self {
        self.tasks.push(task);
        self
    }

    /// Add several participants.
    #[inline]
    pub fn tasks(mut self, tasks: impl IntoIterator<Item = TaskDescriptor>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Name given to the shared barrier, shown in its log records.
    #[inline]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Validate the configuration and build the runner.
    ///
    /// 校验配置并构建运行器。
    pub fn build(self) -> Result<RoundRunner, RunnerError> {
        if self.tasks.is_empty() {
            return Err(RunnerError::NoTasks);
        }
        if self.rounds == 0 {
            return Err(RunnerError::NoRounds);
        }

        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if !seen.insert(task.id) {
                return Err(RunnerError::DuplicateTask(task.id));
            }
        }

        Ok(RoundRunner {
            rounds: self.rounds,
            tasks: self.tasks,
            name: self.name,
        })
    }
}

impl Default for RoundRunnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a fixed set of tasks through a fixed number of rounds, meeting at a
/// shared [`CyclicBarrier`] at the end of every round.
///
/// Each task gets its own thread for the whole run. Per round a task runs its
/// work, compares the elapsed time against its soft deadline, and arrives at
/// the barrier. If a task's work panics, the task abandons the barrier so the
/// others stop with [`BarrierError::Broken`] instead of waiting forever.
///
/// 驱动固定的一组任务运行固定轮数，每轮结束时在共享的 [`CyclicBarrier`] 处会合。
/// 每个任务在整个运行期间拥有自己的线程。每轮中任务执行工作，将耗时与软截止时间比较，
/// 然后到达屏障。如果某个任务的工作 panic，该任务会放弃屏障，
/// 使其他任务以 `Broken` 结束而不是永远等待。
#[derive(Debug)]
pub struct RoundRunner {
    rounds: usize,
    tasks: Vec<TaskDescriptor>,
    name: Option<String>,
}

impl RoundRunner {
    #[inline]
    pub fn builder() -> RoundRunnerBuilder {
        RoundRunnerBuilder::new()
    }

    /// Four tasks costing 200, 350, 500 and 650 ms per round, a 1 s soft
    /// deadline each, five rounds.
    ///
    /// 四个任务，每轮开销分别为 200、350、500 和 650 毫秒，软截止时间各为 1 秒，共五轮。
    pub fn default_scenario() -> Self {
        let tasks = (0..SCENARIO_TASKS)
            .map(|id| {
                let cost = SCENARIO_BASE_COST_MS + id as u64 * SCENARIO_COST_STEP_MS;
                TaskDescriptor::new(
                    id,
                    Duration::from_millis(cost),
                    Duration::from_millis(SCENARIO_DEADLINE_MS),
                )
            })
            .collect();

        RoundRunner {
            rounds: DEFAULT_ROUNDS,
            tasks,
            name: Some("islands".to_owned()),
        }
    }

    #[inline]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    #[inline]
    pub fn tasks(&self) -> &[TaskDescriptor] {
        &self.tasks
    }

    /// Run every task with `work` as the per-round body.
    ///
    /// `work` receives the task and the 1-based round number. It should be
    /// bounded; the barrier waits for the slowest task every round.
    ///
    /// 以 `work` 作为每轮的工作体运行所有任务。
    /// `work` 接收任务和从 1 开始的轮次编号。
    pub fn run<F>(&self, work: F) -> Result<RunReport, RunnerError>
    where
        F: Fn(&TaskDescriptor, usize) + Sync,
    {
        let mut builder = CyclicBarrier::builder(self.tasks.len());
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        let barrier = builder.build()?;

        log::info!(
            "starting {} tasks for {} rounds",
            self.tasks.len(),
            self.rounds
        );

        let joined: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = self
                .tasks
                .iter()
                .map(|task| {
                    let barrier = &barrier;
                    let work = &work;
                    let rounds = self.rounds;
                    (task.id, s.spawn(move || run_task(task, rounds, barrier, work)))
                })
                .collect();

            handles
                .into_iter()
                .map(|(task_id, handle)| (task_id, handle.join()))
                .collect()
        });

        let mut outcomes = Vec::with_capacity(joined.len());
        let mut barrier_error = None;
        for (task_id, result) in joined {
            match result {
                Err(_) => return Err(RunnerError::WorkerPanicked { task_id }),
                Ok(Err(err)) => {
                    barrier_error.get_or_insert(err);
                }
                Ok(Ok(outcome)) => outcomes.push((task_id, outcome)),
            }
        }
        if let Some(err) = barrier_error {
            return Err(err.into());
        }

        let mut deadline_misses: Vec<DeadlineMiss> = outcomes
            .iter()
            .flat_map(|(_, outcome)| outcome.misses.iter().copied())
            .collect();
        deadline_misses.sort_by_key(|miss| (miss.round, miss.task_id));

        let report = RunReport {
            rounds: self.rounds,
            releases: barrier.generation(),
            deadline_misses,
            completed: outcomes
                .iter()
                .map(|(task_id, outcome)| (*task_id, outcome.completed))
                .collect(),
        };

        log::info!(
            "run finished: {} releases, {} deadline misses",
            report.releases,
            report.deadline_misses.len()
        );
        Ok(report)
    }

    /// Run every task with a sleep of its execution cost as the round body.
    /// 以睡眠任务执行开销的时长作为每轮工作体运行所有任务。
    pub fn run_simulated(&self) -> Result<RunReport, RunnerError> {
        self.run(|task, _round| thread::sleep(task.execution_cost))
    }
}

/// Per-thread result of a task's run.
struct TaskOutcome {
    completed: usize,
    misses: Vec<DeadlineMiss>,
}

/// Abandons the barrier if the owning thread unwinds.
struct AbandonOnPanic<'a>(&'a CyclicBarrier);

impl Drop for AbandonOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abandon();
        }
    }
}

fn run_task<F>(
    task: &TaskDescriptor,
    rounds: usize,
    barrier: &CyclicBarrier,
    work: &F,
) -> Result<TaskOutcome, BarrierError>
where
    F: Fn(&TaskDescriptor, usize),
{
    let _abandon = AbandonOnPanic(barrier);
    let mut outcome = TaskOutcome {
        completed: 0,
        misses: Vec::new(),
    };

    for round in 1..=rounds {
        log::debug!("task {}: starting round {}", task.id, round);

        let start = Instant::now();
        work(task, round);
        let elapsed = start.elapsed();

        if elapsed > task.deadline {
            log::warn!(
                "task {}: deadline missed in round {} ({:?} > {:?})",
                task.id,
                round,
                elapsed,
                task.deadline
            );
            outcome.misses.push(DeadlineMiss {
                task_id: task.id,
                round,
                elapsed,
                deadline: task.deadline,
            });
        }

        log::debug!(
            "task {}: finished round {} in {:?}, waiting at barrier",
            task.id,
            round,
            elapsed
        );
        barrier.wait()?;
        outcome.completed += 1;
        log::trace!("task {}: passed barrier after round {}", task.id, round);
    }

    Ok(outcome)
}
