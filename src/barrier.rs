use crate::error::BarrierError;
use crate::state::BarrierState;
use crate::sync::{Condvar, Mutex};
use std::fmt;
use std::time::{Duration, Instant};

/// Label used in log records when a barrier has no name.
const UNNAMED: &str = "barrier";

/// Builder for configuring a `CyclicBarrier`.
///
/// # Example
/// ```
/// use cyclic_barrier::CyclicBarrier;
///
/// let barrier = CyclicBarrier::builder(4)
///     .name("islands")
///     .build()
///     .unwrap();
/// assert_eq!(barrier.participants(), 4);
/// assert_eq!(barrier.name(), Some("islands"));
/// ```
///
/// 用于配置 `CyclicBarrier` 的构建器。
pub struct CyclicBarrierBuilder {
    participants: usize,
    name: Option<String>,
}

impl CyclicBarrierBuilder {
    /// Create a builder for a barrier of `participants` parties.
    /// 为 `participants` 个参与者的屏障创建构建器。
    #[inline]
    pub fn new(participants: usize) -> Self {
        Self {
            participants,
            name: None,
        }
    }

    /// Attach a label that prefixes every log record of this barrier.
    ///
    /// Default: none (records use `"barrier"`).
    ///
    /// 附加一个标签，作为该屏障所有日志记录的前缀。
    #[inline]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Build the barrier.
    ///
    /// Fails with [`BarrierError::NoParticipants`] when the participant count is zero.
    ///
    /// 构建屏障。参与者数量为零时返回 [`BarrierError::NoParticipants`]。
    pub fn build(self) -> Result<CyclicBarrier, BarrierError> {
        if self.participants == 0 {
            return Err(BarrierError::NoParticipants);
        }

        Ok(CyclicBarrier {
            state: Mutex::new(BarrierState::new()),
            cvar: Condvar::new(),
            participants: self.participants,
            name: self.name,
        })
    }
}

/// Outcome of a successful barrier wait.
///
/// Exactly one caller per released generation is the leader: the one whose
/// arrival completed the count.
///
/// 一次成功屏障等待的结果。
/// 每个被释放的代中恰好有一个调用者是领导者：即使计数达到总数的那个到达者。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    is_leader: bool,
    generation: usize,
}

impl BarrierWaitResult {
    /// Whether this caller triggered the release.
    /// 该调用者是否触发了释放。
    #[inline]
    pub fn is_leader(&self) -> bool {
        self.is_leader
    }

    /// The generation this caller arrived in. The barrier's generation after
    /// the release is one past this value.
    ///
    /// 该调用者到达时所在的代。释放后屏障的代数为该值加一。
    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }
}

/// A reusable barrier for a fixed number of participants.
///
/// A `CyclicBarrier` blocks each caller of [`arrive_and_wait`](Self::arrive_and_wait)
/// until `participants` callers have arrived, then releases all of them at
/// once and resets itself for the next round (the next *generation*).
///
/// Waiters remember the generation they arrived in and keep waiting until the
/// shared generation moves past it. A wake-up that does not come with a
/// release (spurious, or a leftover broadcast from an earlier round) sends the
/// waiter straight back to sleep.
///
/// The barrier is shared by reference: wrap it in an `Arc` or borrow it from
/// inside `std::thread::scope`. There is no global instance.
///
/// **Liveness**: if fewer than `participants` callers ever arrive in a
/// generation, the ones that did arrive block forever. Use
/// [`wait_timeout`](Self::wait_timeout) or [`abandon`](Self::abandon) to turn
/// that stall into a [`BarrierError::Broken`] instead.
///
/// ```
/// use cyclic_barrier::CyclicBarrier;
/// use std::thread;
///
/// let barrier = CyclicBarrier::new(3);
/// thread::scope(|s| {
///     for _ in 0..3 {
///         s.spawn(|| {
///             for _round in 0..2 {
///                 barrier.arrive_and_wait();
///             }
///         });
///     }
/// });
/// assert_eq!(barrier.generation(), 2);
/// ```
///
/// 固定参与者数量的可重用屏障。
/// 每个调用 `arrive_and_wait` 的线程都会阻塞，直到 `participants` 个调用者到达，
/// 然后一次性全部释放，并为下一轮（下一代）重置自身。
/// 等待者记住自己到达时的代数，并持续等待直到共享代数超过它。
/// 没有伴随释放的唤醒（虚假唤醒或上一轮残留的广播）会让等待者重新进入睡眠。
pub struct CyclicBarrier {
    state: Mutex<BarrierState>,
    cvar: Condvar,
    participants: usize,
    name: Option<String>,
}

impl CyclicBarrier {
    /// Create a barrier for `participants` parties.
    ///
    /// # Panics
    /// Panics if `participants` is zero. Use [`try_new`](Self::try_new) to get
    /// an error instead.
    ///
    /// 为 `participants` 个参与者创建屏障。参与者数量为零时 panic。
    #[inline]
    pub fn new(participants: usize) -> Self {
        match Self::try_new(participants) {
            Ok(barrier) => barrier,
            Err(err) => panic!("CyclicBarrier::new({participants}): {err}"),
        }
    }

    /// Fallible version of [`new`](Self::new).
    /// [`new`](Self::new) 的可失败版本。
    #[inline]
    pub fn try_new(participants: usize) -> Result<Self, BarrierError> {
        Self::builder(participants).build()
    }

    /// Create a builder for a barrier of `participants` parties.
    /// 为 `participants` 个参与者的屏障创建构建器。
    #[inline]
    pub fn builder(participants: usize) -> CyclicBarrierBuilder {
        CyclicBarrierBuilder::new(participants)
    }

    /// Number of arrivals needed to release a generation.
    #[inline]
    pub fn participants(&self) -> usize {
        self.participants
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Current generation: the number of releases so far.
    /// 当前代数：迄今为止的释放次数。
    pub fn generation(&self) -> usize {
        self.state.lock().generation
    }

    /// Arrivals recorded in the current generation.
    /// 当前代中已记录的到达数量。
    pub fn arrived(&self) -> usize {
        self.state.lock().arrived
    }

    /// Whether a timed-out wait or an abandonment has broken the barrier.
    pub fn is_broken(&self) -> bool {
        self.state.lock().broken
    }

    /// Arrive at the barrier and block until every participant of this
    /// generation has arrived.
    ///
    /// This is an unconditional wait: there is no timeout, and a missing
    /// participant stalls the caller forever.
    ///
    /// # Panics
    /// Panics if the barrier is, or becomes, broken before this caller's
    /// generation is released. A barrier that is never timed out or abandoned
    /// never breaks. Use [`wait`](Self::wait) to get the error instead.
    ///
    /// 到达屏障并阻塞，直到本代所有参与者都已到达。
    /// 这是无条件等待：没有超时，缺少参与者会让调用者永远阻塞。
    pub fn arrive_and_wait(&self) -> BarrierWaitResult {
        match self.arrive(None) {
            Ok(result) => result,
            Err(err) => panic!("{}: {err}", self.label()),
        }
    }

    /// Like [`arrive_and_wait`](Self::arrive_and_wait), but reports a broken
    /// barrier as [`BarrierError::Broken`] instead of panicking.
    ///
    /// A caller arriving at an already broken barrier is not counted and
    /// fails immediately.
    ///
    /// 与 `arrive_and_wait` 相同，但以 [`BarrierError::Broken`] 报告损坏的屏障而不是 panic。
    pub fn wait(&self) -> Result<BarrierWaitResult, BarrierError> {
        self.arrive(None)
    }

    /// Arrive and wait at most `timeout` for this generation to be released.
    ///
    /// If the time elapses first, the caller breaks the barrier, wakes every
    /// other waiter (who then fail with [`BarrierError::Broken`]) and returns
    /// [`BarrierError::Timeout`]. A release that lands before the deadline is
    /// reported as success even if the wake-up is observed late.
    ///
    /// 到达并最多等待 `timeout` 让本代被释放。
    /// 如果先超时，调用者会破坏屏障，唤醒所有其他等待者（它们随后以 `Broken` 失败），
    /// 并返回 `Timeout`。
    pub fn wait_timeout(&self, timeout: Duration) -> Result<BarrierWaitResult, BarrierError> {
        let deadline = Instant::now().checked_add(timeout);
        self.arrive(Some((deadline, timeout)))
    }

    /// Declare that the calling participant will never arrive again.
    ///
    /// Breaks the barrier and wakes every waiter. Calling it on a broken
    /// barrier does nothing.
    ///
    /// 声明调用的参与者将不再到达。破坏屏障并唤醒所有等待者。对已损坏的屏障调用无效果。
    pub fn abandon(&self) {
        let mut state = self.state.lock();
        if state.broken {
            return;
        }
        let generation = state.generation;
        state.break_barrier();
        self.cvar.notify_all();
        drop(state);

        log::warn!(
            "{}: abandoned in generation {}, waiters released as broken",
            self.label(),
            generation
        );
    }

    /// Core arrival protocol shared by every wait flavour.
    ///
    /// `deadline` is `None` for an unconditional wait. A `Some((None, _))`
    /// deadline means the timeout overflowed `Instant` and is treated as
    /// unbounded.
    fn arrive(
        &self,
        deadline: Option<(Option<Instant>, Duration)>,
    ) -> Result<BarrierWaitResult, BarrierError> {
        let mut state = self.state.lock();

        if state.broken {
            return Err(BarrierError::Broken);
        }

        state.arrived += 1;
        let my_generation = state.generation;

        if state.arrived == self.participants {
            // Reset, advance and broadcast in one critical section.
            state.release();
            self.cvar.notify_all();
            drop(state);

            log::debug!(
                "{}: all {} participants arrived, releasing generation {}",
                self.label(),
                self.participants,
                my_generation
            );
            return Ok(BarrierWaitResult {
                is_leader: true,
                generation: my_generation,
            });
        }

        log::trace!(
            "{}: arrival {}/{} in generation {}",
            self.label(),
            state.arrived,
            self.participants,
            my_generation
        );

        // Released-before-broken wins, so the generation check comes first.
        while state.generation == my_generation {
            if state.broken {
                return Err(BarrierError::Broken);
            }

            state = match deadline {
                None | Some((None, _)) => self.cvar.wait(state),
                Some((Some(at), timeout)) => {
                    let now = Instant::now();
                    if now >= at {
                        state.break_barrier();
                        self.cvar.notify_all();
                        drop(state);

                        log::warn!(
                            "{}: wait timed out after {:?} in generation {}, barrier broken",
                            self.label(),
                            timeout,
                            my_generation
                        );
                        return Err(BarrierError::Timeout(timeout));
                    }
                    self.cvar.wait_timeout(state, at - now).0
                }
            };
        }

        Ok(BarrierWaitResult {
            is_leader: false,
            generation: my_generation,
        })
    }

    #[inline]
    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED)
    }

    /// Wake every waiter without touching the counters.
    #[cfg(test)]
    pub(crate) fn notify_spurious(&self) {
        let _state = self.state.lock();
        self.cvar.notify_all();
    }
}

impl fmt::Debug for CyclicBarrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CyclicBarrier")
            .field("name", &self.name)
            .field("participants", &self.participants)
            .finish_non_exhaustive()
    }
}
