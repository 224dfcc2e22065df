/// Generation number of a freshly built barrier.
/// 新建屏障的初始代数。
pub(crate) const INITIAL_GENERATION: usize = 0;

/// Counters guarded by the barrier's mutex.
///
/// Every read and write happens with the lock held, so the pair
/// `(arrived, generation)` is never observed half-updated.
///
/// 由屏障互斥锁保护的计数器。
/// 所有读写都在持锁期间进行，因此 `(arrived, generation)` 永远不会被观察到处于半更新状态。
#[derive(Debug)]
pub(crate) struct BarrierState {
    /// Arrivals in the current generation. Always `<= participants`.
    /// 当前代已到达的参与者数量。始终 `<= participants`。
    pub(crate) arrived: usize,
    /// Advances by exactly one per release.
    /// 每次释放恰好加一。
    pub(crate) generation: usize,
    /// Set once by a timed-out wait or an abandonment, never cleared.
    /// 由超时等待或放弃设置一次，永不清除。
    pub(crate) broken: bool,
}

impl BarrierState {
    pub(crate) fn new() -> Self {
        Self {
            arrived: 0,
            generation: INITIAL_GENERATION,
            broken: false,
        }
    }

    /// Close the current generation: reset arrivals and advance.
    ///
    /// Must be called in the same critical section as the wake-up broadcast.
    ///
    /// 关闭当前代：重置到达计数并推进代数。
    /// 必须与唤醒广播处于同一临界区。
    #[inline]
    pub(crate) fn release(&mut self) {
        self.arrived = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn break_barrier(&mut self) {
        self.broken = true;
        self.arrived = 0;
    }
}
