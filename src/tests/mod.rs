use crate::CyclicBarrier;
use std::thread;
use std::time::{Duration, Instant};

mod lifecycle_tests;

/// Block until `expected` callers have arrived in the current generation.
/// 阻塞直到当前代中已有 `expected` 个调用者到达。
pub(crate) fn wait_for_arrivals(barrier: &CyclicBarrier, expected: usize) {
    let give_up = Instant::now() + Duration::from_secs(5);
    while barrier.arrived() < expected {
        assert!(
            Instant::now() < give_up,
            "only {} of {} arrivals after 5s",
            barrier.arrived(),
            expected
        );
        thread::sleep(Duration::from_millis(1));
    }
}
