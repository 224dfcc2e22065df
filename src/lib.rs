//! A generation-counted cyclic barrier.
//!
//! [`CyclicBarrier`] holds a fixed number of participants at a rendezvous
//! point until all of them have arrived, releases them together, and resets
//! for the next round. Each waiter snapshots the barrier's generation on
//! arrival and only leaves once the generation has moved on, which makes the
//! barrier immune to spurious wake-ups and to stale broadcasts from earlier
//! rounds.
//!
//! [`RoundRunner`] is a small thread-per-task harness built on top of the
//! barrier: every task runs a bounded piece of work per round, is checked
//! against a soft deadline, and meets the others at the barrier.
//!
//! ```
//! use cyclic_barrier::CyclicBarrier;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let barrier = Arc::new(CyclicBarrier::new(4));
//! let handles: Vec<_> = (0..4)
//!     .map(|_| {
//!         let barrier = Arc::clone(&barrier);
//!         thread::spawn(move || barrier.arrive_and_wait().is_leader())
//!     })
//!     .collect();
//!
//! let leaders = handles
//!     .into_iter()
//!     .map(|h| h.join().unwrap())
//!     .filter(|&leader| leader)
//!     .count();
//! assert_eq!(leaders, 1);
//! assert_eq!(barrier.generation(), 1);
//! assert_eq!(barrier.arrived(), 0);
//! ```
//!
//! 基于代计数的循环屏障。
//! [`CyclicBarrier`] 将固定数量的参与者阻塞在会合点，直到全部到达，然后一起释放，
//! 并为下一轮重置。每个等待者在到达时记录屏障的代数，只有代数推进后才离开，
//! 这使屏障不受虚假唤醒和早期轮次残留广播的影响。

mod barrier;
mod error;
mod runner;
mod state;
mod sync;

pub use barrier::{BarrierWaitResult, CyclicBarrier, CyclicBarrierBuilder};
pub use error::{BarrierError, RunnerError};
pub use runner::{DeadlineMiss, RoundRunner, RoundRunnerBuilder, RunReport, TaskDescriptor};

#[cfg(all(test, not(feature = "loom")))]
mod tests;
