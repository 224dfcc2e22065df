/// 运行器生命周期测试模块
/// 测试 RoundRunner 的配置校验、轮次驱动、截止时间检测和 panic 处理
use crate::{RoundRunner, RunnerError, TaskDescriptor};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

fn quick_task(id: usize) -> TaskDescriptor {
    TaskDescriptor::new(id, Duration::from_millis(1), Duration::from_secs(10))
}

/// 测试1: 没有任务、零轮次和重复 id 都会被拒绝
#[test]
fn test_builder_validation() {
    assert!(matches!(
        RoundRunner::builder().build(),
        Err(RunnerError::NoTasks)
    ));
    assert!(matches!(
        RoundRunner::builder().rounds(0).task(quick_task(0)).build(),
        Err(RunnerError::NoRounds)
    ));
    assert!(matches!(
        RoundRunner::builder()
            .task(quick_task(3))
            .task(quick_task(3))
            .build(),
        Err(RunnerError::DuplicateTask(3))
    ));
}

/// 测试2: 默认轮数为 5
#[test]
fn test_builder_defaults() {
    let runner = RoundRunner::builder().task(quick_task(0)).build().unwrap();
    assert_eq!(runner.rounds(), 5);
    assert_eq!(runner.tasks().len(), 1);
}

/// 测试3: 默认场景的任务配置
#[test]
fn test_default_scenario() {
    let runner = RoundRunner::default_scenario();

    assert_eq!(runner.rounds(), 5);
    let costs: Vec<_> = runner
        .tasks()
        .iter()
        .map(|t| t.execution_cost().as_millis())
        .collect();
    assert_eq!(costs, vec![200, 350, 500, 650]);
    assert!(
        runner
            .tasks()
            .iter()
            .all(|t| t.deadline() == Duration::from_secs(1))
    );
}

/// 测试4: 模拟运行完成所有轮次，每轮释放一次
#[test]
fn test_simulated_run_completes_all_rounds() {
    let runner = RoundRunner::builder()
        .rounds(4)
        .tasks((0..3).map(quick_task))
        .name("quick")
        .build()
        .unwrap();

    let report = runner.run_simulated().unwrap();

    assert_eq!(report.rounds(), 4);
    assert_eq!(report.releases(), 4);
    assert!(report.deadline_misses().is_empty());
    for id in 0..3 {
        assert_eq!(report.completed_rounds(id), Some(4));
    }
    assert_eq!(report.completed_rounds(99), None);
}

/// 测试5: 工作体收到从 1 开始的轮次编号
#[test]
fn test_work_sees_every_round_in_order() {
    let runner = RoundRunner::builder()
        .rounds(3)
        .tasks((0..2).map(quick_task))
        .build()
        .unwrap();
    let calls = Mutex::new(Vec::new());

    runner
        .run(|task, round| calls.lock().unwrap().push((task.id(), round)))
        .unwrap();

    let calls = calls.into_inner().unwrap();
    for id in 0..2 {
        let rounds: Vec<_> = calls
            .iter()
            .filter(|(task, _)| *task == id)
            .map(|(_, round)| *round)
            .collect();
        assert_eq!(rounds, vec![1, 2, 3]);
    }
}

/// 测试6: 没有任务能在其他任务完成上一轮之前开始下一轮
#[test]
fn test_rounds_are_separated_by_the_barrier() {
    let runner = RoundRunner::builder()
        .rounds(5)
        .tasks((0..4).map(quick_task))
        .build()
        .unwrap();
    let finished = AtomicUsize::new(0);

    runner
        .run(|task, round| {
            assert!(finished.load(Ordering::SeqCst) >= (round - 1) * 4);
            thread::sleep(Duration::from_micros(100 * (task.id() as u64 + 1)));
            finished.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    assert_eq!(finished.load(Ordering::SeqCst), 20);
}

/// 测试7: 截止时间错过被记录但不中断运行
#[test]
fn test_deadline_misses_are_reported_not_fatal() {
    let runner = RoundRunner::builder()
        .rounds(3)
        .task(TaskDescriptor::new(
            0,
            Duration::from_millis(20),
            Duration::from_millis(1),
        ))
        .task(quick_task(1))
        .build()
        .unwrap();

    let report = runner.run_simulated().unwrap();

    assert_eq!(report.releases(), 3);
    let misses = report.deadline_misses();
    assert_eq!(misses.len(), 3);
    for (i, miss) in misses.iter().enumerate() {
        assert_eq!(miss.task_id, 0);
        assert_eq!(miss.round, i + 1);
        assert_eq!(miss.deadline, Duration::from_millis(1));
        assert!(miss.elapsed > miss.deadline);
    }
    assert_eq!(report.completed_rounds(1), Some(3));
}

/// 测试8: 工作体 panic 时其他任务不会永久阻塞
#[test]
fn test_worker_panic_does_not_stall_the_run() {
    let runner = RoundRunner::builder()
        .rounds(4)
        .tasks((0..3).map(quick_task))
        .build()
        .unwrap();

    let result = runner.run(|task, round| {
        if task.id() == 2 && round == 2 {
            panic!("task 2 failed");
        }
    });

    assert!(matches!(
        result,
        Err(RunnerError::WorkerPanicked { task_id: 2 })
    ));
}
