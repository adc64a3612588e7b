// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::{MigrationOutcome, MigrationResult, MigrationTask};
use crate::utils::errors::MigrationError;
use crate::workers::worker::MigrationUnit;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error};

/// 迁移调度器
///
/// 固定数量的工作协程从同一个任务通道中拉取任务，
/// 结果按任务下标写回，因此返回顺序与提交顺序一致。
pub struct Scheduler {
    concurrency: usize,
}

impl Scheduler {
    /// 创建新的调度器实例
    ///
    /// # 参数
    ///
    /// * `concurrency` - 同时执行的迁移单元数量，0 视为 1
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// 执行一组迁移任务
    ///
    /// 每个任务恰好产生一个结果；单个任务的 panic 只会变成该任务的失败结果。
    pub async fn run(
        &self,
        unit: Arc<dyn MigrationUnit>,
        tasks: Vec<MigrationTask>,
    ) -> Vec<MigrationOutcome> {
        let total = tasks.len();
        if total == 0 {
            return Vec::new();
        }

        let (task_tx, task_rx) = mpsc::channel::<(usize, MigrationTask)>(total);
        for (index, task) in tasks.iter().cloned().enumerate() {
            // Capacity equals the task count, so this never waits
            if task_tx.send((index, task)).await.is_err() {
                break;
            }
        }
        drop(task_tx);

        let task_rx = Arc::new(Mutex::new(task_rx));
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<(usize, MigrationOutcome)>();

        let workers = self.concurrency.min(total);
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let unit = unit.clone();
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    let next = task_rx.lock().await.recv().await;
                    let Some((index, task)) = next else {
                        break;
                    };
                    debug!(worker_id, index, task = %task, "Worker picked task");

                    let outcome = run_isolated(unit.clone(), task).await;
                    if result_tx.send((index, outcome)).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(result_tx);

        let mut slots: Vec<Option<MigrationOutcome>> = (0..total).map(|_| None).collect();
        while let Some((index, outcome)) = result_rx.recv().await {
            slots[index] = Some(outcome);
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Scheduler worker exited abnormally: {}", e);
            }
        }

        let kind = unit.kind();
        slots
            .into_iter()
            .zip(tasks)
            .map(|(slot, task)| {
                slot.unwrap_or_else(|| {
                    MigrationOutcome::new(
                        task,
                        kind,
                        MigrationResult::Failure(MigrationError::Panicked(
                            "worker exited before reporting".to_string(),
                        )),
                        Duration::ZERO,
                    )
                })
            })
            .collect()
    }
}

/// 在独立的任务中执行迁移单元，把 panic 转换为失败结果
async fn run_isolated(unit: Arc<dyn MigrationUnit>, task: MigrationTask) -> MigrationOutcome {
    let kind = unit.kind();
    let started = Instant::now();
    let owned = task.clone();

    match tokio::spawn(async move { unit.migrate(&owned).await }).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(task = %task, error = %e, "Migration unit panicked");
            MigrationOutcome::new(
                task,
                kind,
                MigrationResult::Failure(MigrationError::Panicked(e.to_string())),
                started.elapsed(),
            )
        }
    }
}
