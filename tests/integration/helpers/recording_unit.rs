// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use gitlab_migrate::domain::models::{
    EntityKind, MigrationOutcome, MigrationResult, MigrationTask,
};
use gitlab_migrate::workers::MigrationUnit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 执行事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(EntityKind, String),
    End(EntityKind, String),
}

/// 记录并发度和执行顺序的迁移单元
///
/// 任务源路径形如 `name-<millis>` 时会睡眠对应的毫秒数；
/// 源路径为 `panic` 时直接 panic。
pub struct RecordingUnit {
    kind: EntityKind,
    running: AtomicUsize,
    peak: AtomicUsize,
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingUnit {
    pub fn new(kind: EntityKind, events: Arc<Mutex<Vec<Event>>>) -> Self {
        Self {
            kind,
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            events,
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MigrationUnit for RecordingUnit {
    async fn migrate(&self, task: &MigrationTask) -> MigrationOutcome {
        let name = task.src.to_string();
        if name == "panic" {
            panic!("unit exploded");
        }

        self.events
            .lock()
            .unwrap()
            .push(Event::Start(self.kind, name.clone()));
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);

        let millis = name
            .rsplit('-')
            .next()
            .and_then(|m| m.parse::<u64>().ok())
            .unwrap_or(1);
        tokio::time::sleep(Duration::from_millis(millis)).await;

        self.running.fetch_sub(1, Ordering::SeqCst);
        self.events
            .lock()
            .unwrap()
            .push(Event::End(self.kind, name));

        MigrationOutcome::new(
            task.clone(),
            self.kind,
            MigrationResult::Success,
            Duration::from_millis(millis),
        )
    }

    fn kind(&self) -> EntityKind {
        self.kind
    }
}
