// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::{
    ArchiveFile, EntityKind, MigrationOutcome, MigrationResult, MigrationTask, SkipReason,
};
use crate::domain::repositories::host_client::{DownloadAttempt, ExportTrigger, HostClient};
use crate::infrastructure::metrics;
use crate::utils::errors::MigrationError;
use crate::utils::retry_policy::{PollOutcome, PollPolicy, PollStep};
use crate::workers::worker::{ArchiveOptions, MigrationUnit};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// 分组迁移单元
///
/// 流程：检查目标 → 触发导出 → 下载归档 → 提交导入 → 轮询确认
pub struct GroupMigration {
    source: Arc<dyn HostClient>,
    destination: Arc<dyn HostClient>,
    archive: ArchiveOptions,
    download_policy: PollPolicy,
    verify_policy: PollPolicy,
}

impl GroupMigration {
    /// 创建新的分组迁移单元，轮询策略默认为每秒一次、最多100次
    pub fn new(
        source: Arc<dyn HostClient>,
        destination: Arc<dyn HostClient>,
        archive: ArchiveOptions,
    ) -> Self {
        Self {
            source,
            destination,
            archive,
            download_policy: PollPolicy::default(),
            verify_policy: PollPolicy::default(),
        }
    }

    /// 设置下载和导入确认的轮询策略
    pub fn with_policies(mut self, download: PollPolicy, verify: PollPolicy) -> Self {
        self.download_policy = download;
        self.verify_policy = verify;
        self
    }

    async fn run(&self, task: &MigrationTask) -> Result<MigrationResult, MigrationError> {
        if self.destination.group_exists(&task.dest).await? {
            info!(src = %task.src, dest = %task.dest, "Destination group exists, skipping");
            return Ok(MigrationResult::Skipped(SkipReason::DestinationExists));
        }

        info!(src = %task.src, dest = %task.dest, "Start migrating group");
        match self.source.start_group_export(&task.src).await? {
            ExportTrigger::Accepted => {}
            ExportTrigger::NotFound => return Err(MigrationError::NotFound(task.src.to_string())),
            ExportTrigger::Rejected(status) => return Err(MigrationError::Rejected(status)),
        }

        let archive = self.download(task).await?;

        let imported = self.destination.import_group(&task.dest, &archive).await;
        self.archive.cleanup(&archive).await;
        imported?;

        self.verify(task).await
    }

    /// 反复下载导出归档，直到某次下载成功或尝试次数用完
    async fn download(&self, task: &MigrationTask) -> Result<ArchiveFile, MigrationError> {
        let archive = self.archive.archive_for(EntityKind::Group, task);
        let source = &self.source;
        let target = &archive;

        let outcome = self
            .download_policy
            .poll(move |attempt| async move {
                match source.download_group_export(&task.src, target).await {
                    Ok(DownloadAttempt::Ready(file)) => PollStep::Ready(file),
                    Ok(DownloadAttempt::NotReady(status)) => {
                        debug!(group = %task.src, attempt, %status, "Export archive not ready");
                        PollStep::Pending(())
                    }
                    Err(e) => {
                        warn!(group = %task.src, attempt, error = %e, "Export download failed");
                        PollStep::Pending(())
                    }
                }
            })
            .await;

        match outcome {
            PollOutcome::Ready { value, attempts } => {
                info!(group = %task.src, attempts, "Downloaded group export");
                Ok(value)
            }
            PollOutcome::Exhausted { attempts, .. } => Err(MigrationError::Unavailable(format!(
                "{} not downloaded after {} attempts",
                archive.file_name(),
                attempts
            ))),
        }
    }

    /// 轮询目标分组是否已经出现
    async fn verify(&self, task: &MigrationTask) -> Result<MigrationResult, MigrationError> {
        let destination = &self.destination;

        let outcome = self
            .verify_policy
            .poll(move |attempt| async move {
                match destination.group_exists(&task.dest).await {
                    Ok(true) => PollStep::Ready(()),
                    Ok(false) => {
                        debug!(group = %task.dest, attempt, "Waiting for group import");
                        PollStep::Pending(())
                    }
                    Err(e) => {
                        warn!(group = %task.dest, attempt, error = %e, "Failed to check group");
                        PollStep::Pending(())
                    }
                }
            })
            .await;

        match outcome {
            PollOutcome::Ready { attempts, .. } => {
                info!(dest = %task.dest, attempts, "Group import confirmed");
                Ok(MigrationResult::Success)
            }
            PollOutcome::Exhausted { attempts, .. } => Err(MigrationError::Timeout {
                stage: "group import verification",
                attempts,
            }),
        }
    }
}

#[async_trait]
impl MigrationUnit for GroupMigration {
    async fn migrate(&self, task: &MigrationTask) -> MigrationOutcome {
        let started = Instant::now();
        let result = match self.run(task).await {
            Ok(result) => result,
            Err(e) => {
                error!(src = %task.src, dest = %task.dest, error = %e, "Group migration failed");
                MigrationResult::Failure(e)
            }
        };

        let outcome = MigrationOutcome::new(task.clone(), EntityKind::Group, result, started.elapsed());
        metrics::record_outcome(&outcome);
        outcome
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Group
    }
}
