// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::{
    ArchiveFile, EntityKind, ImportStatus, MigrationOutcome, MigrationResult, MigrationTask,
    SkipReason,
};
use crate::domain::repositories::host_client::HostClient;
use crate::infrastructure::metrics;
use crate::utils::errors::MigrationError;
use crate::utils::retry_policy::{PollOutcome, PollPolicy, PollStep};
use crate::workers::worker::{ArchiveOptions, MigrationUnit};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// 项目迁移的轮询策略
#[derive(Debug, Clone)]
pub struct ProjectPolicies {
    /// 导出状态轮询
    pub export: PollPolicy,
    /// 导入状态轮询
    pub import: PollPolicy,
    /// 导入完成后的存在性确认
    pub verify: PollPolicy,
}

impl Default for ProjectPolicies {
    fn default() -> Self {
        Self {
            export: PollPolicy::fixed(100, Duration::from_secs(1)),
            import: PollPolicy::fixed(360, Duration::from_secs(10)),
            verify: PollPolicy::fixed(100, Duration::from_secs(10)),
        }
    }
}

/// 项目迁移单元
///
/// 流程：归档源项目 → 检查目标 → 检查源 → 导出 → 读取元数据 → 导入并等待 → 确认
pub struct ProjectMigration {
    source: Arc<dyn HostClient>,
    destination: Arc<dyn HostClient>,
    archive: ArchiveOptions,
    policies: ProjectPolicies,
}

impl ProjectMigration {
    pub fn new(
        source: Arc<dyn HostClient>,
        destination: Arc<dyn HostClient>,
        archive: ArchiveOptions,
    ) -> Self {
        Self {
            source,
            destination,
            archive,
            policies: ProjectPolicies::default(),
        }
    }

    pub fn with_policies(mut self, policies: ProjectPolicies) -> Self {
        self.policies = policies;
        self
    }

    async fn run(&self, task: &MigrationTask) -> Result<MigrationResult, MigrationError> {
        // Archiving the source is best-effort
        if let Err(e) = self.source.archive_project(&task.src).await {
            warn!(project = %task.src, error = %e, "Failed to archive source project");
        }

        if self.destination.project_exists(&task.dest).await? {
            info!(src = %task.src, dest = %task.dest, "Destination project exists, skipping");
            return Ok(MigrationResult::Skipped(SkipReason::DestinationExists));
        }

        info!(src = %task.src, dest = %task.dest, "Start migrating project");
        if !self.source.project_exists(&task.src).await? {
            info!(src = %task.src, "Source project does not exist, skipping");
            return Ok(MigrationResult::Skipped(SkipReason::SourceMissing));
        }

        let target = self.archive.archive_for(EntityKind::Project, task);
        let Some(archive) = self
            .source
            .export_project(&task.src, &target, &self.policies.export)
            .await?
        else {
            return Err(MigrationError::Unavailable(target.file_name()));
        };

        let imported = self.import(task, &archive).await;
        self.archive.cleanup(&archive).await;
        imported?;

        self.verify(task).await
    }

    async fn import(&self, task: &MigrationTask, archive: &ArchiveFile) -> Result<(), MigrationError> {
        let project = self
            .source
            .get_project(&task.src)
            .await?
            .ok_or_else(|| MigrationError::NotFound(task.src.to_string()))?;

        let started = Instant::now();
        let status = self
            .destination
            .import_project(
                &task.dest,
                archive,
                &project.name,
                &project.path,
                &self.policies.import,
            )
            .await?;
        let elapsed = started.elapsed();

        match status {
            ImportStatus::Finished => {
                info!(dest = %task.dest, elapsed_secs = elapsed.as_secs(), "Imported project");
                Ok(())
            }
            ImportStatus::Failed => {
                error!(dest = %task.dest, elapsed_secs = elapsed.as_secs(), "Failed to import project");
                Err(MigrationError::ImportFailed { elapsed })
            }
            status => {
                warn!(dest = %task.dest, %status, "Project import still running");
                Err(MigrationError::Timeout {
                    stage: "project import",
                    attempts: self.policies.import.max_attempts.max(1),
                })
            }
        }
    }

    /// 导入完成后再次确认目标项目存在
    async fn verify(&self, task: &MigrationTask) -> Result<MigrationResult, MigrationError> {
        let destination = &self.destination;

        let outcome = self
            .policies
            .verify
            .poll(move |attempt| async move {
                match destination.project_exists(&task.dest).await {
                    Ok(true) => PollStep::Ready(()),
                    Ok(false) => {
                        debug!(project = %task.dest, attempt, "Waiting for project");
                        PollStep::Pending(())
                    }
                    Err(e) => {
                        warn!(project = %task.dest, attempt, error = %e, "Failed to check project");
                        PollStep::Pending(())
                    }
                }
            })
            .await;

        match outcome {
            PollOutcome::Ready { .. } => Ok(MigrationResult::Success),
            PollOutcome::Exhausted { attempts, .. } => Err(MigrationError::Timeout {
                stage: "project import verification",
                attempts,
            }),
        }
    }
}

#[async_trait]
impl MigrationUnit for ProjectMigration {
    async fn migrate(&self, task: &MigrationTask) -> MigrationOutcome {
        let started = Instant::now();
        let result = match self.run(task).await {
            Ok(result) => result,
            Err(e) => {
                error!(src = %task.src, dest = %task.dest, error = %e, "Project migration failed");
                MigrationResult::Failure(e)
            }
        };

        let outcome =
            MigrationOutcome::new(task.clone(), EntityKind::Project, result, started.elapsed());
        metrics::record_outcome(&outcome);
        outcome
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Project
    }
}
