// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::models::{EntityKind, MigrationOutcome, MigrationTask};
use crate::domain::repositories::host_client::HostClient;
use crate::infrastructure::gitlab::GitlabClient;
use crate::queue::scheduler::Scheduler;
use crate::utils::errors::HostError;
use crate::workers::{ArchiveOptions, GroupMigration, MigrationUnit, ProjectMigration, ProjectPolicies};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 迁移报告
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// 分组迁移结果，按提交顺序排列
    pub groups: Vec<MigrationOutcome>,
    /// 项目迁移结果，按提交顺序排列
    pub projects: Vec<MigrationOutcome>,
}

impl MigrationReport {
    pub fn outcomes(&self) -> impl Iterator<Item = &MigrationOutcome> {
        self.groups.iter().chain(self.projects.iter())
    }

    pub fn failures(&self) -> usize {
        self.outcomes().filter(|o| o.is_failure()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failures() > 0
    }
}

/// 迁移用例
///
/// 先用分组调度器迁移全部分组，全部结束后再迁移项目
pub struct MigrateUseCase {
    group_unit: Arc<dyn MigrationUnit>,
    project_unit: Arc<dyn MigrationUnit>,
    group_scheduler: Scheduler,
    project_scheduler: Scheduler,
}

impl MigrateUseCase {
    pub fn new(
        group_unit: Arc<dyn MigrationUnit>,
        project_unit: Arc<dyn MigrationUnit>,
        group_concurrency: usize,
        project_concurrency: usize,
    ) -> Self {
        Self {
            group_unit,
            project_unit,
            group_scheduler: Scheduler::new(group_concurrency),
            project_scheduler: Scheduler::new(project_concurrency),
        }
    }

    /// 根据配置构造 GitLab 客户端和迁移单元
    pub fn from_settings(settings: &Settings) -> Result<Self, HostError> {
        let source: Arc<dyn HostClient> =
            Arc::new(GitlabClient::new(&settings.gitlab.src, &settings.http)?);
        let destination: Arc<dyn HostClient> =
            Arc::new(GitlabClient::new(&settings.gitlab.dest, &settings.http)?);

        let archive = ArchiveOptions {
            work_dir: settings.archive.work_dir.clone(),
            keep_archives: settings.archive.keep_archives,
        };
        let polling = &settings.polling;

        let group_unit = GroupMigration::new(source.clone(), destination.clone(), archive.clone())
            .with_policies(
                polling.policy(&polling.group_download),
                polling.policy(&polling.group_verify),
            );
        let project_unit = ProjectMigration::new(source, destination, archive).with_policies(
            ProjectPolicies {
                export: polling.policy(&polling.project_export),
                import: polling.policy(&polling.project_import),
                verify: polling.policy(&polling.project_verify),
            },
        );

        Ok(Self::new(
            Arc::new(group_unit),
            Arc::new(project_unit),
            settings.concurrency.groups,
            settings.concurrency.projects,
        ))
    }

    /// 执行迁移
    ///
    /// 无论单个任务结果如何，两个阶段都会执行完
    pub async fn execute(
        &self,
        groups: Vec<MigrationTask>,
        projects: Vec<MigrationTask>,
    ) -> MigrationReport {
        let groups = self
            .run_phase(EntityKind::Group, &self.group_scheduler, &self.group_unit, groups)
            .await;
        let projects = self
            .run_phase(
                EntityKind::Project,
                &self.project_scheduler,
                &self.project_unit,
                projects,
            )
            .await;

        let report = MigrationReport { groups, projects };
        info!(
            total = report.outcomes().count(),
            failed = report.failures(),
            "Migration finished"
        );
        report
    }

    async fn run_phase(
        &self,
        kind: EntityKind,
        scheduler: &Scheduler,
        unit: &Arc<dyn MigrationUnit>,
        tasks: Vec<MigrationTask>,
    ) -> Vec<MigrationOutcome> {
        info!("{0} Start migrate {1}s {0}", "*".repeat(10), kind);
        warn_duplicate_sources(kind, &tasks);

        let outcomes = scheduler.run(unit.clone(), tasks).await;
        for outcome in &outcomes {
            if outcome.is_failure() {
                error!("{}", outcome);
            } else {
                info!("{}", outcome);
            }
        }

        let skipped = outcomes.iter().filter(|o| o.is_skipped()).count();
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        info!(%kind, succeeded, skipped, failed, "Phase summary");
        info!("{0} End migrate {1}s {0}", "*".repeat(10), kind);

        outcomes
    }
}

/// 同一阶段内相同源路径的任务会写同一个归档文件
fn warn_duplicate_sources(kind: EntityKind, tasks: &[MigrationTask]) {
    let mut seen = HashSet::new();
    for task in tasks {
        if !seen.insert(&task.src) {
            warn!(%kind, src = %task.src, "Duplicate source path in one phase, archives will collide");
        }
    }
}
