// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::{ArchiveFile, EntityPath, ExportStatus, ImportStatus, Project};
use crate::utils::errors::HostError;
use crate::utils::retry_policy::{PollOutcome, PollPolicy, PollStep};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

/// 触发分组导出的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTrigger {
    /// 服务端已接受导出请求（202）
    Accepted,
    /// 分组不存在
    NotFound,
    /// 服务端拒绝导出
    Rejected(StatusCode),
}

/// 一次导出下载尝试的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadAttempt {
    /// 归档已完整写入本地文件
    Ready(ArchiveFile),
    /// 归档尚未就绪，之前下载的内容保持不变
    NotReady(StatusCode),
}

/// 托管实例客户端特质
///
/// 封装对单个实例（源或目标）的带认证访问。
/// 轮询类操作（`export_project`、`import_project`）基于基础操作提供默认实现。
#[async_trait]
pub trait HostClient: Send + Sync {
    /// 根据路径查找分组ID，不存在时返回 `None`
    async fn resolve_group_id(&self, path: &EntityPath) -> Result<Option<u64>, HostError>;

    /// 分组查询返回 200 时为 true
    async fn group_exists(&self, path: &EntityPath) -> Result<bool, HostError>;

    /// 触发分组导出，不在这一层重试
    async fn start_group_export(&self, path: &EntityPath) -> Result<ExportTrigger, HostError>;

    /// 尝试下载一次分组导出归档
    async fn download_group_export(
        &self,
        path: &EntityPath,
        archive: &ArchiveFile,
    ) -> Result<DownloadAttempt, HostError>;

    /// 提交分组导入，完成情况由调用方通过 `group_exists` 轮询确认
    async fn import_group(
        &self,
        destination: &EntityPath,
        archive: &ArchiveFile,
    ) -> Result<(), HostError>;

    /// 获取项目元数据，不存在时返回 `None`
    async fn get_project(&self, path: &EntityPath) -> Result<Option<Project>, HostError>;

    /// 项目是否存在；除“不存在”之外的错误都会向上传递
    async fn project_exists(&self, path: &EntityPath) -> Result<bool, HostError> {
        Ok(self.get_project(path).await?.is_some())
    }

    /// 归档项目
    async fn archive_project(&self, path: &EntityPath) -> Result<(), HostError>;

    /// 创建项目导出任务
    async fn create_project_export(&self, path: &EntityPath) -> Result<(), HostError>;

    /// 查询项目导出状态
    async fn project_export_status(&self, path: &EntityPath) -> Result<ExportStatus, HostError>;

    /// 下载项目导出归档
    async fn download_project_export(
        &self,
        path: &EntityPath,
        archive: &ArchiveFile,
    ) -> Result<(), HostError>;

    /// 提交项目导入，命名空间取目标路径的父级路径
    async fn submit_project_import(
        &self,
        destination: &EntityPath,
        archive: &ArchiveFile,
        name: &str,
        path: &str,
    ) -> Result<(), HostError>;

    /// 导出项目并下载归档
    ///
    /// 创建导出任务后按策略轮询状态直到 `finished`，然后下载到 `archive`。
    /// 导出失败、轮询预算耗尽或下载后本地文件不存在时返回 `None`。
    async fn export_project(
        &self,
        path: &EntityPath,
        archive: &ArchiveFile,
        policy: &PollPolicy,
    ) -> Result<Option<ArchiveFile>, HostError> {
        self.create_project_export(path).await?;

        let outcome = policy
            .poll(move |attempt| async move {
                match self.project_export_status(path).await {
                    Ok(ExportStatus::Finished) => PollStep::Ready(true),
                    Ok(ExportStatus::Failed) => PollStep::Ready(false),
                    Ok(status) => {
                        debug!(project = %path, attempt, %status, "Waiting for project export");
                        PollStep::Pending(())
                    }
                    Err(e) => {
                        warn!(project = %path, attempt, error = %e, "Failed to query export status");
                        PollStep::Pending(())
                    }
                }
            })
            .await;

        match outcome {
            PollOutcome::Ready { value: true, .. } => {}
            PollOutcome::Ready { value: false, .. } => {
                warn!(project = %path, "Project export failed on the source instance");
                return Ok(None);
            }
            PollOutcome::Exhausted { attempts, .. } => {
                warn!(project = %path, attempts, "Project export did not finish");
                return Ok(None);
            }
        }

        self.download_project_export(path, archive).await?;
        if archive.exists().await {
            Ok(Some(archive.clone()))
        } else {
            Ok(None)
        }
    }

    /// 导入项目并等待目标实例完成
    ///
    /// 提交后轮询目标项目的 `import_status`，遇到 `finished` 或 `failed` 立即返回；
    /// 预算耗尽时返回最后观察到的非终止状态。
    async fn import_project(
        &self,
        destination: &EntityPath,
        archive: &ArchiveFile,
        name: &str,
        path: &str,
        policy: &PollPolicy,
    ) -> Result<ImportStatus, HostError> {
        self.submit_project_import(destination, archive, name, path)
            .await?;
        info!(project = %destination, "Project import submitted");

        let outcome = policy
            .poll(move |attempt| async move {
                let status = match self.get_project(destination).await {
                    Ok(Some(project)) => project.import_status(),
                    Ok(None) => ImportStatus::Idle,
                    Err(e) => {
                        warn!(project = %destination, attempt, error = %e, "Failed to query import status");
                        ImportStatus::Unknown
                    }
                };
                if status.is_terminal() {
                    PollStep::Ready(status)
                } else {
                    debug!(project = %destination, attempt, %status, "Waiting for project import");
                    PollStep::Pending(status)
                }
            })
            .await;

        Ok(match outcome {
            PollOutcome::Ready { value, .. } => value,
            PollOutcome::Exhausted { last, .. } => last.unwrap_or_default(),
        })
    }
}
