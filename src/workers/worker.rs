// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::{ArchiveFile, EntityKind, MigrationOutcome, MigrationTask};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::warn;

/// 迁移单元特质
///
/// 每个实现负责一种实体（分组或项目）的完整迁移流程，
/// 所有失败都在单元内部转换为 `MigrationOutcome`，不会向外抛出。
#[async_trait]
pub trait MigrationUnit: Send + Sync {
    /// 执行一个迁移任务
    async fn migrate(&self, task: &MigrationTask) -> MigrationOutcome;

    /// 单元处理的实体类型
    fn kind(&self) -> EntityKind;
}

/// 归档文件选项
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// 存放归档文件的目录
    pub work_dir: PathBuf,
    /// 导入后是否保留归档文件
    pub keep_archives: bool,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            keep_archives: false,
        }
    }
}

impl ArchiveOptions {
    pub fn archive_for(&self, kind: EntityKind, task: &MigrationTask) -> ArchiveFile {
        ArchiveFile::for_entity(kind, &task.src, &self.work_dir)
    }

    /// 导入提交之后清理归档文件
    pub async fn cleanup(&self, archive: &ArchiveFile) {
        if self.keep_archives {
            return;
        }
        if let Err(e) = archive.remove().await {
            warn!(archive = %archive.path().display(), error = %e, "Failed to remove archive");
        }
    }
}
