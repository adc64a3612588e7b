// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::entity::{EntityKind, EntityPath};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 本地导出归档文件
///
/// 文件名由实体类型和路径确定，例如 `download_group_infra_tools.tar.gz`。
/// 同一阶段内不能有两个任务使用相同的源路径，否则会写同一个文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    path: PathBuf,
}

impl ArchiveFile {
    /// 在工作目录下为实体生成归档文件
    pub fn for_entity(kind: EntityKind, entity: &EntityPath, work_dir: &Path) -> Self {
        let file_name = format!("download_{}_{}.tar.gz", kind, entity.sanitized());
        Self {
            path: work_dir.join(file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// 下载过程中使用的临时文件，下载完成后再重命名为正式文件
    pub fn partial_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".part");
        PathBuf::from(name)
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// 删除归档文件，文件不存在时视为成功
    pub async fn remove(&self) -> std::io::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
