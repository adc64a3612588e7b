// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 项目元数据
///
/// 只保留迁移过程需要的字段，其余字段在反序列化时忽略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub import_status: Option<ImportStatus>,
}

impl Project {
    /// 导入状态，缺失时视为没有导入
    pub fn import_status(&self) -> ImportStatus {
        self.import_status.unwrap_or_default()
    }
}

/// 导入任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    /// 没有导入任务
    #[default]
    #[serde(rename = "none")]
    Idle,
    Scheduled,
    #[serde(alias = "in_progress")]
    Started,
    Finished,
    Failed,
    #[serde(other)]
    Unknown,
}

impl ImportStatus {
    /// 是否已到达终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportStatus::Finished | ImportStatus::Failed)
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImportStatus::Idle => write!(f, "none"),
            ImportStatus::Scheduled => write!(f, "scheduled"),
            ImportStatus::Started => write!(f, "started"),
            ImportStatus::Finished => write!(f, "finished"),
            ImportStatus::Failed => write!(f, "failed"),
            ImportStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// 导出任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    #[default]
    #[serde(rename = "none")]
    Idle,
    Queued,
    Started,
    Finished,
    Failed,
    RegenerationInProgress,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExportStatus::Idle => write!(f, "none"),
            ExportStatus::Queued => write!(f, "queued"),
            ExportStatus::Started => write!(f, "started"),
            ExportStatus::Finished => write!(f, "finished"),
            ExportStatus::Failed => write!(f, "failed"),
            ExportStatus::RegenerationInProgress => write!(f, "regeneration_in_progress"),
            ExportStatus::Unknown => write!(f, "unknown"),
        }
    }
}
