// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::entity::{EntityKind, MigrationTask};
use crate::utils::errors::MigrationError;
use std::fmt;
use std::time::Duration;

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 目标实例上已存在同名实体
    DestinationExists,
    /// 源实例上不存在该实体
    SourceMissing,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SkipReason::DestinationExists => write!(f, "destination already exists"),
            SkipReason::SourceMissing => write!(f, "source does not exist"),
        }
    }
}

/// 单个任务的迁移结果
#[derive(Debug)]
pub enum MigrationResult {
    Skipped(SkipReason),
    Success,
    Failure(MigrationError),
}

/// 迁移结果
///
/// 每个任务恰好产生一个结果，由调度器按提交顺序收集
#[derive(Debug)]
pub struct MigrationOutcome {
    pub task: MigrationTask,
    pub kind: EntityKind,
    pub result: MigrationResult,
    pub elapsed: Duration,
}

impl MigrationOutcome {
    pub fn new(
        task: MigrationTask,
        kind: EntityKind,
        result: MigrationResult,
        elapsed: Duration,
    ) -> Self {
        Self {
            task,
            kind,
            result,
            elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, MigrationResult::Success)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.result, MigrationResult::Skipped(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.result, MigrationResult::Failure(_))
    }

    /// 用于指标标签的结果名称
    pub fn label(&self) -> &'static str {
        match self.result {
            MigrationResult::Skipped(_) => "skipped",
            MigrationResult::Success => "success",
            MigrationResult::Failure(_) => "failure",
        }
    }
}

impl fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.result {
            MigrationResult::Skipped(reason) => {
                write!(f, "Skipping {} {}: {}", self.kind, self.task, reason)
            }
            MigrationResult::Success => write!(
                f,
                "Finished migrating {} {} in {}s",
                self.kind,
                self.task,
                self.elapsed.as_secs()
            ),
            MigrationResult::Failure(error) => {
                write!(f, "Failed to migrate {} {}: {}", self.kind, self.task, error)
            }
        }
    }
}
