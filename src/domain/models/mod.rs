// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型
///
/// 包含迁移任务、实体路径、归档文件、项目元数据和迁移结果
pub mod archive;
pub mod entity;
pub mod outcome;
pub mod project;

pub use archive::ArchiveFile;
pub use entity::{EntityKind, EntityPath, MigrationTask};
pub use outcome::{MigrationOutcome, MigrationResult, SkipReason};
pub use project::{ExportStatus, ImportStatus, Project};
