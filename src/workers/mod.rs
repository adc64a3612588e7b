// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 实现分组和项目的迁移单元
pub mod group_worker;
pub mod project_worker;
pub mod worker;

pub use group_worker::GroupMigration;
pub use project_worker::{ProjectMigration, ProjectPolicies};
pub use worker::{ArchiveOptions, MigrationUnit};
