// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含迁移的核心业务概念：
/// - 领域模型（models）：迁移任务、归档文件、项目元数据和迁移结果
/// - 仓库接口（repositories）：访问托管实例的抽象接口
///
/// 领域层不依赖于具体的 HTTP 实现，具体实现由基础设施层提供。
pub mod models;
pub mod repositories;
