// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 提供领域接口的具体实现：
/// - GitLab 客户端（gitlab）：基于 reqwest 的 `HostClient` 实现
/// - 指标（metrics）：请求次数和迁移结果的计数
pub mod gitlab;
pub mod metrics;
