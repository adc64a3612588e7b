// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 编排迁移阶段并汇总结果
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含迁移任务、实体模型和实例访问接口
pub mod domain;

/// 基础设施模块
///
/// 提供 GitLab API 客户端和指标记录
pub mod infrastructure;

/// 队列模块
///
/// 实现有界并发的任务调度
pub mod queue;

/// 工具模块
///
/// 提供错误类型、轮询策略和日志初始化
pub mod utils;

/// 工作器模块
///
/// 实现分组和项目的迁移单元
pub mod workers;
