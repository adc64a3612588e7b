// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义访问托管实例（源实例和目标实例）的抽象契约，
/// 具体实现由基础设施层提供，测试中可以替换为假实现。
pub mod host_client;
