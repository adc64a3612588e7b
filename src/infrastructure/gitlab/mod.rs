// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// GitLab 实例访问
///
/// 基于 reqwest 实现的 `HostClient`
pub mod client;

pub use client::GitlabClient;
