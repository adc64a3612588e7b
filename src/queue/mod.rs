// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 实现有界并发的迁移调度
pub mod scheduler;

pub use scheduler::Scheduler;
