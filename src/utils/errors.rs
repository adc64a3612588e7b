// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// 托管实例访问错误类型
#[derive(Error, Debug)]
pub enum HostError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 本地文件读写失败
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 服务端返回了无法处理的状态码
    #[error("Unexpected status {status} from {operation}")]
    UnexpectedStatus {
        operation: &'static str,
        status: StatusCode,
    },
    /// 依赖的实体不存在
    #[error("Not found: {0}")]
    NotFound(String),
    /// 响应或配置格式错误
    #[error("Malformed: {0}")]
    Malformed(String),
}

/// 迁移错误类型
///
/// 每个迁移单元的失败都会被转换为此类型，并作为该任务的结果上报
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("entity not found: {0}")]
    NotFound(String),

    #[error("export rejected with status {0}")]
    Rejected(StatusCode),

    #[error("export archive unavailable: {0}")]
    Unavailable(String),

    #[error("import failed after {}s", .elapsed.as_secs())]
    ImportFailed { elapsed: Duration },

    #[error("{stage} did not complete after {attempts} attempts")]
    Timeout { stage: &'static str, attempts: u32 },

    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[error("migration task panicked: {0}")]
    Panicked(String),
}
