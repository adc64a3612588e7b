// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::MigrationTask;
use crate::utils::retry_policy::PollPolicy;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含两个 GitLab 实例、迁移任务列表、并发限制、轮询策略、归档和 HTTP 等配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 源实例和目标实例
    pub gitlab: GitlabSettings,
    /// 迁移任务
    #[serde(default)]
    pub migrations: MigrationsSettings,
    /// 并发控制配置
    pub concurrency: ConcurrencySettings,
    /// 轮询配置
    pub polling: PollingSettings,
    /// 归档文件配置
    pub archive: ArchiveSettings,
    /// HTTP 客户端配置
    pub http: HttpSettings,
}

/// 实例配置
#[derive(Clone, Deserialize)]
pub struct HostConfig {
    /// 实例地址，例如 `https://gitlab.example.com`
    pub url: String,
    /// 访问令牌
    pub token: String,
}

impl fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConfig")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// GitLab 实例配置
#[derive(Debug, Clone, Deserialize)]
pub struct GitlabSettings {
    pub src: HostConfig,
    pub dest: HostConfig,
}

/// 迁移任务列表
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MigrationsSettings {
    #[serde(default)]
    pub groups: Vec<MigrationTask>,
    #[serde(default)]
    pub projects: Vec<MigrationTask>,
}

/// 并发控制配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ConcurrencySettings {
    /// 分组迁移并发数
    pub groups: usize,
    /// 项目迁移并发数，项目导入导出占用服务端资源更久，默认更低
    pub projects: usize,
}

/// 单个轮询循环的预算
#[derive(Debug, Clone, Deserialize)]
pub struct PollSettings {
    /// 最大尝试次数
    pub max_attempts: u32,
    /// 轮询间隔（秒）
    pub interval_secs: u64,
}

/// 轮询配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct PollingSettings {
    /// 分组导出下载
    pub group_download: PollSettings,
    /// 分组导入确认
    pub group_verify: PollSettings,
    /// 项目导出状态
    pub project_export: PollSettings,
    /// 项目导入状态
    pub project_import: PollSettings,
    /// 项目导入确认
    pub project_verify: PollSettings,
    /// 是否启用指数退避
    pub exponential_backoff: bool,
    /// 抖动因子 (0.0-1.0)
    pub jitter_factor: f64,
}

impl PollingSettings {
    /// 把轮询预算转换为轮询策略
    pub fn policy(&self, poll: &PollSettings) -> PollPolicy {
        let interval = Duration::from_secs(poll.interval_secs);
        let mut policy = PollPolicy::fixed(poll.max_attempts, interval);
        if self.exponential_backoff {
            policy = policy.with_backoff(2.0, interval * 10);
        }
        policy.with_jitter(self.jitter_factor)
    }
}

/// 归档文件配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveSettings {
    /// 存放导出归档的目录
    pub work_dir: PathBuf,
    /// 导入后是否保留归档文件
    pub keep_archives: bool,
}

/// HTTP 客户端配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// 建立连接的超时时间（秒）
    pub connect_timeout_secs: u64,
    /// 两次读取之间允许的最长空闲时间（秒），不限制整个请求的耗时
    pub read_timeout_secs: u64,
    /// User-Agent
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            read_timeout_secs: 300,
            user_agent: concat!("gitlab-migrate/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config.{yaml,toml,json}`、`config/<APP_ENVIRONMENT>` 和环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::defaults()?
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("GLMIGRATE").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 从指定文件加载配置，环境变量仍可覆盖文件中的值
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("GLMIGRATE").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let http = HttpSettings::default();
        Config::builder()
            // Default concurrency settings
            .set_default("concurrency.groups", 5)?
            .set_default("concurrency.projects", 2)?
            // Default polling budgets
            .set_default("polling.group_download.max_attempts", 100)?
            .set_default("polling.group_download.interval_secs", 1)?
            .set_default("polling.group_verify.max_attempts", 100)?
            .set_default("polling.group_verify.interval_secs", 1)?
            .set_default("polling.project_export.max_attempts", 100)?
            .set_default("polling.project_export.interval_secs", 1)?
            .set_default("polling.project_import.max_attempts", 360)?
            .set_default("polling.project_import.interval_secs", 10)?
            .set_default("polling.project_verify.max_attempts", 100)?
            .set_default("polling.project_verify.interval_secs", 10)?
            .set_default("polling.exponential_backoff", false)?
            .set_default("polling.jitter_factor", 0.0)?
            // Default archive settings
            .set_default("archive.work_dir", ".")?
            .set_default("archive.keep_archives", false)?
            // Default HTTP settings
            .set_default("http.connect_timeout_secs", http.connect_timeout_secs)?
            .set_default("http.read_timeout_secs", http.read_timeout_secs)?
            .set_default("http.user_agent", http.user_agent)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
