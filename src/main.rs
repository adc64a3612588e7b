// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use gitlab_migrate::application::use_cases::migrate_use_case::MigrateUseCase;
use gitlab_migrate::config::settings::Settings;
use gitlab_migrate::utils::telemetry;
use tracing::info;

/// 主函数
///
/// 加载配置，先迁移分组再迁移项目；有任务失败时以非零状态退出
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting gitlab-migrate...");

    // 2. Load configuration
    let settings = match std::env::var("GLMIGRATE_CONFIG") {
        Ok(path) => Settings::from_file(&path)?,
        Err(_) => Settings::new()?,
    };
    info!(
        src = %settings.gitlab.src.url,
        dest = %settings.gitlab.dest.url,
        groups = settings.migrations.groups.len(),
        projects = settings.migrations.projects.len(),
        "Configuration loaded"
    );

    // 3. Prepare the archive directory
    tokio::fs::create_dir_all(&settings.archive.work_dir).await?;

    // 4. Run both phases
    let use_case = MigrateUseCase::from_settings(&settings)?;
    let report = use_case
        .execute(
            settings.migrations.groups.clone(),
            settings.migrations.projects.clone(),
        )
        .await;

    if report.has_failures() {
        anyhow::bail!("{} migration task(s) failed", report.failures());
    }
    Ok(())
}
