// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::fake_host::{project, FakeHost};
use gitlab_migrate::domain::models::{
    ArchiveFile, EntityKind, EntityPath, ExportStatus, ImportStatus, MigrationResult,
    MigrationTask, SkipReason,
};
use gitlab_migrate::domain::repositories::host_client::HostClient;
use gitlab_migrate::utils::errors::MigrationError;
use gitlab_migrate::utils::retry_policy::PollPolicy;
use gitlab_migrate::workers::{ArchiveOptions, MigrationUnit, ProjectMigration};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;

fn task() -> MigrationTask {
    MigrationTask::parse("old/tools", "new/tools").unwrap()
}

fn unit(source: &Arc<FakeHost>, destination: &Arc<FakeHost>, dir: &TempDir) -> ProjectMigration {
    ProjectMigration::new(
        source.clone(),
        destination.clone(),
        ArchiveOptions {
            work_dir: dir.path().to_path_buf(),
            keep_archives: false,
        },
    )
}

fn source_with_project() -> FakeHost {
    let tools = project("Tools", ImportStatus::Idle);
    FakeHost::new().with_projects([], Some(tools))
}

#[tokio::test(start_paused = true)]
async fn test_import_project_returns_after_two_sleeps() {
    let dir = tempfile::tempdir().unwrap();
    let destination = FakeHost::new().with_projects(
        [
            Some(project("Tools", ImportStatus::Scheduled)),
            Some(project("Tools", ImportStatus::Scheduled)),
            Some(project("Tools", ImportStatus::Finished)),
        ],
        None,
    );
    let path = EntityPath::new("new/tools").unwrap();
    let archive = ArchiveFile::for_entity(EntityKind::Project, &path, dir.path());
    std::fs::write(archive.path(), b"archive").unwrap();
    let policy = PollPolicy::fixed(100, Duration::from_secs(10));

    let started = Instant::now();
    let status = destination
        .import_project(&path, &archive, "Tools", "tools", &policy)
        .await
        .unwrap();

    assert_eq!(status, ImportStatus::Finished);
    assert_eq!(started.elapsed(), Duration::from_secs(20));
    assert_eq!(destination.count("get_project"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_import_project_stops_on_failed() {
    let dir = tempfile::tempdir().unwrap();
    let destination = FakeHost::new().with_projects(
        [
            Some(project("Tools", ImportStatus::Started)),
            Some(project("Tools", ImportStatus::Failed)),
        ],
        Some(project("Tools", ImportStatus::Finished)),
    );
    let path = EntityPath::new("new/tools").unwrap();
    let archive = ArchiveFile::for_entity(EntityKind::Project, &path, dir.path());
    std::fs::write(archive.path(), b"archive").unwrap();
    let policy = PollPolicy::fixed(100, Duration::from_secs(10));

    let status = destination
        .import_project(&path, &archive, "Tools", "tools", &policy)
        .await
        .unwrap();

    assert_eq!(status, ImportStatus::Failed);
    assert_eq!(destination.count("get_project"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_destination_exists_skips_after_archiving_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(source_with_project().with_failing_archive());
    let destination =
        Arc::new(FakeHost::new().with_projects([], Some(project("Tools", ImportStatus::Finished))));

    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;

    assert!(matches!(
        outcome.result,
        MigrationResult::Skipped(SkipReason::DestinationExists)
    ));
    assert_eq!(source.calls(), vec!["archive_project".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_missing_source_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(FakeHost::new().with_projects([], None));
    let destination = Arc::new(FakeHost::new().with_projects([], None));

    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;

    assert!(matches!(
        outcome.result,
        MigrationResult::Skipped(SkipReason::SourceMissing)
    ));
    assert_eq!(source.count("create_project_export"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_full_project_migration() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(
        source_with_project()
            .with_export_statuses([ExportStatus::Queued, ExportStatus::Started], ExportStatus::Finished),
    );
    let destination = Arc::new(FakeHost::new().with_projects(
        [
            None,
            Some(project("Tools", ImportStatus::Scheduled)),
            Some(project("Tools", ImportStatus::Scheduled)),
        ],
        Some(project("Tools", ImportStatus::Finished)),
    ));

    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;

    assert!(outcome.is_success(), "unexpected outcome: {}", outcome);
    // Two export polls one second apart, two import polls ten seconds apart
    assert_eq!(outcome.elapsed, Duration::from_secs(22));
    assert_eq!(
        destination.imports(),
        vec![("new/tools".to_string(), b"project-archive".to_vec())]
    );
    let archive = ArchiveFile::for_entity(EntityKind::Project, &task().src, dir.path());
    assert!(!archive.path().exists());
}

#[tokio::test(start_paused = true)]
async fn test_failed_import_reports_elapsed() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(source_with_project());
    let destination = Arc::new(FakeHost::new().with_projects(
        [
            None,
            Some(project("Tools", ImportStatus::Scheduled)),
            Some(project("Tools", ImportStatus::Failed)),
        ],
        Some(project("Tools", ImportStatus::Finished)),
    ));

    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;

    match outcome.result {
        MigrationResult::Failure(MigrationError::ImportFailed { elapsed }) => {
            assert_eq!(elapsed, Duration::from_secs(10));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    // One existence check plus two status polls, no verification afterwards
    assert_eq!(destination.count("get_project"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_failed_export_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(
        source_with_project().with_export_statuses([ExportStatus::Started], ExportStatus::Failed),
    );
    let destination = Arc::new(FakeHost::new().with_projects([], None));

    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;

    assert!(matches!(
        outcome.result,
        MigrationResult::Failure(MigrationError::Unavailable(_))
    ));
    assert_eq!(source.count("download_project_export"), 0);
    assert_eq!(destination.count("submit_project_import"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_missing_archive_after_download_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(source_with_project().with_project_archive(None));
    let destination = Arc::new(FakeHost::new().with_projects([], None));

    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;

    assert!(matches!(
        outcome.result,
        MigrationResult::Failure(MigrationError::Unavailable(_))
    ));
    assert_eq!(destination.count("submit_project_import"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_verification_timeout_after_import() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(source_with_project());
    // The import reports finished, but the project never becomes visible afterwards
    let destination = Arc::new(FakeHost::new().with_projects(
        [None, Some(project("Tools", ImportStatus::Finished))],
        None,
    ));

    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;

    assert!(matches!(
        outcome.result,
        MigrationResult::Failure(MigrationError::Timeout { attempts: 100, .. })
    ));
    assert_eq!(outcome.elapsed, Duration::from_secs(990));
}
