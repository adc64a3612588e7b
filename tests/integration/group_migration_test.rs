// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::fake_host::FakeHost;
use gitlab_migrate::domain::models::{
    ArchiveFile, EntityKind, MigrationResult, MigrationTask, SkipReason,
};
use gitlab_migrate::domain::repositories::host_client::ExportTrigger;
use gitlab_migrate::utils::errors::MigrationError;
use gitlab_migrate::workers::{ArchiveOptions, GroupMigration, MigrationUnit};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn task() -> MigrationTask {
    MigrationTask::parse("old/infra", "new/infra").unwrap()
}

fn unit(source: &Arc<FakeHost>, destination: &Arc<FakeHost>, dir: &TempDir) -> GroupMigration {
    GroupMigration::new(
        source.clone(),
        destination.clone(),
        ArchiveOptions {
            work_dir: dir.path().to_path_buf(),
            keep_archives: false,
        },
    )
}

#[tokio::test(start_paused = true)]
async fn test_destination_exists_skips_without_export() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(FakeHost::new());
    let destination = Arc::new(FakeHost::new().with_group_exists([true], true));

    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;

    assert!(matches!(
        outcome.result,
        MigrationResult::Skipped(SkipReason::DestinationExists)
    ));
    assert_eq!(outcome.kind, EntityKind::Group);
    assert!(source.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rerun_with_existing_destination_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(FakeHost::new());
    let destination = Arc::new(FakeHost::new().with_group_exists([], true));
    let unit = unit(&source, &destination, &dir);

    for _ in 0..3 {
        let outcome = unit.migrate(&task()).await;
        assert!(outcome.is_skipped());
    }
    assert_eq!(source.count("start_group_export"), 0);
    assert_eq!(destination.count("import_group"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_export_never_imports() {
    let dir = tempfile::tempdir().unwrap();
    let source =
        Arc::new(FakeHost::new().with_export_trigger(ExportTrigger::Rejected(StatusCode::FORBIDDEN)));
    let destination = Arc::new(FakeHost::new());

    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;

    assert!(matches!(
        outcome.result,
        MigrationResult::Failure(MigrationError::Rejected(StatusCode::FORBIDDEN))
    ));
    assert_eq!(source.count("download_group_export"), 0);
    assert_eq!(destination.count("import_group"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_missing_source_group_fails() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(FakeHost::new().with_export_trigger(ExportTrigger::NotFound));
    let destination = Arc::new(FakeHost::new());

    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;

    assert!(matches!(
        outcome.result,
        MigrationResult::Failure(MigrationError::NotFound(_))
    ));
    assert_eq!(destination.count("import_group"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_download_retries_until_ready() {
    let dir = tempfile::tempdir().unwrap();
    let mut downloads: Vec<Option<Vec<u8>>> = vec![None; 5];
    downloads.push(Some(b"group-archive".to_vec()));
    let source = Arc::new(FakeHost::new().with_downloads(downloads, None));
    let destination = Arc::new(FakeHost::new().with_group_exists([false, true], false));

    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;

    assert!(outcome.is_success());
    assert_eq!(source.count("download_group_export"), 6);
    assert_eq!(outcome.elapsed, Duration::from_secs(5));
    assert_eq!(
        destination.imports(),
        vec![("new/infra".to_string(), b"group-archive".to_vec())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_download_budget_exhausted() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(FakeHost::new().with_downloads([], None));
    let destination = Arc::new(FakeHost::new());

    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;

    assert!(matches!(
        outcome.result,
        MigrationResult::Failure(MigrationError::Unavailable(_))
    ));
    assert_eq!(source.count("download_group_export"), 100);
    assert_eq!(outcome.elapsed, Duration::from_secs(99));
    assert_eq!(destination.count("import_group"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_verify_succeeds_on_kth_poll() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(FakeHost::new());
    // First answer is the initial destination check, then 9 misses before the group shows up
    let mut exists = vec![false; 10];
    exists.push(true);
    let destination = Arc::new(FakeHost::new().with_group_exists(exists, false));

    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;

    assert!(outcome.is_success());
    assert_eq!(destination.count("group_exists"), 11);
    assert_eq!(outcome.elapsed, Duration::from_secs(9));
}

#[tokio::test(start_paused = true)]
async fn test_verify_times_out_after_budget() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(FakeHost::new());
    let destination = Arc::new(FakeHost::new().with_group_exists([], false));

    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;

    assert!(matches!(
        outcome.result,
        MigrationResult::Failure(MigrationError::Timeout { attempts: 100, .. })
    ));
    assert_eq!(destination.count("group_exists"), 101);
    assert_eq!(outcome.elapsed, Duration::from_secs(99));
}

#[tokio::test(start_paused = true)]
async fn test_archive_removed_after_import_unless_kept() {
    let dir = tempfile::tempdir().unwrap();
    let archive = ArchiveFile::for_entity(EntityKind::Group, &task().src, dir.path());

    let source = Arc::new(FakeHost::new());
    let destination = Arc::new(FakeHost::new().with_group_exists([false, true], false));
    let outcome = unit(&source, &destination, &dir).migrate(&task()).await;
    assert!(outcome.is_success());
    assert!(!archive.path().exists());

    let destination = Arc::new(FakeHost::new().with_group_exists([false, true], false));
    let keeping = GroupMigration::new(
        source.clone(),
        destination.clone(),
        ArchiveOptions {
            work_dir: dir.path().to_path_buf(),
            keep_archives: true,
        },
    );
    let outcome = keeping.migrate(&task()).await;
    assert!(outcome.is_success());
    assert!(archive.path().exists());
}
