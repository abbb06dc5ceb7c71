mod common;

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use common::*;
use trimmy::app::trim_executor::{TrimExecutor, TrimOptions, UNEXPECTED_FAILURE};
use trimmy::app::TempRegistry;
use trimmy::domain::errors::DomainError;
use trimmy::domain::model::*;

fn executor(trimmer: Arc<FakeTrimmer>, fs: Arc<FlakyFs>) -> (Arc<TrimExecutor>, TempRegistry) {
    let registry = TempRegistry::new();
    let executor = TrimExecutor::new(trimmer, fs, registry.clone(), TrimOptions::default());
    (Arc::new(executor), registry)
}

#[tokio::test]
async fn test_copy_trim_uses_suffix() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "holiday.mp4");
    let trimmer = FakeTrimmer::new(TrimBehaviour::Write);
    let (executor, registry) = executor(trimmer.clone(), FlakyFs::new());

    let request = TrimRequest::new(&source, dir.path(), range(10.0, 20.0));
    let outcome = executor.execute(request).await.unwrap();

    let expected = dir.path().join("holiday_trimmy.mp4");
    assert_eq!(
        outcome,
        TrimOutcome::Success {
            output: expected.clone(),
            original_deleted: false
        }
    );
    assert!(expected.exists());
    assert!(source.exists());

    let commands = trimmer.commands();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].input, source);
    assert_eq!(commands[0].start, 10.0);
    assert!((commands[0].length - 10.0).abs() < 1e-9);

    assert_eq!(executor.state(), TrimState::Succeeded { output: expected });
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_copy_trim_avoids_collisions() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "clip.mov");
    write_video(dir.path(), "clip_trimmy.mov");
    let (executor, _) = executor(FakeTrimmer::new(TrimBehaviour::Write), FlakyFs::new());

    let first = executor
        .execute(TrimRequest::new(&source, dir.path(), range(0.0, 5.0)))
        .await
        .unwrap();
    assert_eq!(first.output(), Some(dir.path().join("clip_trimmy_1.mov").as_path()));

    let second = executor
        .execute(TrimRequest::new(&source, dir.path(), range(0.0, 5.0)))
        .await
        .unwrap();
    assert_eq!(second.output(), Some(dir.path().join("clip_trimmy_2.mov").as_path()));
}

#[tokio::test]
async fn test_copy_trim_skips_directory_with_output_name() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "holiday.mp4");
    std::fs::create_dir(dir.path().join("holiday_trimmy.mp4")).unwrap();
    let trimmer = FakeTrimmer::new(TrimBehaviour::Write);
    let (executor, _) = executor(trimmer.clone(), FlakyFs::new());

    let outcome = executor
        .execute(TrimRequest::new(&source, dir.path(), range(10.0, 20.0)))
        .await
        .unwrap();

    let expected = dir.path().join("holiday_trimmy_1.mp4");
    assert_eq!(
        outcome,
        TrimOutcome::Success {
            output: expected.clone(),
            original_deleted: false
        }
    );
    assert_eq!(trimmer.commands()[0].output, expected);
    assert!(dir.path().join("holiday_trimmy.mp4").is_dir());
}

#[tokio::test]
async fn test_delete_trim_skips_directory_with_final_name() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "holiday.mp4");
    std::fs::create_dir(dir.path().join("holiday_trimmy.mp4")).unwrap();
    let (executor, registry) = executor(FakeTrimmer::new(TrimBehaviour::Write), FlakyFs::new());

    let request = TrimRequest::new(&source, dir.path(), range(10.0, 20.0))
        .with_delete_original(true)
        .with_custom_name(Some("holiday_trimmy".to_string()));
    let outcome = executor.execute(request).await.unwrap();

    let expected = dir.path().join("holiday_trimmy_1.mp4");
    assert_eq!(
        outcome,
        TrimOutcome::Success {
            output: expected.clone(),
            original_deleted: true
        }
    );
    assert!(expected.is_file());
    assert!(!source.exists());
    assert_eq!(file_names(dir.path()), vec!["holiday_trimmy.mp4", "holiday_trimmy_1.mp4"]);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_unreadable_candidate_counts_as_taken() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "holiday.mp4");
    let fs = FlakyFs::unreadable(&[dir.path().join("holiday_trimmy.mp4")]);
    let (executor, _) = executor(FakeTrimmer::new(TrimBehaviour::Write), fs);

    let outcome = executor
        .execute(TrimRequest::new(&source, dir.path(), range(10.0, 20.0)))
        .await
        .unwrap();
    assert_eq!(
        outcome.output(),
        Some(dir.path().join("holiday_trimmy_1.mp4").as_path())
    );
}

#[tokio::test]
async fn test_custom_name_gets_mp4() {
    let dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "raw.mkv");
    let (executor, _) = executor(FakeTrimmer::new(TrimBehaviour::Write), FlakyFs::new());

    let request = TrimRequest::new(&source, out_dir.path(), range(1.0, 2.0))
        .with_custom_name(Some("best bit".to_string()));
    let outcome = executor.execute(request).await.unwrap();
    assert_eq!(outcome.output(), Some(out_dir.path().join("best bit.mp4").as_path()));
}

#[tokio::test]
async fn test_length_is_floored() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "a.mp4");
    let trimmer = FakeTrimmer::new(TrimBehaviour::Write);
    let executor = TrimExecutor::new(
        trimmer.clone(),
        FlakyFs::new(),
        TempRegistry::new(),
        TrimOptions {
            min_trim_length: 0.05,
            ..TrimOptions::default()
        },
    );

    let mut range = TrimRange::new(120.0).unwrap();
    range.set_start(30.0);
    range.set_end(30.06);
    executor
        .execute(TrimRequest::new(&source, dir.path(), range))
        .await
        .unwrap();
    assert!((trimmer.commands()[0].length - MIN_TRIM_LENGTH).abs() < 1e-9);
}

#[tokio::test]
async fn test_validation_rejects_before_running() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "a.mp4");
    let trimmer = FakeTrimmer::new(TrimBehaviour::Write);
    let (executor, _) = executor(trimmer.clone(), FlakyFs::new());

    let missing = TrimRequest::new(dir.path().join("gone.mp4"), dir.path(), range(0.0, 5.0));
    assert!(matches!(
        executor.execute(missing).await,
        Err(DomainError::FileNotFound(_))
    ));

    let bad_dir = TrimRequest::new(&source, dir.path().join("nope"), range(0.0, 5.0));
    assert!(matches!(
        executor.execute(bad_dir).await,
        Err(DomainError::BadArgs(_))
    ));

    let too_short = TrimRequest::new(&source, dir.path(), range(5.0, 5.05));
    assert!(matches!(
        executor.execute(too_short).await,
        Err(DomainError::InvalidTimeRange(_))
    ));

    let bad_name = TrimRequest::new(&source, dir.path(), range(0.0, 5.0))
        .with_custom_name(Some("a:b".to_string()));
    assert!(matches!(
        executor.execute(bad_name).await,
        Err(DomainError::BadArgs(_))
    ));

    assert!(trimmer.commands().is_empty());
    assert_eq!(executor.state(), TrimState::Idle);
}

#[tokio::test]
async fn test_tool_failure_removes_partial_output() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "a.mp4");
    let (executor, registry) = executor(FakeTrimmer::new(TrimBehaviour::Fail), FlakyFs::new());

    let outcome = executor
        .execute(TrimRequest::new(&source, dir.path(), range(0.0, 5.0)))
        .await
        .unwrap();

    match &outcome {
        TrimOutcome::Failure { reason } => assert!(reason.contains("exited with code 1")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(file_names(dir.path()), vec!["a.mp4"]);
    assert!(registry.is_empty());
    assert!(matches!(executor.state(), TrimState::Failed { .. }));
}

#[tokio::test]
async fn test_missing_output_is_failure() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "a.mp4");
    let (executor, _) = executor(FakeTrimmer::new(TrimBehaviour::NoOutput), FlakyFs::new());

    let outcome = executor
        .execute(TrimRequest::new(&source, dir.path(), range(0.0, 5.0)))
        .await
        .unwrap();
    assert!(matches!(outcome, TrimOutcome::Failure { .. }));
}

#[tokio::test]
async fn test_delete_original_replaces_source() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "keep.mp4");
    let trimmer = FakeTrimmer::new(TrimBehaviour::Write);
    let (executor, registry) = executor(trimmer.clone(), FlakyFs::new());

    let request = TrimRequest::new(&source, dir.path(), range(10.0, 20.0)).with_delete_original(true);
    let outcome = executor.execute(request).await.unwrap();

    assert_eq!(
        outcome,
        TrimOutcome::Success {
            output: source.clone(),
            original_deleted: true
        }
    );
    assert_eq!(std::fs::read(&source).unwrap(), b"trimmed clip");
    assert_eq!(file_names(dir.path()), vec!["keep.mp4"]);
    assert!(registry.is_empty());

    let temp_name = trimmer.commands()[0]
        .output
        .file_name()
        .unwrap()
        .to_string_lossy()
        .to_string();
    assert!(temp_name.starts_with("keep_temp_trim_"));
    assert!(temp_name.ends_with(".mp4"));
}

#[tokio::test]
async fn test_delete_original_with_custom_name() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "keep.mov");
    let (executor, _) = executor(FakeTrimmer::new(TrimBehaviour::Write), FlakyFs::new());

    let request = TrimRequest::new(&source, dir.path(), range(0.0, 3.0))
        .with_delete_original(true)
        .with_custom_name(Some("short".to_string()));
    let outcome = executor.execute(request).await.unwrap();

    assert_eq!(outcome.output(), Some(dir.path().join("short.mp4").as_path()));
    assert_eq!(file_names(dir.path()), vec!["short.mp4"]);
}

#[tokio::test]
async fn test_delete_failure_keeps_original() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "locked.mp4");
    let (executor, registry) = executor(FakeTrimmer::new(TrimBehaviour::Write), FlakyFs::failing_delete());

    let request = TrimRequest::new(&source, dir.path(), range(0.0, 5.0)).with_delete_original(true);
    let outcome = executor.execute(request).await.unwrap();

    match &outcome {
        TrimOutcome::PartialSuccess {
            output,
            original_deleted,
            message,
        } => {
            assert!(!original_deleted);
            assert!(output.exists());
            assert!(output.to_string_lossy().contains("_temp_trim_"));
            assert!(message.contains("original could not be deleted"));
        }
        other => panic!("expected partial success, got {:?}", other),
    }
    assert!(source.exists());
    assert!(registry.is_empty());
    assert!(matches!(executor.state(), TrimState::PartialSuccess { .. }));
}

#[tokio::test]
async fn test_rename_failure_after_delete() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "gone.mp4");
    let (executor, registry) = executor(FakeTrimmer::new(TrimBehaviour::Write), FlakyFs::failing_move());

    let request = TrimRequest::new(&source, dir.path(), range(0.0, 5.0)).with_delete_original(true);
    let outcome = executor.execute(request).await.unwrap();

    match &outcome {
        TrimOutcome::PartialSuccess {
            output,
            original_deleted,
            message,
        } => {
            assert!(original_deleted);
            assert!(output.exists());
            assert!(message.starts_with("Original deleted"));
            assert!(message.contains(&output.display().to_string()));
        }
        other => panic!("expected partial success, got {:?}", other),
    }
    assert!(!source.exists());
    // The clip is the user's now; a sweep must not touch it
    registry.sweep();
    assert!(outcome.output().unwrap().exists());
}

#[tokio::test]
async fn test_second_trim_is_busy() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "a.mp4");
    let trimmer = FakeTrimmer::slow(TrimBehaviour::Write, Duration::from_millis(200));
    let (executor, _) = executor(trimmer.clone(), FlakyFs::new());
    let mut states = executor.subscribe();

    let handle = executor
        .spawn(TrimRequest::new(&source, dir.path(), range(0.0, 5.0)))
        .await
        .unwrap();
    assert!(executor.is_running());
    assert_eq!(
        *states.borrow_and_update(),
        TrimState::Running {
            source: source.clone()
        }
    );

    let err = executor
        .spawn(TrimRequest::new(&source, dir.path(), range(0.0, 5.0)))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Busy(_)));

    let outcome = handle.await.unwrap();
    assert!(outcome.is_success());
    states.changed().await.unwrap();
    assert!(matches!(*states.borrow(), TrimState::Succeeded { .. }));
    assert_eq!(trimmer.commands().len(), 1);

    // Back to interactive: another trim is accepted
    let again = executor
        .spawn(TrimRequest::new(&source, dir.path(), range(0.0, 5.0)))
        .await
        .unwrap();
    assert!(again.await.unwrap().is_success());
}

#[tokio::test]
async fn test_worker_panic_becomes_failure() {
    let dir = TempDir::new().unwrap();
    let source = write_video(dir.path(), "a.mp4");
    let (executor, _) = executor(FakeTrimmer::new(TrimBehaviour::Panic), FlakyFs::new());

    let handle = executor
        .spawn(TrimRequest::new(&source, dir.path(), range(0.0, 5.0)))
        .await
        .unwrap();
    let outcome = handle.await.unwrap();

    assert_eq!(
        outcome,
        TrimOutcome::Failure {
            reason: UNEXPECTED_FAILURE.to_string()
        }
    );
    assert!(!executor.is_running());
    executor.acknowledge();
    assert_eq!(executor.state(), TrimState::Idle);
}
