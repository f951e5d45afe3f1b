//! Build executor integration tests.
//!
//! Drives real external processes (shell stubs) through the executor and
//! checks outcome classification, event emission, deadline enforcement,
//! and unconditional spec-file cleanup.

use std::{path::Path, sync::Arc, time::Duration};

use buildhook_core::{BuildEvent, BuildEventHandler, BuildId, BuildRequest, ProjectName};
use buildhook_runner::{BuildExecutor, BuildOutcome};
use buildhook_testing::{RecordingEventHandler, TestEnv};
use serde_json::json;

fn request(project: &str) -> BuildRequest {
    BuildRequest {
        project_name: ProjectName::new(project).expect("valid test project name"),
        infrastructure_spec: json!({"provider": "aws", "instances": 2}),
    }
}

fn executor_for(
    env: &TestEnv,
    timeout: Duration,
) -> (Arc<BuildExecutor>, Arc<RecordingEventHandler>) {
    let events = env.events();
    let handler: Arc<dyn BuildEventHandler> = events.clone();
    let executor =
        Arc::new(BuildExecutor::new(env.runner_config_with_timeout(timeout), handler));
    (executor, events)
}

/// A zero exit status is a success, reported as exactly one Succeeded
/// event.
#[tokio::test]
async fn zero_exit_is_success() {
    let env = TestEnv::new().expect("failed to create test environment");
    let (executor, events) = executor_for(&env, Duration::from_secs(10));

    let outcome = executor.execute(request("demo"), BuildId(1001)).await;
    assert_eq!(outcome, BuildOutcome::Succeeded);

    let recorded = events.events();
    assert_eq!(recorded.len(), 1);
    match &recorded[0] {
        BuildEvent::Succeeded { project, build_id, .. } => {
            assert_eq!(project.as_str(), "demo");
            assert_eq!(*build_id, BuildId(1001));
        },
        other => panic!("expected Succeeded, got {other:?}"),
    }

    let log = env.logs_dir().join("build-demo-1001.log");
    assert!(log.exists(), "stub build script should write the conventional log file");
}

/// A non-zero exit is a failure carrying the exit code and captured
/// stderr.
#[tokio::test]
async fn non_zero_exit_is_failure_with_stderr() {
    let env = TestEnv::new().expect("failed to create test environment");
    env.use_failing_build_script("terraform plan exploded").unwrap();
    let (executor, events) = executor_for(&env, Duration::from_secs(10));

    let outcome = executor.execute(request("demo"), BuildId(1002)).await;
    match &outcome {
        BuildOutcome::Failed { exit_code, stderr } => {
            assert_eq!(*exit_code, Some(1));
            assert!(stderr.contains("terraform plan exploded"), "stderr was {stderr:?}");
        },
        other => panic!("expected Failed, got {other:?}"),
    }

    assert!(matches!(events.events()[0], BuildEvent::Failed { .. }));
}

/// A missing executable is a launch failure, distinct from a build
/// failure.
#[tokio::test]
async fn missing_executable_is_launch_failure() {
    let env = TestEnv::new().expect("failed to create test environment");
    env.remove_build_script().unwrap();
    let (executor, events) = executor_for(&env, Duration::from_secs(10));

    let outcome = executor.execute(request("demo"), BuildId(1003)).await;
    match &outcome {
        BuildOutcome::LaunchFailed { error } => {
            assert!(
                error.contains("build-and-upload.sh"),
                "error should name the program, was {error:?}"
            );
        },
        other => panic!("expected LaunchFailed, got {other:?}"),
    }

    assert!(matches!(events.events()[0], BuildEvent::LaunchFailed { .. }));
}

/// A build that outlives its deadline is killed and reported as a
/// timeout, not a generic failure.
#[tokio::test]
async fn deadline_exceeded_is_timeout() {
    let env = TestEnv::new().expect("failed to create test environment");
    env.use_hanging_build_script(30).unwrap();
    let timeout = Duration::from_millis(300);
    let (executor, events) = executor_for(&env, timeout);

    let started = std::time::Instant::now();
    let outcome = executor.execute(request("demo"), BuildId(1004)).await;
    let elapsed = started.elapsed();

    assert_eq!(outcome, BuildOutcome::TimedOut { timeout });
    assert!(
        elapsed < Duration::from_secs(5),
        "executor should return promptly after the deadline, took {elapsed:?}"
    );
    assert!(matches!(events.events()[0], BuildEvent::TimedOut { .. }));
}

/// The scoped spec file is handed to the process as its second argument
/// and is gone after the build completes.
#[tokio::test]
async fn spec_file_passed_to_process_and_removed_after_success() {
    let env = TestEnv::new().expect("failed to create test environment");
    let capture = env.use_capturing_build_script().unwrap();
    let (executor, _events) = executor_for(&env, Duration::from_secs(10));

    let outcome = executor.execute(request("web-app"), BuildId(1005)).await;
    assert_eq!(outcome, BuildOutcome::Succeeded);

    let captured = std::fs::read_to_string(&capture).unwrap();
    let mut lines = captured.lines();
    assert_eq!(lines.next(), Some("web-app"));
    let spec_path = lines.next().expect("spec path should be captured");
    assert_eq!(lines.next(), Some("1005"));

    assert!(spec_path.ends_with(".json"));
    assert!(
        !Path::new(spec_path).exists(),
        "spec file must be removed after the build completes"
    );
}

/// The spec file is removed even when the build times out.
#[tokio::test]
async fn spec_file_removed_after_timeout() {
    let env = TestEnv::new().expect("failed to create test environment");
    // Record the spec path, then hang until killed
    let capture = env.logs_dir().join("captured-spec-path");
    let body = format!(
        "#!/bin/sh\nprintf '%s' \"$2\" > \"{}\"\nsleep 30\n",
        capture.display()
    );
    std::fs::write(&env.config().build_script, body).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(
            &env.config().build_script,
            std::fs::Permissions::from_mode(0o755),
        )
        .unwrap();
    }

    let timeout = Duration::from_millis(300);
    let (executor, _events) = executor_for(&env, timeout);

    let outcome = executor.execute(request("demo"), BuildId(1006)).await;
    assert_eq!(outcome, BuildOutcome::TimedOut { timeout });

    let spec_path = std::fs::read_to_string(&capture).unwrap();
    assert!(
        !Path::new(spec_path.trim()).exists(),
        "spec file must be removed after a timeout"
    );
}

/// Spawned builds are detached: spawn returns immediately and the
/// outcome arrives only through the event handler.
#[tokio::test]
async fn spawn_is_fire_and_forget() {
    let env = TestEnv::new().expect("failed to create test environment");
    let (executor, events) = executor_for(&env, Duration::from_secs(10));

    executor.spawn(request("demo"), BuildId(1007));

    let event = events
        .wait_for_terminal_event(Duration::from_secs(5))
        .await
        .expect("spawned build should report a terminal event");
    assert!(matches!(event, BuildEvent::Succeeded { .. }));
}
