// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;

fn sh(script: &str) -> Invocation {
    Invocation::from_command(&["sh".to_string(), "-c".to_string()], Path::new("."))
        .unwrap()
        .arg(script)
}

#[test]
fn from_command_splits_program_and_args() {
    let command = vec!["mocha".to_string(), "--ui".to_string(), "bdd".to_string()];
    let inv = Invocation::from_command(&command, Path::new("/tmp"))
        .unwrap()
        .arg("--reporter")
        .arg("spec");

    assert_eq!(inv.program, "mocha");
    assert_eq!(inv.args, vec!["--ui", "bdd", "--reporter", "spec"]);
    assert_eq!(inv.display(), "mocha --ui bdd --reporter spec");
}

#[test]
fn from_command_rejects_empty_command() {
    let err = Invocation::from_command(&[], Path::new(".")).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn cancel_token_is_shared_between_clones() {
    let token = CancelToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());
    token.cancel();
    assert!(clone.is_cancelled());
}

#[test]
fn stderr_helpers_ignore_whitespace() {
    let out = ToolOutput {
        stderr: b"  \n".to_vec(),
        ..Default::default()
    };
    assert!(!out.has_stderr());

    let out = ToolOutput {
        stderr: b"boom\nat line 2\nat line 3\n".to_vec(),
        ..Default::default()
    };
    assert!(out.has_stderr());
    assert_eq!(out.stderr_excerpt(2), "boom\nat line 2");
}

#[cfg(unix)]
mod unix {
    use super::*;

    #[test]
    fn captures_stdout_stderr_and_code() {
        let out = ProcessSpawner
            .spawn(&sh("echo out; echo err >&2; exit 3"), &CancelToken::new())
            .unwrap();
        assert_eq!(out.code, Some(3));
        assert!(!out.success);
        assert_eq!(out.stdout_lossy(), "out\n");
        assert_eq!(out.stderr_excerpt(10), "err");
    }

    #[test]
    fn passes_environment_variables() {
        let inv = sh("printf %s \"$CASTLE_PROBE\"").env("CASTLE_PROBE", "value");
        let out = ProcessSpawner.spawn(&inv, &CancelToken::new()).unwrap();
        assert_eq!(out.stdout_lossy(), "value");
    }

    #[test]
    fn large_output_does_not_block() {
        let inv = sh("i=0; while [ $i -lt 20000 ]; do echo 0123456789; i=$((i+1)); done");
        let out = ProcessSpawner
            .spawn(&inv.timeout(Duration::from_secs(30)), &CancelToken::new())
            .unwrap();
        assert_eq!(out.stdout.len(), 20000 * 11);
    }

    #[test]
    fn kills_process_after_timeout() {
        let inv = sh("sleep 5").timeout(Duration::from_millis(100));
        let start = Instant::now();
        let err = ProcessSpawner.spawn(&inv, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn kills_process_when_cancelled() {
        let token = CancelToken::new();
        let trigger = token.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            trigger.cancel();
        });
        let start = Instant::now();
        let err = ProcessSpawner.spawn(&sh("sleep 5"), &token).unwrap_err();
        handle.join().unwrap();
        assert!(err.is_cancellation());
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn already_cancelled_token_never_starts_process() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("started");
        let token = CancelToken::new();
        token.cancel();
        let err = ProcessSpawner
            .spawn(&sh(&format!("touch {}", marker.display())), &token)
            .unwrap_err();
        assert!(err.is_cancellation());
        assert!(!marker.exists());
    }

    #[test]
    fn missing_program_is_io_error() {
        let inv = Invocation::from_command(
            &["castle-no-such-program".to_string()],
            Path::new("."),
        )
        .unwrap();
        let err = ProcessSpawner.spawn(&inv, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
