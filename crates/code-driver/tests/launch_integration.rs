//! End-to-end launch tests against a fake packaged build
//!
//! A real spawn needs a real executable, so these tests assemble a packaged
//! build layout (product descriptor + a shell script standing in for the
//! editor binary) and drive the launch with a scripted connector. Unix only:
//! the stand-in executable is a shell script.

#![cfg(unix)]

use async_trait::async_trait;
use code_driver::{
    ConnectError, Connect, DriverSession, Endpoint, Error, LaunchOptions, Launcher, Platform,
};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

mod common;

const PRODUCT_JSON: &str = r#"{
    "nameShort": "Fake Editor",
    "nameLong": "Fake Editor",
    "applicationName": "fake-editor"
}"#;

/// Lays out a packaged build whose "editor" records its pid and sleeps
fn make_build_root() -> (TempDir, PathBuf) {
    let root = TempDir::new().unwrap();
    let app = root.path().join("resources").join("app");
    fs::create_dir_all(&app).unwrap();
    fs::write(app.join("product.json"), PRODUCT_JSON).unwrap();

    let pid_file = root.path().join("editor.pid");
    let executable = match Platform::current().unwrap() {
        Platform::MacOs => {
            let dir = root.path().join("Contents").join("MacOS");
            fs::create_dir_all(&dir).unwrap();
            dir.join("Electron")
        }
        Platform::Linux => root.path().join("fake-editor"),
        Platform::Windows => unreachable!("unix-only test"),
    };
    fs::write(
        &executable,
        format!("#!/bin/sh\necho $$ > '{}'\nexec sleep 30\n", pid_file.display()),
    )
    .unwrap();
    fs::set_permissions(&executable, fs::Permissions::from_mode(0o755)).unwrap();

    (root, pid_file)
}

fn options(build_root: &Path, scratch: &Path) -> LaunchOptions {
    LaunchOptions::new(
        scratch.join("workspace"),
        scratch.join("user-data"),
        scratch.join("extensions"),
    )
    .build_path(build_root)
}

struct NoopSession;

#[async_trait]
impl DriverSession for NoopSession {
    async fn dispose(&mut self) -> code_driver::Result<()> {
        Ok(())
    }
}

/// Fails with the transient error `failures` times, then succeeds
struct ScriptedConnector {
    failures: u32,
    attempts: AtomicU32,
}

impl ScriptedConnector {
    fn new(failures: u32) -> Self {
        Self {
            failures,
            attempts: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl Connect for ScriptedConnector {
    async fn connect(
        &self,
        _output_path: &Path,
        _endpoint: &Endpoint,
    ) -> Result<Box<dyn DriverSession>, ConnectError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            Err(ConnectError::EndpointNotReady)
        } else {
            Ok(Box::new(NoopSession))
        }
    }
}

async fn wait_until_gone(pid: i32) {
    for _ in 0..200 {
        // Signal 0 probes for existence; the exit observer reaps the child,
        // after which this reports ESRCH.
        if unsafe { libc::kill(pid, 0) } != 0 {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("process {} still alive", pid);
}

async fn read_pid(pid_file: &Path) -> i32 {
    for _ in 0..200 {
        if let Ok(contents) = fs::read_to_string(pid_file) {
            if let Ok(pid) = contents.trim().parse() {
                return pid;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    panic!("pid file never appeared at {}", pid_file.display());
}

#[tokio::test]
async fn test_launch_survives_startup_race() -> anyhow::Result<()> {
    common::init_tracing();
    let (build_root, pid_file) = make_build_root();
    let scratch = TempDir::new().unwrap();

    let launcher = Launcher::with_collaborators(
        Arc::new(ScriptedConnector::new(2)),
        Arc::new(code_driver::FsExtensionCopier),
    );
    let mut result = launcher
        .launch(options(build_root.path(), scratch.path()))
        .await
        .expect("launch should succeed after transient failures");

    assert!(result.process.pid() > 0);
    assert!(!result.process.has_exited());
    let script_pid = read_pid(&pid_file).await;

    result.driver.dispose().await?;
    result.process.kill().await?;
    result.process.wait().await;
    assert!(result.process.has_exited());
    wait_until_gone(script_pid).await;
    Ok(())
}

// Teardown-on-exhaustion (kill invoked exactly once, last error kept) is
// covered on the virtual clock in the retry loop's unit tests; this checks
// the caller-visible error shape end to end.
#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_surface_the_last_error() {
    common::init_tracing();
    let (build_root, _pid_file) = make_build_root();
    let scratch = TempDir::new().unwrap();

    let launcher = Launcher::with_collaborators(
        // Never succeeds; every attempt sees the transient error.
        Arc::new(ScriptedConnector::new(u32::MAX)),
        Arc::new(code_driver::FsExtensionCopier),
    );
    let err = launcher
        .launch(options(build_root.path(), scratch.path()))
        .await
        .expect_err("connector never succeeds");

    match err {
        Error::ConnectionFailed { attempts, source } => {
            assert_eq!(attempts, 31);
            assert!(matches!(source, ConnectError::EndpointNotReady));
        }
        other => panic!("expected ConnectionFailed, got {:?}", other),
    }
}
