// Application process lifecycle
//
// Spawns the resolved executable and keeps just enough state to manage it
// afterwards: a pid for tree kills, an exited flag so a process is never
// killed twice, and a hook on the global shutdown registry so a crashing
// test runner does not leave GUI processes behind.

use crate::args::SpawnSpec;
use crate::shutdown;
use crate::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::sync::watch;

/// A live, spawned application process
#[derive(Debug)]
pub struct ApplicationProcess {
    pid: u32,
    exited: watch::Receiver<bool>,
}

impl ApplicationProcess {
    /// Spawns `executable` with the built argument vector and environment.
    ///
    /// Returns immediately with a live handle; an observer task records the
    /// eventual exit. On Unix the child gets its own process group so the
    /// whole tree can be killed with one signal.
    ///
    /// # Errors
    ///
    /// Returns `Error::LaunchFailed` if the OS refuses the spawn.
    pub(crate) fn spawn(executable: &Path, spec: SpawnSpec) -> Result<Self> {
        let mut command = tokio::process::Command::new(executable);
        command
            .args(&spec.args)
            .envs(spec.env.iter().cloned())
            .stdin(Stdio::null());
        if spec.inherit_stdio {
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| {
            Error::LaunchFailed(format!("failed to spawn {}: {}", executable.display(), e))
        })?;
        let pid = child.id().ok_or_else(|| {
            Error::LaunchFailed(format!(
                "{} exited before a pid could be observed",
                executable.display()
            ))
        })?;
        tracing::debug!("Spawned application process {}", pid);

        let (exited_tx, exited_rx) = watch::channel(false);

        // If the host goes down first, take the child's tree with it.
        let hook_exited = exited_rx.clone();
        let hook = shutdown::global().register(move || {
            if !*hook_exited.borrow() {
                tracing::debug!("Host exiting, killing application process {}", pid);
                if let Err(err) = kill_tree_blocking(pid) {
                    tracing::warn!("Failed to kill application process {}: {}", pid, err);
                }
            }
        });

        // Exit observer: records the exit and retires the shutdown hook.
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => {
                    tracing::debug!("Application process {} exited with {}", pid, status);
                }
                Err(err) => {
                    tracing::warn!("Failed to observe exit of process {}: {}", pid, err);
                }
            }
            let _ = exited_tx.send(true);
            shutdown::global().deregister(hook);
        });

        Ok(Self {
            pid,
            exited: exited_rx,
        })
    }

    /// OS process id of the spawned application
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Whether the process has been observed to exit
    pub fn has_exited(&self) -> bool {
        *self.exited.borrow()
    }

    /// Waits until the process exits (however that comes about)
    pub async fn wait(&self) {
        let mut exited = self.exited.clone();
        // The observer task only drops the sender after flagging the exit,
        // so an Err here still means the process is gone.
        let _ = exited.wait_for(|done| *done).await;
    }

    /// Forcibly terminates the process and its descendant tree.
    ///
    /// A no-op once the process has been observed to exit.
    pub async fn kill(&self) -> Result<()> {
        if self.has_exited() {
            return Ok(());
        }
        tracing::debug!("Killing application process {}", self.pid);
        kill_tree(self.pid).await
    }
}

#[cfg(unix)]
fn kill_tree_blocking(pid: u32) -> Result<()> {
    // The child is its own process group leader; one signal reaps the tree.
    let ret = unsafe { libc::kill(-(pid as i32), libc::SIGKILL) };
    if ret == 0 {
        return Ok(());
    }
    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        // Already gone.
        return Ok(());
    }
    Err(Error::Io(err))
}

#[cfg(unix)]
async fn kill_tree(pid: u32) -> Result<()> {
    kill_tree_blocking(pid)
}

#[cfg(windows)]
fn kill_tree_blocking(pid: u32) -> Result<()> {
    let status = std::process::Command::new("taskkill")
        .args(["/pid", &pid.to_string(), "/T", "/F"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::Io(std::io::Error::other(format!(
            "taskkill for {} exited with {}",
            pid, status
        ))))
    }
}

#[cfg(windows)]
async fn kill_tree(pid: u32) -> Result<()> {
    let status = tokio::process::Command::new("taskkill")
        .args(["/pid", &pid.to_string(), "/T", "/F"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::Io(std::io::Error::other(format!(
            "taskkill for {} exited with {}",
            pid, status
        ))))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::args::SpawnSpec;

    fn sleep_spec() -> SpawnSpec {
        SpawnSpec {
            args: vec!["30".to_string()],
            env: vec![],
            inherit_stdio: false,
        }
    }

    #[tokio::test]
    async fn test_kill_reaps_the_process() {
        let process = ApplicationProcess::spawn(Path::new("/bin/sleep"), sleep_spec()).unwrap();
        assert!(process.pid() > 0);
        assert!(!process.has_exited());

        process.kill().await.unwrap();
        process.wait().await;
        assert!(process.has_exited());
    }

    #[tokio::test]
    async fn test_kill_after_exit_is_a_noop() {
        let spec = SpawnSpec {
            args: vec!["0".to_string()],
            env: vec![],
            inherit_stdio: false,
        };
        let process = ApplicationProcess::spawn(Path::new("/bin/sleep"), spec).unwrap();
        process.wait().await;
        assert!(process.has_exited());
        process.kill().await.unwrap();
    }

    #[tokio::test]
    async fn test_spawn_failure_is_launch_failed() {
        let err =
            ApplicationProcess::spawn(Path::new("/nonexistent/editor"), sleep_spec()).unwrap_err();
        assert!(matches!(err, Error::LaunchFailed(_)));
    }
}
