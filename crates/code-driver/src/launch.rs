// Launch orchestration
//
// Ties the pieces together: resolve paths, allocate an endpoint, build the
// spawn environment, start the process, then retry the driver connection
// until it is up or the budget is gone. A LaunchResult only ever exists once
// the driver session does; on failure the process is torn down first.

use crate::connect::connect_with_retry;
use crate::driver::{Connect, DriverSession, IpcConnector};
use crate::endpoint::Endpoint;
use crate::extensions::{ExtensionCopier, FsExtensionCopier};
use crate::options::LaunchOptions;
use crate::platform::Platform;
use crate::process::ApplicationProcess;
use crate::{args, paths, Result};
use std::sync::Arc;

/// A successfully launched and connected application
#[derive(Debug)]
pub struct LaunchResult {
    /// Handle to the spawned OS process
    pub process: ApplicationProcess,
    /// The established driver session; dispose it when done
    pub driver: Box<dyn DriverSession>,
}

/// Launches application instances with a configurable driver connector and
/// extension copier.
///
/// # Example
///
/// ```ignore
/// use code_driver::{Launcher, LaunchOptions};
///
/// # #[tokio::main]
/// # async fn main() -> code_driver::Result<()> {
/// let options = LaunchOptions::new("/tmp/workspace", "/tmp/data", "/tmp/ext")
///     .build_path("/builds/stable")
///     .verbose(true);
/// let mut result = Launcher::new().launch(options).await?;
/// // ... drive the application ...
/// result.driver.dispose().await?;
/// result.process.kill().await?;
/// # Ok(())
/// # }
/// ```
pub struct Launcher {
    connector: Arc<dyn Connect>,
    extensions: Arc<dyn ExtensionCopier>,
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher {
    /// A launcher with the default transport-level connector and filesystem
    /// extension copier
    pub fn new() -> Self {
        Self {
            connector: Arc::new(IpcConnector),
            extensions: Arc::new(FsExtensionCopier),
        }
    }

    /// A launcher with injected collaborators (protocol-level connectors,
    /// test fakes)
    pub fn with_collaborators(
        connector: Arc<dyn Connect>,
        extensions: Arc<dyn ExtensionCopier>,
    ) -> Self {
        Self {
            connector,
            extensions,
        }
    }

    /// Launches the application described by `options` and connects a
    /// driver session to it.
    ///
    /// # Errors
    ///
    /// - `Error::UnsupportedPlatform` if the host OS is not supported
    /// - `Error::LaunchFailed` if the process cannot be spawned
    /// - `Error::ConnectionFailed` if the driver never became reachable
    ///   within the retry budget (the process has been torn down by then)
    pub async fn launch(&self, options: LaunchOptions) -> Result<LaunchResult> {
        let platform = Platform::current()?;
        let repo_root = match &options.repo_root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };

        let resolved = paths::resolve(platform, options.build_path.as_deref(), &repo_root)?;
        let endpoint = Endpoint::allocate(platform)?;
        tracing::debug!(
            "Launching {} against driver endpoint {}",
            resolved.executable.display(),
            endpoint
        );

        let spec = args::build_spawn_spec(
            &options,
            platform,
            &repo_root,
            &endpoint,
            self.extensions.as_ref(),
        )
        .await?;

        let process = ApplicationProcess::spawn(&resolved.executable, spec)?;

        let teardown_target = &process;
        let driver = connect_with_retry(
            self.connector.as_ref(),
            &resolved.output,
            &endpoint,
            || async move { teardown_target.kill().await },
        )
        .await?;

        Ok(LaunchResult { process, driver })
    }
}

/// Launches with the default collaborators. See [`Launcher::launch`].
pub async fn launch(options: LaunchOptions) -> Result<LaunchResult> {
    Launcher::new().launch(options).await
}
