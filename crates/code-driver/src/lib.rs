//! code-driver: launch a Code-style desktop editor for automated testing
//!
//! This crate launches the application binary with a deterministic, isolated
//! runtime environment (scoped user-data/extensions directories, telemetry
//! and updates disabled) and establishes a driver connection to it over an
//! inter-process channel, tolerating the race between process startup and
//! the driver listener becoming ready.
//!
//! # Example
//!
//! ```ignore
//! use code_driver::{launch, LaunchOptions};
//!
//! #[tokio::main]
//! async fn main() -> code_driver::Result<()> {
//!     let options = LaunchOptions::new(
//!         "/tmp/smoke/workspace",
//!         "/tmp/smoke/user-data",
//!         "/tmp/smoke/extensions",
//!     )
//!     .build_path("/builds/code-stable");
//!
//!     let mut result = launch(options).await?;
//!     // ... drive the application through result.driver ...
//!     result.driver.dispose().await?;
//!     result.process.kill().await?;
//!     Ok(())
//! }
//! ```
//!
//! The driver protocol itself is not part of this crate: the default
//! [`IpcConnector`] only establishes the transport-level stream. Protocol
//! clients plug in through the [`Connect`] trait via
//! [`Launcher::with_collaborators`].

mod args;
mod connect;
mod endpoint;
mod error;
mod options;
mod paths;
mod platform;
mod process;

pub mod driver;
pub mod extensions;
pub mod shutdown;

mod launch;

pub use connect::{CONNECT_RETRY_DELAY, MAX_CONNECT_ATTEMPTS};
pub use driver::{Connect, DriverSession, IpcConnector};
pub use endpoint::Endpoint;
pub use error::{ConnectError, Error, Result};
pub use extensions::{ExtensionCopier, FsExtensionCopier};
pub use launch::{launch, LaunchResult, Launcher};
pub use options::LaunchOptions;
pub use paths::{resolve as resolve_paths, ResolvedPaths};
pub use platform::Platform;
pub use process::ApplicationProcess;
