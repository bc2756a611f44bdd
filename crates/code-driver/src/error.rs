// Error types for code-driver

use thiserror::Error;

/// Result type alias for code-driver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when launching and connecting to the application
#[derive(Debug, Error)]
pub enum Error {
    /// The host operating system is not in the supported set
    ///
    /// Path and executable resolution only knows macOS, Linux and Windows.
    /// There is no fallback layout for anything else.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Failed to spawn the application process
    ///
    /// Common causes: the executable path does not exist (missing build
    /// output), or insufficient permissions.
    /// Details: {0}
    #[error("Failed to launch application: {0}")]
    LaunchFailed(String),

    /// The driver connection retry budget was exhausted
    ///
    /// Carries the error from the final attempt. The spawned process has
    /// already been torn down (best effort) by the time this surfaces.
    #[error("Failed to connect to the driver after {attempts} attempts: {source}")]
    ConnectionFailed {
        attempts: u32,
        #[source]
        source: ConnectError,
    },

    /// A path could not be converted to the form an argument requires
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Product descriptor parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors produced by a [`Connect`](crate::driver::Connect) implementation.
///
/// The retry loop treats `EndpointNotReady` as the expected condition during
/// the startup window and stays quiet about it; anything else is logged on
/// every occurrence but still retried, because a connector cannot tell a
/// permanently-fatal error from a transient one without protocol knowledge.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Nothing is listening behind the endpoint yet
    #[error("driver endpoint is not listening yet")]
    EndpointNotReady,

    /// Any other connection failure (bad path, permissions, protocol)
    #[error("driver connection failed: {0}")]
    Other(String),
}

impl ConnectError {
    /// Maps a transport-level I/O error into the tagged taxonomy.
    ///
    /// A missing socket file or pipe name surfaces as `NotFound`, which is
    /// exactly the "listener does not exist yet" startup race.
    pub fn from_io(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ConnectError::EndpointNotReady
        } else {
            ConnectError::Other(err.to_string())
        }
    }
}
