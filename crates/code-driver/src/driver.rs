// Driver connection seam
//
// The driver protocol itself lives outside this crate. What the launcher
// needs is narrow: connect(output_path, endpoint) -> session, with failures
// tagged so the retry loop can tell "listener not up yet" from everything
// else. `IpcConnector` is the default transport-level implementation;
// protocol clients substitute their own `Connect`.

use crate::endpoint::Endpoint;
use crate::error::ConnectError;
use crate::Result;
use async_trait::async_trait;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// A live driver session, returned once the endpoint accepted a connection
#[async_trait]
pub trait DriverSession: Send {
    /// Dispose of the session, releasing the underlying connection.
    async fn dispose(&mut self) -> Result<()>;
}

impl std::fmt::Debug for dyn DriverSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn DriverSession")
    }
}

/// Opens a driver session against an endpoint
#[async_trait]
pub trait Connect: Send + Sync {
    /// Attempt one connection to `endpoint`.
    ///
    /// `output_path` is the compiled-output directory of the application;
    /// protocol-level connectors load their driver module from there. Must
    /// return [`ConnectError::EndpointNotReady`] when nothing is listening
    /// yet, so the retry loop can suppress the expected startup noise.
    async fn connect(
        &self,
        output_path: &Path,
        endpoint: &Endpoint,
    ) -> std::result::Result<Box<dyn DriverSession>, ConnectError>;
}

#[cfg(unix)]
type IpcStream = tokio::net::UnixStream;
#[cfg(windows)]
type IpcStream = tokio::net::windows::named_pipe::NamedPipeClient;

/// Transport-level session over the raw IPC stream
pub struct IpcDriverSession {
    stream: IpcStream,
}

#[async_trait]
impl DriverSession for IpcDriverSession {
    async fn dispose(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

/// Default connector: Unix domain socket on macOS/Linux, named pipe client
/// on Windows.
#[derive(Debug, Default)]
pub struct IpcConnector;

#[async_trait]
impl Connect for IpcConnector {
    async fn connect(
        &self,
        output_path: &Path,
        endpoint: &Endpoint,
    ) -> std::result::Result<Box<dyn DriverSession>, ConnectError> {
        tracing::debug!(
            "Dialing driver endpoint {} (output at {})",
            endpoint,
            output_path.display()
        );
        let stream = open_stream(endpoint).await.map_err(ConnectError::from_io)?;
        Ok(Box::new(IpcDriverSession { stream }))
    }
}

#[cfg(unix)]
async fn open_stream(endpoint: &Endpoint) -> std::io::Result<IpcStream> {
    tokio::net::UnixStream::connect(endpoint.as_str()).await
}

#[cfg(windows)]
async fn open_stream(endpoint: &Endpoint) -> std::io::Result<IpcStream> {
    tokio::net::windows::named_pipe::ClientOptions::new().open(endpoint.as_str())
}
