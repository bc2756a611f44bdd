// Driver connection retry loop
//
// The application binds its driver listener at some unknowable point after
// spawn; the loop dials once a second until the listener exists or the
// budget runs out. Backoff is deliberately flat: the condition being waited
// on is binary (listener exists or not), so exponential growth only wastes
// wall clock on slow CI machines.

use crate::driver::{Connect, DriverSession};
use crate::endpoint::Endpoint;
use crate::error::ConnectError;
use crate::{Error, Result};
use std::future::Future;
use std::path::Path;
use std::time::Duration;

/// Maximum connection attempts before giving up. Combined with the 1s delay
/// this allows roughly 30 seconds of application startup, sized for slow CI
/// machines.
pub const MAX_CONNECT_ATTEMPTS: u32 = 30;

/// Fixed delay between attempts
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Repeatedly attempts to connect a driver session to `endpoint`.
///
/// On success returns the session. Once the attempt counter exceeds
/// [`MAX_CONNECT_ATTEMPTS`], runs `teardown` (best effort; its failure is
/// logged, never propagated) and surfaces the final attempt's error as
/// [`Error::ConnectionFailed`].
///
/// An [`ConnectError::EndpointNotReady`] failure is the expected condition
/// while the application is still starting and retries silently; any other
/// error is logged on every occurrence but retried all the same — without
/// protocol knowledge the loop cannot tell a permanently-fatal connection
/// error from a transient one.
pub(crate) async fn connect_with_retry<T, F>(
    connector: &dyn Connect,
    output_path: &Path,
    endpoint: &Endpoint,
    teardown: T,
) -> Result<Box<dyn DriverSession>>
where
    T: FnOnce() -> F,
    F: Future<Output = Result<()>>,
{
    let mut attempts: u32 = 0;
    loop {
        match connector.connect(output_path, endpoint).await {
            Ok(session) => {
                tracing::debug!("Driver connected after {} failed attempts", attempts);
                return Ok(session);
            }
            Err(err) => {
                attempts += 1;
                if attempts > MAX_CONNECT_ATTEMPTS {
                    tracing::error!(
                        "Giving up connecting to the driver after {} attempts: {}",
                        attempts,
                        err
                    );
                    if let Err(teardown_err) = teardown().await {
                        tracing::warn!(
                            "Failed to terminate the application after exhausting connection attempts: {}",
                            teardown_err
                        );
                    }
                    return Err(Error::ConnectionFailed {
                        attempts,
                        source: err,
                    });
                }
                if !matches!(err, ConnectError::EndpointNotReady) {
                    tracing::warn!(
                        "Unexpected error connecting to the driver (attempt {}), retrying: {}",
                        attempts,
                        err
                    );
                }
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
        }
    }
}
