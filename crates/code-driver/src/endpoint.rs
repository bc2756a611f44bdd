// IPC endpoint allocation
//
// One fresh endpoint per launch. Windows addresses a named pipe namespace;
// everywhere else the address is a filesystem path that the application will
// bind a socket to. Randomness only has to avoid collisions between
// concurrent test runs, nothing stronger.

use crate::platform::Platform;
use crate::Result;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

const SUFFIX_LEN: usize = 15;

/// The IPC address the driver connects through
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    /// Allocates a fresh, collision-resistant endpoint for `platform`.
    ///
    /// On Windows this is a named-pipe path with a random alphanumeric
    /// suffix. On macOS/Linux it is a path under the temp directory that is
    /// guaranteed not to currently exist; the application creates the socket
    /// there, this function never touches the filesystem beyond the
    /// existence probe.
    pub fn allocate(platform: Platform) -> Result<Self> {
        match platform {
            Platform::Windows => Ok(Endpoint(format!(
                r"\\.\pipe\code-driver-{}",
                random_suffix()
            ))),
            Platform::MacOs | Platform::Linux => {
                let tmp = std::env::temp_dir();
                loop {
                    let candidate = tmp.join(format!("code-driver-{}.sock", random_suffix()));
                    if !candidate.exists() {
                        return Ok(Endpoint(candidate.to_string_lossy().into_owned()));
                    }
                }
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn random_suffix() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect()
}
