// Supported platform set
//
// The launcher only knows three application layouts. Everything branches on
// this closed enum so an unsupported OS fails once, up front, instead of
// producing half-resolved paths.

use crate::{Error, Result};

/// The platforms the application ships on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
}

impl Platform {
    /// Detects the platform the host is running on.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedPlatform` for any OS outside the
    /// supported set.
    pub fn current() -> Result<Self> {
        match std::env::consts::OS {
            "macos" => Ok(Platform::MacOs),
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            other => Err(Error::UnsupportedPlatform(other.to_string())),
        }
    }
}
