//! Capability traits for the two OS primitives.
//!
//! Every entropy backend implements [`EntropySource`] and every timer backend
//! implements [`TimeSource`]. Exactly one OS implementation of each is
//! compiled in per target; callers see the same contract everywhere.

use crate::clock::Timestamp;
use crate::error::Result;

/// Platform family a backend is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Linux and Android (direct `getrandom(2)` syscall).
    Linux,
    /// Other Unix-like systems (macOS, the BSDs, illumos, ...).
    Unix,
    /// Windows (CryptoAPI provider, performance counter).
    Windows,
    /// A target with no native backend.
    Unsupported,
}

impl Platform {
    /// Platform family of the current build target.
    pub const fn current() -> Self {
        if cfg!(any(target_os = "linux", target_os = "android")) {
            Self::Linux
        } else if cfg!(unix) {
            Self::Unix
        } else if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unsupported
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Unix => write!(f, "unix"),
            Self::Windows => write!(f, "windows"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Metadata about a backend.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// Unique identifier (e.g. `"os_entropy"`).
    pub name: &'static str,
    /// One-line human-readable description.
    pub description: &'static str,
    /// Platform family this backend targets.
    pub platform: Platform,
    /// The OS call doing the work (e.g. `"clock_gettime(CLOCK_MONOTONIC)"`).
    pub backend: &'static str,
}

/// A source of cryptographically secure random bytes.
pub trait EntropySource: Send + Sync {
    /// Source metadata.
    fn info(&self) -> &SourceInfo;

    /// Overwrite every byte of `buf` with random data.
    ///
    /// On `Err` the contents of `buf` are unspecified and must not be used.
    fn fill(&self, buf: &mut [u8]) -> Result<()>;

    /// Convenience: name from info.
    fn name(&self) -> &'static str {
        self.info().name
    }
}

/// A monotonic nanosecond timer.
///
/// Construction is where a timer may fail; once a `TimeSource` exists,
/// reading it cannot.
pub trait TimeSource: Send + Sync {
    /// Source metadata.
    fn info(&self) -> &SourceInfo;

    /// Current reading. Never smaller than an earlier reading from the same source.
    fn now(&self) -> Timestamp;

    /// Convenience: name from info.
    fn name(&self) -> &'static str {
        self.info().name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_display() {
        assert_eq!(Platform::Linux.to_string(), "linux");
        assert_eq!(Platform::Unix.to_string(), "unix");
        assert_eq!(Platform::Windows.to_string(), "windows");
        assert_eq!(Platform::Unsupported.to_string(), "unsupported");
    }

    #[test]
    fn test_current_platform_matches_target() {
        let p = Platform::current();
        #[cfg(target_os = "linux")]
        assert_eq!(p, Platform::Linux);
        #[cfg(target_os = "macos")]
        assert_eq!(p, Platform::Unix);
        #[cfg(windows)]
        assert_eq!(p, Platform::Windows);
        let _ = p;
    }
}
