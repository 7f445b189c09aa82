//! Platform detection and backend discovery.

use crate::source::Platform;
use crate::sys;

/// Which OS calls this build answers with.
pub fn backend_info() -> BackendInfo {
    BackendInfo {
        system: std::env::consts::OS.to_string(),
        machine: std::env::consts::ARCH.to_string(),
        family: std::env::consts::FAMILY.to_string(),
        platform: Platform::current(),
        entropy_backend: sys::ENTROPY_BACKEND,
        clock_backend: sys::CLOCK_BACKEND,
    }
}

#[derive(Debug, Clone)]
pub struct BackendInfo {
    pub system: String,
    pub machine: String,
    pub family: String,
    pub platform: Platform,
    pub entropy_backend: &'static str,
    pub clock_backend: &'static str,
}

impl std::fmt::Display for BackendInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} ({}): entropy via {}, clock via {}",
            self.system, self.machine, self.platform, self.entropy_backend, self.clock_backend
        )
    }
}
