//! Error type shared by the entropy and clock primitives.
//!
//! Both failure modes are rare, OS-level, and not recoverable inside this
//! crate. They are returned to the caller, who decides whether to abort,
//! fall back, or retry at a higher level.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of an OS primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The OS entropy source could not be reached or reported an error.
    EntropyUnavailable {
        /// Backend that failed (e.g. `"getrandom(2) syscall"`).
        backend: &'static str,
        /// Raw OS error code, when the backend reported one.
        code: Option<i32>,
    },
    /// The platform monotonic timer could not be read or initialized.
    ClockUnavailable {
        /// Backend that failed (e.g. `"QueryPerformanceCounter"`).
        backend: &'static str,
        /// Short description of what went wrong.
        reason: &'static str,
    },
}

impl Error {
    pub(crate) fn entropy(backend: &'static str, code: Option<i32>) -> Self {
        Self::EntropyUnavailable { backend, code }
    }

    pub(crate) fn entropy_io(backend: &'static str, err: &std::io::Error) -> Self {
        Self::EntropyUnavailable {
            backend,
            code: err.raw_os_error(),
        }
    }

    pub(crate) fn clock(backend: &'static str, reason: &'static str) -> Self {
        Self::ClockUnavailable { backend, reason }
    }

    /// The raw OS error code behind this failure, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::EntropyUnavailable { code, .. } => *code,
            Self::ClockUnavailable { .. } => None,
        }
    }

    /// Whether this is an entropy failure.
    pub fn is_entropy(&self) -> bool {
        matches!(self, Self::EntropyUnavailable { .. })
    }

    /// Whether this is a clock failure.
    pub fn is_clock(&self) -> bool {
        matches!(self, Self::ClockUnavailable { .. })
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntropyUnavailable {
                backend,
                code: Some(code),
            } => {
                let os = std::io::Error::from_raw_os_error(*code);
                write!(f, "entropy unavailable: {backend} failed: {os}")
            }
            Self::EntropyUnavailable { backend, code: None } => {
                write!(f, "entropy unavailable: {backend} failed")
            }
            Self::ClockUnavailable { backend, reason } => {
                write!(f, "clock unavailable: {backend}: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<getrandom::Error> for Error {
    fn from(err: getrandom::Error) -> Self {
        Self::EntropyUnavailable {
            backend: "getrandom crate",
            code: err.raw_os_error(),
        }
    }
}
