//! # osprim-core
//!
//! **The two things a crypto library needs from the OS, and nothing else.**
//!
//! `osprim-core` exposes two stateless primitives backed directly by the
//! operating system:
//!
//! - **Entropy**: fill a buffer with bytes from the kernel CSPRNG.
//! - **Monotonic time**: read a high-resolution, never-decreasing timer in
//!   nanoseconds.
//!
//! ## Quick Start
//!
//! ```no_run
//! use osprim_core::{fill_random, now_nanos};
//!
//! let mut key = [0u8; 32];
//! fill_random(&mut key)?;
//!
//! let start = now_nanos()?;
//! // ... work ...
//! let elapsed = now_nanos()?.duration_since(start);
//! println!("took {elapsed:?}");
//! # Ok::<(), osprim_core::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! caller → EntropySource / TimeSource → sys backend (one per target) → OS
//! ```
//!
//! Exactly one backend per primitive is selected at compile time (see the
//! table in `sys`). Failures are never swallowed: an OS error becomes
//! [`Error::EntropyUnavailable`] or [`Error::ClockUnavailable`].
//!
//! Output is never buffered, mixed, or whitened. Each call is a direct
//! pass-through to the OS.

pub mod clock;
pub mod entropy;
pub mod error;
pub mod platform;
pub mod source;

mod sys;

pub use clock::{
    MonotonicClock, NANOS_PER_SEC, Timestamp, now_nanos, system_clock, ticks_to_nanos,
    timespec_to_nanos,
};
pub use entropy::{
    EntropyConfig, OsEntropy, fill_exact, fill_random, fill_random_from, random_array,
};
pub use error::{Error, Result};
pub use platform::{BackendInfo, backend_info};
pub use source::{EntropySource, Platform, SourceInfo, TimeSource};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
