//! Per-target OS backends.
//!
//! Exactly one entropy backend and one clock backend are compiled in. Each
//! backend module exposes the same crate-private surface:
//!
//! - `ENTROPY_BACKEND` / `fill_bytes(buf, config)`
//! - `CLOCK_BACKEND` / `RawClock::{open, read, frequency_hz}`
//!
//! | Target              | Entropy                    | Clock                           |
//! |---------------------|----------------------------|---------------------------------|
//! | Linux, Android      | `getrandom(2)` syscall     | `clock_gettime(CLOCK_MONOTONIC)`|
//! | Other Unix          | `getrandom` crate          | `clock_gettime(CLOCK_MONOTONIC)`|
//! | Windows             | CryptoAPI `CryptGenRandom` | `QueryPerformanceCounter`       |
//! | Anything else       | `getrandom` crate          | none (`ClockUnavailable`)       |

#[cfg(any(target_os = "linux", target_os = "android"))]
mod linux;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) use linux::{ENTROPY_BACKEND, fill_bytes};

#[cfg(not(any(target_os = "linux", target_os = "android", windows)))]
mod portable;
#[cfg(not(any(target_os = "linux", target_os = "android", windows)))]
pub(crate) use portable::{ENTROPY_BACKEND, fill_bytes};

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub(crate) use unix::{CLOCK_BACKEND, RawClock};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use windows::{CLOCK_BACKEND, ENTROPY_BACKEND, RawClock, fill_bytes};

#[cfg(not(any(unix, windows)))]
mod unsupported;
#[cfg(not(any(unix, windows)))]
pub(crate) use unsupported::{CLOCK_BACKEND, RawClock};
