//! Cryptographically secure random bytes from the operating system.
//!
//! [`OsEntropy`] is a thin pass-through to the kernel CSPRNG of the build
//! target. Nothing is buffered, mixed, or post-processed: each call goes
//! straight to the OS and either fills the whole buffer or returns
//! [`Error::EntropyUnavailable`].
//!
//! ```
//! let mut nonce = [0u8; 12];
//! osprim_core::fill_random(&mut nonce)?;
//!
//! let key: [u8; 32] = osprim_core::random_array()?;
//! # Ok::<(), osprim_core::Error>(())
//! ```

use std::io;

use crate::error::{Error, Result};
use crate::source::{EntropySource, Platform, SourceInfo};
use crate::sys;

/// Tuning for [`OsEntropy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntropyConfig {
    /// Wait for the kernel pool to be seeded (early boot) instead of failing.
    ///
    /// Only the Linux backend can fail fast; with `false` an unseeded pool
    /// surfaces as `EntropyUnavailable` carrying `EAGAIN`. Other backends
    /// always wait.
    pub block_until_seeded: bool,
}

impl EntropyConfig {
    pub const fn new() -> Self {
        Self {
            block_until_seeded: true,
        }
    }
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The operating system's CSPRNG.
#[derive(Debug, Clone)]
pub struct OsEntropy {
    info: SourceInfo,
    config: EntropyConfig,
}

impl OsEntropy {
    /// OS entropy with the default configuration.
    pub const fn new() -> Self {
        Self::with_config(EntropyConfig::new())
    }

    pub const fn with_config(config: EntropyConfig) -> Self {
        Self {
            info: SourceInfo {
                name: "os_entropy",
                description: "Kernel CSPRNG of the build target",
                platform: Platform::current(),
                backend: sys::ENTROPY_BACKEND,
            },
            config,
        }
    }

    pub fn config(&self) -> &EntropyConfig {
        &self.config
    }
}

impl Default for OsEntropy {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for OsEntropy {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        sys::fill_bytes(buf, &self.config)
    }
}

static DEFAULT_SOURCE: OsEntropy = OsEntropy::new();

/// Fill `buf` with random bytes from the OS CSPRNG.
///
/// An empty buffer is a no-op. On error the buffer contents are unspecified.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    DEFAULT_SOURCE.fill(buf)
}

/// Fill `buf` from an arbitrary source, with the same empty-buffer rule as
/// [`fill_random`].
pub fn fill_random_from(source: &dyn EntropySource, buf: &mut [u8]) -> Result<()> {
    if buf.is_empty() {
        return Ok(());
    }
    source.fill(buf)
}

/// A fixed-size array of random bytes, e.g. a key or nonce.
pub fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut out = [0u8; N];
    fill_random(&mut out)?;
    Ok(out)
}

/// Drive a read primitive until all of `buf` is written.
///
/// `read` is handed the unfilled tail and returns how many bytes it wrote.
/// Short reads continue from where they stopped and `Interrupted` errors are
/// retried. Any other error, a zero-length read, or a read claiming more
/// bytes than it was offered ends the loop with
/// [`Error::EntropyUnavailable`] attributed to `backend`.
pub fn fill_exact<F>(buf: &mut [u8], backend: &'static str, mut read: F) -> Result<()>
where
    F: FnMut(&mut [u8]) -> io::Result<usize>,
{
    let mut filled = 0;
    while filled < buf.len() {
        let remaining = buf.len() - filled;
        match read(&mut buf[filled..]) {
            Ok(n) if n > 0 && n <= remaining => {
                if n < remaining {
                    log::trace!("{backend}: short read {n}/{remaining} bytes");
                }
                filled += n;
            }
            Ok(n) => {
                log::debug!("{backend}: bogus read length {n} for {remaining} bytes");
                return Err(Error::entropy(backend, None));
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                log::trace!("{backend}: interrupted, retrying");
            }
            Err(err) => {
                log::debug!("{backend}: {err}");
                return Err(Error::entropy_io(backend, &err));
            }
        }
    }
    Ok(())
}
