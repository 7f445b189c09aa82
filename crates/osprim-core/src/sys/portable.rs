//! Entropy for Unix-likes other than Linux, and for targets with no native
//! backend: the `getrandom` crate, which picks the platform's blessed call
//! (`getentropy` on macOS and OpenBSD, `arc4random_buf` on NetBSD, ...).
//!
//! These calls block only until the kernel pool is seeded, so
//! `EntropyConfig::block_until_seeded` has nothing to toggle here.

use crate::entropy::EntropyConfig;
use crate::error::Result;

pub(crate) const ENTROPY_BACKEND: &str = "getrandom crate";

pub(crate) fn fill_bytes(buf: &mut [u8], _config: &EntropyConfig) -> Result<()> {
    if buf.is_empty() {
        return Ok(());
    }
    getrandom::fill(buf)?;
    Ok(())
}
