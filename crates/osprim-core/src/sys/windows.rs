//! Windows backends: the CryptoAPI provider for entropy and the performance
//! counter for time.
//!
//! A provider context is acquired per call and released by [`Provider`]'s
//! `Drop`, so it is returned to the OS on the success path and on every
//! error path alike.

use std::io;

use windows_sys::Win32::Security::Cryptography::{
    CRYPT_VERIFYCONTEXT, CryptAcquireContextW, CryptGenRandom, CryptReleaseContext,
    PROV_RSA_FULL,
};
use windows_sys::Win32::System::Performance::{QueryPerformanceCounter, QueryPerformanceFrequency};

use crate::clock::ticks_to_nanos;
use crate::entropy::{EntropyConfig, fill_exact};
use crate::error::{Error, Result};

pub(crate) const ENTROPY_BACKEND: &str = "CryptGenRandom";
pub(crate) const CLOCK_BACKEND: &str = "QueryPerformanceCounter";

// ---------------------------------------------------------------------------
// Entropy
// ---------------------------------------------------------------------------

/// An acquired CryptoAPI provider context, released on drop.
struct Provider(usize);

impl Provider {
    fn acquire() -> Result<Self> {
        let mut handle: usize = 0;
        // SAFETY: `handle` is a valid out-pointer; null container and provider
        // names select the default provider, and CRYPT_VERIFYCONTEXT asks for
        // an ephemeral context with no key container.
        let ok = unsafe {
            CryptAcquireContextW(
                &mut handle,
                std::ptr::null(),
                std::ptr::null(),
                PROV_RSA_FULL,
                CRYPT_VERIFYCONTEXT,
            )
        };
        if ok == 0 {
            return Err(Error::entropy_io(
                "CryptAcquireContextW",
                &io::Error::last_os_error(),
            ));
        }
        Ok(Self(handle))
    }

    fn gen_random(&self, chunk: &mut [u8]) -> io::Result<usize> {
        let len = u32::try_from(chunk.len()).unwrap_or(u32::MAX);
        // SAFETY: `chunk` has at least `len` writable bytes and `self.0` is a
        // live provider context.
        let ok = unsafe { CryptGenRandom(self.0, len, chunk.as_mut_ptr()) };
        if ok == 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(len as usize)
        }
    }
}

impl Drop for Provider {
    fn drop(&mut self) {
        // SAFETY: `self.0` came from a successful CryptAcquireContextW and is
        // released exactly once.
        if unsafe { CryptReleaseContext(self.0, 0) } == 0 {
            log::warn!(
                "CryptReleaseContext failed: {}",
                io::Error::last_os_error()
            );
        }
    }
}

pub(crate) fn fill_bytes(buf: &mut [u8], _config: &EntropyConfig) -> Result<()> {
    if buf.is_empty() {
        return Ok(());
    }
    let provider = Provider::acquire()?;
    fill_exact(buf, ENTROPY_BACKEND, |chunk| provider.gen_random(chunk))
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Performance counter with its tick frequency, read once at open.
///
/// The frequency is fixed at boot and identical on all processors.
#[derive(Debug)]
pub(crate) struct RawClock {
    frequency: u64,
}

impl RawClock {
    pub(crate) fn open() -> Result<Self> {
        let mut frequency: i64 = 0;
        // SAFETY: valid out-pointer.
        if unsafe { QueryPerformanceFrequency(&mut frequency) } == 0 {
            return Err(Error::clock("QueryPerformanceFrequency", "call failed"));
        }
        let frequency = u64::try_from(frequency).unwrap_or(0);
        if frequency == 0 {
            return Err(Error::clock(
                "QueryPerformanceFrequency",
                "counter frequency is zero",
            ));
        }

        let mut counter: i64 = 0;
        // SAFETY: valid out-pointer.
        if unsafe { QueryPerformanceCounter(&mut counter) } == 0 {
            return Err(Error::clock(CLOCK_BACKEND, "call failed"));
        }
        Ok(Self { frequency })
    }

    pub(crate) fn read(&self) -> u64 {
        let mut counter: i64 = 0;
        // SAFETY: valid out-pointer. Cannot fail on XP and later once the
        // frequency query succeeded.
        unsafe { QueryPerformanceCounter(&mut counter) };
        ticks_to_nanos(u64::try_from(counter).unwrap_or(0), self.frequency)
    }

    pub(crate) fn frequency_hz(&self) -> u64 {
        self.frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_acquire_and_release() {
        let provider = Provider::acquire().unwrap();
        let mut buf = [0u8; 32];
        assert_eq!(provider.gen_random(&mut buf).unwrap(), 32);
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_clock_frequency_nonzero() {
        let clock = RawClock::open().unwrap();
        assert!(clock.frequency_hz() > 0);
        let a = clock.read();
        let b = clock.read();
        assert!(b >= a);
    }
}
