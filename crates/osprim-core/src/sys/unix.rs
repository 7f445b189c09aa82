//! Unix monotonic clock: `clock_gettime(CLOCK_MONOTONIC)`.

use std::mem::MaybeUninit;

use crate::clock::{NANOS_PER_SEC, timespec_to_nanos};
use crate::error::{Error, Result};

pub(crate) const CLOCK_BACKEND: &str = "clock_gettime(CLOCK_MONOTONIC)";

/// Handle to the kernel's monotonic clock. Holds no OS resources.
#[derive(Debug)]
pub(crate) struct RawClock;

impl RawClock {
    pub(crate) fn open() -> Result<Self> {
        read_monotonic()
            .map(|_| Self)
            .map_err(|_| Error::clock(CLOCK_BACKEND, "CLOCK_MONOTONIC is not supported"))
    }

    pub(crate) fn read(&self) -> u64 {
        // CLOCK_MONOTONIC fails only with EINVAL (ruled out by `open`) or
        // EFAULT (impossible with a local timespec).
        read_monotonic().expect("clock_gettime(CLOCK_MONOTONIC) failed after a successful open")
    }

    pub(crate) fn frequency_hz(&self) -> u64 {
        NANOS_PER_SEC
    }
}

fn read_monotonic() -> std::io::Result<u64> {
    let mut tp = MaybeUninit::<libc::timespec>::uninit();
    // SAFETY: `tp` is a valid out-pointer to a timespec; on success the
    // kernel has initialized it.
    let ret = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, tp.as_mut_ptr()) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error());
    }
    // SAFETY: clock_gettime returned 0, so `tp` is initialized.
    let tp = unsafe { tp.assume_init() };
    Ok(timespec_to_nanos(i64::from(tp.tv_sec), i64::from(tp.tv_nsec)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_read() {
        let clock = RawClock::open().unwrap();
        let a = clock.read();
        let b = clock.read();
        assert!(a > 0);
        assert!(b >= a);
    }

    #[test]
    fn test_frequency_is_nanoseconds() {
        let clock = RawClock::open().unwrap();
        assert_eq!(clock.frequency_hz(), 1_000_000_000);
    }
}
