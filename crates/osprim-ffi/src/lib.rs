//! C ABI for osprim.
//!
//! Two fixed-signature exports that native libraries link against by symbol
//! name:
//!
//! ```c
//! void     random_bytes(void *buffer, size_t len);
//! uint64_t current_time_nanos(void);
//! ```
//!
//! Neither signature can report an error, and handing back an unfilled
//! buffer or a made-up time would be worse than stopping. Both therefore log
//! the failure and abort the process. Callers that want to handle failure
//! themselves use the `osprim_*_checked` variants, which return a status
//! code instead. See `include/osprim.h`.

use std::ffi::{c_int, c_void};

use osprim_core::{Error, fill_random, now_nanos};

/// Version of this ABI. Bumped on any change to an exported signature.
pub const OSPRIM_ABI_VERSION: u32 = 1;

pub const OSPRIM_OK: c_int = 0;
pub const OSPRIM_ERR_NULL_POINTER: c_int = -1;
pub const OSPRIM_ERR_ENTROPY_UNAVAILABLE: c_int = -2;
pub const OSPRIM_ERR_CLOCK_UNAVAILABLE: c_int = -3;

fn status_of(err: &Error) -> c_int {
    match err {
        Error::EntropyUnavailable { .. } => OSPRIM_ERR_ENTROPY_UNAVAILABLE,
        Error::ClockUnavailable { .. } => OSPRIM_ERR_CLOCK_UNAVAILABLE,
    }
}

/// Fill `len` bytes at `buffer` from the OS CSPRNG, or report why not.
///
/// # Safety
/// If `len > 0`, `buffer` must be valid for writes of `len` bytes and not
/// accessed by anyone else for the duration of the call.
unsafe fn fill_raw(buffer: *mut c_void, len: usize) -> Result<(), c_int> {
    if len == 0 {
        return Ok(());
    }
    if buffer.is_null() {
        return Err(OSPRIM_ERR_NULL_POINTER);
    }
    // SAFETY: non-null, and the caller guarantees `len` writable bytes.
    let buf = unsafe { std::slice::from_raw_parts_mut(buffer.cast::<u8>(), len) };
    fill_random(buf).map_err(|err| {
        log::error!("random_bytes({len}): {err}");
        status_of(&err)
    })
}

/// Fill `len` bytes at `buffer` with secure random data.
///
/// `len == 0` is a no-op and `buffer` may then be null. Aborts the process if
/// the OS entropy source fails or `buffer` is null with `len > 0`.
///
/// # Safety
/// If `len > 0`, `buffer` must be valid for writes of `len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn random_bytes(buffer: *mut c_void, len: usize) {
    // SAFETY: forwarded caller contract.
    if let Err(status) = unsafe { fill_raw(buffer, len) } {
        log::error!("random_bytes: fatal (status {status}), aborting");
        std::process::abort();
    }
}

/// Current monotonic time in nanoseconds since an arbitrary epoch.
///
/// Aborts the process if the platform has no usable monotonic timer.
#[unsafe(no_mangle)]
pub extern "C" fn current_time_nanos() -> u64 {
    match now_nanos() {
        Ok(ts) => ts.as_nanos(),
        Err(err) => {
            log::error!("current_time_nanos: {err}, aborting");
            std::process::abort();
        }
    }
}

/// Like [`random_bytes`], but returns a status instead of aborting.
///
/// Returns `OSPRIM_OK`, `OSPRIM_ERR_NULL_POINTER` or
/// `OSPRIM_ERR_ENTROPY_UNAVAILABLE`. On error the buffer contents are
/// unspecified.
///
/// # Safety
/// If `len > 0`, `buffer` must be valid for writes of `len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn osprim_random_bytes_checked(buffer: *mut c_void, len: usize) -> c_int {
    // SAFETY: forwarded caller contract.
    match unsafe { fill_raw(buffer, len) } {
        Ok(()) => OSPRIM_OK,
        Err(status) => status,
    }
}

/// Like [`current_time_nanos`], but writes through `out` and returns a status.
///
/// Returns `OSPRIM_OK`, `OSPRIM_ERR_NULL_POINTER` or
/// `OSPRIM_ERR_CLOCK_UNAVAILABLE`. `*out` is only written on success.
///
/// # Safety
/// `out` must be null or valid for a write of one `u64`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn osprim_current_time_nanos_checked(out: *mut u64) -> c_int {
    if out.is_null() {
        return OSPRIM_ERR_NULL_POINTER;
    }
    match now_nanos() {
        Ok(ts) => {
            // SAFETY: non-null and valid per the caller contract.
            unsafe { out.write(ts.as_nanos()) };
            OSPRIM_OK
        }
        Err(err) => {
            log::error!("current_time_nanos: {err}");
            status_of(&err)
        }
    }
}

/// ABI version implemented by this library.
#[unsafe(no_mangle)]
pub extern "C" fn osprim_abi_version() -> u32 {
    OSPRIM_ABI_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_distinct() {
        let codes = [
            OSPRIM_OK,
            OSPRIM_ERR_NULL_POINTER,
            OSPRIM_ERR_ENTROPY_UNAVAILABLE,
            OSPRIM_ERR_CLOCK_UNAVAILABLE,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_status_of_maps_errors() {
        let entropy = Error::EntropyUnavailable {
            backend: "mock",
            code: Some(5),
        };
        let clock = Error::ClockUnavailable {
            backend: "mock",
            reason: "none",
        };
        assert_eq!(status_of(&entropy), OSPRIM_ERR_ENTROPY_UNAVAILABLE);
        assert_eq!(status_of(&clock), OSPRIM_ERR_CLOCK_UNAVAILABLE);
    }

    #[test]
    fn test_fill_raw_null_with_length() {
        let res = unsafe { fill_raw(std::ptr::null_mut(), 16) };
        assert_eq!(res, Err(OSPRIM_ERR_NULL_POINTER));
    }

    #[test]
    fn test_fill_raw_null_zero_length() {
        let res = unsafe { fill_raw(std::ptr::null_mut(), 0) };
        assert_eq!(res, Ok(()));
    }

    #[test]
    fn test_abi_version() {
        assert_eq!(osprim_abi_version(), 1);
    }
}
