//! Linux / Android entropy: the `getrandom(2)` system call, invoked directly.
//!
//! Short reads (requests above 32 MiB, or a signal landing mid-call) and
//! `EINTR` are retried by [`fill_exact`]. Every other error is returned.
//! Kernels older than 3.17, or sandboxes whose seccomp filter rejects the
//! syscall, answer `ENOSYS`; with the `urandom-fallback` feature those reads
//! are served from `/dev/urandom` instead.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::entropy::{EntropyConfig, fill_exact};
use crate::error::{Error, Result};

pub(crate) const ENTROPY_BACKEND: &str = "getrandom(2) syscall";

/// Set once the kernel has answered `ENOSYS`; later calls skip the syscall.
static SYSCALL_MISSING: AtomicBool = AtomicBool::new(false);

pub(crate) fn fill_bytes(buf: &mut [u8], config: &EntropyConfig) -> Result<()> {
    let flags = if config.block_until_seeded {
        0
    } else {
        libc::GRND_NONBLOCK
    };
    fill_bytes_with(buf, flags, &SYSCALL_MISSING, getrandom_syscall)
}

/// `fill_bytes` over an arbitrary syscall and `ENOSYS` latch.
fn fill_bytes_with<F>(
    buf: &mut [u8],
    flags: libc::c_uint,
    syscall_missing: &AtomicBool,
    mut syscall: F,
) -> Result<()>
where
    F: FnMut(&mut [u8], libc::c_uint) -> std::io::Result<usize>,
{
    if syscall_missing.load(Ordering::Relaxed) {
        return urandom_fallback(buf);
    }

    match fill_exact(buf, ENTROPY_BACKEND, |chunk| syscall(chunk, flags)) {
        Err(err) if err.raw_os_error() == Some(libc::ENOSYS) => {
            syscall_missing.store(true, Ordering::Relaxed);
            urandom_fallback(buf)
        }
        other => other,
    }
}

fn getrandom_syscall(chunk: &mut [u8], flags: libc::c_uint) -> std::io::Result<usize> {
    // SAFETY: `chunk` is an exclusively borrowed, writable region of exactly
    // `chunk.len()` bytes; the kernel writes at most that many.
    let ret = unsafe {
        libc::syscall(
            libc::SYS_getrandom,
            chunk.as_mut_ptr(),
            chunk.len(),
            flags,
        )
    };
    if ret < 0 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(ret as usize)
    }
}

#[cfg(feature = "urandom-fallback")]
fn urandom_fallback(buf: &mut [u8]) -> Result<()> {
    use std::io::Read;

    const URANDOM: &str = "/dev/urandom";
    static WARNED: AtomicBool = AtomicBool::new(false);

    if !WARNED.swap(true, Ordering::Relaxed) {
        log::warn!("getrandom(2) unavailable (ENOSYS), reading {URANDOM} instead");
    }
    let mut file = std::fs::File::open(URANDOM).map_err(|e| Error::entropy_io(URANDOM, &e))?;
    fill_exact(buf, URANDOM, |chunk| file.read(chunk))
}

#[cfg(not(feature = "urandom-fallback"))]
fn urandom_fallback(_buf: &mut [u8]) -> Result<()> {
    Err(Error::entropy(ENTROPY_BACKEND, Some(libc::ENOSYS)))
}
