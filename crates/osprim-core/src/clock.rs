//! Monotonic high-resolution clock in nanoseconds.
//!
//! A [`Timestamp`] counts nanoseconds from an unspecified, platform-defined
//! epoch (usually boot). Readings only ever compare meaningfully against
//! other readings from the same machine during the same boot.

use std::sync::OnceLock;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::source::{Platform, SourceInfo, TimeSource};
use crate::sys;

pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Nanoseconds since an arbitrary per-boot epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Nanoseconds from `earlier` to `self`, or 0 if `earlier` is later.
    pub const fn saturating_nanos_since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Elapsed time from `earlier` to `self`, saturating at zero.
    pub const fn duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_nanos(self.saturating_nanos_since(earlier))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

impl From<Timestamp> for u64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

/// `secs * 1e9 + nanos`, saturating. Negative parts count as zero.
pub fn timespec_to_nanos(secs: i64, nanos: i64) -> u64 {
    let secs = u64::try_from(secs).unwrap_or(0);
    let nanos = u64::try_from(nanos).unwrap_or(0);
    secs.saturating_mul(NANOS_PER_SEC).saturating_add(nanos)
}

/// Convert a counter reading at `frequency` ticks/second to nanoseconds.
///
/// The product is formed in 128 bits, so counters of any size convert
/// without overflow or the precision loss of a float round-trip. Results
/// past `u64::MAX` (584 years of uptime) saturate. A zero frequency yields 0.
pub fn ticks_to_nanos(ticks: u64, frequency: u64) -> u64 {
    if frequency == 0 {
        return 0;
    }
    let nanos = u128::from(ticks) * u128::from(NANOS_PER_SEC) / u128::from(frequency);
    u64::try_from(nanos).unwrap_or(u64::MAX)
}

/// The platform's monotonic timer.
#[derive(Debug)]
pub struct MonotonicClock {
    info: SourceInfo,
    raw: sys::RawClock,
}

impl MonotonicClock {
    /// Open the platform timer and check that it can be read.
    ///
    /// Fails with [`Error::ClockUnavailable`] if the target has no monotonic
    /// timer or the timer reports an unusable frequency.
    pub fn new() -> Result<Self> {
        let raw = sys::RawClock::open()?;
        log::debug!(
            "monotonic clock: {} at {} Hz",
            sys::CLOCK_BACKEND,
            raw.frequency_hz()
        );
        Ok(Self {
            info: SourceInfo {
                name: "monotonic_clock",
                description: "Monotonic high-resolution OS timer",
                platform: Platform::current(),
                backend: sys::CLOCK_BACKEND,
            },
            raw,
        })
    }

    /// Current reading.
    ///
    /// # Panics
    /// Panics if the OS timer fails after [`MonotonicClock::new`]
    /// succeeded, which indicates a fatal platform issue.
    pub fn now(&self) -> Timestamp {
        Timestamp(self.raw.read())
    }

    /// Ticks per second of the underlying counter.
    pub fn frequency_hz(&self) -> u64 {
        self.raw.frequency_hz()
    }

    /// Time elapsed since `earlier`, saturating at zero.
    pub fn elapsed_since(&self, earlier: Timestamp) -> Duration {
        self.now().duration_since(earlier)
    }
}

impl TimeSource for MonotonicClock {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn now(&self) -> Timestamp {
        MonotonicClock::now(self)
    }
}

static SYSTEM_CLOCK: OnceLock<Result<MonotonicClock>> = OnceLock::new();

/// The process-wide clock, opened on first use.
///
/// The outcome of that first open is kept: a target without a timer reports
/// `ClockUnavailable` on every call.
pub fn system_clock() -> Result<&'static MonotonicClock> {
    SYSTEM_CLOCK
        .get_or_init(MonotonicClock::new)
        .as_ref()
        .map_err(|err: &Error| *err)
}

/// Current monotonic time in nanoseconds.
///
/// Only the first call can fail (with `ClockUnavailable`); after a successful
/// open every later read succeeds.
pub fn now_nanos() -> Result<Timestamp> {
    system_clock().map(MonotonicClock::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timespec_to_nanos() {
        assert_eq!(timespec_to_nanos(0, 0), 0);
        assert_eq!(timespec_to_nanos(1, 5), 1_000_000_005);
        assert_eq!(timespec_to_nanos(12, 999_999_999), 12_999_999_999);
    }

    #[test]
    fn test_timespec_to_nanos_saturates() {
        assert_eq!(timespec_to_nanos(i64::MAX, 0), u64::MAX);
        assert_eq!(timespec_to_nanos(-1, -1), 0);
    }

    #[test]
    fn test_ticks_to_nanos_common_frequencies() {
        // 10 MHz, the usual QPC frequency on Windows 10+.
        assert_eq!(ticks_to_nanos(10_000_000, 10_000_000), NANOS_PER_SEC);
        assert_eq!(ticks_to_nanos(1, 10_000_000), 100);
        // 24 MHz Apple Silicon counter.
        assert_eq!(ticks_to_nanos(24_000_000, 24_000_000), NANOS_PER_SEC);
        assert_eq!(ticks_to_nanos(3, 24_000_000), 125);
        // TSC-derived 3.579545 MHz ACPI PM timer.
        assert_eq!(ticks_to_nanos(3_579_545, 3_579_545), NANOS_PER_SEC);
    }

    #[test]
    fn test_ticks_to_nanos_large_counter_no_overflow() {
        // A year of uptime at 10 MHz: counter * 1e9 overflows u64, u128 does not.
        let ticks = 10_000_000u64 * 60 * 60 * 24 * 365;
        assert_eq!(ticks_to_nanos(ticks, 10_000_000), NANOS_PER_SEC * 60 * 60 * 24 * 365);
    }

    #[test]
    fn test_ticks_to_nanos_saturates_and_zero_frequency() {
        assert_eq!(ticks_to_nanos(u64::MAX, 1), u64::MAX);
        assert_eq!(ticks_to_nanos(1234, 0), 0);
    }

    #[test]
    fn test_ticks_to_nanos_monotone() {
        let freq = 3_579_545;
        let mut last = 0;
        for ticks in (0..1_000_000u64).step_by(7) {
            let n = ticks_to_nanos(ticks, freq);
            assert!(n >= last);
            last = n;
        }
    }

    #[test]
    fn test_timestamp_arithmetic() {
        let a = Timestamp::from_nanos(1_000);
        let b = Timestamp::from_nanos(4_500);
        assert_eq!(b.saturating_nanos_since(a), 3_500);
        assert_eq!(a.saturating_nanos_since(b), 0);
        assert_eq!(b.duration_since(a), Duration::from_nanos(3_500));
        assert_eq!(a.duration_since(b), Duration::ZERO);
        assert!(a < b);
        assert_eq!(u64::from(b), 4_500);
        assert_eq!(b.to_string(), "4500ns");
    }

    #[cfg(any(unix, windows))]
    #[test]
    fn test_clock_is_monotonic() {
        let clock = MonotonicClock::new().unwrap();
        let mut last = clock.now();
        for _ in 0..10_000 {
            let t = clock.now();
            assert!(t >= last, "clock went backwards: {last} -> {t}");
            last = t;
        }
    }

    #[cfg(any(unix, windows))]
    #[test]
    fn test_clock_info() {
        let clock = MonotonicClock::new().unwrap();
        assert_eq!(clock.name(), "monotonic_clock");
        assert_eq!(clock.info().backend, sys::CLOCK_BACKEND);
        assert!(clock.frequency_hz() > 0);
    }

    #[cfg(any(unix, windows))]
    #[test]
    fn test_now_nanos_uses_shared_clock() {
        let a = now_nanos().unwrap();
        let b = system_clock().unwrap().now();
        assert!(b >= a);
    }

    #[cfg(not(any(unix, windows)))]
    #[test]
    fn test_clock_unavailable() {
        assert!(MonotonicClock::new().unwrap_err().is_clock());
        assert!(now_nanos().unwrap_err().is_clock());
    }
}
