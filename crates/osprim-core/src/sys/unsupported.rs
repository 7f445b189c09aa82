//! Targets with no native monotonic timer.

use crate::error::{Error, Result};

pub(crate) const CLOCK_BACKEND: &str = "none";

/// Uninhabited: no clock can be opened on this target.
#[derive(Debug)]
pub(crate) enum RawClock {}

impl RawClock {
    pub(crate) fn open() -> Result<Self> {
        Err(Error::clock(CLOCK_BACKEND, "no monotonic timer on this target"))
    }

    pub(crate) fn read(&self) -> u64 {
        match *self {}
    }

    pub(crate) fn frequency_hz(&self) -> u64 {
        match *self {}
    }
}
