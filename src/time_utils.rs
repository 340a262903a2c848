// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.
//!
//! Wall-clock access goes through [`Clock`] so token expiry and "today"
//! defaults can be driven from tests without sleeping.

use crate::error::{AppError, Result};
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Mutex;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Half-open UTC interval `[start, end)` used for provider range queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// The local calendar day `date` in `tz`.
    pub fn day(date: NaiveDate, tz: Tz) -> Self {
        Self::days_ending(date, 1, tz)
    }

    /// `days` local calendar days ending with (and including) `date`.
    ///
    /// Clamps at the ends of the representable calendar instead of overflowing.
    pub fn days_ending(date: NaiveDate, days: u32, tz: Tz) -> Self {
        let first = date
            .checked_sub_days(Days::new(u64::from(days.max(1)) - 1))
            .unwrap_or(NaiveDate::MIN);
        let after_last = date.succ_opt().unwrap_or(NaiveDate::MAX);
        Self {
            start: local_midnight(first, tz),
            end: local_midnight(after_last, tz),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// UTC instant of local midnight on `date` in `tz`.
///
/// Days that start inside a DST gap begin at the first valid local instant.
fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    match tz.from_local_datetime(&midnight) {
        chrono::LocalResult::Single(dt) => dt.with_timezone(&Utc),
        chrono::LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        chrono::LocalResult::None => tz
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight)),
    }
}

/// The current local date in `tz`.
pub fn today(clock: &dyn Clock, tz: Tz) -> NaiveDate {
    clock.now().with_timezone(&tz).date_naive()
}

/// Earliest year a tool will look up. WHOOP holds no data before it.
pub const EARLIEST_YEAR: i32 = 2000;

/// Resolve an optional `YYYY-MM-DD` argument to a local date.
///
/// `None` means today. Future dates and dates before [`EARLIEST_YEAR`] are rejected.
pub fn resolve_date(arg: Option<&str>, clock: &dyn Clock, tz: Tz) -> Result<NaiveDate> {
    let today = today(clock, tz);
    let Some(raw) = arg.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(today);
    };

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::InvalidArgument(format!("date must be YYYY-MM-DD, got {:?}", raw))
    })?;

    if date > today {
        return Err(AppError::InvalidArgument(format!(
            "date {} is in the future (today is {})",
            date, today
        )));
    }

    if date.year() < EARLIEST_YEAR {
        return Err(AppError::InvalidArgument(format!(
            "date {} is before {}",
            date, EARLIEST_YEAR
        )));
    }

    Ok(date)
}

/// Format an instant as local `HH:MM` in `tz`.
pub fn format_local_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}
