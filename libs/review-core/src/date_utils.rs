//! Date utilities for daily reset hour handling.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};

/// Get the study day for a given local time.
///
/// Before `daily_reset_hour` the study day is still the previous calendar
/// day, so a late-night session counts towards the day it started on.
pub fn study_day(now: NaiveDateTime, daily_reset_hour: u32) -> NaiveDate {
    if now.hour() < daily_reset_hour {
        (now - Duration::days(1)).date()
    } else {
        now.date()
    }
}

/// Get adjusted "today" based on daily_reset_hour.
pub fn get_adjusted_today(daily_reset_hour: u32) -> NaiveDate {
    study_day(Local::now().naive_local(), daily_reset_hour)
}
