//! Calendar projection
//!
//! Deterministic mapping of (year, month, posts) onto a month grid of day
//! cells, plus the default scheduling instant for a clicked day. Everything
//! here is a pure function of its inputs; re-running a projection for the
//! same inputs yields an identical grid.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::error::{PostplanError, Result};
use crate::types::Post;

/// One populated day in the month grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub posts: Vec<Post>,
}

/// A month rendered as complete weeks.
///
/// `cells.len()` is always a multiple of seven: `first_weekday` leading
/// `None` entries pad the first week and trailing `None` entries pad the
/// last, so consumers can render row by row without date math.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    /// Weekday of day 1, Sunday = 0.
    pub first_weekday: u32,
    pub cells: Vec<Option<DayCell>>,
}

impl MonthGrid {
    pub fn weeks(&self) -> usize {
        self.cells.len() / 7
    }

    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.cells
            .iter()
            .flatten()
            .find(|cell| cell.day == day)
    }
}

fn invalid_date(year: i32, month: u32, day: u32) -> PostplanError {
    PostplanError::InvalidInput(format!("invalid date: {:04}-{:02}-{:02}", year, month, day))
}

/// Number of days in a civil month.
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let first =
        NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| invalid_date(year, month, 1))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| invalid_date(year, month, 1))?;

    Ok(next.signed_duration_since(first).num_days() as u32)
}

/// Weekday of the first of the month, Sunday = 0.
pub fn first_weekday(year: i32, month: u32) -> Result<u32> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|date| date.weekday().num_days_from_sunday())
        .ok_or_else(|| invalid_date(year, month, 1))
}

/// The calendar date a post lands on: its scheduled instant when set,
/// otherwise its creation instant (drafts), viewed in the owner's offset.
pub fn effective_date(post: &Post, offset: FixedOffset) -> Option<NaiveDate> {
    DateTime::from_timestamp(post.effective_at(), 0)
        .map(|instant| instant.with_timezone(&offset).date_naive())
}

/// Half-open unix-second window `[start, end)` covering one local calendar
/// day in the given offset.
pub fn day_bounds(year: i32, month: u32, day: u32, offset: FixedOffset) -> Result<(i64, i64)> {
    let date =
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| invalid_date(year, month, day))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| invalid_date(year, month, day))?;
    let start = offset
        .from_local_datetime(&midnight)
        .single()
        .ok_or_else(|| invalid_date(year, month, day))?
        .timestamp();

    // A fixed offset has no transitions; days are exactly 86 400 seconds.
    Ok((start, start + 86_400))
}

/// Project a set of posts onto the month grid.
///
/// Cell layout: `first_weekday` leading empty cells, one cell per day
/// 1..=days_in_month, then trailing empty cells up to a full week. Posts
/// keep their input order inside each cell; a post appears in exactly one
/// cell of the month it falls in, and in none otherwise.
pub fn project(year: i32, month: u32, posts: &[Post], offset: FixedOffset) -> Result<MonthGrid> {
    let lead = first_weekday(year, month)?;
    let days = days_in_month(year, month)?;

    let mut cells: Vec<Option<DayCell>> = Vec::with_capacity(((lead + days + 6) / 7 * 7) as usize);
    for _ in 0..lead {
        cells.push(None);
    }
    for day in 1..=days {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| invalid_date(year, month, day))?;
        let day_posts: Vec<Post> = posts
            .iter()
            .filter(|post| effective_date(post, offset) == Some(date))
            .cloned()
            .collect();
        cells.push(Some(DayCell { day, posts: day_posts }));
    }
    while cells.len() % 7 != 0 {
        cells.push(None);
    }

    Ok(MonthGrid {
        year,
        month,
        days_in_month: days,
        first_weekday: lead,
        cells,
    })
}

/// Default scheduling instant for a clicked calendar day.
///
/// Branch table:
/// - clicked day with its local noon still ahead: noon on that day;
/// - today with noon already passed: one hour from now, re-stamped onto the
///   clicked day when the re-stamp stays in the future (the +1h can roll
///   into the next day near local midnight);
/// - a day fully in the past: the re-stamp can never be future, so the
///   plain one-hour-from-now instant is returned and creation-time
///   validation remains the authority.
pub fn default_schedule_instant(
    year: i32,
    month: u32,
    day: u32,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<DateTime<Utc>> {
    let date =
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| invalid_date(year, month, day))?;
    let noon = date
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| invalid_date(year, month, day))?;
    let candidate = offset
        .from_local_datetime(&noon)
        .single()
        .ok_or_else(|| invalid_date(year, month, day))?
        .with_timezone(&Utc);

    if candidate > now {
        return Ok(candidate);
    }

    let fallback = now + Duration::hours(1);
    let fallback_time = fallback.with_timezone(&offset).time();
    if let Some(restamped) = offset
        .from_local_datetime(&date.and_time(fallback_time))
        .single()
    {
        let restamped = restamped.with_timezone(&Utc);
        if restamped > now {
            return Ok(restamped);
        }
    }
    Ok(fallback)
}
