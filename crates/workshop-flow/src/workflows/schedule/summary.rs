use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::domain::DaySchedule;

/// Dashboard totals for one workshop-month, folded fresh from the day schedules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    /// Days with at least one open hour.
    pub configured_days: u32,
    pub blocked_days: u32,
    pub active_slots: u32,
    /// Seat totals hold the sum of any month of `u32` slots.
    pub total_capacity: u64,
    pub booked: u64,
    pub remaining: u64,
}

impl MonthSummary {
    pub fn fold<'a>(
        year: i32,
        month: u32,
        days: impl IntoIterator<Item = &'a DaySchedule>,
    ) -> Self {
        let mut summary = Self {
            year,
            month,
            ..Self::default()
        };

        for day in days {
            if day.date.year() != year || day.date.month() != month {
                continue;
            }
            if day.is_configured() {
                summary.configured_days += 1;
            }
            if day.blocked {
                summary.blocked_days += 1;
            }
            for slot in day.active_slots() {
                summary.active_slots += 1;
                summary.total_capacity += u64::from(slot.capacity);
                summary.booked += u64::from(slot.booked);
                if !day.blocked {
                    summary.remaining += u64::from(slot.remaining());
                }
            }
        }

        summary
    }
}

/// First and last calendar day of a month, or `None` for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}
