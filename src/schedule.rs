use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar frame of a fund: when it runs and on which day of the month the
/// pots are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_withdrawal_day: u8,
}

impl Schedule {
    /// Builds a schedule running `duration_months` from `start_date`.
    pub fn from_duration(start_date: NaiveDate, duration_months: u32, withdrawal_day: u8) -> Self {
        Self {
            start_date,
            end_date: advance_months(start_date, duration_months),
            monthly_withdrawal_day: withdrawal_day,
        }
    }

    /// Whole months left until the end date, zero once the fund has ended.
    /// A started month only counts once its day-of-month has been reached.
    pub fn months_remaining(&self, today: NaiveDate) -> u32 {
        if today >= self.end_date {
            return 0;
        }
        let mut months = (self.end_date.year() - today.year()) * 12
            + (self.end_date.month() as i32 - today.month() as i32);
        if today.day() > self.end_date.day() {
            months -= 1;
        }
        months.max(0) as u32
    }

    /// True on the day of the month the pots are due to be drawn.
    pub fn is_withdrawal_day(&self, today: NaiveDate) -> bool {
        today.day() == self.monthly_withdrawal_day as u32
    }
}

/// Advances a date by whole months, clamping to the last valid day of the
/// resulting month when the source day overflows it.
pub fn advance_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total_months = date.year() * 12 + date.month0() as i32 + months as i32;
    let year = total_months.div_euclid(12);
    let month = total_months.rem_euclid(12) as u32 + 1;
    let mut day = date.day();
    loop {
        if let Some(candidate) = NaiveDate::from_ymd_opt(year, month, day) {
            return candidate;
        }
        day -= 1;
    }
}
