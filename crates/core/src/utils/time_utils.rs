use chrono::{Days, Months, NaiveDate, NaiveDateTime, Utc};

/// Current UTC date. Used for paid dates when the caller omits one.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Current UTC timestamp for audit columns.
pub fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Adds whole months, clamping to the last day of shorter months
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Adds (or subtracts, for negative values) a number of days.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}
