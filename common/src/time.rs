//! Calendar helpers for the trailing history window.

use chrono::{Duration, NaiveDate, Utc};

/// Length of the history window in days.
pub const HISTORY_WINDOW_DAYS: u32 = 7;

/// Today's calendar date in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Consecutive calendar days ending at `end` inclusive, oldest first.
pub fn trailing_window(end: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days)
        .rev()
        .map(|back| end - Duration::days(i64::from(back)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_window_is_ascending_and_inclusive() {
        let end = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let window = trailing_window(end, HISTORY_WINDOW_DAYS);

        assert_eq!(window.len(), 7);
        assert_eq!(window[0], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(window[6], end);
        assert!(window.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_trailing_window_crosses_month_boundary() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let window = trailing_window(end, 7);

        assert_eq!(window[0], NaiveDate::from_ymd_opt(2024, 2, 25).unwrap());
        assert_eq!(window[6], end);
    }
}
