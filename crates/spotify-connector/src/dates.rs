//! Date parameters for the analytics endpoints

use chrono::{Days, Months, NaiveDate};
use tracing::warn;

use crate::types::ImpressionKind;

/// Width of the window the impressions endpoint accepts.
pub const IMPRESSIONS_DAYS_DIFF: u64 = 29;

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `start`/`end` query parameters.
pub fn date_params(start: NaiveDate, end: NaiveDate) -> [(&'static str, String); 2] {
    [("start", format_date(start)), ("end", format_date(end))]
}

fn plus_window(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(IMPRESSIONS_DAYS_DIFF))
        .unwrap_or(NaiveDate::MAX)
}

/// Resolve the date range for an impressions request.
///
/// Defaults: start is `today - 29d`, end is `start + 29d`. `total` and
/// `faceted` always use a 29-day window from start; `daily` only clamps an
/// end that precedes start.
pub fn impressions_window(
    kind: ImpressionKind,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let start = start.unwrap_or_else(|| {
        today
            .checked_sub_days(Days::new(IMPRESSIONS_DAYS_DIFF))
            .unwrap_or(NaiveDate::MIN)
    });
    let end = end.unwrap_or_else(|| plus_window(start));

    match kind {
        ImpressionKind::Total | ImpressionKind::Faceted => {
            let forced = plus_window(start);
            if forced != end {
                warn!(
                    %kind,
                    start = %format_date(start),
                    end = %format_date(forced),
                    "overriding end date to {IMPRESSIONS_DAYS_DIFF} days after start"
                );
            }
            (start, forced)
        }
        ImpressionKind::Daily if end < start => {
            warn!(
                start = %format_date(start),
                end = %format_date(end),
                "end date is before start date, using start date"
            );
            (start, start)
        }
        ImpressionKind::Daily => (start, end),
    }
}

/// Wide window used for the catalog so every show is listed:
/// ten years back to one year ahead.
pub fn catalog_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today
        .checked_sub_months(Months::new(120))
        .unwrap_or(NaiveDate::MIN);
    let end = today
        .checked_add_months(Months::new(12))
        .unwrap_or(NaiveDate::MAX);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn formats_as_iso_date() {
        assert_eq!(format_date(d(2024, 3, 7)), "2024-03-07");
        let [start, end] = date_params(d(2024, 1, 1), d(2024, 1, 31));
        assert_eq!(start, ("start", "2024-01-01".to_string()));
        assert_eq!(end, ("end", "2024-01-31".to_string()));
    }

    #[test]
    fn total_forces_29_day_window() {
        let (start, end) =
            impressions_window(ImpressionKind::Total, Some(d(2024, 1, 1)), Some(d(2024, 3, 1)), d(2024, 6, 1));
        assert_eq!(start, d(2024, 1, 1));
        assert_eq!(end, d(2024, 1, 30));
    }

    #[test]
    fn faceted_forces_29_day_window() {
        let (_, end) =
            impressions_window(ImpressionKind::Faceted, Some(d(2024, 2, 10)), None, d(2024, 6, 1));
        assert_eq!(end, d(2024, 3, 10));
    }

    #[test]
    fn daily_keeps_caller_range() {
        let range =
            impressions_window(ImpressionKind::Daily, Some(d(2024, 1, 1)), Some(d(2024, 4, 1)), d(2024, 6, 1));
        assert_eq!(range, (d(2024, 1, 1), d(2024, 4, 1)));
    }

    #[test]
    fn daily_clamps_inverted_range() {
        let range =
            impressions_window(ImpressionKind::Daily, Some(d(2024, 5, 1)), Some(d(2024, 4, 1)), d(2024, 6, 1));
        assert_eq!(range, (d(2024, 5, 1), d(2024, 5, 1)));
    }

    #[test]
    fn defaults_start_29_days_before_today() {
        let (start, end) = impressions_window(ImpressionKind::Daily, None, None, d(2024, 6, 30));
        assert_eq!(start, d(2024, 6, 1));
        assert_eq!(end, d(2024, 6, 30));
    }

    #[test]
    fn catalog_spans_ten_years_back_one_ahead() {
        let (start, end) = catalog_window(d(2024, 2, 29));
        assert_eq!(start, d(2014, 2, 28));
        assert_eq!(end, d(2025, 2, 28));
    }
}
