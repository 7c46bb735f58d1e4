use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Epidemiological reporting week (CDC MMWR numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportingInterval {
    pub year: i32,
    pub week: u32,
}

impl ReportingInterval {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }

    /// Weeks run Sunday to Saturday. Week 1 is the week containing 4 January,
    /// so the first days of January may still belong to the previous year and
    /// the last days of December to the next one.
    pub fn for_date(date: NaiveDate) -> Self {
        let year = date.year();
        let next_start = first_week_start(year + 1);
        if date >= next_start {
            return Self::new(year + 1, 1);
        }

        let start = first_week_start(year);
        if date < start {
            let previous_start = first_week_start(year - 1);
            return Self::new(year - 1, week_number(previous_start, date));
        }

        Self::new(year, week_number(start, date))
    }

    pub fn label(&self) -> String {
        format!("Epi Week {} ({})", self.week, self.year)
    }
}

impl fmt::Display for ReportingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

fn first_week_start(year: i32) -> NaiveDate {
    let anchor = NaiveDate::from_ymd_opt(year, 1, 4).unwrap_or(NaiveDate::MIN);
    let offset = anchor.weekday().num_days_from_sunday();
    anchor - Duration::days(i64::from(offset))
}

fn week_number(start: NaiveDate, date: NaiveDate) -> u32 {
    let days = (date - start).num_days();
    (days / 7) as u32 + 1
}

/// Source of "now" for interval resolution.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Noon UTC on the given date, far enough from midnight that any reporting
    /// offset keeps the same calendar day.
    pub fn on(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
        Self(DateTime::from_naive_utc_and_offset(noon, Utc))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Resolves the reporting interval for "now" in the reporting timezone.
#[derive(Clone)]
pub struct IntervalResolver {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl IntervalResolver {
    pub fn new(clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self { clock, offset }
    }

    pub fn system(offset: FixedOffset) -> Self {
        Self::new(Arc::new(SystemClock), offset)
    }

    pub fn current(&self) -> ReportingInterval {
        let local = self.clock.now().with_timezone(&self.offset);
        ReportingInterval::for_date(local.date_naive())
    }
}

impl fmt::Debug for IntervalResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalResolver")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn first_week_contains_fourth_of_january() {
        assert_eq!(
            ReportingInterval::for_date(date(2016, 1, 3)),
            ReportingInterval::new(2016, 1)
        );
        assert_eq!(
            ReportingInterval::for_date(date(2016, 1, 9)),
            ReportingInterval::new(2016, 1)
        );
        assert_eq!(
            ReportingInterval::for_date(date(2016, 1, 10)),
            ReportingInterval::new(2016, 2)
        );
    }

    #[test]
    fn early_january_rolls_back_into_previous_year() {
        assert_eq!(
            ReportingInterval::for_date(date(2015, 1, 1)),
            ReportingInterval::new(2014, 53)
        );
        assert_eq!(
            ReportingInterval::for_date(date(2021, 1, 2)),
            ReportingInterval::new(2020, 53)
        );
    }

    #[test]
    fn late_december_rolls_forward_into_next_year() {
        assert_eq!(
            ReportingInterval::for_date(date(2024, 12, 29)),
            ReportingInterval::new(2025, 1)
        );
        assert_eq!(
            ReportingInterval::for_date(date(2024, 12, 28)),
            ReportingInterval::new(2024, 52)
        );
    }

    #[test]
    fn resolver_applies_reporting_offset() {
        // Saturday 23:30 UTC is already Sunday in West Africa Time.
        let instant = Utc
            .with_ymd_and_hms(2025, 4, 5, 23, 30, 0)
            .single()
            .expect("unambiguous instant");
        let wat = FixedOffset::east_opt(3600).expect("valid offset");
        let utc = FixedOffset::east_opt(0).expect("valid offset");

        let utc_resolver = IntervalResolver::new(Arc::new(FixedClock(instant)), utc);
        let wat_resolver = IntervalResolver::new(Arc::new(FixedClock(instant)), wat);

        assert_eq!(utc_resolver.current(), ReportingInterval::new(2025, 14));
        assert_eq!(wat_resolver.current(), ReportingInterval::new(2025, 15));
    }

    #[test]
    fn label_matches_sms_wording() {
        let interval = ReportingInterval::new(2025, 7);
        assert_eq!(interval.label(), "Epi Week 7 (2025)");
        assert_eq!(interval.to_string(), "2025-W07");
    }
}
