use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use utoipa::ToSchema;

/// Aggregation window granularity selected on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RangeMode {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl RangeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeMode::Day => "day",
            RangeMode::Week => "week",
            RangeMode::Month => "month",
            RangeMode::Year => "year",
        }
    }
}

/// Half-open aggregation window `[start, end)` anchored in a timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub mode: RangeMode,
    pub tz: Tz,
}

impl Period {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Calendar date of `start` in the period's own timezone.
    pub fn anchor_date(&self) -> NaiveDate {
        self.start.with_timezone(&self.tz).date_naive()
    }

    /// Reference value that reproduces this period for its mode.
    pub fn reference_value(&self) -> String {
        let anchor = self.anchor_date();
        match self.mode {
            RangeMode::Day | RangeMode::Week => anchor.format("%Y-%m-%d").to_string(),
            RangeMode::Month => anchor.format("%Y-%m").to_string(),
            RangeMode::Year => anchor.format("%Y").to_string(),
        }
    }
}

/// Current period plus the immediately preceding one of the same mode.
///
/// `previous.end == current.start` always holds; there is no gap and no
/// overlap between the two windows.
#[derive(Debug, Clone)]
pub struct ResolvedPeriods {
    pub current: Period,
    pub previous: Period,
}

#[derive(Debug, Error)]
pub enum PeriodError {
    #[error("range value {value:?} is not valid for mode {mode}", mode = .mode.as_str())]
    InvalidRangeValue { mode: RangeMode, value: String },
}

/// Resolves a range mode + reference value into current/previous period
/// boundaries.
pub struct PeriodResolver;

impl PeriodResolver {
    /// Resolve `value` for `mode` in `tz`.
    ///
    /// A missing or unparseable reference value never aborts the caller: the
    /// resolver logs the problem and substitutes the mode's current period
    /// computed from `now`.
    pub fn resolve(
        mode: RangeMode,
        value: Option<&str>,
        tz: Tz,
        now: DateTime<Utc>,
    ) -> ResolvedPeriods {
        match value {
            Some(raw) => match Self::parse_anchor(mode, raw) {
                Ok(anchor) => Self::from_anchor(mode, anchor, tz),
                Err(err) => {
                    warn!(%err, "substituting current period for unusable range value");
                    Self::current(mode, tz, now)
                }
            },
            None => Self::current(mode, tz, now),
        }
    }

    /// Current period of `mode` as seen from `now` in `tz`.
    pub fn current(mode: RangeMode, tz: Tz, now: DateTime<Utc>) -> ResolvedPeriods {
        Self::from_anchor(mode, now.with_timezone(&tz).date_naive(), tz)
    }

    fn parse_anchor(mode: RangeMode, raw: &str) -> Result<NaiveDate, PeriodError> {
        let invalid = || PeriodError::InvalidRangeValue {
            mode,
            value: raw.to_string(),
        };
        let value = raw.trim();
        match mode {
            RangeMode::Day | RangeMode::Week => {
                NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())
            }
            RangeMode::Month => {
                let (year, month) = value.split_once('-').ok_or_else(invalid)?;
                let year: i32 = year.parse().map_err(|_| invalid())?;
                let month: u32 = month.parse().map_err(|_| invalid())?;
                NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
            }
            RangeMode::Year => {
                let year: i32 = value.parse().map_err(|_| invalid())?;
                NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)
            }
        }
    }

    fn from_anchor(mode: RangeMode, anchor: NaiveDate, tz: Tz) -> ResolvedPeriods {
        let (cur_start, cur_end, prev_start) = match mode {
            RangeMode::Day => (anchor, next_day(anchor), anchor - Duration::days(1)),
            RangeMode::Week => {
                // Reference values that are not a Monday snap back to the
                // Monday of that week.
                let monday = anchor - Duration::days(anchor.weekday().num_days_from_monday() as i64);
                (
                    monday,
                    monday + Duration::days(7),
                    monday - Duration::days(7),
                )
            }
            RangeMode::Month => {
                let first = first_of_month(anchor);
                (first, add_months(first, 1), add_months(first, -1))
            }
            RangeMode::Year => {
                let jan1 = NaiveDate::from_ymd_opt(anchor.year(), 1, 1).unwrap_or(anchor);
                (jan1, add_months(jan1, 12), add_months(jan1, -12))
            }
        };

        let current_start = local_midnight(cur_start, tz);
        let current = Period {
            start: current_start,
            end: local_midnight(cur_end, tz),
            mode,
            tz,
        };
        let previous = Period {
            start: local_midnight(prev_start, tz),
            end: current_start,
            mode,
            tz,
        };
        ResolvedPeriods { current, previous }
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Calendar-aware month stepping; the input is always a first-of-month date.
fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let (year, month0) = (total.div_euclid(12), total.rem_euclid(12));
    NaiveDate::from_ymd_opt(year, month0 as u32 + 1, 1).unwrap_or(date)
}

/// UTC instant of local midnight on `date` in `tz`.
///
/// When midnight falls inside a DST gap the day starts when clocks resume;
/// when it is ambiguous the earlier instant wins.
fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
    }
}
