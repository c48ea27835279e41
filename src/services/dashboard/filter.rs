use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use super::period::{Period, RangeMode};
use crate::models::{AttendanceRecord, AttendanceStatus, SalesRecord};

/// Filter set driving a metrics recomputation.
///
/// Every field is optional; an unset (or blank) field leaves that dimension
/// unrestricted. The same struct is echoed back in the metrics payload with
/// defaulted fields filled in, so the UI can sync its URL state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardFilters {
    /// Aggregation window granularity (day, week, month, year)
    #[serde(default)]
    pub range_mode: RangeMode,
    /// Mode-specific reference: ISO date for day/week, "YYYY-MM" for month,
    /// "YYYY" for year
    #[schema(example = "2024-03-15")]
    pub range_value: Option<String>,
    /// Restrict to one store
    pub store: Option<String>,
    /// Restrict to one employee
    pub employee: Option<String>,
    /// Restrict attendance records to check-ins or check-outs
    pub attendance_status: Option<AttendanceStatus>,
    /// Restrict sales records to one workflow status label
    pub sales_status: Option<String>,
    /// Inclusive local wall-clock lower bound, "HH:MM"
    #[schema(example = "09:00")]
    pub time_of_day_from: Option<String>,
    /// Inclusive local wall-clock upper bound, "HH:MM"
    #[schema(example = "17:00")]
    pub time_of_day_to: Option<String>,
    /// IANA timezone for period boundaries and wall-clock checks
    #[schema(example = "Asia/Bangkok")]
    pub time_zone: Option<String>,
}

impl DashboardFilters {
    /// Collapse blank strings to `None` so "" and absent mean the same thing.
    pub fn normalized(mut self) -> Self {
        fn scrub(field: &mut Option<String>) {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
        scrub(&mut self.range_value);
        scrub(&mut self.store);
        scrub(&mut self.employee);
        scrub(&mut self.sales_status);
        scrub(&mut self.time_of_day_from);
        scrub(&mut self.time_of_day_to);
        scrub(&mut self.time_zone);
        self
    }
}

/// Narrows raw record sets to those matching a filter set within one period.
pub struct RecordFilterer<'a> {
    filters: &'a DashboardFilters,
    period: &'a Period,
    window: Option<(NaiveTime, NaiveTime)>,
}

impl<'a> RecordFilterer<'a> {
    pub fn new(filters: &'a DashboardFilters, period: &'a Period) -> Self {
        let window = match (
            parse_wall_clock(filters.time_of_day_from.as_deref()),
            parse_wall_clock(filters.time_of_day_to.as_deref()),
        ) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        };
        Self {
            filters,
            period,
            window,
        }
    }

    pub fn attendance(&self, records: &[AttendanceRecord]) -> Vec<AttendanceRecord> {
        records
            .iter()
            .filter(|r| {
                self.matches_common(&r.store_id, &r.employee_id, r.timestamp)
                    && self
                        .filters
                        .attendance_status
                        .map_or(true, |wanted| r.status == wanted)
            })
            .cloned()
            .collect()
    }

    pub fn sales(&self, records: &[SalesRecord]) -> Vec<SalesRecord> {
        records
            .iter()
            .filter(|r| {
                self.matches_common(&r.store_id, &r.employee_id, r.timestamp)
                    && self
                        .filters
                        .sales_status
                        .as_deref()
                        .map_or(true, |wanted| r.status == wanted)
            })
            .cloned()
            .collect()
    }

    fn matches_common(
        &self,
        store_id: &str,
        employee_id: &str,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> bool {
        if !self.period.contains(timestamp) {
            return false;
        }
        if self.filters.store.as_deref().is_some_and(|s| s != store_id) {
            return false;
        }
        if self
            .filters
            .employee
            .as_deref()
            .is_some_and(|e| e != employee_id)
        {
            return false;
        }
        match self.window {
            // Plain inclusive range, not a circular one: from > to matches
            // nothing rather than wrapping past midnight.
            Some((from, to)) => {
                let local = timestamp.with_timezone(&self.period.tz).time();
                local >= from && local <= to
            }
            None => true,
        }
    }
}

fn parse_wall_clock(value: Option<&str>) -> Option<NaiveTime> {
    let raw = value?.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|err| {
            debug!(raw, %err, "ignoring unparseable time-of-day bound");
            err
        })
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dashboard::period::PeriodResolver;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Asia::Bangkok;
    use uuid::Uuid;

    fn day_period() -> Period {
        PeriodResolver::resolve(
            RangeMode::Day,
            Some("2024-03-15"),
            Bangkok,
            Utc::now(),
        )
        .current
    }

    fn sale_at(hour_local: u32, store: &str, employee: &str) -> SalesRecord {
        // Bangkok local hour on 2024-03-15 expressed in UTC (UTC+7).
        let ts = Bangkok
            .with_ymd_and_hms(2024, 3, 15, hour_local, 30, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc);
        SalesRecord {
            id: Uuid::new_v4(),
            employee_id: employee.to_string(),
            store_id: store.to_string(),
            timestamp: ts,
            status: "completed".to_string(),
            total_amount: rust_decimal_macros::dec!(100),
            quantity: 1,
            product_lines: vec![],
        }
    }

    #[test]
    fn unrestricted_filters_keep_in_period_records() {
        let period = day_period();
        let filters = DashboardFilters::default();
        let records = vec![sale_at(10, "s1", "e1"), sale_at(23, "s2", "e2")];
        assert_eq!(RecordFilterer::new(&filters, &period).sales(&records).len(), 2);
    }

    #[test]
    fn store_and_employee_match_exactly() {
        let period = day_period();
        let filters = DashboardFilters {
            store: Some("s1".to_string()),
            employee: Some("e1".to_string()),
            ..Default::default()
        };
        let records = vec![
            sale_at(10, "s1", "e1"),
            sale_at(11, "s1", "e2"),
            sale_at(12, "s2", "e1"),
        ];
        assert_eq!(RecordFilterer::new(&filters, &period).sales(&records).len(), 1);
    }

    #[test]
    fn time_window_excludes_evening_sale() {
        let period = day_period();
        let filters = DashboardFilters {
            time_of_day_from: Some("09:00".to_string()),
            time_of_day_to: Some("17:00".to_string()),
            ..Default::default()
        };
        let records = vec![sale_at(10, "s1", "e1"), sale_at(18, "s1", "e1")];
        let kept = RecordFilterer::new(&filters, &period).sales(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(
            kept[0].timestamp.with_timezone(&Bangkok).time(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap()
        );
    }

    #[test]
    fn inverted_time_window_matches_nothing() {
        let period = day_period();
        let filters = DashboardFilters {
            time_of_day_from: Some("17:00".to_string()),
            time_of_day_to: Some("09:00".to_string()),
            ..Default::default()
        };
        let records = vec![
            sale_at(8, "s1", "e1"),
            sale_at(12, "s1", "e1"),
            sale_at(18, "s1", "e1"),
        ];
        assert!(RecordFilterer::new(&filters, &period).sales(&records).is_empty());
    }

    #[test]
    fn single_bound_leaves_window_unrestricted() {
        let period = day_period();
        let filters = DashboardFilters {
            time_of_day_from: Some("09:00".to_string()),
            ..Default::default()
        };
        let records = vec![sale_at(6, "s1", "e1")];
        assert_eq!(RecordFilterer::new(&filters, &period).sales(&records).len(), 1);
    }

    #[test]
    fn blank_strings_normalize_to_unrestricted() {
        let filters = DashboardFilters {
            store: Some("  ".to_string()),
            sales_status: Some(String::new()),
            ..Default::default()
        }
        .normalized();
        assert!(filters.store.is_none());
        assert!(filters.sales_status.is_none());
    }

    #[test]
    fn attendance_status_filter_restricts_kind() {
        let period = day_period();
        let ts = Bangkok
            .with_ymd_and_hms(2024, 3, 15, 9, 0, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc);
        let records = vec![
            AttendanceRecord {
                id: Uuid::new_v4(),
                employee_id: "e1".to_string(),
                store_id: "s1".to_string(),
                timestamp: ts,
                status: AttendanceStatus::CheckIn,
            },
            AttendanceRecord {
                id: Uuid::new_v4(),
                employee_id: "e1".to_string(),
                store_id: "s1".to_string(),
                timestamp: ts,
                status: AttendanceStatus::CheckOut,
            },
        ];
        let filters = DashboardFilters {
            attendance_status: Some(AttendanceStatus::CheckIn),
            ..Default::default()
        };
        let kept = RecordFilterer::new(&filters, &period).attendance(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].status, AttendanceStatus::CheckIn);
    }
}
