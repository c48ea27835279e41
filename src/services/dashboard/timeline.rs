use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::period::Period;
use crate::models::{AttendanceRecord, AttendanceStatus, SalesRecord};

/// One calendar day's merged totals inside a period's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TimelineBucket {
    /// Local calendar day (in the period's timezone)
    pub date: NaiveDate,
    /// Sum of sale amounts dated this day
    pub sales_total: Decimal,
    /// Units sold this day
    pub sales_quantity: i64,
    /// Check-in events this day
    pub check_ins: i64,
    /// Check-out events this day
    pub check_outs: i64,
    /// Number of sales transactions this day
    pub transactions: i64,
}

impl TimelineBucket {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            sales_total: Decimal::ZERO,
            sales_quantity: 0,
            check_ins: 0,
            check_outs: 0,
            transactions: 0,
        }
    }
}

/// Merge filtered attendance and sales into one chronological per-day series.
///
/// Only days with activity on at least one side appear; a day present in a
/// single source still yields one bucket with the other side's counters at
/// zero. Keys are unique and strictly increasing.
pub fn build_timeline(
    attendance: &[AttendanceRecord],
    sales: &[SalesRecord],
    period: &Period,
) -> Vec<TimelineBucket> {
    let mut buckets: BTreeMap<NaiveDate, TimelineBucket> = BTreeMap::new();

    for record in attendance {
        let day = record.timestamp.with_timezone(&period.tz).date_naive();
        let bucket = buckets
            .entry(day)
            .or_insert_with(|| TimelineBucket::empty(day));
        match record.status {
            AttendanceStatus::CheckIn => bucket.check_ins += 1,
            AttendanceStatus::CheckOut => bucket.check_outs += 1,
        }
    }

    for sale in sales {
        let day = sale.timestamp.with_timezone(&period.tz).date_naive();
        let bucket = buckets
            .entry(day)
            .or_insert_with(|| TimelineBucket::empty(day));
        bucket.sales_total += sale.total_amount;
        bucket.sales_quantity += sale.quantity;
        bucket.transactions += 1;
    }

    buckets.into_values().collect()
}
