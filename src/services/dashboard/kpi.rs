use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{AttendanceRecord, AttendanceStatus, SalesRecord};

/// One tracked metric: current value, previous-period value, and the
/// percentage delta between them.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Kpi {
    pub value: Decimal,
    pub previous_value: Decimal,
    /// `(value - previous) / previous * 100`, one decimal place.
    /// Zero whenever `previous_value` is zero: "no baseline" is a defined
    /// case, not infinity or NaN.
    pub delta_percent: Decimal,
}

impl Kpi {
    pub fn from_pair(value: Decimal, previous_value: Decimal) -> Self {
        let delta_percent = if previous_value.is_zero() {
            Decimal::ZERO
        } else {
            ((value - previous_value) / previous_value * dec!(100)).round_dp(1)
        };
        Self {
            value,
            previous_value,
            delta_percent,
        }
    }
}

/// KPIs tracked by the dashboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KpiSet {
    /// Sum of sale amounts
    pub sales: Kpi,
    /// Check-in events
    pub attendance: Kpi,
    /// Sales total divided by transaction count
    pub average_ticket: Kpi,
    /// Number of sales records
    pub transaction_count: Kpi,
}

#[derive(Debug, Default, PartialEq)]
struct PeriodTotals {
    sales_total: Decimal,
    attendance_count: i64,
    average_ticket: Decimal,
    transaction_count: i64,
}

fn totals(sales: &[SalesRecord], attendance: &[AttendanceRecord]) -> PeriodTotals {
    let sales_total: Decimal = sales.iter().map(|s| s.total_amount).sum();
    let transaction_count = sales.len() as i64;
    let attendance_count = attendance
        .iter()
        .filter(|r| r.status == AttendanceStatus::CheckIn)
        .count() as i64;
    let average_ticket = if transaction_count > 0 {
        (sales_total / Decimal::from(transaction_count)).round_dp(2)
    } else {
        Decimal::ZERO
    };
    PeriodTotals {
        sales_total,
        attendance_count,
        average_ticket,
        transaction_count,
    }
}

/// Compute the KPI set from the filtered record sets of the current and
/// previous periods.
pub fn calculate(
    current_sales: &[SalesRecord],
    current_attendance: &[AttendanceRecord],
    previous_sales: &[SalesRecord],
    previous_attendance: &[AttendanceRecord],
) -> KpiSet {
    let current = totals(current_sales, current_attendance);
    let previous = totals(previous_sales, previous_attendance);

    KpiSet {
        sales: Kpi::from_pair(current.sales_total, previous.sales_total),
        attendance: Kpi::from_pair(
            Decimal::from(current.attendance_count),
            Decimal::from(previous.attendance_count),
        ),
        average_ticket: Kpi::from_pair(current.average_ticket, previous.average_ticket),
        transaction_count: Kpi::from_pair(
            Decimal::from(current.transaction_count),
            Decimal::from(previous.transaction_count),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use test_case::test_case;
    use uuid::Uuid;

    fn sale(amount: Decimal) -> SalesRecord {
        SalesRecord {
            id: Uuid::new_v4(),
            employee_id: "e1".to_string(),
            store_id: "s1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 4, 0, 0).single().unwrap(),
            status: "completed".to_string(),
            total_amount: amount,
            quantity: 1,
            product_lines: vec![],
        }
    }

    fn attendance(status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            employee_id: "e1".to_string(),
            store_id: "s1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 1, 0, 0).single().unwrap(),
            status,
        }
    }

    #[test_case(dec!(0), dec!(0), dec!(0) ; "both zero")]
    #[test_case(dec!(100), dec!(0), dec!(0) ; "no baseline stays zero")]
    #[test_case(dec!(150), dec!(100), dec!(50.0) ; "fifty percent up")]
    #[test_case(dec!(80), dec!(100), dec!(-20.0) ; "twenty percent down")]
    #[test_case(dec!(100), dec!(3), dec!(3233.3) ; "rounded to one decimal")]
    fn delta_percent_cases(value: Decimal, previous: Decimal, expected: Decimal) {
        assert_eq!(Kpi::from_pair(value, previous).delta_percent, expected);
    }

    #[test]
    fn attendance_counts_only_check_ins() {
        let current = vec![
            attendance(AttendanceStatus::CheckIn),
            attendance(AttendanceStatus::CheckOut),
            attendance(AttendanceStatus::CheckIn),
        ];
        let kpis = calculate(&[], &current, &[], &[]);
        assert_eq!(kpis.attendance.value, dec!(2));
    }

    #[test]
    fn average_ticket_divides_by_transaction_count() {
        let current = vec![sale(dec!(100)), sale(dec!(200)), sale(dec!(50))];
        let kpis = calculate(&current, &[], &[], &[]);
        assert_eq!(kpis.average_ticket.value, dec!(116.67));
        assert_eq!(kpis.transaction_count.value, dec!(3));
    }

    #[test]
    fn empty_periods_yield_zeroed_kpis() {
        let kpis = calculate(&[], &[], &[], &[]);
        assert_eq!(kpis.sales.value, Decimal::ZERO);
        assert_eq!(kpis.sales.delta_percent, Decimal::ZERO);
        assert_eq!(kpis.average_ticket.value, Decimal::ZERO);
    }

    #[test]
    fn previous_period_feeds_the_baseline() {
        let current = vec![sale(dec!(80))];
        let previous = vec![sale(dec!(100))];
        let kpis = calculate(&current, &[], &previous, &[]);
        assert_eq!(kpis.sales.value, dec!(80));
        assert_eq!(kpis.sales.previous_value, dec!(100));
        assert_eq!(kpis.sales.delta_percent, dec!(-20.0));
    }
}
