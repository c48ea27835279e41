use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::kpi::KpiSet;

/// Threshold configuration for qualitative dashboard alerts.
///
/// Values are percentage deltas; drops are negative, spikes positive.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertThresholds {
    /// Sales delta at or below this fires "sales down sharply"
    pub sales_drop_percent: Decimal,
    /// Attendance delta at or below this fires "fewer check-ins"
    pub attendance_drop_percent: Decimal,
    /// Average-ticket delta at or above this (without transactions rising)
    /// fires the data-anomaly alert
    pub ticket_spike_percent: Decimal,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            sales_drop_percent: dec!(-20),
            attendance_drop_percent: dec!(-20),
            ticket_spike_percent: dec!(50),
        }
    }
}

/// Derive qualitative alert strings from the KPI deltas.
///
/// A metric with a zero previous value has no baseline and never alerts.
/// The returned list is ordered and empty when nothing triggers; evaluation
/// itself cannot fail.
pub fn evaluate(kpis: &KpiSet, thresholds: &AlertThresholds) -> Vec<String> {
    let mut alerts = Vec::new();

    if !kpis.sales.previous_value.is_zero()
        && kpis.sales.delta_percent <= thresholds.sales_drop_percent
    {
        alerts.push(format!(
            "Sales down sharply: {}% vs previous period",
            kpis.sales.delta_percent
        ));
    }

    if !kpis.attendance.previous_value.is_zero()
        && kpis.attendance.delta_percent <= thresholds.attendance_drop_percent
    {
        alerts.push(format!(
            "Fewer check-ins than previous period ({}%)",
            kpis.attendance.delta_percent
        ));
    }

    // A ticket spike that is not carried by more transactions usually means
    // mis-entered amounts rather than a real shift in buying behavior.
    if !kpis.average_ticket.previous_value.is_zero()
        && kpis.average_ticket.delta_percent >= thresholds.ticket_spike_percent
        && kpis.transaction_count.delta_percent <= Decimal::ZERO
    {
        alerts.push(format!(
            "Possible data anomaly: average ticket up {}% without more transactions",
            kpis.average_ticket.delta_percent
        ));
    }

    alerts
}
