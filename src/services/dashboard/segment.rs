use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::models::{AttendanceRecord, AttendanceStatus, Employee, SalesRecord, Store};

/// Ranked contribution of one store to the filtered sales total.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoreSegment {
    /// Store identifier
    pub key: String,
    /// Resolved display name (falls back to the raw id)
    pub label: String,
    pub total: Decimal,
    pub transactions: i64,
    pub quantity: i64,
    /// Distinct employees with at least one check-in at this store in the period
    pub active_employees: i64,
    /// Check-in events at this store in the period
    pub check_ins: i64,
}

/// Ranked contribution of one employee to the filtered sales total.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeSegment {
    /// Employee identifier
    pub key: String,
    /// Resolved display name (falls back to the raw id)
    pub label: String,
    pub total: Decimal,
    pub transactions: i64,
    pub quantity: i64,
    /// Distinct stores this employee sold at in the period
    pub stores: Vec<String>,
}

/// Ranked contribution of one workflow status label.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusSegment {
    /// Raw status label
    pub key: String,
    /// Same as `key`; statuses are free text with no directory
    pub label: String,
    pub total: Decimal,
    pub transactions: i64,
    pub quantity: i64,
}

#[derive(Default)]
struct SegmentTotals {
    total: Decimal,
    transactions: i64,
    quantity: i64,
}

impl SegmentTotals {
    fn absorb(&mut self, sale: &SalesRecord) {
        self.total += sale.total_amount;
        self.transactions += 1;
        self.quantity += sale.quantity;
    }
}

/// Groups the filtered sales set into ranked store/employee/status
/// leaderboards.
///
/// Every list comes back sorted by total descending in full; top-N truncation
/// belongs to the caller.
pub struct SegmentAggregator<'a> {
    stores: &'a HashMap<String, Store>,
    employees: &'a HashMap<String, Employee>,
}

impl<'a> SegmentAggregator<'a> {
    pub fn new(
        stores: &'a HashMap<String, Store>,
        employees: &'a HashMap<String, Employee>,
    ) -> Self {
        Self { stores, employees }
    }

    pub fn by_store(
        &self,
        sales: &[SalesRecord],
        attendance: &[AttendanceRecord],
    ) -> Vec<StoreSegment> {
        let mut grouped: BTreeMap<&str, SegmentTotals> = BTreeMap::new();
        for sale in sales {
            grouped.entry(&sale.store_id).or_default().absorb(sale);
        }

        let mut present: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        let mut check_ins: HashMap<&str, i64> = HashMap::new();
        for record in attendance {
            if record.status == AttendanceStatus::CheckIn {
                present
                    .entry(&record.store_id)
                    .or_default()
                    .insert(&record.employee_id);
                *check_ins.entry(&record.store_id).or_default() += 1;
            }
        }

        let mut segments: Vec<StoreSegment> = grouped
            .into_iter()
            .map(|(key, totals)| StoreSegment {
                key: key.to_string(),
                label: self.store_label(key),
                total: totals.total,
                transactions: totals.transactions,
                quantity: totals.quantity,
                active_employees: present.get(key).map_or(0, |set| set.len() as i64),
                check_ins: check_ins.get(key).copied().unwrap_or(0),
            })
            .collect();
        rank(&mut segments, |s| s.total);
        segments
    }

    pub fn by_employee(&self, sales: &[SalesRecord]) -> Vec<EmployeeSegment> {
        let mut grouped: BTreeMap<&str, (SegmentTotals, BTreeSet<&str>)> = BTreeMap::new();
        for sale in sales {
            let entry = grouped.entry(&sale.employee_id).or_default();
            entry.0.absorb(sale);
            entry.1.insert(&sale.store_id);
        }

        let mut segments: Vec<EmployeeSegment> = grouped
            .into_iter()
            .map(|(key, (totals, stores))| EmployeeSegment {
                key: key.to_string(),
                label: self.employee_label(key),
                total: totals.total,
                transactions: totals.transactions,
                quantity: totals.quantity,
                stores: stores.into_iter().map(str::to_string).collect(),
            })
            .collect();
        rank(&mut segments, |s| s.total);
        segments
    }

    pub fn by_status(&self, sales: &[SalesRecord]) -> Vec<StatusSegment> {
        let mut grouped: BTreeMap<&str, SegmentTotals> = BTreeMap::new();
        for sale in sales {
            grouped.entry(&sale.status).or_default().absorb(sale);
        }

        let mut segments: Vec<StatusSegment> = grouped
            .into_iter()
            .map(|(key, totals)| StatusSegment {
                key: key.to_string(),
                label: key.to_string(),
                total: totals.total,
                transactions: totals.transactions,
                quantity: totals.quantity,
            })
            .collect();
        rank(&mut segments, |s| s.total);
        segments
    }

    fn store_label(&self, id: &str) -> String {
        match self.stores.get(id) {
            Some(store) => store.name.clone(),
            None => {
                debug!(store_id = id, "store missing from directory, using raw id");
                id.to_string()
            }
        }
    }

    fn employee_label(&self, id: &str) -> String {
        match self.employees.get(id) {
            Some(employee) => employee.name.clone(),
            None => {
                debug!(employee_id = id, "employee missing from directory, using raw id");
                id.to_string()
            }
        }
    }
}

/// Sort by total descending. Input arrives in key order from the BTreeMap, so
/// equal totals keep a stable, deterministic ordering.
fn rank<T>(segments: &mut [T], total: impl Fn(&T) -> Decimal) {
    segments.sort_by(|a, b| total(b).cmp(&total(a)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sale(store: &str, employee: &str, status: &str, amount: Decimal) -> SalesRecord {
        SalesRecord {
            id: Uuid::new_v4(),
            employee_id: employee.to_string(),
            store_id: store.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 4, 0, 0).single().unwrap(),
            status: status.to_string(),
            total_amount: amount,
            quantity: 1,
            product_lines: vec![],
        }
    }

    fn check_in(store: &str, employee: &str) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            employee_id: employee.to_string(),
            store_id: store.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 1, 0, 0).single().unwrap(),
            status: AttendanceStatus::CheckIn,
        }
    }

    fn directories() -> (HashMap<String, Store>, HashMap<String, Employee>) {
        let mut stores = HashMap::new();
        stores.insert(
            "s1".to_string(),
            Store {
                id: "s1".to_string(),
                name: "Sukhumvit Flagship".to_string(),
                province: Some("Bangkok".to_string()),
                latitude: None,
                longitude: None,
            },
        );
        let mut employees = HashMap::new();
        employees.insert(
            "e1".to_string(),
            Employee {
                id: "e1".to_string(),
                name: "Nok S.".to_string(),
                province: None,
            },
        );
        (stores, employees)
    }

    #[test]
    fn stores_rank_by_total_descending() {
        let (stores, employees) = directories();
        let aggregator = SegmentAggregator::new(&stores, &employees);
        let sales = vec![
            sale("s1", "e1", "completed", dec!(100)),
            sale("s2", "e1", "completed", dec!(300)),
            sale("s1", "e1", "completed", dec!(50)),
        ];
        let segments = aggregator.by_store(&sales, &[]);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].key, "s2");
        assert_eq!(segments[0].total, dec!(300));
        assert_eq!(segments[1].key, "s1");
        assert_eq!(segments[1].total, dec!(150));
        assert_eq!(segments[1].transactions, 2);
    }

    #[test]
    fn per_store_totals_partition_the_flat_total() {
        let (stores, employees) = directories();
        let aggregator = SegmentAggregator::new(&stores, &employees);
        let sales = vec![
            sale("s1", "e1", "completed", dec!(100.25)),
            sale("s2", "e2", "completed", dec!(300)),
            sale("s3", "e3", "pending", dec!(42.75)),
        ];
        let segments = aggregator.by_store(&sales, &[]);
        let segmented: Decimal = segments.iter().map(|s| s.total).sum();
        let flat: Decimal = sales.iter().map(|s| s.total_amount).sum();
        assert_eq!(segmented, flat);
    }

    #[test]
    fn missing_directory_entry_falls_back_to_raw_id() {
        let (stores, employees) = directories();
        let aggregator = SegmentAggregator::new(&stores, &employees);
        let sales = vec![
            sale("s1", "e1", "completed", dec!(10)),
            sale("s-unknown", "e-unknown", "completed", dec!(20)),
        ];
        let by_store = aggregator.by_store(&sales, &[]);
        assert_eq!(by_store[0].key, "s-unknown");
        assert_eq!(by_store[0].label, "s-unknown");
        assert_eq!(by_store[1].label, "Sukhumvit Flagship");

        let by_employee = aggregator.by_employee(&sales);
        assert_eq!(by_employee[0].label, "e-unknown");
        assert_eq!(by_employee[1].label, "Nok S.");
    }

    #[test]
    fn store_segment_counts_distinct_checked_in_employees() {
        let (stores, employees) = directories();
        let aggregator = SegmentAggregator::new(&stores, &employees);
        let sales = vec![sale("s1", "e1", "completed", dec!(10))];
        let attendance = vec![
            check_in("s1", "e1"),
            check_in("s1", "e1"), // same employee twice
            check_in("s1", "e2"),
            check_in("s2", "e3"), // different store, no sales there
        ];
        let segments = aggregator.by_store(&sales, &attendance);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].active_employees, 2);
        assert_eq!(segments[0].check_ins, 3);
    }

    #[test]
    fn employee_segment_lists_distinct_stores() {
        let (stores, employees) = directories();
        let aggregator = SegmentAggregator::new(&stores, &employees);
        let sales = vec![
            sale("s1", "e1", "completed", dec!(10)),
            sale("s2", "e1", "completed", dec!(10)),
            sale("s1", "e1", "completed", dec!(10)),
        ];
        let segments = aggregator.by_employee(&sales);
        assert_eq!(segments[0].stores, vec!["s1".to_string(), "s2".to_string()]);
    }

    #[test]
    fn status_grouping_uses_raw_labels() {
        let (stores, employees) = directories();
        let aggregator = SegmentAggregator::new(&stores, &employees);
        let sales = vec![
            sale("s1", "e1", "completed", dec!(10)),
            sale("s1", "e1", "void", dec!(90)),
        ];
        let segments = aggregator.by_status(&sales);
        assert_eq!(segments[0].key, "void");
        assert_eq!(segments[0].label, "void");
        assert_eq!(segments[1].key, "completed");
    }

    #[test]
    fn empty_sales_produce_empty_lists() {
        let (stores, employees) = directories();
        let aggregator = SegmentAggregator::new(&stores, &employees);
        assert!(aggregator.by_store(&[], &[]).is_empty());
        assert!(aggregator.by_employee(&[]).is_empty());
        assert!(aggregator.by_status(&[]).is_empty());
    }
}
