//! Dashboard metrics engine.
//!
//! Pure computation over already-fetched record arrays: given a filter set
//! and source records, the result is deterministic and total. Empty inputs
//! produce well-formed empty payloads, never an error. Debouncing and
//! cancellation of recomputation requests belong to the calling layer; the
//! engine holds no state between calls.

pub mod alert;
pub mod filter;
pub mod kpi;
pub mod period;
pub mod segment;
pub mod timeline;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::models::{AttendanceRecord, AttendanceStatus, Employee, SalesRecord, Store};
use crate::sources::{AttendanceSource, DirectorySource, SalesSource};

pub use alert::AlertThresholds;
pub use filter::{DashboardFilters, RecordFilterer};
pub use kpi::{Kpi, KpiSet};
pub use period::{Period, PeriodResolver, RangeMode, ResolvedPeriods};
pub use segment::{EmployeeSegment, SegmentAggregator, StatusSegment, StoreSegment};
pub use timeline::TimelineBucket;

/// Ambient wall-clock capability. Injected so period defaulting stays
/// deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock reading system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Server-side dashboard tuning derived from configuration.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    /// Timezone used when a request does not carry one
    pub time_zone: Tz,
    /// Days of sales history shown in the snapshot trend
    pub trend_lookback_days: u32,
    /// Entries kept in the snapshot's top-product list
    pub top_products_limit: usize,
    /// Alert rule thresholds
    pub thresholds: AlertThresholds,
}

impl DashboardSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let dashboard = &config.dashboard;
        Self {
            time_zone: config.dashboard_time_zone(),
            trend_lookback_days: dashboard.trend_lookback_days,
            top_products_limit: dashboard.top_products_limit,
            thresholds: AlertThresholds {
                sales_drop_percent: decimal_or(
                    dashboard.sales_drop_alert_percent,
                    AlertThresholds::default().sales_drop_percent,
                ),
                attendance_drop_percent: decimal_or(
                    dashboard.attendance_drop_alert_percent,
                    AlertThresholds::default().attendance_drop_percent,
                ),
                ticket_spike_percent: decimal_or(
                    dashboard.ticket_spike_alert_percent,
                    AlertThresholds::default().ticket_spike_percent,
                ),
            },
        }
    }
}

fn decimal_or(value: f64, fallback: Decimal) -> Decimal {
    Decimal::try_from(value).unwrap_or(fallback)
}

/// Resolved period boundaries echoed in the metrics payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PeriodSummary {
    pub mode: RangeMode,
    /// IANA timezone the boundaries were computed in
    #[schema(example = "Asia/Bangkok")]
    pub time_zone: String,
    pub current_start: DateTime<Utc>,
    pub current_end: DateTime<Utc>,
    pub previous_start: DateTime<Utc>,
    pub previous_end: DateTime<Utc>,
}

impl PeriodSummary {
    fn from_resolved(resolved: &ResolvedPeriods) -> Self {
        Self {
            mode: resolved.current.mode,
            time_zone: resolved.current.tz.name().to_string(),
            current_start: resolved.current.start,
            current_end: resolved.current.end,
            previous_start: resolved.previous.start,
            previous_end: resolved.previous.end,
        }
    }
}

/// Fully filter-driven metrics payload, recomputed on every filter change.
#[derive(Debug, Serialize, ToSchema)]
pub struct Metrics {
    pub period: PeriodSummary,
    pub kpis: KpiSet,
    pub timeline: Vec<TimelineBucket>,
    pub store_segments: Vec<StoreSegment>,
    pub employee_segments: Vec<EmployeeSegment>,
    pub status_segments: Vec<StatusSegment>,
    pub alerts: Vec<String>,
    /// Distinct sales status labels seen in the fetched window, for filter UI
    pub available_statuses: Vec<String>,
    /// The filter set after defaulting, for UI/URL synchronization
    pub filters: DashboardFilters,
}

/// Lifetime totals shown on first paint.
#[derive(Debug, Serialize, ToSchema)]
pub struct SnapshotTotals {
    pub sales_total: Decimal,
    pub transactions: i64,
    pub check_ins: i64,
}

/// One day of the snapshot's recent sales trend.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub total: Decimal,
}

/// Aggregated product rank inside the snapshot lookback window.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductRank {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub amount: Decimal,
}

/// Coarse first-paint overview, computed once per page load.
#[derive(Debug, Serialize, ToSchema)]
pub struct Snapshot {
    pub totals: SnapshotTotals,
    /// KPIs for the server-chosen default period (today, default timezone)
    pub kpis: KpiSet,
    /// Daily sales totals over the configured lookback window
    pub sales_trend: Vec<TrendPoint>,
    pub top_products: Vec<ProductRank>,
    pub generated_at: DateTime<Utc>,
}

/// Composes the engine components into the two response shapes.
///
/// Adds no aggregation logic of its own beyond composition and shape
/// selection.
#[derive(Clone)]
pub struct DashboardService {
    attendance: Arc<dyn AttendanceSource>,
    sales: Arc<dyn SalesSource>,
    directory: Arc<dyn DirectorySource>,
    clock: Arc<dyn Clock>,
    settings: DashboardSettings,
}

impl DashboardService {
    pub fn new(
        attendance: Arc<dyn AttendanceSource>,
        sales: Arc<dyn SalesSource>,
        directory: Arc<dyn DirectorySource>,
        clock: Arc<dyn Clock>,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            attendance,
            sales,
            directory,
            clock,
            settings,
        }
    }

    /// Coarse overview for first paint.
    pub async fn snapshot(&self) -> Result<Snapshot, ServiceError> {
        info!("assembling dashboard snapshot");
        let now = self.clock.now();
        let tz = self.settings.time_zone;

        let all_sales = self.sales.fetch(None, None).await?;
        let all_attendance = self.attendance.fetch(None, None).await?;

        let totals = SnapshotTotals {
            sales_total: all_sales.iter().map(|s| s.total_amount).sum(),
            transactions: all_sales.len() as i64,
            check_ins: all_attendance
                .iter()
                .filter(|r| r.status == AttendanceStatus::CheckIn)
                .count() as i64,
        };

        // Default-period KPIs: today vs yesterday in the server timezone.
        let resolved = PeriodResolver::current(RangeMode::Day, tz, now);
        let filters = DashboardFilters::default();
        let current = RecordFilterer::new(&filters, &resolved.current);
        let previous = RecordFilterer::new(&filters, &resolved.previous);
        let kpis = kpi::calculate(
            &current.sales(&all_sales),
            &current.attendance(&all_attendance),
            &previous.sales(&all_sales),
            &previous.attendance(&all_attendance),
        );

        let lookback = self.lookback_window(now);
        let recent: Vec<&SalesRecord> = all_sales
            .iter()
            .filter(|s| s.timestamp >= lookback.0 && s.timestamp < lookback.1)
            .collect();

        Ok(Snapshot {
            totals,
            kpis,
            sales_trend: sales_trend(&recent, tz),
            top_products: top_products(&recent, self.settings.top_products_limit),
            generated_at: now,
        })
    }

    /// Full filter-driven recomputation.
    pub async fn metrics(&self, filters: DashboardFilters) -> Result<Metrics, ServiceError> {
        let mut filters = filters.normalized();
        let tz = self.resolve_time_zone(filters.time_zone.as_deref());
        let resolved = PeriodResolver::resolve(
            filters.range_mode,
            filters.range_value.as_deref(),
            tz,
            self.clock.now(),
        );

        // One contiguous fetch covers both periods: previous.end == current.start.
        let window_start = Some(resolved.previous.start);
        let window_end = Some(resolved.current.end);
        let attendance = self.attendance.fetch(window_start, window_end).await?;
        let sales = self.sales.fetch(window_start, window_end).await?;

        let current = RecordFilterer::new(&filters, &resolved.current);
        let previous = RecordFilterer::new(&filters, &resolved.previous);
        let current_sales = current.sales(&sales);
        let current_attendance = current.attendance(&attendance);
        let previous_sales = previous.sales(&sales);
        let previous_attendance = previous.attendance(&attendance);

        let stores = index_stores(self.directory.stores().await?);
        let employees = index_employees(self.directory.employees().await?);
        let aggregator = SegmentAggregator::new(&stores, &employees);

        let kpis = kpi::calculate(
            &current_sales,
            &current_attendance,
            &previous_sales,
            &previous_attendance,
        );
        let alerts = alert::evaluate(&kpis, &self.settings.thresholds);

        let available_statuses: Vec<String> = sales
            .iter()
            .map(|s| s.status.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        // Echo the resolved filter set so the UI can sync its URL state.
        filters.range_value = Some(resolved.current.reference_value());
        filters.time_zone = Some(tz.name().to_string());

        Ok(Metrics {
            period: PeriodSummary::from_resolved(&resolved),
            kpis,
            timeline: timeline::build_timeline(
                &current_attendance,
                &current_sales,
                &resolved.current,
            ),
            store_segments: aggregator.by_store(&current_sales, &current_attendance),
            employee_segments: aggregator.by_employee(&current_sales),
            status_segments: aggregator.by_status(&current_sales),
            alerts,
            available_statuses,
            filters,
        })
    }

    fn resolve_time_zone(&self, requested: Option<&str>) -> Tz {
        match requested {
            Some(name) => name.parse().unwrap_or_else(|_| {
                warn!(
                    time_zone = name,
                    "unknown IANA timezone, using configured default"
                );
                self.settings.time_zone
            }),
            None => self.settings.time_zone,
        }
    }

    /// Half-open UTC window covering the last `trend_lookback_days` local
    /// days up to and including today.
    fn lookback_window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let days = i64::from(self.settings.trend_lookback_days.max(1));
        let today = PeriodResolver::current(RangeMode::Day, self.settings.time_zone, now);
        (
            today.current.start - Duration::days(days - 1),
            today.current.end,
        )
    }
}

fn index_stores(stores: Vec<Store>) -> HashMap<String, Store> {
    stores.into_iter().map(|s| (s.id.clone(), s)).collect()
}

fn index_employees(employees: Vec<Employee>) -> HashMap<String, Employee> {
    employees.into_iter().map(|e| (e.id.clone(), e)).collect()
}

fn sales_trend(sales: &[&SalesRecord], tz: Tz) -> Vec<TrendPoint> {
    let mut daily: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for sale in sales {
        let day = sale.timestamp.with_timezone(&tz).date_naive();
        *daily.entry(day).or_insert(Decimal::ZERO) += sale.total_amount;
    }
    daily
        .into_iter()
        .map(|(date, total)| TrendPoint { date, total })
        .collect()
}

fn top_products(sales: &[&SalesRecord], limit: usize) -> Vec<ProductRank> {
    let mut grouped: BTreeMap<&str, ProductRank> = BTreeMap::new();
    for sale in sales {
        for line in &sale.product_lines {
            let entry = grouped
                .entry(line.product_id.as_str())
                .or_insert_with(|| ProductRank {
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                    quantity: 0,
                    amount: Decimal::ZERO,
                });
            entry.quantity += line.quantity;
            entry.amount += line.amount;
        }
    }
    let mut ranked: Vec<ProductRank> = grouped.into_values().collect();
    ranked.sort_by(|a, b| b.amount.cmp(&a.amount).then(b.quantity.cmp(&a.quantity)));
    ranked.truncate(limit);
    ranked
}
