use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{AttendanceSource, DirectorySource, SalesSource};
use crate::errors::ServiceError;
use crate::models::{AttendanceRecord, Employee, SalesRecord, Store};

/// In-memory record store backing the capture endpoints and the dashboard
/// sources.
///
/// This is the stand-in for whatever persistence the deployment wires up;
/// everything behind the [`AttendanceSource`]/[`SalesSource`]/
/// [`DirectorySource`] seams is swappable without touching the engine.
#[derive(Default)]
pub struct InMemoryRecordStore {
    attendance: RwLock<Vec<AttendanceRecord>>,
    sales: RwLock<Vec<SalesRecord>>,
    stores: RwLock<HashMap<String, Store>>,
    employees: RwLock<HashMap<String, Employee>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_attendance(&self, record: AttendanceRecord) {
        self.attendance.write().await.push(record);
    }

    pub async fn push_sale(&self, record: SalesRecord) {
        self.sales.write().await.push(record);
    }

    pub async fn upsert_store(&self, store: Store) {
        self.stores.write().await.insert(store.id.clone(), store);
    }

    pub async fn upsert_employee(&self, employee: Employee) {
        self.employees
            .write()
            .await
            .insert(employee.id.clone(), employee);
    }

    pub async fn attendance_count(&self) -> usize {
        self.attendance.read().await.len()
    }

    pub async fn sales_count(&self) -> usize {
        self.sales.read().await.len()
    }
}

fn in_window(
    timestamp: DateTime<Utc>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> bool {
    from.map_or(true, |f| timestamp >= f) && to.map_or(true, |t| timestamp < t)
}

#[async_trait]
impl AttendanceSource for InMemoryRecordStore {
    async fn fetch(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<AttendanceRecord>, ServiceError> {
        Ok(self
            .attendance
            .read()
            .await
            .iter()
            .filter(|r| in_window(r.timestamp, from, to))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SalesSource for InMemoryRecordStore {
    async fn fetch(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<SalesRecord>, ServiceError> {
        Ok(self
            .sales
            .read()
            .await
            .iter()
            .filter(|r| in_window(r.timestamp, from, to))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DirectorySource for InMemoryRecordStore {
    async fn stores(&self) -> Result<Vec<Store>, ServiceError> {
        Ok(self.stores.read().await.values().cloned().collect())
    }

    async fn employees(&self) -> Result<Vec<Employee>, ServiceError> {
        Ok(self.employees.read().await.values().cloned().collect())
    }
}
