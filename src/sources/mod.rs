//! External record collaborators consumed by the dashboard engine.
//!
//! The engine itself is pure computation over already-fetched record arrays;
//! these traits are the seam where records come from. Fetch failures surface
//! as [`ServiceError::SourceUnavailable`](crate::errors::ServiceError) and
//! propagate to the caller untouched.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::ServiceError;
use crate::models::{AttendanceRecord, Employee, SalesRecord, Store};

/// Queryable attendance record collection.
#[async_trait]
pub trait AttendanceSource: Send + Sync {
    /// Fetch records with `from <= timestamp < to`; an unset bound is open.
    async fn fetch(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<AttendanceRecord>, ServiceError>;
}

/// Queryable sales record collection.
#[async_trait]
pub trait SalesSource: Send + Sync {
    /// Fetch records with `from <= timestamp < to`; an unset bound is open.
    async fn fetch(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<SalesRecord>, ServiceError>;
}

/// Employee/store directory lookups used for label resolution.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    async fn stores(&self) -> Result<Vec<Store>, ServiceError>;
    async fn employees(&self) -> Result<Vec<Employee>, ServiceError>;
}
