use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Direction of an attendance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    CheckIn,
    CheckOut,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::CheckIn => "check-in",
            AttendanceStatus::CheckOut => "check-out",
        }
    }
}

/// A single attendance event captured at a store.
///
/// Records are immutable once captured; the dashboard engine only ever reads
/// them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    /// Record UUID
    pub id: Uuid,
    /// Employee identifier
    #[schema(example = "emp-042")]
    pub employee_id: String,
    /// Store identifier
    #[schema(example = "store-bkk-01")]
    pub store_id: String,
    /// Capture instant (UTC)
    pub timestamp: DateTime<Utc>,
    /// Check-in or check-out
    pub status: AttendanceStatus,
}
