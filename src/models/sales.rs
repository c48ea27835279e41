use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One product position inside a sale.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductLine {
    /// Product identifier
    #[schema(example = "sku-1001")]
    pub product_id: String,
    /// Product display name
    #[schema(example = "Iced Latte 16oz")]
    pub name: String,
    /// Units sold on this line
    pub quantity: i64,
    /// Line total amount
    pub amount: Decimal,
}

/// A per-unit sales entry captured by an employee at a store.
///
/// `status` is a free-text workflow label ("completed", "pending", "void", …)
/// owned by the sales workflow, not an enum of this crate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalesRecord {
    /// Record UUID
    pub id: Uuid,
    /// Employee who entered the sale
    #[schema(example = "emp-042")]
    pub employee_id: String,
    /// Store the sale belongs to
    #[schema(example = "store-bkk-01")]
    pub store_id: String,
    /// Sale instant (UTC)
    pub timestamp: DateTime<Utc>,
    /// Workflow status label
    #[schema(example = "completed")]
    pub status: String,
    /// Total amount of the sale
    pub total_amount: Decimal,
    /// Total units across all product lines
    pub quantity: i64,
    /// Per-product breakdown
    pub product_lines: Vec<ProductLine>,
}
