use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Store directory entry used for label resolution and geodata display.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Store {
    /// Store identifier
    #[schema(example = "store-bkk-01")]
    pub id: String,
    /// Display name
    #[schema(example = "Sukhumvit Flagship")]
    pub name: String,
    /// Province the store operates in
    pub province: Option<String>,
    /// Latitude of the storefront
    pub latitude: Option<f64>,
    /// Longitude of the storefront
    pub longitude: Option<f64>,
}

/// Employee directory entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Employee {
    /// Employee identifier
    #[schema(example = "emp-042")]
    pub id: String,
    /// Display name
    #[schema(example = "Nok S.")]
    pub name: String,
    /// Home province
    pub province: Option<String>,
}
