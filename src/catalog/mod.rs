/// Service catalog
///
/// Admin-managed catalog of bookable services with bulk activate,
/// deactivate, and delete actions.

mod manager;

pub use manager::ServiceManager;

use serde::{Deserialize, Serialize};

/// Service creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub min_duration_minutes: i64,
    pub max_duration_minutes: i64,
    pub is_active: Option<bool>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// Partial service update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub min_duration_minutes: Option<i64>,
    pub max_duration_minutes: Option<i64>,
    pub is_active: Option<bool>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// Bulk action kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Activate,
    Deactivate,
    Delete,
}

/// Bulk action request over a set of service ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkActionRequest {
    pub action: BulkAction,
    pub ids: Vec<i64>,
}

/// Bulk action outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkActionResponse {
    pub affected: u64,
}
