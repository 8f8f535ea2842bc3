use serde::{Deserialize, Serialize};
use sqlx::types::JsonValue;

/// Pricing/quota tier. Reference data maintained outside this service.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub daily_limit: Option<i32>,
    pub monthly_limit: Option<i32>,
    pub price: Option<f64>,
    pub features: Option<JsonValue>,
}
