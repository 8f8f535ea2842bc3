use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::subscription::SubscriptionStatus;

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionCreateRequest {
    pub user_id: Uuid,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub current_period_end: Option<DateTime<Utc>>,
}
