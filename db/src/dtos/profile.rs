use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct ProfileCreateRequest {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
}
