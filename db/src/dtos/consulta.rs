use serde::Serialize;
use sqlx::types::JsonValue;
use uuid::Uuid;

use crate::models::consulta::ConsultaTipo;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultaCreateRequest {
    pub user_id: Uuid,
    pub tipo: ConsultaTipo,
    pub placa: Option<String>,
    pub documento: Option<String>,
    pub request_payload: Option<JsonValue>,
    pub response_payload: Option<JsonValue>,
    pub resumen: String,
    pub ok: bool,
    pub error_code: Option<String>,
    pub duracion_ms: Option<i32>,
    pub path: Option<String>,
}
