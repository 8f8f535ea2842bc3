use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::JsonValue;
use uuid::Uuid;

/// Category a logged query is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultaTipo {
    #[default]
    Vehicular,
    Soat,
    Revision,
    Papeletas,
    Licencia,
    Dni,
    Redam,
    Recompensas,
}

impl ConsultaTipo {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultaTipo::Vehicular => "vehicular",
            ConsultaTipo::Soat => "soat",
            ConsultaTipo::Revision => "revision",
            ConsultaTipo::Papeletas => "papeletas",
            ConsultaTipo::Licencia => "licencia",
            ConsultaTipo::Dni => "dni",
            ConsultaTipo::Redam => "redam",
            ConsultaTipo::Recompensas => "recompensas",
        }
    }
}

impl fmt::Display for ConsultaTipo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only log row written once per completed query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consulta {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
}
