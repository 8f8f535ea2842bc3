use db::{Store, dtos::consulta::ConsultaCreateRequest};
use log::{debug, warn};
use serde_json::Value;
use uuid::Uuid;

use crate::{Outcome, category::map_service_to_consulta_tipo};

/// Details of a completed query, as reported by the caller.
#[derive(Debug, Clone, Default)]
pub struct RegisterConsulta {
    pub user_id: Option<Uuid>,
    pub service_key: String,
    pub placa: Option<String>,
    pub documento: Option<String>,
    pub request: Option<Value>,
    pub response: Option<Value>,
    pub resumen: Option<String>,
    pub ok: Option<bool>,
    pub error_code: Option<String>,
    pub duracion_ms: Option<i32>,
    pub path: Option<String>,
}

/// Assembles the log row. `None` when there is no user to attribute it to.
pub fn build_consulta_row(input: RegisterConsulta) -> Option<ConsultaCreateRequest> {
    let user_id = input.user_id?;

    let placa = input
        .placa
        .map(|placa| placa.trim().to_uppercase())
        .filter(|placa| !placa.is_empty());

    let resumen = input.resumen.unwrap_or_else(|| {
        let subject = placa.as_deref().or(input.documento.as_deref()).unwrap_or("");
        format!("{} {}", input.service_key.trim(), subject.trim())
            .trim()
            .to_string()
    });

    Some(ConsultaCreateRequest {
        user_id,
        tipo: map_service_to_consulta_tipo(&input.service_key),
        placa,
        documento: input.documento,
        request_payload: input.request,
        response_payload: input.response,
        resumen,
        ok: input.ok.unwrap_or(true),
        error_code: input.error_code,
        duracion_ms: input.duracion_ms,
        path: input.path,
    })
}

/// Appends one row to the query log. Fire and forget: insert failures are
/// logged and reported as `Degraded`, never raised.
pub async fn register_consulta(store: Option<&dyn Store>, input: RegisterConsulta) -> Outcome<()> {
    let Some(store) = store else {
        debug!("Query log skipped: no store configured");
        return Outcome::Skipped;
    };
    let Some(row) = build_consulta_row(input) else {
        debug!("Query log skipped: no user id");
        return Outcome::Skipped;
    };

    let user_id = row.user_id;
    let tipo = row.tipo;
    match store.insert_consulta(row).await {
        Ok(()) => {
            debug!("Logged {} query for user {}", tipo, user_id);
            Outcome::Completed(())
        }
        Err(e) => {
            warn!("Failed to log {} query for user {}: {}", tipo, user_id, e);
            Outcome::Degraded {
                value: (),
                issues: vec![e.to_string()],
            }
        }
    }
}
