use serde::{Deserialize, Serialize};
use serde_json::Value;
use usage::{
    BootstrapReport, Outcome, RegisterConsulta, UsageSnapshot, outcome::OutcomeStatus,
};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct BootstrapResponse {
    pub status: OutcomeStatus,
    pub profile_created: bool,
    pub subscription_created: bool,
}

impl From<Outcome<BootstrapReport>> for BootstrapResponse {
    fn from(outcome: Outcome<BootstrapReport>) -> Self {
        let status = outcome.status();
        let report = outcome.value_or_default();
        BootstrapResponse {
            status,
            profile_created: report.profile_created,
            subscription_created: report.subscription_created,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub status: OutcomeStatus,
    #[serde(flatten)]
    pub snapshot: UsageSnapshot,
    pub allows_query: bool,
}

impl From<Outcome<UsageSnapshot>> for UsageResponse {
    fn from(outcome: Outcome<UsageSnapshot>) -> Self {
        let status = outcome.status();
        let snapshot = outcome.value_or_default();
        UsageResponse {
            status,
            allows_query: snapshot.allows_query(),
            snapshot,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConsultaResponse {
    pub status: OutcomeStatus,
}

/// Body of `POST /account/consultas`.
#[derive(Debug, Deserialize)]
pub struct RegisterConsultaRequest {
    #[serde(alias = "service_key")]
    pub service: String,
    pub placa: Option<String>,
    #[serde(alias = "dni")]
    pub documento: Option<String>,
    pub request: Option<Value>,
    pub response: Option<Value>,
    pub resumen: Option<String>,
    pub ok: Option<bool>,
    pub error_code: Option<String>,
    pub duracion_ms: Option<i32>,
    pub path: Option<String>,
}

impl RegisterConsultaRequest {
    pub fn into_input(self, user_id: Option<Uuid>) -> RegisterConsulta {
        RegisterConsulta {
            user_id,
            service_key: self.service,
            placa: self.placa,
            documento: self.documento,
            request: self.request,
            response: self.response,
            resumen: self.resumen,
            ok: self.ok,
            error_code: self.error_code,
            duracion_ms: self.duracion_ms,
            path: self.path,
        }
    }
}
