use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::dtos::consulta::ConsultaCreateRequest;

/// Number of log rows of a user created at or after `since`.
pub async fn count_consultas_since<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: &Uuid,
    since: DateTime<Utc>,
) -> Res<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM consultas WHERE user_id = $1 AND created_at >= $2",
    )
    .bind(user_id)
    .bind(since)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_consulta<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: ConsultaCreateRequest,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO consultas (user_id, tipo, placa, documento, request_payload, response_payload,
                               resumen, ok, error_code, duracion_ms, path)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(data.user_id)
    .bind(data.tipo.as_str())
    .bind(data.placa)
    .bind(data.documento)
    .bind(data.request_payload)
    .bind(data.response_payload)
    .bind(data.resumen)
    .bind(data.ok)
    .bind(data.error_code)
    .bind(data.duracion_ms)
    .bind(data.path)
    .execute(executor)
    .await?;
    Ok(())
}
