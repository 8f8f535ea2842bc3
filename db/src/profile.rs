use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::dtos::profile::ProfileCreateRequest;

pub async fn exists_profile<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: &Uuid,
) -> Res<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM profiles WHERE id = $1)")
        .bind(user_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn insert_profile<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: ProfileCreateRequest,
) -> Res<()> {
    sqlx::query("INSERT INTO profiles (id, full_name, phone) VALUES ($1, $2, $3)")
        .bind(data.id)
        .bind(data.full_name)
        .bind(data.phone)
        .execute(executor)
        .await?;
    Ok(())
}
