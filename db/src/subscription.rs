use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::subscription::SubscriptionCreateRequest, models::subscription::Subscription};

/// Most recent `active` subscription of a user, if any.
pub async fn get_active_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: &Uuid,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>(
        r#"
        SELECT id, user_id, plan_id::text AS plan_id, status::text AS status,
               current_period_end, started_at, created_at
        FROM subscriptions
        WHERE user_id = $1 AND status = 'active'
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: SubscriptionCreateRequest,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO subscriptions (user_id, plan_id, status, current_period_end)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(data.user_id)
    .bind(data.plan_id)
    .bind(data.status.as_str())
    .bind(data.current_period_end)
    .execute(executor)
    .await?;
    Ok(())
}
