use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};

use crate::models::plan::Plan;

pub async fn get_plan_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    plan_id: &str,
) -> Res<Option<Plan>> {
    sqlx::query_as::<_, Plan>(
        r#"
        SELECT id::text AS id, name, daily_limit::int4 AS daily_limit,
               monthly_limit::int4 AS monthly_limit, price::float8 AS price, features
        FROM plans
        WHERE id::text = $1
        "#,
    )
    .bind(plan_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}
