use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::Res;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::{
        consulta::ConsultaCreateRequest, profile::ProfileCreateRequest,
        subscription::SubscriptionCreateRequest,
    },
    models::{plan::Plan, subscription::Subscription},
};

/// Row-level operations the account services need from the hosted backend.
///
/// Every method is a single round trip. Implementations must not retry.
#[async_trait]
pub trait Store: Send + Sync {
    async fn profile_exists(&self, user_id: Uuid) -> Res<bool>;

    async fn insert_profile(&self, profile: ProfileCreateRequest) -> Res<()>;

    /// Most recent subscription of the user with status `active`.
    async fn get_active_subscription(&self, user_id: Uuid) -> Res<Option<Subscription>>;

    async fn insert_subscription(&self, subscription: SubscriptionCreateRequest) -> Res<()>;

    async fn get_plan(&self, plan_id: &str) -> Res<Option<Plan>>;

    /// Exact count of `consultas` rows of the user with `created_at >= since`.
    async fn count_consultas_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Res<i64>;

    async fn insert_consulta(&self, consulta: ConsultaCreateRequest) -> Res<()>;
}

/// Store backed by a direct Postgres connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn profile_exists(&self, user_id: Uuid) -> Res<bool> {
        crate::profile::exists_profile(&*self.pool, &user_id).await
    }

    async fn insert_profile(&self, profile: ProfileCreateRequest) -> Res<()> {
        crate::profile::insert_profile(&*self.pool, profile).await
    }

    async fn get_active_subscription(&self, user_id: Uuid) -> Res<Option<Subscription>> {
        crate::subscription::get_active_subscription(&*self.pool, &user_id).await
    }

    async fn insert_subscription(&self, subscription: SubscriptionCreateRequest) -> Res<()> {
        crate::subscription::insert_subscription(&*self.pool, subscription).await
    }

    async fn get_plan(&self, plan_id: &str) -> Res<Option<Plan>> {
        crate::plan::get_plan_by_id(&*self.pool, plan_id).await
    }

    async fn count_consultas_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Res<i64> {
        crate::consulta::count_consultas_since(&*self.pool, &user_id, since).await
    }

    async fn insert_consulta(&self, consulta: ConsultaCreateRequest) -> Res<()> {
        crate::consulta::insert_consulta(&*self.pool, consulta).await
    }
}
