use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use uuid::Uuid;

use crate::{
    dtos::{
        consulta::ConsultaCreateRequest, profile::ProfileCreateRequest,
        subscription::SubscriptionCreateRequest,
    },
    models::{
        consulta::Consulta,
        plan::Plan,
        profile::Profile,
        subscription::{Subscription, SubscriptionStatus},
    },
    store::Store,
};

/// Store operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ProfileExists,
    InsertProfile,
    ActiveSubscription,
    InsertSubscription,
    Plan,
    CountConsultas,
    InsertConsulta,
}

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, Profile>,
    subscriptions: Vec<Subscription>,
    plans: HashMap<String, Plan>,
    consultas: Vec<Consulta>,
}

/// Process-local store used by tests.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    failing: Arc<RwLock<HashSet<StoreOp>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call of `op` return a backend error.
    pub fn fail(&self, op: StoreOp) {
        self.failing.write().unwrap().insert(op);
    }

    pub fn seed_plan(&self, plan: Plan) {
        self.tables
            .write()
            .unwrap()
            .plans
            .insert(plan.id.clone(), plan);
    }

    pub fn seed_subscription(&self, subscription: Subscription) {
        self.tables.write().unwrap().subscriptions.push(subscription);
    }

    /// Inserts a log row with an explicit creation time.
    pub fn seed_consulta_at(&self, user_id: Uuid, created_at: DateTime<Utc>) {
        self.tables.write().unwrap().consultas.push(Consulta {
            id: Uuid::new_v4(),
            user_id,
            tipo: Default::default(),
            placa: None,
            documento: None,
            request_payload: None,
            response_payload: None,
            resumen: String::new(),
            ok: true,
            error_code: None,
            duracion_ms: None,
            path: None,
            created_at,
        });
    }

    pub fn profiles(&self) -> Vec<Profile> {
        self.tables.read().unwrap().profiles.values().cloned().collect()
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.tables.read().unwrap().subscriptions.clone()
    }

    pub fn consultas(&self) -> Vec<Consulta> {
        self.tables.read().unwrap().consultas.clone()
    }

    fn check(&self, op: StoreOp) -> Res<()> {
        if self.failing.read().unwrap().contains(&op) {
            return Err(AppError::Backend {
                status: 503,
                message: format!("{:?} unavailable", op),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn profile_exists(&self, user_id: Uuid) -> Res<bool> {
        self.check(StoreOp::ProfileExists)?;
        Ok(self.tables.read().unwrap().profiles.contains_key(&user_id))
    }

    async fn insert_profile(&self, profile: ProfileCreateRequest) -> Res<()> {
        self.check(StoreOp::InsertProfile)?;
        let mut tables = self.tables.write().unwrap();
        if tables.profiles.contains_key(&profile.id) {
            return Err(AppError::Backend {
                status: 409,
                message: "duplicate key value violates unique constraint \"profiles_pkey\""
                    .to_string(),
            });
        }
        tables.profiles.insert(
            profile.id,
            Profile {
                id: profile.id,
                full_name: profile.full_name,
                phone: profile.phone,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_active_subscription(&self, user_id: Uuid) -> Res<Option<Subscription>> {
        self.check(StoreOp::ActiveSubscription)?;
        let tables = self.tables.read().unwrap();
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id && s.status == SubscriptionStatus::Active)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn insert_subscription(&self, subscription: SubscriptionCreateRequest) -> Res<()> {
        self.check(StoreOp::InsertSubscription)?;
        let now = Utc::now();
        self.tables.write().unwrap().subscriptions.push(Subscription {
            id: Uuid::new_v4(),
            user_id: subscription.user_id,
            plan_id: Some(subscription.plan_id),
            status: subscription.status,
            current_period_end: subscription.current_period_end,
            started_at: Some(now),
            created_at: now,
        });
        Ok(())
    }

    async fn get_plan(&self, plan_id: &str) -> Res<Option<Plan>> {
        self.check(StoreOp::Plan)?;
        Ok(self.tables.read().unwrap().plans.get(plan_id).cloned())
    }

    async fn count_consultas_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Res<i64> {
        self.check(StoreOp::CountConsultas)?;
        let tables = self.tables.read().unwrap();
        Ok(tables
            .consultas
            .iter()
            .filter(|c| c.user_id == user_id && c.created_at >= since)
            .count() as i64)
    }

    async fn insert_consulta(&self, consulta: ConsultaCreateRequest) -> Res<()> {
        self.check(StoreOp::InsertConsulta)?;
        self.tables.write().unwrap().consultas.push(Consulta {
            id: Uuid::new_v4(),
            user_id: consulta.user_id,
            tipo: consulta.tipo,
            placa: consulta.placa,
            documento: consulta.documento,
            request_payload: consulta.request_payload,
            response_payload: consulta.response_payload,
            resumen: consulta.resumen,
            ok: consulta.ok,
            error_code: consulta.error_code,
            duracion_ms: consulta.duracion_ms,
            path: consulta.path,
            created_at: Utc::now(),
        });
        Ok(())
    }
}
