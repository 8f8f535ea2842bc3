use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use common::error::{AppError, Res};
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response, header::CONTENT_RANGE};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
    dtos::{
        consulta::ConsultaCreateRequest, profile::ProfileCreateRequest,
        subscription::SubscriptionCreateRequest,
    },
    models::{
        plan::Plan,
        subscription::{Subscription, SubscriptionStatus},
    },
    store::Store,
};

/// Store that talks to the backend's PostgREST endpoint (`<base>/rest/v1`).
pub struct RestStore {
    client: Client,
    rest_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Res<Self> {
        let base = url::Url::parse(base_url)
            .map_err(|e| AppError::Internal(format!("Invalid SUPABASE_URL: {}", e)))?;
        let rest_url = format!("{}/rest/v1", base.as_str().trim_end_matches('/'));

        let client = Client::builder().timeout(timeout).build()?;

        Ok(RestStore {
            client,
            rest_url,
            api_key,
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Res<Vec<T>> {
        debug!("GET {} {:?}", table, filters);
        let response = self
            .request(Method::GET, table)
            .query(filters)
            .send()
            .await?;
        let rows = check(response).await?.json::<Vec<T>>().await?;
        Ok(rows)
    }

    async fn count(&self, table: &str, filters: &[(&str, String)]) -> Res<i64> {
        debug!("HEAD {} {:?}", table, filters);
        let response = self
            .request(Method::HEAD, table)
            .query(filters)
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = check(response).await?;

        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| {
                AppError::Internal(format!("Missing exact count in response for '{}'", table))
            })
    }

    async fn insert<T: Serialize + Sync>(&self, table: &str, row: &T) -> Res<()> {
        debug!("POST {}", table);
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

async fn check(response: Response) -> Res<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    Err(AppError::Backend { status, message })
}

/// Total from a `Content-Range` header such as `0-24/312` or `*/312`.
pub(crate) fn parse_content_range_total(value: &str) -> Option<i64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}

fn eq(value: impl ToString) -> String {
    format!("eq.{}", value.to_string())
}

#[async_trait]
impl Store for RestStore {
    async fn profile_exists(&self, user_id: Uuid) -> Res<bool> {
        let rows: Vec<serde_json::Value> = self
            .select(
                "profiles",
                &[
                    ("select", "id".to_string()),
                    ("id", eq(user_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    async fn insert_profile(&self, profile: ProfileCreateRequest) -> Res<()> {
        self.insert("profiles", &profile).await
    }

    async fn get_active_subscription(&self, user_id: Uuid) -> Res<Option<Subscription>> {
        let rows: Vec<Subscription> = self
            .select(
                "subscriptions",
                &[
                    ("select", "*".to_string()),
                    ("user_id", eq(user_id)),
                    ("status", eq(SubscriptionStatus::Active)),
                    ("order", "created_at.desc".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_subscription(&self, subscription: SubscriptionCreateRequest) -> Res<()> {
        self.insert("subscriptions", &subscription).await
    }

    async fn get_plan(&self, plan_id: &str) -> Res<Option<Plan>> {
        let rows: Vec<Plan> = self
            .select(
                "plans",
                &[
                    ("select", "*".to_string()),
                    ("id", eq(plan_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn count_consultas_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Res<i64> {
        self.count(
            "consultas",
            &[
                ("select", "id".to_string()),
                ("user_id", eq(user_id)),
                (
                    "created_at",
                    format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Millis, true)),
                ),
            ],
        )
        .await
    }

    async fn insert_consulta(&self, consulta: ConsultaCreateRequest) -> Res<()> {
        self.insert("consultas", &consulta).await
    }
}
