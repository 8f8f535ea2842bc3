use actix_web::{Responder, get, post, web};
use common::{error::Res, http::Success, jwt::Identity};
use db::StoreHandle;

use crate::{
    AccountSettings,
    dtos::account::{BootstrapResponse, ConsultaResponse, RegisterConsultaRequest, UsageResponse},
};

/// Ensures the caller has a profile and an active subscription.
///
/// Meant to be called once per session start. Without a valid session token
/// or without a configured store the call is a no-op reported as `skipped`.
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/account/bootstrap', {
///   method: 'POST',
///   headers: { 'Authorization': `Bearer ${session.access_token}` }
/// });
/// // { status: "completed", profile_created: true, subscription_created: true }
/// ```
#[post("/bootstrap")]
pub async fn post_bootstrap(
    identity: Option<Identity>,
    store: web::Data<StoreHandle>,
    settings: web::Data<AccountSettings>,
) -> Res<impl Responder> {
    let outcome =
        usage::ensure_user_bootstrap(store.as_deref(), identity.as_ref(), &settings.free_plan_id)
            .await;
    Success::ok(BootstrapResponse::from(outcome))
}

/// Current plan and remaining quota of the caller.
///
/// Anonymous callers get the zero snapshot.
#[get("/usage")]
pub async fn get_usage(
    identity: Option<Identity>,
    store: web::Data<StoreHandle>,
    settings: web::Data<AccountSettings>,
) -> Res<impl Responder> {
    let user_id = identity.map(|identity| identity.user_id);
    let outcome = usage::get_usage_snapshot(store.as_deref(), user_id, &settings.clock).await;
    Success::ok(UsageResponse::from(outcome))
}

#[post("/consultas")]
pub async fn post_consulta(
    identity: Option<Identity>,
    store: web::Data<StoreHandle>,
    body: web::Json<RegisterConsultaRequest>,
) -> Res<impl Responder> {
    let user_id = identity.map(|identity| identity.user_id);
    let input = body.into_inner().into_input(user_id);
    let outcome = usage::register_consulta(store.as_deref(), input).await;
    Success::accepted(ConsultaResponse {
        status: outcome.status(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test, web};
    use common::{
        env_config::JwtConfig,
        jwt::{SessionClaims, UserMetadata},
    };
    use db::{StoreHandle, memory::InMemoryStore};
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::{Value, json};
    use usage::QuotaClock;
    use uuid::Uuid;

    use crate::AccountSettings;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            audience: "authenticated".to_string(),
        }
    }

    fn token(user_id: Uuid) -> String {
        let claims = SessionClaims {
            sub: user_id,
            email: Some("carla@example.com".to_string()),
            phone: None,
            user_metadata: UserMetadata {
                full_name: Some("Carla Rojas".to_string()),
                ..Default::default()
            },
            aud: "authenticated".to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_config().secret.as_bytes()),
        )
        .unwrap()
    }

    fn settings() -> AccountSettings {
        AccountSettings {
            free_plan_id: "free".to_string(),
            clock: QuotaClock::Local,
        }
    }

    macro_rules! app {
        ($handle:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($handle))
                    .app_data(web::Data::new(settings()))
                    .wrap(extractor::middleware(jwt_config()))
                    .service(web::scope("/api").service(crate::mount_account())),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn anonymous_usage_is_the_zero_snapshot() {
        let store = InMemoryStore::new();
        let handle: StoreHandle = Some(Arc::new(store));
        let app = app!(handle);

        let req = test::TestRequest::get().uri("/api/account/usage").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "skipped");
        assert_eq!(body["dailyUsed"], 0);
        assert_eq!(body["monthlyUsed"], 0);
        assert_eq!(body["remainingToday"], Value::Null);
        assert_eq!(body["plan"], Value::Null);
        assert_eq!(body["allowsQuery"], true);
    }

    #[actix_web::test]
    async fn authenticated_session_is_bootstrapped_once() {
        let store = InMemoryStore::new();
        let handle: StoreHandle = Some(Arc::new(store.clone()));
        let app = app!(handle);
        let user_id = Uuid::new_v4();

        for expected_created in [true, false] {
            let req = test::TestRequest::post()
                .uri("/api/account/bootstrap")
                .insert_header(("Authorization", format!("Bearer {}", token(user_id))))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;

            assert_eq!(body["status"], "completed");
            assert_eq!(body["profile_created"], expected_created);
            assert_eq!(body["subscription_created"], expected_created);
        }

        let profiles = store.profiles();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].full_name, "Carla Rojas");
        assert_eq!(store.subscriptions().len(), 1);
    }

    #[actix_web::test]
    async fn consulta_is_logged_for_authenticated_caller() {
        let store = InMemoryStore::new();
        let handle: StoreHandle = Some(Arc::new(store.clone()));
        let app = app!(handle);
        let user_id = Uuid::new_v4();

        let req = test::TestRequest::post()
            .uri("/api/account/consultas")
            .insert_header(("Authorization", format!("Bearer {}", token(user_id))))
            .set_json(json!({ "service": "sat_callao", "placa": "c3x-456", "ok": false }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "completed");

        let rows = store.consultas();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, user_id);
        assert_eq!(rows[0].placa.as_deref(), Some("C3X-456"));
        assert_eq!(rows[0].resumen, "sat_callao C3X-456");
        assert!(!rows[0].ok);
    }

    #[actix_web::test]
    async fn anonymous_consulta_is_skipped() {
        let store = InMemoryStore::new();
        let handle: StoreHandle = Some(Arc::new(store.clone()));
        let app = app!(handle);

        let req = test::TestRequest::post()
            .uri("/api/account/consultas")
            .set_json(json!({ "service": "soat", "placa": "abc123" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "skipped");
        assert!(store.consultas().is_empty());
    }

    #[actix_web::test]
    async fn unconfigured_store_skips_bootstrap() {
        let handle: StoreHandle = None;
        let app = app!(handle);

        let req = test::TestRequest::post()
            .uri("/api/account/bootstrap")
            .insert_header(("Authorization", format!("Bearer {}", token(Uuid::new_v4()))))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "skipped");
        assert_eq!(body["profile_created"], false);
    }
}
