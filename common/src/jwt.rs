use actix_web::HttpMessage;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    env_config::JwtConfig,
    error::{AppError, Res},
};

/// Claims carried by the session token issued by the backend's auth service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
    pub aud: String,
    pub exp: usize,
}

/// Free-form profile data the user supplied at sign up.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Authenticated identity handed to the account services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub full_name: Option<String>,
    pub name: Option<String>,
}

impl Identity {
    pub fn new(user_id: Uuid) -> Self {
        Identity {
            user_id,
            email: None,
            phone: None,
            full_name: None,
            name: None,
        }
    }
}

impl From<SessionClaims> for Identity {
    fn from(claims: SessionClaims) -> Self {
        let metadata = claims.user_metadata;
        Identity {
            user_id: claims.sub,
            email: non_blank(claims.email),
            phone: non_blank(metadata.phone).or_else(|| non_blank(claims.phone)),
            full_name: non_blank(metadata.full_name),
            name: non_blank(metadata.name),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Extracts claims object from a session token.
/// Requires the backend's JWT secret and expected audience.
pub fn validate_session_token(token: &str, config: &JwtConfig) -> Res<SessionClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.audience.as_str()]);

    let token_data = jsonwebtoken::decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

pub fn get_identity_or_error(req: &HttpRequest) -> Res<Identity> {
    match req.extensions().get::<Res<SessionClaims>>() {
        Some(Ok(claims)) => Ok(Identity::from(claims.clone())),
        Some(Err(app_error)) => Err(AppError::Unauthorized(app_error.to_string())),
        None => Err(AppError::Unauthorized(
            "No authorization token provided".to_string(),
        )),
    }
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(get_identity_or_error(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "super-secret-jwt-token".to_string(),
            audience: "authenticated".to_string(),
        }
    }

    fn sign(claims: &SessionClaims, secret: &str) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(aud: &str) -> SessionClaims {
        SessionClaims {
            sub: Uuid::new_v4(),
            email: Some("ana@example.com".to_string()),
            phone: Some("".to_string()),
            user_metadata: UserMetadata {
                full_name: Some("Ana Quispe".to_string()),
                name: None,
                phone: Some("+51999888777".to_string()),
            },
            aud: aud.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        }
    }

    #[test]
    fn valid_token_yields_identity() {
        let claims = claims("authenticated");
        let token = sign(&claims, &config().secret);

        let decoded = validate_session_token(&token, &config()).unwrap();
        let identity = Identity::from(decoded);

        assert_eq!(identity.user_id, claims.sub);
        assert_eq!(identity.full_name.as_deref(), Some("Ana Quispe"));
        assert_eq!(identity.phone.as_deref(), Some("+51999888777"));
        assert_eq!(identity.email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let token = sign(&claims("anon"), &config().secret);
        assert!(validate_session_token(&token, &config()).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign(&claims("authenticated"), "another-secret");
        assert!(validate_session_token(&token, &config()).is_err());
    }

    #[test]
    fn blank_claim_phone_is_dropped() {
        let mut claims = claims("authenticated");
        claims.user_metadata.phone = None;
        let identity = Identity::from(claims);
        assert_eq!(identity.phone, None);
    }
}
