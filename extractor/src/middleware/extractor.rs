use actix_web::HttpMessage;
use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform}, Error
};
use futures::future::{Ready, ok};

use common::{
    env_config::JwtConfig, error::Res, jwt::{self, SessionClaims}
};

/// Decodes the bearer session token, when present, and stores the result
/// (claims or the validation error) in the request extensions.
///
/// Requests are never rejected here; routes decide whether an identity is required.
pub struct ExtractionMiddleware {
    jwt_config: Rc<JwtConfig>,
}

impl ExtractionMiddleware {
    pub fn new(jwt_config: JwtConfig) -> Self {
        Self {
            jwt_config: Rc::new(jwt_config),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ExtractionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = ExtractionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ExtractionMiddlewareService {
            service: Rc::new(service),
            jwt_config: Rc::clone(&self.jwt_config),
        })
    }
}

pub struct ExtractionMiddlewareService<S> {
    service: Rc<S>,
    jwt_config: Rc<JwtConfig>,
}

impl<S, B> Service<ServiceRequest> for ExtractionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // retrieve token from authorization header
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_owned());

        let jwt_config = Rc::clone(&self.jwt_config);
        let srv = Rc::clone(&self.service);

        Box::pin(async move {
            if let Some(token) = token {
                // validate token and insert claims to request object for future use
                let claims_res = jwt::validate_session_token(&token, &jwt_config);
                if let Err(e) = &claims_res {
                    log::debug!("Rejected session token: {}", e);
                }
                req.extensions_mut().insert::<Res<SessionClaims>>(claims_res);
            }
            srv.call(req).await.map(|res| res.map_into_boxed_body())
        })
    }
}
