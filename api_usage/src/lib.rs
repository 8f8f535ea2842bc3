use actix_web::web;
use common::{env_config::Config, error::Res};
use usage::QuotaClock;

pub mod routes {
    pub mod account;
    pub mod health;
}

mod dtos {
    pub(crate) mod account;
}

/// Settings the account routes read from application data.
#[derive(Debug, Clone)]
pub struct AccountSettings {
    pub free_plan_id: String,
    pub clock: QuotaClock,
}

impl AccountSettings {
    pub fn from_config(config: &Config) -> Res<Self> {
        Ok(AccountSettings {
            free_plan_id: config.free_plan_id.clone(),
            clock: QuotaClock::from_config(config.quota_timezone.as_deref())?,
        })
    }
}

pub fn mount_account() -> actix_web::Scope {
    web::scope("/account")
        .service(routes::account::post_bootstrap)
        .service(routes::account::get_usage)
        .service(routes::account::post_consulta)
}

pub fn mount_health() -> actix_web::Resource {
    web::resource("/health").route(web::get().to(routes::health::get_health))
}
