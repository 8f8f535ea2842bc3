mod cors;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use api_usage::AccountSettings;
use common::env_config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();

    // init logger
    if config.console_logging_enabled {
        logger::setup(&config).expect("Failed to set up logger");
    }

    // init store (may be unconfigured)
    let store = db::connect(&config)
        .await
        .expect("Failed to set up store");

    let settings = AccountSettings::from_config(&config).expect("Invalid quota settings");
    log::info!(
        "Free plan '{}', quota windows in {:?}",
        settings.free_plan_id,
        settings.clock
    );

    let origin = config.cors_allowed_origin.clone();
    let jwt_config = config.jwt_config.clone();

    log::info!(
        "Listening on {}:{} ({})",
        config.server_host,
        config.server_port,
        config.environment
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(settings.clone()))
            .wrap(extractor::middleware(jwt_config.clone())) // 3rd
            .wrap(logger::middleware()) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .service(
                web::scope("/api")
                    .service(api_usage::mount_health())
                    .service(api_usage::mount_account()),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
