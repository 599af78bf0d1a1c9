mod cors;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use api_checkout::{
    ProcessedEvents,
    gateway::{PaymentGateway, StripeGateway},
};
use common::env_config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars; missing provider credentials abort startup here
    let config = Config::from_env();
    let config_data = config.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup().expect("Failed to set up logger");
    }

    // init the payment gateway and the webhook redelivery guard
    let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(&config));
    let processed_events = web::Data::new(ProcessedEvents::default());

    let origins = config.cors_allowed_origins.clone();
    // one quota table shared by every worker
    let client_limiter = limiter::client_middleware(config.rate_limit_per_minute);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(processed_events.clone())
            .wrap(client_limiter.clone()) // 3rd
            .wrap(logger::middleware()) // 2nd
            .wrap(cors::middleware(&origins)) // 1st
            .service(
                web::scope("/api")
                    .service(api_checkout::mount_checkout())
                    .service(api_checkout::mount_webhook())
                    .service(health::mount_health()),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
