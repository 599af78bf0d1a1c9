use actix_web::web::{self};

pub mod gateway;

pub mod routes {
    pub mod checkout;
    pub(crate) mod fallback;
    pub mod webhook;
}

mod services {
    pub(crate) mod checkout;
    pub(crate) mod webhook;
}

mod dtos {
    pub(crate) mod checkout;
}

mod models {
    pub(crate) mod catalog;
}

pub use services::webhook::ProcessedEvents;

pub fn mount_checkout() -> actix_web::Scope {
    web::scope("/checkout")
        .service(routes::checkout::post_session)
        .default_service(web::route().to(routes::fallback::method_fallback))
}

pub fn mount_webhook() -> actix_web::Scope {
    web::scope("/pay")
        .service(routes::webhook::post_webhook)
        .default_service(web::route().to(routes::fallback::method_fallback))
}
