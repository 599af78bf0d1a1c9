use actix_cors::Cors;
use actix_web::http::header;

/// CORS restricted to the configured origin allow-list; never a wildcard,
/// so arbitrary origins cannot drive session creation from a browser.
pub fn middleware(origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE])
        .supports_credentials()
        .max_age(3600);

    for origin in origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}
