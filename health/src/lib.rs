use actix_web::{HttpRequest, Responder, route, web};
use chrono::Utc;
use common::{error::Res, http::Success};
use serde_json::Value;

/// Liveness probe that echoes the request back. Diagnostic only.
#[route("/ping", method = "GET", method = "POST")]
async fn ping(req: HttpRequest, body: web::Bytes) -> Res<impl Responder> {
    let body = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);

    Success::ok(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "method": req.method().to_string(),
        "path": req.path(),
        "body": body,
    }))
}

pub fn mount_health() -> actix_web::Scope {
    web::scope("/health").service(ping)
}
