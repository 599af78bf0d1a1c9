use actix_web::{HttpRequest, HttpResponse, http::Method};
use common::error::{AppError, Res};

/// Catch-all for the checkout and webhook scopes: bare OPTIONS gets an
/// empty 200 (preflight is otherwise handled by the CORS middleware),
/// every other unmatched method gets a 405.
pub(crate) async fn method_fallback(req: HttpRequest) -> Res<HttpResponse> {
    if req.method() == Method::OPTIONS {
        Ok(HttpResponse::Ok().finish())
    } else {
        Err(AppError::MethodNotAllowed(req.method().to_string()))
    }
}
