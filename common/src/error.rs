use actix_web::HttpResponse;
use thiserror::Error;

pub type Res<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // === CONVERSION ERRORS ===
    #[error("Payment provider error: {0}")]
    Provider(#[from] stripe::StripeError),

    // === APPLICATION ERRORS ===
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid plan or period: {0}")]
    InvalidPlanPeriod(String),

    #[error("Invalid add-on amount: {0}")]
    InvalidAddonAmount(i64),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Webhook Error: {0}")]
    SignatureVerification(String),

    #[error("Too Many Requests: {0}")]
    TooManyRequests(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn to_http_response(&self) -> HttpResponse {
        match self {
            // === CONVERSION ERRORS ===
            AppError::Provider(error) => {
                log::error!("Stripe error: {}", error);
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({ "error": "Payment provider error" }))
            }

            // === APPLICATION ERRORS ===
            AppError::MissingField(_)
            | AppError::InvalidPlanPeriod(_)
            | AppError::InvalidAddonAmount(_) => {
                HttpResponse::BadRequest().json(serde_json::json!({ "error": self.to_string() }))
            }
            AppError::MethodNotAllowed(_) => HttpResponse::MethodNotAllowed()
                .json(serde_json::json!({ "error": "Method not allowed" })),
            // Signature failures answer in plain text, not json.
            AppError::SignatureVerification(_) => {
                HttpResponse::BadRequest().body(self.to_string())
            }
            AppError::TooManyRequests(_) => HttpResponse::TooManyRequests()
                .json(serde_json::json!({ "error": self.to_string() })),
            AppError::Internal(error) => {
                log::error!("Internal error: {}", error);
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({ "error": "Internal server error" }))
            }
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        self.to_http_response()
    }
}
