use std::{env, sync::Arc};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// This struct holds all the necessary configuration parameters
/// required to initialize and run the server.
/// It includes the bind address and worker count, the CORS origin
/// allow-list, logging and rate-limit settings, and the payment
/// provider credentials together with the checkout redirect URLs.
pub struct Config {
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The origins allowed for CORS (explicit allow-list, never a wildcard).
    pub cors_allowed_origins: Vec<String>,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Requests allowed per client address per minute.
    pub rate_limit_per_minute: u32,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook secret
    pub stripe_webhook_secret: String,
    /// Where the hosted checkout redirects after a completed payment.
    pub checkout_success_url: String,
    /// Where the hosted checkout redirects after an abandoned payment.
    pub checkout_cancel_url: String,
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Loads all configuration values from environment variables with
    /// sensible defaults for the optional settings. Provider credentials and
    /// redirect URLs have no defaults: a process without them must not come
    /// up at all instead of failing on the first provider call.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `STRIPE_SECRET_KEY`: API key for the payment provider
    /// - `STRIPE_WEBHOOK_SECRET`: Signing secret for webhook verification
    /// - `CHECKOUT_SUCCESS_URL`: Redirect target after a completed checkout
    /// - `CHECKOUT_CANCEL_URL`: Redirect target after a cancelled checkout
    ///
    /// Optional (with defaults):
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGINS`: Comma-separated origin allow-list
    ///   (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `RATE_LIMIT_PER_MINUTE`: Per-client request quota (default: 60;
    ///   zero or unparsable values fall back to the default)
    ///
    /// # Panics
    ///
    /// This function will panic if required environment variables are missing.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config {
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            num_workers: env::var("WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            // zero would panic in the limiter's quota; treat it as unset
            rate_limit_per_minute: env::var("RATE_LIMIT_PER_MINUTE")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .ok()
                .filter(|limit| *limit > 0)
                .unwrap_or(60),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .expect("STRIPE_SECRET_KEY must be set"),
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET")
                .expect("STRIPE_WEBHOOK_SECRET must be set"),
            checkout_success_url: env::var("CHECKOUT_SUCCESS_URL")
                .expect("CHECKOUT_SUCCESS_URL must be set"),
            checkout_cancel_url: env::var("CHECKOUT_CANCEL_URL")
                .expect("CHECKOUT_CANCEL_URL must be set"),
        })
    }
}
