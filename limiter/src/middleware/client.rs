use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use common::error::AppError;
use governor::{Quota, RateLimiter, clock::QuantaClock, state::keyed::DashMapStateStore};
use std::{future::Future, num::NonZeroU32, pin::Pin, rc::Rc, sync::Arc};

type ClientStateStore = DashMapStateStore<String>;

/// Sliding-window limiter keyed by client address. State lives in process
/// memory, so the limit is advisory and per instance.
pub struct ClientRateLimiter {
    limiter: Arc<RateLimiter<String, ClientStateStore, QuantaClock>>,
}

impl ClientRateLimiter {
    pub fn new(permits_per_minute: u32) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(permits_per_minute).expect("rate limit must be nonzero"));
        let limiter = Arc::new(RateLimiter::keyed(quota));
        Self { limiter }
    }

    /// Consumes one permit for the given client. Returns false when the
    /// client has exhausted its quota for the current window.
    pub fn allow(&self, client_key: &str) -> bool {
        self.limiter.check_key(&client_key.to_string()).is_ok()
    }
}

/// This limiter works per client address (not per server instance).
/// Clones share one quota table, so a clone per actix worker still
/// enforces a single per-process limit.
#[derive(Clone)]
pub struct ClientLimiter {
    limiter: Arc<ClientRateLimiter>,
}

impl ClientLimiter {
    pub fn new(permits_per_minute: u32) -> Self {
        Self {
            limiter: Arc::new(ClientRateLimiter::new(permits_per_minute)),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ClientLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = ClientLimiterService<S>;
    type InitError = ();
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(ClientLimiterService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct ClientLimiterService<S> {
    service: Rc<S>,
    limiter: Arc<ClientRateLimiter>,
}

impl<S, B> Service<ServiceRequest> for ClientLimiterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Rc::clone(&self.service);
        let limiter = self.limiter.clone();
        let client_key = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();
        Box::pin(async move {
            // Check if the rate limiter allows the request
            if limiter.allow(&client_key) {
                // Move to the next services if ok
                srv.call(req).await.map(|res| res.map_into_boxed_body())
            } else {
                // Return 429 if limit reached
                Ok(req.error_response(AppError::TooManyRequests(
                    "Too many requests. Please try again later.".to_string(),
                )))
            }
        })
    }
}
