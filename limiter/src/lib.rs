use middleware::client::ClientLimiter;

pub mod middleware {
    pub mod client;
}

pub fn client_middleware(permits_per_minute: u32) -> ClientLimiter {
    ClientLimiter::new(permits_per_minute)
}
