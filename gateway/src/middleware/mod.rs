pub mod auth;
pub mod rate_limit;

pub use auth::auth_middleware;
pub use rate_limit::{RATE_LIMIT_DISABLED_AT, rate_limit_config};
