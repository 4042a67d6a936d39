pub mod table;
pub mod errors;
pub mod ratelimit;

pub use ratelimit::{check_cooldown, check_global_rate_limit};
