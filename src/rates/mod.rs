pub mod config;
pub mod resolver;
pub mod validation;

pub use config::*;
pub use resolver::{filed_rate, hourly_rate, per_lb_per_mile_rate};
pub use validation::{rate_warnings, validate_rates};
