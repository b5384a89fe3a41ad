pub mod config;
pub mod engine;
pub mod factors;
pub mod types;

pub use config::EngineConfig;
pub use engine::{Estimator, DEFAULT_CREW, DEFAULT_TRUCKS};
pub use factors::{bump_hours_for_access, difficulty_bump, AccessFactor};
pub use types::{BillingMode, Bounds, EstimateResult, HomeSize, MoveRequest, PackingAdded};
