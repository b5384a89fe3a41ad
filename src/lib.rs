//! Move cost estimation under filed tariff bands.
//!
//! The engine picks hourly billing for local moves and weight-and-miles
//! billing for line-haul moves, and explains every assumption it makes in
//! plain-language notes.

pub mod config;
pub mod distance;
pub mod estimate;
pub mod output;
pub mod rates;
pub mod stderr_buffer;

pub use distance::{estimate_distance, DistanceConfidence, DistanceEstimate};
pub use estimate::{AccessFactor, BillingMode, Bounds, EstimateResult, Estimator, HomeSize, MoveRequest};
