pub mod centroids;
pub mod estimator;

pub use centroids::{Centroid, CentroidTable};
pub use estimator::{
    estimate_distance, haversine_miles, is_zip, zip3_fallback_miles, DistanceConfidence,
    DistanceEstimate, EARTH_RADIUS_MILES,
};
