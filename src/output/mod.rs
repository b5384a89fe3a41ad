pub mod formatter;

pub use formatter::{
    currency, format_distance_estimate, format_estimate, format_rate_table, format_tsv,
    should_use_colors, ErrorEnvelope, EstimateEnvelope,
};
