//! Learning-insights analytics: raw marks, homework and attendance in,
//! per-subject metrics, recommendations, forecasts and dashboard data out.

pub mod aggregate;
pub mod config;
pub mod distribution;
pub mod metrics;
pub mod patterns;
pub mod pipeline;
pub mod predictions;
pub mod recommendations;
pub mod types;

pub use config::InsightsConfig;
pub use pipeline::{
    build_insights, get_cached_insights, get_learning_insights, InsightsGenerationError,
    InsightsRepository,
};
