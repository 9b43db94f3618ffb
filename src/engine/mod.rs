pub mod matcher;
pub mod metrics;
pub mod rankings;

pub use matcher::Team;
pub use metrics::{compute_metrics, TeamMetrics};
