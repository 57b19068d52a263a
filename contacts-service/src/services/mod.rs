pub mod build_info;
pub mod health;
pub mod metrics;

pub use build_info::BuildInfo;
pub use health::{HealthProbes, ProbeReport};
pub use metrics::{get_metrics, init_metrics};
