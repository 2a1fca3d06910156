pub mod insights;
pub mod metrics;
pub mod periods;
pub mod service;
