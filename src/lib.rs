pub mod cluster;
pub mod config;
pub mod embedding;
pub mod keywords;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod scoring;

pub const TARGET_PIPELINE: &str = "pipeline";
pub const TARGET_EMBEDDING: &str = "embedding";
pub const TARGET_CLUSTER: &str = "cluster";
