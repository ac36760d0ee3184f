//! Configuration and logging setup

pub mod config;
pub mod logging;

pub use config::{ConfigError, EngineConfig, MapType, RenderConfig};
pub use logging::init_tracing;
