//! Configuration subsystem.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BinaryContentConfig, ContextPathConfig, GatewayConfig, ObservabilityConfig, ServerConfig,
};
pub use validation::{validate_config, ValidationError};
