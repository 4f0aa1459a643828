//! Shared domain types and configuration for placefinder.

mod app_config;
mod config;
pub mod geo;
pub mod region;
pub mod scope;

use thiserror::Error;

pub use app_config::{AppConfig, CoordinateFormat, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{GeoPoint, DEFAULT_LOCATION};
pub use region::{Bounds, CatalogError, Region, RegionCatalog, ScopeRadii};
pub use scope::{Scope, ScopeClassifier};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
