use std::net::SocketAddr;

use crate::geo::GeoPoint;
use crate::region::ScopeRadii;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How the `Coordinates:` line of a completion is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateFormat {
    /// `Coordinates: 19.10 72.83`
    #[default]
    Space,
    /// `Coordinates: 19.10, 72.83`
    Comma,
}

impl std::str::FromStr for CoordinateFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "space" => Ok(Self::Space),
            "comma" => Ok(Self::Comma),
            other => Err(format!("expected \"space\" or \"comma\", got \"{other}\"")),
        }
    }
}

impl std::fmt::Display for CoordinateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateFormat::Space => write!(f, "space"),
            CoordinateFormat::Comma => write!(f, "comma"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub geoip_base_url: String,
    pub completion_timeout_secs: u64,
    pub geoip_timeout_secs: u64,
    pub user_agent: String,
    pub default_location: GeoPoint,
    pub enforce_bounds: bool,
    pub coordinate_format: CoordinateFormat,
    pub city_keywords: Vec<String>,
    pub region_keywords: Vec<String>,
    pub scope_radii: ScopeRadii,
    pub rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("gemini_api_key", &"[redacted]")
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("geoip_base_url", &self.geoip_base_url)
            .field("completion_timeout_secs", &self.completion_timeout_secs)
            .field("geoip_timeout_secs", &self.geoip_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("default_location", &self.default_location)
            .field("enforce_bounds", &self.enforce_bounds)
            .field("coordinate_format", &self.coordinate_format)
            .field("city_keywords", &self.city_keywords)
            .field("region_keywords", &self.region_keywords)
            .field("scope_radii", &self.scope_radii)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
