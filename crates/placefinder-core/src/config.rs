use std::str::FromStr;

use crate::app_config::{AppConfig, CoordinateFormat, Environment};
use crate::geo::GeoPoint;
use crate::region::{ScopeRadii, FIXED_BOUNDS_MIN_RADIUS_KM};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can use a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        parse_value::<SocketAddr>(var, &or_default(var, default))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value::<u64>(var, &or_default(var, default))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        parse_value::<usize>(var, &or_default(var, default))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = parse_value::<f64>(var, &or_default(var, default))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be a finite number".to_string(),
            })
        }
    };

    let gemini_api_key = require("GEMINI_API_KEY")?;

    let env = parse_environment(&or_default("PLACEFINDER_ENV", "development"))?;
    let bind_addr = parse("PLACEFINDER_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("PLACEFINDER_LOG_LEVEL", "info");

    let gemini_model = or_default("PLACEFINDER_GEMINI_MODEL", "gemini-1.5-flash");
    let gemini_base_url = or_default(
        "PLACEFINDER_GEMINI_BASE_URL",
        "https://generativelanguage.googleapis.com/v1beta",
    );
    let geoip_base_url = or_default("PLACEFINDER_GEOIP_BASE_URL", "http://ip-api.com/json");
    let completion_timeout_secs = parse_u64("PLACEFINDER_COMPLETION_TIMEOUT_SECS", "30")?;
    let geoip_timeout_secs = parse_u64("PLACEFINDER_GEOIP_TIMEOUT_SECS", "5")?;
    let user_agent = or_default("PLACEFINDER_USER_AGENT", "placefinder/0.1 (place-search)");

    let default_location = GeoPoint::new(
        parse_f64("PLACEFINDER_DEFAULT_LATITUDE", "19.0549")?,
        parse_f64("PLACEFINDER_DEFAULT_LONGITUDE", "72.8258")?,
    );
    if !default_location.is_on_globe() {
        return Err(ConfigError::InvalidEnvVar {
            var: "PLACEFINDER_DEFAULT_LATITUDE".to_string(),
            reason: format!("default location {default_location} is not a valid coordinate"),
        });
    }

    let enforce_bounds = parse_bool(
        "PLACEFINDER_ENFORCE_BOUNDS",
        &or_default("PLACEFINDER_ENFORCE_BOUNDS", "true"),
    )?;
    let coordinate_format = parse_value::<CoordinateFormat>(
        "PLACEFINDER_COORDINATE_FORMAT",
        &or_default("PLACEFINDER_COORDINATE_FORMAT", "space"),
    )?;

    let city_keywords = split_keywords(&or_default("PLACEFINDER_CITY_KEYWORDS", "mumbai"));
    let region_keywords =
        split_keywords(&or_default("PLACEFINDER_REGION_KEYWORDS", "maharashtra"));

    let parse_radius = |var: &str, default: f64| -> Result<f64, ConfigError> {
        let radius = parse_f64(var, &default.to_string())?;
        if radius > 0.0 {
            Ok(radius)
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("radius must be greater than 0 km, got {radius}"),
            })
        }
    };

    let defaults = ScopeRadii::default();
    let scope_radii = ScopeRadii {
        nearby_km: parse_radius("PLACEFINDER_RADIUS_NEARBY_KM", defaults.nearby_km)?,
        local_km: parse_radius("PLACEFINDER_RADIUS_LOCAL_KM", defaults.local_km)?,
        city_km: parse_radius("PLACEFINDER_RADIUS_CITY_KM", defaults.city_km)?,
        metro_km: parse_radius("PLACEFINDER_RADIUS_METRO_KM", defaults.metro_km)?,
        region_km: region_radius(parse_radius(
            "PLACEFINDER_RADIUS_REGION_KM",
            defaults.region_km,
        )?)?,
    };

    let rate_limit_per_minute = parse_usize("PLACEFINDER_RATE_LIMIT_PER_MINUTE", "120")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        gemini_api_key,
        gemini_model,
        gemini_base_url,
        geoip_base_url,
        completion_timeout_secs,
        geoip_timeout_secs,
        user_agent,
        default_location,
        enforce_bounds,
        coordinate_format,
        city_keywords,
        region_keywords,
        scope_radii,
        rate_limit_per_minute,
    })
}

/// The REGION scope always searches the fixed metropolitan box, which only
/// applies from [`FIXED_BOUNDS_MIN_RADIUS_KM`] up.
fn region_radius(radius: f64) -> Result<f64, ConfigError> {
    if radius >= FIXED_BOUNDS_MIN_RADIUS_KM {
        Ok(radius)
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: "PLACEFINDER_RADIUS_REGION_KM".to_string(),
            reason: format!(
                "region radius must be at least {FIXED_BOUNDS_MIN_RADIUS_KM} km, got {radius}"
            ),
        })
    }
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PLACEFINDER_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
