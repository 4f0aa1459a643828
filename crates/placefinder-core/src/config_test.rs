use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("GEMINI_API_KEY", "test-key");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "PLACEFINDER_ENV"));
}

#[test]
fn build_app_config_fails_without_api_key() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "GEMINI_API_KEY"),
        "expected MissingEnvVar(GEMINI_API_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_api_key_as_missing() {
    let mut map = HashMap::new();
    map.insert("GEMINI_API_KEY", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:5000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.gemini_api_key, "test-key");
    assert_eq!(cfg.gemini_model, "gemini-1.5-flash");
    assert_eq!(
        cfg.gemini_base_url,
        "https://generativelanguage.googleapis.com/v1beta"
    );
    assert_eq!(cfg.geoip_base_url, "http://ip-api.com/json");
    assert_eq!(cfg.completion_timeout_secs, 30);
    assert_eq!(cfg.geoip_timeout_secs, 5);
    assert_eq!(cfg.user_agent, "placefinder/0.1 (place-search)");
    assert_eq!(cfg.default_location, GeoPoint::new(19.0549, 72.8258));
    assert!(cfg.enforce_bounds);
    assert_eq!(cfg.coordinate_format, CoordinateFormat::Space);
    assert_eq!(cfg.city_keywords, vec!["mumbai".to_string()]);
    assert_eq!(cfg.region_keywords, vec!["maharashtra".to_string()]);
    assert_eq!(cfg.scope_radii, ScopeRadii::default());
    assert_eq!(cfg.rate_limit_per_minute, 120);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("PLACEFINDER_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PLACEFINDER_BIND_ADDR"),
        "expected InvalidEnvVar(PLACEFINDER_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn completion_timeout_override_and_invalid() {
    let mut map = full_env();
    map.insert("PLACEFINDER_COMPLETION_TIMEOUT_SECS", "60");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.completion_timeout_secs, 60);

    map.insert("PLACEFINDER_COMPLETION_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PLACEFINDER_COMPLETION_TIMEOUT_SECS"),
        "got: {result:?}"
    );
}

#[test]
fn default_location_override() {
    let mut map = full_env();
    map.insert("PLACEFINDER_DEFAULT_LATITUDE", "18.9220");
    map.insert("PLACEFINDER_DEFAULT_LONGITUDE", "72.8347");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.default_location, GeoPoint::new(18.922, 72.8347));
}

#[test]
fn default_location_off_globe_fails() {
    let mut map = full_env();
    map.insert("PLACEFINDER_DEFAULT_LATITUDE", "95");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
}

#[test]
fn default_location_nan_fails() {
    let mut map = full_env();
    map.insert("PLACEFINDER_DEFAULT_LONGITUDE", "NaN");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PLACEFINDER_DEFAULT_LONGITUDE"),
        "got: {result:?}"
    );
}

#[test]
fn enforce_bounds_accepts_common_spellings() {
    for (raw, expected) in [("false", false), ("0", false), ("OFF", false), ("yes", true)] {
        let mut map = full_env();
        map.insert("PLACEFINDER_ENFORCE_BOUNDS", raw);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.enforce_bounds, expected, "raw: {raw}");
    }
}

#[test]
fn enforce_bounds_invalid() {
    let mut map = full_env();
    map.insert("PLACEFINDER_ENFORCE_BOUNDS", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PLACEFINDER_ENFORCE_BOUNDS"),
        "got: {result:?}"
    );
}

#[test]
fn coordinate_format_override_and_invalid() {
    let mut map = full_env();
    map.insert("PLACEFINDER_COORDINATE_FORMAT", "Comma");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.coordinate_format, CoordinateFormat::Comma);

    map.insert("PLACEFINDER_COORDINATE_FORMAT", "tab");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PLACEFINDER_COORDINATE_FORMAT"),
        "got: {result:?}"
    );
}

#[test]
fn keyword_lists_are_split_trimmed_and_lowercased() {
    let mut map = full_env();
    map.insert("PLACEFINDER_CITY_KEYWORDS", " Mumbai, Bombay ,,");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.city_keywords, vec!["mumbai", "bombay"]);
}

#[test]
fn radius_override() {
    let mut map = full_env();
    map.insert("PLACEFINDER_RADIUS_NEARBY_KM", "2.5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!((cfg.scope_radii.nearby_km - 2.5).abs() < f64::EPSILON);
    assert!((cfg.scope_radii.region_km - 200.0).abs() < f64::EPSILON);
}

#[test]
fn radius_must_be_positive() {
    for raw in ["-15", "0"] {
        let mut map = full_env();
        map.insert("PLACEFINDER_RADIUS_LOCAL_KM", raw);
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PLACEFINDER_RADIUS_LOCAL_KM"),
            "raw {raw}: got {result:?}"
        );
    }
}

#[test]
fn region_radius_below_fixed_box_threshold_fails() {
    let mut map = full_env();
    map.insert("PLACEFINDER_RADIUS_REGION_KM", "150");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PLACEFINDER_RADIUS_REGION_KM"),
        "got: {result:?}"
    );

    map.insert("PLACEFINDER_RADIUS_REGION_KM", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.scope_radii.region_km >= FIXED_BOUNDS_MIN_RADIUS_KM);
}

#[test]
fn debug_output_redacts_api_key() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("test-key"), "api key leaked: {rendered}");
    assert!(rendered.contains("[redacted]"));
}
