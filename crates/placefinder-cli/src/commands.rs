//! Command handlers called from `main`.
//!
//! `query` and `locate` need the full configuration (including
//! `GEMINI_API_KEY`). `scope` never touches the network and falls back to
//! built-in defaults when no configuration is available.

use anyhow::Context as _;
use placefinder_core::{AppConfig, ConfigError, CoordinateFormat, GeoPoint, DEFAULT_LOCATION};
use placefinder_providers::{locate_or_default, GeminiClient, IpApiClient};
use placefinder_search::{AnnotatedRecord, QueryError, QueryPipeline, SearchSettings};
use serde::Serialize;

/// Per-invocation overrides layered on top of [`AppConfig`].
#[derive(Debug, Default)]
pub(crate) struct QueryOverrides {
    pub location: Option<GeoPoint>,
    pub enforce_bounds: Option<bool>,
    pub coordinate_format: Option<CoordinateFormat>,
}

impl QueryOverrides {
    pub(crate) fn apply(&self, settings: &mut SearchSettings) {
        if let Some(enforce) = self.enforce_bounds {
            settings.parser.enforce_bounds = enforce;
        }
        if let Some(format) = self.coordinate_format {
            settings.parser.coordinate_format = format;
        }
    }
}

/// `--lat`/`--lon` are declared as requiring each other, so one without the
/// other never reaches here.
pub(crate) fn location_arg(lat: Option<f64>, lon: Option<f64>) -> Option<GeoPoint> {
    lat.zip(lon).map(|(lat, lon)| GeoPoint::new(lat, lon))
}

#[derive(Debug, Serialize)]
struct QueryOutput {
    user_location: GeoPoint,
    places: Vec<AnnotatedRecord>,
}

#[derive(Debug, Serialize)]
struct ScopeOutput<'a> {
    query: &'a str,
    scope: placefinder_core::Scope,
    region: &'a placefinder_core::Region,
    bounds: placefinder_core::Bounds,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn geolocation_client(config: &AppConfig) -> anyhow::Result<IpApiClient> {
    IpApiClient::with_base_url(
        config.geoip_timeout_secs,
        &config.user_agent,
        &config.geoip_base_url,
    )
    .context("failed to build geolocation client")
}

pub(crate) async fn run_query(text: &str, overrides: QueryOverrides) -> anyhow::Result<()> {
    let config = placefinder_core::load_app_config()?;

    let user_location = match overrides.location {
        Some(point) => {
            anyhow::ensure!(point.is_on_globe(), "--lat/--lon out of range: {point}");
            point
        }
        None => {
            let geolocation = geolocation_client(&config)?;
            locate_or_default(&geolocation, None, config.default_location).await
        }
    };

    let mut settings = SearchSettings::from_app_config(&config);
    overrides.apply(&mut settings);

    let completion = GeminiClient::with_base_url(
        &config.gemini_api_key,
        &config.gemini_model,
        config.completion_timeout_secs,
        &config.user_agent,
        &config.gemini_base_url,
    )
    .context("failed to build completion client")?;
    let pipeline = QueryPipeline::new(completion, settings);

    match pipeline.run(text, user_location).await {
        Ok(result) => print_json(&QueryOutput {
            user_location,
            places: result.annotated(),
        }),
        Err(QueryError::NoResults { completion_failed }) if completion_failed => {
            anyhow::bail!("no results: the completion request failed")
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) async fn run_locate(ip: Option<&str>) -> anyhow::Result<()> {
    let config = placefinder_core::load_app_config()?;
    let geolocation = geolocation_client(&config)?;
    let point = locate_or_default(&geolocation, ip, config.default_location).await;
    print_json(&point)
}

pub(crate) fn run_scope(
    text: &str,
    location: Option<GeoPoint>,
    show_prompt: bool,
) -> anyhow::Result<()> {
    let (settings, default_location) = match placefinder_core::load_app_config() {
        Ok(config) => (SearchSettings::from_app_config(&config), config.default_location),
        Err(ConfigError::MissingEnvVar(var)) => {
            tracing::debug!(%var, "configuration incomplete; using built-in defaults");
            (SearchSettings::default(), DEFAULT_LOCATION)
        }
        Err(e) => return Err(e.into()),
    };

    let location = location.unwrap_or(default_location);
    anyhow::ensure!(location.is_on_globe(), "--lat/--lon out of range: {location}");

    let plan = settings.plan(text, location)?;
    print_json(&ScopeOutput {
        query: text.trim(),
        scope: plan.scope,
        region: &plan.region,
        bounds: plan.region.bounds(),
        prompt: show_prompt.then_some(plan.prompt.as_str()),
    })
}
