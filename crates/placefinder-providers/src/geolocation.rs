//! IP-based user geolocation via the ip-api.com JSON API.

use std::future::Future;

use placefinder_core::GeoPoint;
use reqwest::Client;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::http::{build_client, error_snippet, normalize_base_url};

pub const DEFAULT_GEOIP_BASE_URL: &str = "http://ip-api.com/json";

/// Resolves a client IP address to coordinates.
pub trait GeolocationService: Send + Sync {
    /// Looks up `ip`; `None` asks the provider to geolocate the caller itself.
    fn locate(
        &self,
        ip: Option<&str>,
    ) -> impl Future<Output = Result<GeoPoint, ProviderError>> + Send;
}

#[derive(Debug)]
pub struct IpApiClient {
    client: Client,
    base_url: String,
}

/// ip-api.com response body. `lat`/`lon` are only present on success.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpApiClient {
    /// Creates a client pointed at the public ip-api.com endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ProviderError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_GEOIP_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ProviderError::InvalidBaseUrl`] if `base_url` is not an http(s) URL.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: normalize_base_url(base_url)?,
        })
    }

    fn lookup_url(&self, ip: Option<&str>) -> String {
        match ip.map(str::trim).filter(|s| !s.is_empty()) {
            Some(ip) => format!("{}/{ip}", self.base_url),
            None => format!("{}/", self.base_url),
        }
    }
}

impl GeolocationService for IpApiClient {
    async fn locate(&self, ip: Option<&str>) -> Result<GeoPoint, ProviderError> {
        let url = self.lookup_url(ip);
        tracing::debug!(url = %url, "looking up client location");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = error_snippet(response).await;
            tracing::debug!(status = status.as_u16(), body = %body, "geolocation request rejected");
            return Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let payload: IpApiResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: format!("ip-api lookup {url}"),
                source: e,
            })?;

        point_from_response(payload)
    }
}

fn point_from_response(payload: IpApiResponse) -> Result<GeoPoint, ProviderError> {
    if payload.status != "success" {
        return Err(ProviderError::Api(format!(
            "geolocation status \"{}\": {}",
            payload.status,
            payload.message.as_deref().unwrap_or("no message")
        )));
    }

    match (payload.lat, payload.lon) {
        (Some(lat), Some(lon)) => {
            let point = GeoPoint::new(lat, lon);
            if point.is_on_globe() {
                Ok(point)
            } else {
                Err(ProviderError::Api(format!(
                    "geolocation returned out-of-range point {point}"
                )))
            }
        }
        _ => Err(ProviderError::Api(
            "geolocation response missing lat/lon".to_string(),
        )),
    }
}

/// Geolocates `ip`, falling back to `default` on any failure.
///
/// Failures are logged at `warn` and never propagated.
pub async fn locate_or_default<G: GeolocationService>(
    service: &G,
    ip: Option<&str>,
    default: GeoPoint,
) -> GeoPoint {
    match service.locate(ip).await {
        Ok(point) => {
            tracing::info!(ip = ip.unwrap_or("-"), location = %point, "resolved user location");
            point
        }
        Err(e) => {
            tracing::warn!(
                ip = ip.unwrap_or("-"),
                error = %e,
                fallback = %default,
                "geolocation failed, using default location"
            );
            default
        }
    }
}
