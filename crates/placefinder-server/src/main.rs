mod api;
mod middleware;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use placefinder_providers::{GeminiClient, IpApiClient};
use placefinder_search::{QueryPipeline, SearchSettings};
use tracing_subscriber::EnvFilter;

use crate::{api::build_app, api::AppState, middleware::RateLimitState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = placefinder_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, model = %config.gemini_model, "starting placefinder");
    tracing::debug!(?config, "loaded configuration");

    let completion = GeminiClient::with_base_url(
        &config.gemini_api_key,
        &config.gemini_model,
        config.completion_timeout_secs,
        &config.user_agent,
        &config.gemini_base_url,
    )?;
    let geolocation = IpApiClient::with_base_url(
        config.geoip_timeout_secs,
        &config.user_agent,
        &config.geoip_base_url,
    )?;

    let state = AppState {
        pipeline: Arc::new(QueryPipeline::new(
            completion,
            SearchSettings::from_app_config(&config),
        )),
        geolocation: Arc::new(geolocation),
        default_location: config.default_location,
    };
    let rate_limit = RateLimitState::new(config.rate_limit_per_minute, Duration::from_secs(60));
    let app = build_app(state, rate_limit);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
