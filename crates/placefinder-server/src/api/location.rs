use axum::{extract::State, Extension, Json};
use placefinder_core::GeoPoint;

use crate::middleware::ClientIp;

use super::AppState;

/// `GET /api/user-location`: geolocated caller, or the configured default.
pub(super) async fn get_user_location(
    State(state): State<AppState>,
    Extension(client): Extension<ClientIp>,
) -> Json<GeoPoint> {
    let location = state.locate(client).await;
    tracing::info!(%location, "returning user location");
    Json(location)
}
