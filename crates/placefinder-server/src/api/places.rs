use axum::{
    extract::{Query, State},
    Extension, Json,
};
use placefinder_core::GeoPoint;
use placefinder_search::AnnotatedRecord;
use serde::{Deserialize, Serialize};

use crate::middleware::{ClientIp, RequestId};

use super::{map_query_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct PlacesParams {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct PlacesResponse {
    pub user_location: GeoPoint,
    pub places: Vec<AnnotatedRecord>,
}

pub(super) async fn search_places(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(client): Extension<ClientIp>,
    Query(params): Query<PlacesParams>,
) -> Result<Json<PlacesResponse>, ApiError> {
    let query = params.query.as_deref().map_or("", str::trim);
    tracing::info!(query, "received places query");

    if query.is_empty() {
        tracing::warn!("empty query received");
        return Err(ApiError::new(req_id.0, "bad_request", "no query provided"));
    }

    let user_location = state.locate(client).await;
    let result = state
        .pipeline
        .run(query, user_location)
        .await
        .map_err(|e| map_query_error(req_id.0.clone(), &e))?;

    let places = result.annotated();
    tracing::info!(count = places.len(), scope = %result.scope, "returning places");

    Ok(Json(PlacesResponse {
        user_location,
        places,
    }))
}
