use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::debug;

use crate::{
    catalog::{self, CATALOG_ID, Manifest, Meta, SortOrder},
    error::AppResult,
    store::CatalogStore,
};

pub struct ReaderState {
    pub store: CatalogStore,
}

pub fn router(state: Arc<ReaderState>) -> Router {
    Router::new()
        .route("/manifest.json", get(manifest))
        .route("/catalog/movie/{file}", get(catalog))
        .route("/catalog/movie/{catalog_id}/{extra}", get(catalog_with_extra))
        .route("/meta/movie/{file}", get(meta))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogResponse {
    metas: Vec<Meta>,
    extra_supported: Vec<&'static str>,
}

impl CatalogResponse {
    fn new(metas: Vec<Meta>) -> Self {
        Self { metas, extra_supported: vec!["sort"] }
    }
}

#[derive(Serialize)]
struct MetaResponse {
    meta: Meta,
}

async fn manifest() -> Json<Manifest> {
    Json(catalog::manifest())
}

async fn catalog(
    State(state): State<Arc<ReaderState>>,
    Path(file): Path<String>,
) -> AppResult<Response> {
    match file.strip_suffix(".json") {
        Some(id) if id == CATALOG_ID => catalog_response(&state, SortOrder::default()).await,
        _ => Ok(empty_catalog()),
    }
}

/// Stremio encodes extras as `/catalog/movie/<id>/sort=<option>.json`.
async fn catalog_with_extra(
    State(state): State<Arc<ReaderState>>,
    Path((catalog_id, extra)): Path<(String, String)>,
) -> AppResult<Response> {
    if catalog_id != CATALOG_ID {
        return Ok(empty_catalog());
    }
    let extra = extra.strip_suffix(".json").unwrap_or(&extra);
    let order = extra
        .split('&')
        .find_map(|pair| pair.strip_prefix("sort="))
        .map(SortOrder::from_label)
        .unwrap_or_default();
    debug!(order = ?order, "catalog requested with extra");
    catalog_response(&state, order).await
}

async fn catalog_response(state: &ReaderState, order: SortOrder) -> AppResult<Response> {
    let records = state.store.all().await?;
    let metas = catalog::sorted_metas(&records, order);
    Ok(Json(CatalogResponse::new(metas)).into_response())
}

fn empty_catalog() -> Response {
    Json(CatalogResponse::new(vec![])).into_response()
}

async fn meta(
    State(state): State<Arc<ReaderState>>,
    Path(file): Path<String>,
) -> AppResult<Response> {
    let slug = file.strip_suffix(".json").unwrap_or(&file);
    let records = state.store.all().await?;

    let resp = match catalog::find_by_slug(&records, slug) {
        Some(record) => Json(MetaResponse { meta: Meta::from(record) }).into_response(),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({}))).into_response(),
    };
    Ok(resp)
}
