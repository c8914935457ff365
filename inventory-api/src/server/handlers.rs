// HTTP request handlers
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use inventory_shared::{AggregationKind, AssetPatch};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AssetError;
use crate::server::models::{
    parse_asset_id, CompanyParams, CreateAssetRequest, ListParams, UserLookupParams,
};
use crate::server::state::AppState;

type ApiResult = Result<(StatusCode, Json<Value>), AssetError>;

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AssetError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AssetError::validation(rejection.body_text()))
}

fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, AssetError> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| AssetError::validation(rejection.body_text()))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// `POST /api/assets`
pub async fn create_asset(
    State(state): State<AppState>,
    payload: Result<Json<CreateAssetRequest>, JsonRejection>,
) -> ApiResult {
    let (owner, new) = json_body(payload)?.into_parts()?;
    info!(username = %owner.username, company_id = %owner.company_id, name = %new.name, "Create asset request");

    let asset_id = state.coordinator.create(&owner, new).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Asset created successfully",
            "assetId": asset_id
        })),
    ))
}

/// `GET /api/assets?companyId=..`
pub async fn list_assets(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult {
    let (company_id, query) = query_params(params)?.into_query()?;

    let assets = state.coordinator.list(company_id, &query).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "assets": assets })),
    ))
}

/// `GET /api/assets/:id`
pub async fn get_asset(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let asset_id = parse_asset_id(&id)?;

    let asset = state.coordinator.get(asset_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "asset": asset })),
    ))
}

/// `PUT /api/assets/:id`
pub async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AssetPatch>, JsonRejection>,
) -> ApiResult {
    let asset_id = parse_asset_id(&id)?;
    let patch = json_body(payload)?;

    state.coordinator.update(asset_id, &patch).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Asset updated successfully" })),
    ))
}

/// `DELETE /api/assets/:id`
pub async fn delete_asset(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let asset_id = parse_asset_id(&id)?;

    state.coordinator.delete(asset_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Asset deleted successfully" })),
    ))
}

/// `GET /api/assets/analytics/:kind?companyId=..`
pub async fn aggregate(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    params: Result<Query<CompanyParams>, QueryRejection>,
) -> ApiResult {
    let kind = kind
        .parse::<AggregationKind>()
        .map_err(|e| AssetError::not_found(e.to_string()))?;
    let company_id = query_params(params)?.company_id()?;

    let data = state.aggregations.aggregate(kind, company_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": data })),
    ))
}

/// `GET /api/user-id?username=..&companyId=..`
pub async fn lookup_user(
    State(state): State<AppState>,
    params: Result<Query<UserLookupParams>, QueryRejection>,
) -> ApiResult {
    let (username, company_id) = query_params(params)?.into_parts()?;

    let user_id = state.coordinator.lookup_user(&username, company_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "userId": user_id })),
    ))
}
