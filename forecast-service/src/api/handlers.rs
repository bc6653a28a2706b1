use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde_json::Value;

use super::{
    error::{ApiError, ValidationError},
    request::{form_to_value, is_workflow_body, parse_json_body, slice_request, workflow_request},
    AppState,
};
use crate::{
    engine::{slice_report, ForecastEngine},
    report::{BackendInfo, Health, LegacyResponse, WorkflowResponse},
};

/// `application/json` or any `application/*+json` media type.
fn is_json(headers: &HeaderMap) -> bool {
    let Some(ct) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

async fn json_body(req: Request, state: &AppState) -> Result<Value, ApiError> {
    let bytes = Bytes::from_request(req, state)
        .await
        .map_err(|e| ValidationError::Body(e.body_text()))?;
    Ok(parse_json_body(&bytes)?)
}

pub async fn predict(State(state): State<AppState>, req: Request) -> Result<Response, ApiError> {
    if is_json(req.headers()) {
        let body = json_body(req, &state).await?;
        if is_workflow_body(&body) {
            return run_workflow(state, body).await;
        }
        return run_slice(state, body).await;
    }

    let Form(form) = Form::<HashMap<String, String>>::from_request(req, &state)
        .await
        .map_err(|e| ValidationError::Body(e.body_text()))?;
    run_slice(state, form_to_value(form)).await
}

pub async fn predict_new_workflow(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, ApiError> {
    if !is_json(req.headers()) {
        return Err(ValidationError::NotJson.into());
    }
    let body = json_body(req, &state).await?;
    run_workflow(state, body).await
}

async fn run_workflow(state: AppState, body: Value) -> Result<Response, ApiError> {
    let request = workflow_request(&body)?;

    let rendered = tokio::task::spawn_blocking(move || {
        let forecast = ForecastEngine::new(&state.store, &state.registry).forecast(&request);
        tracing::info!(
            requested = request.appliances.len(),
            forecast = forecast.appliances.len(),
            skipped = forecast.skipped.len(),
            range = request.range.as_str(),
            period = %request.target.period,
            "workflow forecast served"
        );
        serde_json::to_value(WorkflowResponse::new(&forecast, &state.registry))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(rendered).into_response())
}

async fn run_slice(state: AppState, body: Value) -> Result<Response, ApiError> {
    let request = slice_request(&body)?;

    let rendered = tokio::task::spawn_blocking(move || {
        let report = slice_report(&state.store, &request);
        serde_json::to_value(LegacyResponse::from(&report))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(rendered).into_response())
}

pub async fn backend_info(State(state): State<AppState>) -> Response {
    Json(BackendInfo::new(&state.registry, state.port)).into_response()
}

pub async fn health(State(state): State<AppState>) -> Response {
    Json(Health::of(&state.store)).into_response()
}
