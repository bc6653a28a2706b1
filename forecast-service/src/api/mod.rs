//! HTTP surface consumed by the dashboard.

pub mod error;
mod handlers;
pub mod request;

pub use error::{ApiError, ValidationError};

use std::{net::SocketAddr, sync::Arc};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use usage_domain::UsageStore;

use crate::registry::ModelRegistry;

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UsageStore>,
    pub registry: Arc<ModelRegistry>,
    /// Port reported by `/backend_info`.
    pub port: u16,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/predict_new_workflow", post(handlers::predict_new_workflow))
        .route("/backend_info", get(handlers::backend_info))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "forecast API listening");
    axum::serve(listener, router(state).into_make_service()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, store_of, usage_at};
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use time::macros::datetime;
    use tower::ServiceExt;
    use usage_domain::Appliance;

    fn state(model_dir: &std::path::Path) -> AppState {
        let store = store_of(vec![
            usage_at(datetime!(2024-01-10 08:00), "H1", "winter", &[(Appliance::Fridge, 0.1)]),
            usage_at(datetime!(2024-01-10 09:00), "H1", "winter", &[(Appliance::Fridge, 0.2)]),
            usage_at(datetime!(2024-06-29 10:00), "H1", "summer", &[(Appliance::Fridge, 1.0)]),
            usage_at(datetime!(2024-06-30 10:00), "H1", "summer", &[(Appliance::Fridge, 3.0)]),
        ]);
        AppState {
            store: Arc::new(store),
            registry: Arc::new(ModelRegistry::open(model_dir)),
            port: 5001,
        }
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_req(uri: &str, content_type: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, content_type)
            .body(body.into())
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn workflow_body() -> String {
        json!({
            "appliances": ["Fridge", "Toaster"],
            "range": "month",
            "predictionYear": 2024,
            "predictionMonth": 7
        })
        .to_string()
    }

    #[tokio::test]
    async fn health_reports_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(router(state(dir.path())), get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"], 4);
        assert_eq!(body["latestTimestamp"], "2024-06-30T10:00:00");
    }

    #[tokio::test]
    async fn backend_info_reports_registry() {
        let dir = tempfile::tempdir().unwrap();
        test_support::write_encoders(dir.path());
        test_support::write_linear_model(dir.path(), Appliance::Fridge, 0.5);
        let (status, body) = call(router(state(dir.path())), get_req("/backend_info")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["modelType"], "RandomForestRegressor");
        assert_eq!(body["modelsOnDisk"], 1);
        assert_eq!(body["modelsLoaded"], 0);
        assert_eq!(body["usingML"], true);
        assert_eq!(body["port"], 5001);
    }

    #[tokio::test]
    async fn workflow_requires_json() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(
            router(state(dir.path())),
            post_req("/predict_new_workflow", "text/plain", workflow_body()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Content-Type must be application/json"}));
    }

    #[tokio::test]
    async fn workflow_rejects_empty_and_incomplete_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(dir.path()));

        let (status, body) = call(
            app.clone(),
            post_req("/predict_new_workflow", "application/json", ""),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Request body is empty");

        let (status, body) = call(
            app,
            post_req("/predict_new_workflow", "application/json", r#"{"range": "month"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Missing required fields: appliances, predictionYear, predictionMonth"
        );
    }

    #[tokio::test]
    async fn workflow_forecast_skips_unknown_appliances() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(
            router(state(dir.path())),
            post_req("/predict_new_workflow", "application/json", workflow_body()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["range"], "month");
        assert_eq!(body["predictionPeriod"], "2024-07");
        assert_eq!(body["totals"], json!({"Fridge": 4.0}));
        assert_eq!(body["predicted"]["Fridge"]["unit"], "kWh");
        assert_eq!(body["predicted"]["Fridge"]["predicted"], 2.0 * 24.0 * 31.0);
        assert!(body["predicted"].get("Toaster").is_none());
        assert_eq!(body["modelInfo"]["lazyLoading"], true);
    }

    #[tokio::test]
    async fn predict_dispatches_workflow_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(
            router(state(dir.path())),
            post_req("/predict", "application/json", workflow_body()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["predictionPeriod"], "2024-07");
    }

    #[tokio::test]
    async fn predict_legacy_json_and_form() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(dir.path()));

        let legacy = json!({
            "appliance": "Fridge", "hour": 8, "day": 10,
            "month": 1, "year": 2024, "season": "winter"
        });
        let (status, body) = call(
            app.clone(),
            post_req("/predict", "application/json", legacy.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["daily"]["hours"], json!([8, 9]));
        assert_eq!(body["alert"], "✅ Usage Normal");

        let (status, form_body) = call(
            app,
            post_req(
                "/predict",
                "application/x-www-form-urlencoded",
                "appliance=Fridge&hour=8&day=10&month=1&year=2024&season=winter",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(form_body, body);
    }

    #[tokio::test]
    async fn predict_legacy_rejects_unknown_appliance() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = json!({
            "appliance": "Toaster", "hour": 8, "day": 10,
            "month": 1, "year": 2024, "season": "winter"
        });
        let (status, body) = call(
            router(state(dir.path())),
            post_req("/predict", "application/json", legacy.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unknown appliance: Toaster");
    }
}
