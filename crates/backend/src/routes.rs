use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::dashboards::d400_sales_dashboard::SalesDashboardService;
use crate::{handlers, system};

/// Конфигурация всех роутов приложения
pub fn configure_routes(service: Arc<SalesDashboardService>, static_dir: &str) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // D400 SALES DASHBOARD
        // ========================================
        .route(
            "/api/d400/sales_dashboard",
            post(handlers::d400_sales_dashboard::get_sales_dashboard),
        )
        .route(
            "/api/d400/filter_options",
            get(handlers::d400_sales_dashboard::get_filter_options),
        )
        .route(
            "/api/d400/load_report",
            get(handlers::d400_sales_dashboard::get_load_report),
        )
        .route(
            "/api/d400/reload",
            post(handlers::d400_sales_dashboard::reload),
        )
        .with_state(service)
        .fallback_service(ServeDir::new(static_dir))
        .layer(middleware::from_fn(system::middleware::request_logger))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::default_config;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use contracts::dashboards::d400_sales_dashboard::ErrorResponse;
    use tower::ServiceExt;

    fn app() -> Router {
        let mut config = default_config().unwrap();
        config.source.path = "/definitely/not/here/SALES_2022.xlsx".to_string();
        configure_routes(Arc::new(SalesDashboardService::new(&config)), "dist")
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_dashboard_surfaces_load_error() {
        let request = Request::post("/api/d400/sales_dashboard")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"filter":{"dates":[]}}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "source_unavailable");
        assert!(error.message.contains("SALES_2022.xlsx"));
    }

    #[tokio::test]
    async fn test_reload_surfaces_load_error() {
        let response = app()
            .oneshot(
                Request::post("/api/d400/reload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
