use axum::{extract::State, http::StatusCode, Json};
use contracts::dashboards::d400_sales_dashboard::{
    ErrorResponse, FilterOptions, LoadReportDto, ReloadResponse, SalesDashboardRequest,
    SalesDashboardResponse,
};
use std::sync::Arc;

use crate::dashboards::d400_sales_dashboard::{LoadError, SalesDashboardService};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn error_response(context: &str, err: LoadError) -> (StatusCode, Json<ErrorResponse>) {
    tracing::error!("D400 Dashboard: {}: {}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            code: err.code().to_string(),
            message: err.to_string(),
        }),
    )
}

/// POST /api/d400/sales_dashboard
pub async fn get_sales_dashboard(
    State(service): State<Arc<SalesDashboardService>>,
    Json(request): Json<SalesDashboardRequest>,
) -> ApiResult<SalesDashboardResponse> {
    tracing::info!(
        "D400 Dashboard: building dashboard with {} active filters",
        request.filter.active_dimensions()
    );

    match service.get_sales_dashboard(request).await {
        Ok(response) => {
            tracing::info!(
                "D400 Dashboard: {} of {} rows, {} product lines, {} periods",
                response.filtered_rows,
                response.total_rows,
                response.sales_by_product_line.len(),
                response.sales_by_period.len()
            );
            Ok(Json(response))
        }
        Err(e) => Err(error_response("failed to build dashboard", e)),
    }
}

/// GET /api/d400/filter_options
pub async fn get_filter_options(
    State(service): State<Arc<SalesDashboardService>>,
) -> ApiResult<FilterOptions> {
    service
        .get_filter_options()
        .await
        .map(Json)
        .map_err(|e| error_response("failed to get filter options", e))
}

/// GET /api/d400/load_report
pub async fn get_load_report(
    State(service): State<Arc<SalesDashboardService>>,
) -> ApiResult<LoadReportDto> {
    service
        .get_load_report()
        .await
        .map(Json)
        .map_err(|e| error_response("failed to get load report", e))
}

/// POST /api/d400/reload
pub async fn reload(State(service): State<Arc<SalesDashboardService>>) -> ApiResult<ReloadResponse> {
    tracing::info!("D400 Dashboard: manual reload requested");
    match service.reload().await {
        Ok(response) => {
            tracing::info!(
                "D400 Dashboard: reloaded {} rows ({} rejected)",
                response.rows_kept,
                response.rows_rejected
            );
            Ok(Json(response))
        }
        Err(e) => Err(error_response("reload failed", e)),
    }
}
