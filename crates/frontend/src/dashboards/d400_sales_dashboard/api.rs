use contracts::dashboards::d400_sales_dashboard::{
    ErrorResponse, FilterOptions, ReloadResponse, SalesDashboardRequest, SalesDashboardResponse,
};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;

const API_BASE: &str = "/api/d400";

/// Значения для мультиселектов боковой панели
pub async fn get_filter_options() -> Result<FilterOptions, String> {
    let url = format!("{}/filter_options", API_BASE);

    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    read_json(response).await
}

/// KPI и графики по выбранным фильтрам
pub async fn get_sales_dashboard(
    request: &SalesDashboardRequest,
) -> Result<SalesDashboardResponse, String> {
    let url = format!("{}/sales_dashboard", API_BASE);

    let response = Request::post(&url)
        .json(request)
        .map_err(|e| format!("Failed to serialize request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    read_json(response).await
}

/// Сбросить кэш таблицы и перечитать файл
pub async fn reload() -> Result<ReloadResponse, String> {
    let url = format!("{}/reload", API_BASE);

    let response = Request::post(&url)
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    read_json(response).await
}

/// Backend errors arrive as `ErrorResponse`; its message goes to the banner
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, String> {
    if !response.ok() {
        return Err(match response.json::<ErrorResponse>().await {
            Ok(error) => error.message,
            Err(_) => format!("HTTP error: {}", response.status()),
        });
    }

    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}
