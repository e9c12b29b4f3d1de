use axum::http::{header, Method};
use backend::dashboards::d400_sales_dashboard::SalesDashboardService;
use backend::{routes, shared::config, system};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = config::load_config()?;
    let service = Arc::new(SalesDashboardService::new(&config));

    // Первая загрузка при старте. Ошибка не останавливает сервер,
    // после исправления файла вызывается reload
    match service.table().await {
        Ok(loaded) => tracing::info!(
            "Sales table loaded: {} rows ({} rejected) from {}",
            loaded.table.len(),
            loaded.report.rejected.len(),
            loaded.report.source_path.display()
        ),
        Err(e) => tracing::error!(
            "Initial load failed: {}. Fix the source and POST /api/d400/reload",
            e
        ),
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = routes::configure_routes(service, &config.server.static_dir).layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    config.server.port
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
