use axum::body::to_bytes;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Local;
use std::time::Duration;

use crate::shared::format::format_thousands;

/// Middleware для логирования HTTP запросов
///
/// Выводит в консоль одну строку на запрос:
/// время, длительность, размер ответа, статус, метод и путь.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Читаем тело ответа, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!("Failed to buffer response body for {} {}: {}", method, path, e);
            println!(
                "{}",
                log_line(parts.status, start.elapsed(), None, method.as_str(), &path)
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    println!(
        "{}",
        log_line(
            parts.status,
            start.elapsed(),
            Some(bytes.len()),
            method.as_str(),
            &path
        )
    );

    Response::from_parts(parts, Body::from(bytes))
}

/// Голубой для 2xx, коричневый для остального
fn log_line(
    status: StatusCode,
    elapsed: Duration,
    size: Option<usize>,
    method: &str,
    path: &str,
) -> String {
    let color_code = if status.is_success() { "36" } else { "33" };
    let size = size
        .map(|s| format_thousands(s as u64, '.'))
        .unwrap_or_else(|| "error".to_string());
    format!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
        color_code,
        Local::now().format("%H:%M:%S"),
        elapsed.as_millis(),
        size,
        status.as_u16(),
        method,
        path
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_line_layout() {
        let line = log_line(
            StatusCode::OK,
            Duration::from_millis(12),
            Some(12345),
            "POST",
            "/api/d400/sales_dashboard",
        );
        assert!(line.starts_with("\x1b[36m"));
        assert!(line.contains("12.345"));
        assert!(line.ends_with("200   POST /api/d400/sales_dashboard"));

        let line = log_line(
            StatusCode::INTERNAL_SERVER_ERROR,
            Duration::from_millis(1),
            None,
            "GET",
            "/api/d400/filter_options",
        );
        assert!(line.starts_with("\x1b[33m"));
        assert!(line.contains("error"));
    }
}
