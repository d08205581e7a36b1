use std::{path::PathBuf, sync::Arc};

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use orderboard::config::DashboardConfig;
use orderboard::page::{self, Logo};
use orderboard::types::{Dataset, DateRange};
use orderboard::{io, render};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Read-only state shared by every request
struct AppState {
    dataset: Dataset,
    logo_path: PathBuf,
}

#[derive(Deserialize)]
struct RangeParams {
    start: Option<String>,
    end: Option<String>,
}

/// A request that couldn't be served, rendered as plain text
struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

/// Parses an optional `YYYY-MM-DD` query value; empty counts as absent
fn parse_day(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::bad_request(format!(
                    "Invalid {name} date {text:?}, expected YYYY-MM-DD"
                ))
            }),
    }
}

/// GET /?start=YYYY-MM-DD&end=YYYY-MM-DD
///
/// Renders the dashboard for the range, defaulting to the whole dataset. A
/// range overlapping the data is clamped to it; one outside it is rendered empty.
async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> Result<Html<String>, AppError> {
    let start = parse_day("start", params.start.as_deref())?;
    let end = parse_day("end", params.end.as_deref())?;
    let range = DateRange::resolve(state.dataset.bounds(), start, end);

    let artifacts = render::render(&state.dataset, range);
    let logo = if tokio::fs::try_exists(&state.logo_path).await.unwrap_or(false) {
        Logo::Available { src: "/logo" }
    } else {
        warn!(path = %state.logo_path.display(), "logo not found");
        Logo::Missing(&state.logo_path)
    };
    Ok(Html(page::dashboard_page(&artifacts, logo)))
}

/// GET /logo
async fn logo(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let bytes = tokio::fs::read(&state.logo_path).await.map_err(|err| {
        AppError::not_found(format!(
            "Couldn't read logo at {}: {err}",
            state.logo_path.display()
        ))
    })?;
    let content_type = match state
        .logo_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/logo", get(logo))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = DashboardConfig::from_env();
    let dataset = match io::load_orders_from_path(&config.data_path) {
        Ok(dataset) => dataset,
        Err(err) => {
            error!(path = %config.data_path.display(), "failed to load order data: {err}");
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState {
        dataset,
        logo_path: config.logo_path,
    });

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(addr = %config.listen_addr, "failed to bind: {err}");
            std::process::exit(1);
        }
    };
    info!("listening on http://{}", config.listen_addr);
    if let Err(err) = axum::serve(listener, app(state)).await {
        error!("server stopped: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    const ORDERS_CSV: &[u8] = b"order_id,customer_state,order_purchase_timestamp,order_delivered_customer_date,order_approved_at,geolocation_lat,geolocation_lng,delivered_on_time
A,SP,2018-01-01 09:00:00,2018-01-04 09:00:00,,-23.5,-46.6,True
A,SP,2018-01-01 09:00:00,2018-01-04 09:00:00,,-23.5,-46.6,True
B,RJ,2018-01-02 15:00:00,,,-22.9,-43.2,False
C,MG,2018-01-03 11:00:00,,,-19.9,-43.9,True
";

    fn state(logo_path: PathBuf) -> Arc<AppState> {
        Arc::new(AppState {
            dataset: io::load_orders_from_csv(Cursor::new(ORDERS_CSV)).unwrap(),
            logo_path,
        })
    }

    async fn get_page(state: Arc<AppState>, uri: &str) -> (StatusCode, String) {
        let response = app(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_dashboard_defaults_to_whole_dataset() {
        let (status, html) = get_page(state(PathBuf::from("no/such/logo.png")), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<div class=\"value\">3</div>"));
        assert!(html.contains("value=\"2018-01-01\""));
        assert!(html.contains("value=\"2018-01-03\""));
        assert!(html.contains("Logo not found: no/such/logo.png"));
    }

    #[tokio::test]
    async fn test_dashboard_clamps_overlapping_range() {
        let (status, html) = get_page(
            state(PathBuf::from("no/such/logo.png")),
            "/?start=2017-12-01&end=2018-01-02",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<div class=\"value\">2</div>"));
        assert!(html.contains("name=\"start\" min=\"2018-01-01\" max=\"2018-01-03\" value=\"2018-01-01\""));
        assert!(!html.contains("No orders between"));
    }

    #[tokio::test]
    async fn test_dashboard_range_after_data_is_empty() {
        let (status, html) = get_page(
            state(PathBuf::from("no/such/logo.png")),
            "/?start=2019-01-01&end=2019-02-01",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<div class=\"value\">0</div>"));
        assert!(html.contains("No orders between 2019-01-01 and 2019-02-01"));
    }

    #[tokio::test]
    async fn test_dashboard_rejects_bad_date() {
        let (status, body) =
            get_page(state(PathBuf::from("no/such/logo.png")), "/?start=01-02-2018").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Invalid start date"));
    }

    #[tokio::test]
    async fn test_missing_logo_is_not_found() {
        let (status, body) = get_page(state(PathBuf::from("no/such/logo.png")), "/logo").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("no/such/logo.png"));
    }

    #[tokio::test]
    async fn test_logo_is_served_with_its_type() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"\x89PNG").unwrap();
        let state = state(file.path().to_path_buf());

        let response = app(state.clone())
            .oneshot(Request::builder().uri("/logo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"\x89PNG");

        let (_, html) = get_page(state, "/").await;
        assert!(html.contains("<img src=\"/logo\""));
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("start", None).ok(), Some(None));
        assert_eq!(parse_day("start", Some(" ")).ok(), Some(None));
        assert_eq!(
            parse_day("start", Some("2018-01-02")).ok(),
            Some(NaiveDate::from_ymd_opt(2018, 1, 2))
        );
        let err = parse_day("end", Some("02/01/2018")).err().unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("end"));
    }
}
