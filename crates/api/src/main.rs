use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stonks_core::analysis::AnalysisReport;
use stonks_core::client::error::{FetchError, FetchErrorKind};
use stonks_core::client::http::HttpMarketDataClient;
use stonks_core::client::types::INVALID_TICKER;
use stonks_core::domain::market::{SentimentIndex, TickerMatch};
use stonks_core::domain::valuation::{ValidationError, ValuationInputs, ValuationResult};
use stonks_core::engine::valuation::valuate;
use stonks_core::session::AnalysisSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stonks_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let client = HttpMarketDataClient::from_settings(&settings)?;
    let session = AnalysisSession::start(Arc::new(client), settings.search_debounce()).await;
    let state = AppState {
        session: Arc::new(session),
    };

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/analysis/:ticker", get(get_analysis))
        .route("/search/:query", get(get_search))
        .route("/sentiment", get(get_sentiment))
        .route("/valuation", post(post_valuation))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    session: Arc<AnalysisSession>,
}

/// Same envelope shape the backend uses, so the browser handles both alike.
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        })
    }
}

#[derive(Debug)]
enum ApiError {
    Fetch(FetchError),
    Validation(ValidationError),
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError::Fetch(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Fetch(err) => match err.kind() {
                FetchErrorKind::NotFound => {
                    (StatusCode::NOT_FOUND, INVALID_TICKER, err.to_string())
                }
                FetchErrorKind::InvalidInput => {
                    (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
                }
                FetchErrorKind::Transient => {
                    let message = err.to_string();
                    sentry_anyhow::capture_anyhow(&anyhow::Error::new(err));
                    tracing::error!(error = %message, "backend fetch failed");
                    (StatusCode::BAD_GATEWAY, "upstream_unavailable", message)
                }
            },
            ApiError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_input",
                err.to_string(),
            ),
        };

        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(code.to_string()),
            message: Some(message),
        };
        (status, Json(body)).into_response()
    }
}

async fn get_analysis(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<AnalysisReport>>, ApiError> {
    let report = state.session.analyze_ticker(&ticker).await?;
    Ok(ApiResponse::ok(report))
}

// The browser debounces keystrokes; the server answers every lookup it receives.
async fn get_search(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<ApiResponse<Vec<TickerMatch>>>, ApiError> {
    let matches = state.session.client().search(&query).await?;
    Ok(ApiResponse::ok(matches))
}

async fn get_sentiment(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SentimentIndex>>, ApiError> {
    let sentiment = state.session.refresh_sentiment().await?;
    Ok(ApiResponse::ok(sentiment))
}

async fn post_valuation(
    Json(inputs): Json<ValuationInputs>,
) -> Result<Json<ApiResponse<ValuationResult>>, ApiError> {
    let result = valuate(inputs)?;
    Ok(ApiResponse::ok(result))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &stonks_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::time::Duration;
    use stonks_core::client::MarketDataClient;
    use stonks_core::domain::market::{SentimentTrend, StockSnapshot};
    use tower::ServiceExt;

    struct FakeBackend;

    #[async_trait::async_trait]
    impl MarketDataClient for FakeBackend {
        fn provider_name(&self) -> &'static str {
            "fake"
        }

        async fn fetch_stock(&self, ticker: &str) -> Result<StockSnapshot, FetchError> {
            match ticker {
                "NOPE" => Err(FetchError::NotFound {
                    ticker: ticker.to_string(),
                }),
                "DOWN" => Err(FetchError::Backend("upstream exploded".into())),
                _ => Ok(StockSnapshot {
                    symbol: ticker.to_string(),
                    company_name: Some("Fake Co".into()),
                    current_price: Some(50.0),
                    ..Default::default()
                }),
            }
        }

        async fn search(&self, query: &str) -> Result<Vec<TickerMatch>, FetchError> {
            Ok(vec![TickerMatch {
                symbol: query.to_uppercase(),
                name: Some("Fake Co".into()),
                exchange: Some("NMS".into()),
                quote_type: Some("EQUITY".into()),
            }])
        }

        async fn fetch_sentiment(&self) -> Result<SentimentIndex, FetchError> {
            Ok(SentimentIndex {
                score: 50.0,
                rating: "Neutral".into(),
                vix: Some(16.0),
                previous_vix: None,
                trend: SentimentTrend::Stable,
                source: "fake".into(),
            })
        }
    }

    fn app() -> Router {
        let session = AnalysisSession::new(Arc::new(FakeBackend), Duration::from_millis(1));
        router(AppState {
            session: Arc::new(session),
        })
    }

    async fn call(req: Request<Body>) -> (StatusCode, Value) {
        let res = app().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn analysis_returns_report() {
        let (status, body) = call(get("/analysis/fake")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["display_name"], json!("Fake Co"));
        assert_eq!(body["data"]["scores"]["technical"], json!(2));
        assert_eq!(body["data"]["scores"]["max_total"], json!(15));
    }

    #[tokio::test]
    async fn unknown_ticker_is_404_invalid_ticker() {
        let (status, body) = call(get("/analysis/NOPE")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("invalid_ticker"));
    }

    #[tokio::test]
    async fn upstream_failure_is_502() {
        let (status, body) = call(get("/analysis/DOWN")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], json!("upstream_unavailable"));
    }

    #[tokio::test]
    async fn sentiment_is_refreshed_on_request() {
        let (status, body) = call(get("/sentiment")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["rating"], json!("Neutral"));
        assert_eq!(body["data"]["trend"], json!("stable"));
    }

    #[tokio::test]
    async fn valuation_validates_and_decides() {
        let req = Request::builder()
            .method("POST")
            .uri("/valuation")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "company_name": "Acme",
                    "stock_price": 50.0,
                    "eps": 5.0,
                    "growth_rate": 0.08,
                    "required_return": 0.10,
                    "book_value": 20.0,
                    "fcf": 6.0,
                    "sector": "Industrials"
                })
                .to_string(),
            ))
            .unwrap();
        let (status, body) = call(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["decision"], json!("BUY"));
        assert_eq!(body["data"]["intrinsic_method"], json!("dividend_discount"));

        let req = Request::builder()
            .method("POST")
            .uri("/valuation")
            .header("content-type", "application/json")
            .body(Body::from(json!({"company_name": "Acme"}).to_string()))
            .unwrap();
        let (status, body) = call(req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], json!("stock_price is required"));
    }
}
