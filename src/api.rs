use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::aggregate::Granularity;
use crate::config::PipelineConfig;
use crate::engine::{EngineKind, Engines, ScoringEngine};
use crate::error::SentimentError;
use crate::export;
use crate::ingest;
use crate::pipeline::{self, Report};

pub const SAMPLE_CSV: &str = include_str!("../data/sample_sentiment.csv");
pub const RESULTS_FILENAME: &str = "sentiment_results.csv";

#[derive(Clone)]
pub struct AppState {
    pub engines: Engines,
    pub config: Arc<PipelineConfig>,
}

impl AppState {
    pub fn new(engines: Engines, config: PipelineConfig) -> Self {
        Self {
            engines,
            config: Arc::new(config),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/analyze/csv", post(analyze_csv))
        .route("/sample", get(sample))
        .route("/engines", get(engines))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct AnalyzeParams {
    engine: Option<String>,
    granularity: Option<String>,
}

impl AnalyzeParams {
    fn engine(&self, cfg: &PipelineConfig) -> Result<EngineKind, SentimentError> {
        self.engine
            .as_deref()
            .map_or(Ok(cfg.engine), str::parse)
    }

    fn granularity(&self, cfg: &PipelineConfig) -> Result<Granularity, SentimentError> {
        self.granularity
            .as_deref()
            .map_or(Ok(cfg.granularity), str::parse)
    }
}

async fn analyze(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
    body: Bytes,
) -> Result<Json<Report>, ApiError> {
    let kind = params.engine(&state.config)?;
    let granularity = params.granularity(&state.config)?;
    let records = ingest::read_csv(&body[..])?;
    let report = pipeline::run_batch(records, state.engines.select(kind), granularity)?;
    Ok(Json(report))
}

async fn analyze_csv(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let kind = params.engine(&state.config)?;
    let records = ingest::read_csv(&body[..])?;
    let records = pipeline::analyze(records, state.engines.select(kind))?;
    let csv = export::records_to_csv_string(&records)?;
    Ok(csv_attachment(csv, RESULTS_FILENAME))
}

async fn sample() -> Response {
    csv_attachment(SAMPLE_CSV.to_string(), "sample_sentiment.csv")
}

fn csv_attachment(body: String, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

#[derive(Debug, Serialize)]
struct EngineStatus {
    engine: EngineKind,
    ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    vocabulary_size: Option<usize>,
}

async fn engines(State(state): State<AppState>) -> Json<Vec<EngineStatus>> {
    let list = EngineKind::ALL
        .iter()
        .map(|&kind| EngineStatus {
            engine: kind,
            ready: state.engines.select(kind).is_ready(),
            vocabulary_size: match kind {
                EngineKind::Classifier => state.engines.classifier().vocabulary_size(),
                EngineKind::Lexicon => None,
            },
        })
        .collect();
    Json(list)
}

/// Handler error: core pipeline failures keep their taxonomy, anything else
/// is an internal error.
#[derive(Debug)]
pub enum ApiError {
    Core(SentimentError),
    Internal(anyhow::Error),
}

impl From<SentimentError> for ApiError {
    fn from(e: SentimentError) -> Self {
        ApiError::Core(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

pub fn status_for(err: &SentimentError) -> StatusCode {
    match err {
        SentimentError::UnknownEngine(_)
        | SentimentError::InvalidGranularity(_)
        | SentimentError::Ingestion(_) => StatusCode::BAD_REQUEST,
        SentimentError::InsufficientTrainingData(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SentimentError::EngineNotReady => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Core(e) => (
                status_for(&e),
                ErrorBody {
                    error: e.kind(),
                    message: e.to_string(),
                },
            ),
            ApiError::Internal(e) => {
                warn!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "internal",
                        message: format!("{e:#}"),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            status_for(&SentimentError::UnknownEngine("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&SentimentError::InsufficientTrainingData("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&SentimentError::EngineNotReady),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn params_fall_back_to_config() {
        let cfg = PipelineConfig {
            granularity: Granularity::Hour,
            ..PipelineConfig::default()
        };
        let p = AnalyzeParams::default();
        assert_eq!(p.engine(&cfg).unwrap(), EngineKind::Lexicon);
        assert_eq!(p.granularity(&cfg).unwrap(), Granularity::Hour);

        let p = AnalyzeParams {
            engine: Some("ml".into()),
            granularity: Some("fortnight".into()),
        };
        assert_eq!(p.engine(&cfg).unwrap(), EngineKind::Classifier);
        assert!(matches!(
            p.granularity(&cfg),
            Err(SentimentError::InvalidGranularity(_))
        ));
    }
}
