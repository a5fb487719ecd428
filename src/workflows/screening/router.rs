use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{CaseSnapshot, RiskTier};
use super::pipeline::ScreeningPipeline;
use super::repository::{InMemoryCaseStore, TenderSource};

/// Router builder exposing the read-only reporting surface plus a trigger for
/// batch runs. The snapshot rendered here is whatever the last run stored.
pub fn screening_router<S>(pipeline: Arc<ScreeningPipeline<S, InMemoryCaseStore>>) -> Router
where
    S: TenderSource + 'static,
{
    Router::new()
        .route("/api/v1/cases", get(cases_handler::<S>))
        .route("/api/v1/cases/:case_id", get(case_detail_handler::<S>))
        .route("/api/v1/statistics", get(statistics_handler::<S>))
        .route("/api/v1/screening/run", post(run_handler::<S>))
        .with_state(pipeline)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CaseQuery {
    pub(crate) limit: Option<usize>,
    pub(crate) tier: Option<String>,
    pub(crate) body: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunRequest {
    #[serde(default = "default_days_back")]
    pub(crate) days_back: u32,
}

fn default_days_back() -> u32 {
    7
}

#[derive(Debug, Serialize)]
pub(crate) struct RunResponse {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) collected: usize,
    pub(crate) scored: usize,
    pub(crate) skipped: usize,
    pub(crate) suspicious: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatisticsView {
    pub(crate) total_count: usize,
    pub(crate) suspicious_count: usize,
    pub(crate) potential_savings_total: f64,
    pub(crate) suspicion_rate: f64,
    pub(crate) generated_at: Option<DateTime<Utc>>,
}

fn snapshot_of<S>(pipeline: &ScreeningPipeline<S, InMemoryCaseStore>) -> Option<CaseSnapshot>
where
    S: TenderSource + 'static,
{
    pipeline.store().snapshot()
}

pub(crate) async fn cases_handler<S>(
    State(pipeline): State<Arc<ScreeningPipeline<S, InMemoryCaseStore>>>,
    Query(query): Query<CaseQuery>,
) -> Response
where
    S: TenderSource + 'static,
{
    let tier = match query.tier.as_deref().map(RiskTier::parse) {
        Some(None) => {
            let payload = json!({ "error": "unknown risk tier" });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
        Some(parsed) => parsed,
        None => None,
    };

    let cases = snapshot_of(&pipeline)
        .map(|snapshot| snapshot.cases)
        .unwrap_or_default();

    let filtered: Vec<_> = cases
        .into_iter()
        .filter(|case| tier.map_or(true, |wanted| case.tier == wanted))
        .filter(|case| {
            query.body.as_deref().map_or(true, |body| {
                case.awarding_body.to_lowercase().contains(&body.to_lowercase())
            })
        })
        .take(query.limit.unwrap_or(usize::MAX))
        .collect();

    (StatusCode::OK, axum::Json(filtered)).into_response()
}

pub(crate) async fn case_detail_handler<S>(
    State(pipeline): State<Arc<ScreeningPipeline<S, InMemoryCaseStore>>>,
    Path(case_id): Path<String>,
) -> Response
where
    S: TenderSource + 'static,
{
    let found = snapshot_of(&pipeline)
        .and_then(|snapshot| snapshot.cases.into_iter().find(|case| case.id.0 == case_id));

    match found {
        Some(case) => (StatusCode::OK, axum::Json(case)).into_response(),
        None => {
            let payload = json!({ "error": format!("case {case_id} not found") });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn statistics_handler<S>(
    State(pipeline): State<Arc<ScreeningPipeline<S, InMemoryCaseStore>>>,
) -> Response
where
    S: TenderSource + 'static,
{
    let view = match snapshot_of(&pipeline) {
        Some(snapshot) => {
            let suspicious_count = snapshot
                .cases
                .iter()
                .filter(|case| case.tier.is_suspicious())
                .count();
            let potential_savings_total =
                snapshot.cases.iter().map(|case| case.potential_savings).sum();
            let suspicion_rate = if snapshot.total_count == 0 {
                0.0
            } else {
                suspicious_count as f64 / snapshot.total_count as f64
            };
            StatisticsView {
                total_count: snapshot.total_count,
                suspicious_count,
                potential_savings_total,
                suspicion_rate,
                generated_at: Some(snapshot.generated_at),
            }
        }
        None => StatisticsView {
            total_count: 0,
            suspicious_count: 0,
            potential_savings_total: 0.0,
            suspicion_rate: 0.0,
            generated_at: None,
        },
    };

    (StatusCode::OK, axum::Json(view)).into_response()
}

pub(crate) async fn run_handler<S>(
    State(pipeline): State<Arc<ScreeningPipeline<S, InMemoryCaseStore>>>,
    axum::Json(request): axum::Json<RunRequest>,
) -> Response
where
    S: TenderSource + 'static,
{
    let days_back = request.days_back;
    let result = tokio::task::spawn_blocking(move || pipeline.run(days_back)).await;

    match result {
        Ok(Ok(report)) => (
            StatusCode::OK,
            axum::Json(RunResponse {
                generated_at: report.generated_at,
                collected: report.collected,
                scored: report.scored,
                skipped: report.skipped,
                suspicious: report.suspicious,
            }),
        )
            .into_response(),
        Ok(Err(err)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(join_error) => {
            let payload = json!({ "error": format!("batch task failed: {join_error}") });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
