//! Insight matching handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use careerlens_common::{
    auth::AuthContext,
    db::models::InsightMatch,
    errors::{AppError, Result},
    metrics,
};
use careerlens_matching::{MatchParams, MatchStatus};

/// Optional overrides for one match run; config defaults apply otherwise
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MatchInsightsRequest {
    #[validate(range(min = 1, max = 50))]
    pub top_k: Option<usize>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub min_similarity: Option<f32>,

    /// Restrict candidates to these categories
    pub categories: Option<Vec<Uuid>>,
}

#[derive(Serialize)]
pub struct MatchRow {
    pub id: Uuid,
    pub insight_id: Uuid,
    pub relevance_score: f64,
    pub category_bonus: f64,
    pub final_score: f64,
    pub used_in_narrative: bool,
}

impl From<InsightMatch> for MatchRow {
    fn from(m: InsightMatch) -> Self {
        Self {
            id: m.id,
            insight_id: m.insight_id,
            relevance_score: m.relevance_score,
            category_bonus: m.category_bonus,
            final_score: m.final_score,
            used_in_narrative: m.used_in_narrative,
        }
    }
}

#[derive(Serialize)]
pub struct MatchInsightsResponse {
    pub job_id: Uuid,
    pub matches_found: usize,
    pub matches: Vec<MatchRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Recompute the match set for a job. The previous set is replaced
/// wholesale; a run that matches nothing still succeeds and leaves the set
/// empty.
pub async fn match_insights(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(job_id): Path<Uuid>,
    body: Option<Json<MatchInsightsRequest>>,
) -> Result<Json<MatchInsightsResponse>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let job = state
        .repo()
        .find_job(auth.owner_id, job_id)
        .await?
        .ok_or_else(|| AppError::JobNotFound {
            id: job_id.to_string(),
        })?;

    // The job embedding is computed on demand from title + description
    let job_embedding = state
        .embedder
        .embed(&job.match_text())
        .await
        .map_err(|e| AppError::EmbeddingUnavailable {
            message: format!("failed to embed job {}: {}", job_id, e),
        })?;

    let mut params = MatchParams::from(&state.config.matching);
    if let Some(top_k) = request.top_k {
        params.top_k = top_k;
    }
    if let Some(min_similarity) = request.min_similarity {
        params.min_similarity = min_similarity;
    }

    let start = std::time::Instant::now();
    let outcome = state
        .engine
        .compute_matches(
            &job,
            Some(&job_embedding),
            &params,
            request.categories.as_deref(),
        )
        .await?;
    metrics::record_match_run(start, outcome.matches.len());

    let message = match outcome.status {
        MatchStatus::Matched => None,
        MatchStatus::NoEligibleInsights => Some(
            "No insights cleared the similarity threshold; the match set is now empty".to_string(),
        ),
    };

    Ok(Json(MatchInsightsResponse {
        job_id,
        matches_found: outcome.matches.len(),
        matches: outcome.matches.into_iter().map(Into::into).collect(),
        message,
    }))
}

/// Stored matches for a job, best first
pub async fn list_matches(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<MatchRow>>> {
    let repo = state.repo();

    repo.find_job(auth.owner_id, job_id)
        .await?
        .ok_or_else(|| AppError::JobNotFound {
            id: job_id.to_string(),
        })?;

    let matches = repo.matches_for_job(job_id).await?;
    Ok(Json(matches.into_iter().map(Into::into).collect()))
}
