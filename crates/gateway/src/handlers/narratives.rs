//! Narrative generation handlers

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use careerlens_common::{
    auth::AuthContext,
    db::models::{Narrative, NarrativeType},
    errors::{AppError, Result},
    generation::prompt::{build_prompt, InsightContext, SYSTEM_PROMPT},
    metrics,
};

/// Request to generate a narrative for a job
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateNarrativeRequest {
    pub narrative_type: NarrativeType,

    /// Explicit insight selection; when absent the top stored matches are
    /// used
    pub use_insight_ids: Option<Vec<Uuid>>,

    #[validate(length(max = 2000))]
    pub custom_prompt: Option<String>,
}

#[derive(Serialize)]
pub struct InsightUsedRow {
    pub insight_id: Uuid,
    pub weight: f64,
    pub position: i32,
}

#[derive(Serialize)]
pub struct NarrativeResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub narrative_type: String,
    pub content: String,
    pub model_used: Option<String>,
    pub created_at: String,
    pub insights_used: Vec<InsightUsedRow>,
}

#[derive(Serialize)]
pub struct GenerateNarrativeResponse {
    pub job_id: Uuid,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<NarrativeResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn narrative_response(narrative: Narrative, usages: Vec<InsightUsedRow>) -> NarrativeResponse {
    NarrativeResponse {
        id: narrative.id,
        job_id: narrative.job_id,
        narrative_type: narrative.narrative_type.clone(),
        content: narrative.content.clone(),
        model_used: narrative.model_used.clone(),
        created_at: narrative.created_at.to_rfc3339(),
        insights_used: usages,
    }
}

/// Generate (or regenerate) a narrative of the given type for a job.
///
/// A job with no stored matches and no explicit insight ids is a valid
/// empty state, answered with an empty 200 rather than an error.
pub async fn generate_narrative(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(job_id): Path<Uuid>,
    Json(request): Json<GenerateNarrativeRequest>,
) -> Result<(StatusCode, Json<GenerateNarrativeResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = state.repo();
    let job = repo
        .find_job(auth.owner_id, job_id)
        .await?
        .ok_or_else(|| AppError::JobNotFound {
            id: job_id.to_string(),
        })?;

    let selected = match state
        .selector
        .select(job_id, auth.owner_id, request.use_insight_ids.as_deref())
        .await
    {
        Ok(selected) => selected,
        Err(AppError::NoMatchesAvailable { .. }) => {
            return Ok((
                StatusCode::OK,
                Json(GenerateNarrativeResponse {
                    job_id,
                    status: "no_matches".to_string(),
                    narrative: None,
                    message: Some(
                        "No matched insights for this job; run match-insights first".to_string(),
                    ),
                }),
            ));
        }
        Err(e) => return Err(e),
    };

    // Category names for the prompt context
    let categories: HashMap<Uuid, String> = repo
        .list_active_categories()
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let contexts: Vec<InsightContext> = selected
        .iter()
        .map(|s| InsightContext {
            insight: s.insight.clone(),
            category_name: categories
                .get(&s.insight.category_id)
                .cloned()
                .unwrap_or_else(|| "General".to_string()),
        })
        .collect();

    let user_prompt = build_prompt(
        &job,
        &contexts,
        request.narrative_type,
        request.custom_prompt.as_deref(),
    );
    let content = state.generator.generate(SYSTEM_PROMPT, &user_prompt).await?;

    let usages: Vec<(Uuid, f64)> = selected.iter().map(|s| (s.insight.id, s.weight)).collect();
    let narrative = repo
        .replace_narrative(
            job_id,
            auth.owner_id,
            request.narrative_type,
            content,
            Some(state.generator.model_name().to_string()),
            &usages,
        )
        .await?;
    metrics::record_narrative_generated();

    tracing::info!(
        narrative_id = %narrative.id,
        job_id = %job_id,
        owner_id = %auth.owner_id,
        narrative_type = %narrative.narrative_type,
        insights = usages.len(),
        "Narrative generated"
    );

    let used_rows = usages
        .iter()
        .enumerate()
        .map(|(position, (insight_id, weight))| InsightUsedRow {
            insight_id: *insight_id,
            weight: *weight,
            position: position as i32,
        })
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(GenerateNarrativeResponse {
            job_id,
            status: "generated".to_string(),
            narrative: Some(narrative_response(narrative, used_rows)),
            message: None,
        }),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListNarrativesQuery {
    pub job_id: Option<Uuid>,
    pub narrative_type: Option<NarrativeType>,
}

/// List the caller's narratives, newest first
pub async fn list_narratives(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListNarrativesQuery>,
) -> Result<Json<Vec<NarrativeResponse>>> {
    let repo = state.repo();
    let narratives = repo
        .list_narratives(auth.owner_id, query.job_id, query.narrative_type)
        .await?;

    let mut responses = Vec::with_capacity(narratives.len());
    for narrative in narratives {
        let usages = repo
            .usages_for_narrative(narrative.id)
            .await?
            .into_iter()
            .map(|u| InsightUsedRow {
                insight_id: u.insight_id,
                weight: u.weight,
                position: u.position,
            })
            .collect();
        responses.push(narrative_response(narrative, usages));
    }

    Ok(Json(responses))
}

/// Get a narrative by ID
pub async fn get_narrative(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(narrative_id): Path<Uuid>,
) -> Result<Json<NarrativeResponse>> {
    let repo = state.repo();
    let narrative = repo
        .find_narrative(auth.owner_id, narrative_id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource_type: "narrative".to_string(),
            id: narrative_id.to_string(),
        })?;

    let usages = repo
        .usages_for_narrative(narrative.id)
        .await?
        .into_iter()
        .map(|u| InsightUsedRow {
            insight_id: u.insight_id,
            weight: u.weight,
            position: u.position,
        })
        .collect();

    Ok(Json(narrative_response(narrative, usages)))
}
