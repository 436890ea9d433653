//! Personal insight handlers

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
    db::models::{Insight, InsightType},
    errors::{AppError, Result},
};

/// Request to create a new insight
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInsightRequest {
    pub category_id: Uuid,

    pub insight_type: InsightType,

    #[validate(length(min = 1, max = 2000))]
    pub question: String,

    #[validate(length(min = 1, max = 10000))]
    pub content: String,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request to update an insight; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInsightRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: Option<String>,

    #[validate(length(min = 1, max = 10000))]
    pub content: Option<String>,

    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListInsightsQuery {
    pub category_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct InsightResponse {
    pub id: Uuid,
    pub category_id: Uuid,
    pub insight_type: String,
    pub question: String,
    pub content: String,
    pub tags: serde_json::Value,
    /// Whether the embedding has been generated; matching only considers
    /// insights where this is true
    pub has_embedding: bool,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Insight> for InsightResponse {
    fn from(i: Insight) -> Self {
        Self {
            id: i.id,
            category_id: i.category_id,
            insight_type: i.insight_type.clone(),
            question: i.question.clone(),
            content: i.content.clone(),
            tags: i.tags.clone(),
            has_embedding: i.embedding.is_some(),
            is_active: i.is_active,
            created_at: i.created_at.to_rfc3339(),
            updated_at: i.updated_at.to_rfc3339(),
        }
    }
}

/// Create a new insight. Supersedes any prior active insight for the same
/// (category, type); the embedding is generated asynchronously by the
/// worker.
pub async fn create_insight(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateInsightRequest>,
) -> Result<(StatusCode, Json<InsightResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = state.repo();

    repo.find_category(request.category_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| AppError::CategoryNotFound {
            id: request.category_id.to_string(),
        })?;

    let insight = repo
        .create_insight(
            auth.owner_id,
            request.category_id,
            request.insight_type,
            request.question,
            request.content,
            request.tags,
        )
        .await?;

    tracing::info!(
        insight_id = %insight.id,
        owner_id = %auth.owner_id,
        insight_type = %insight.insight_type,
        "Insight created"
    );

    Ok((StatusCode::CREATED, Json(insight.into())))
}

/// List the caller's active insights
pub async fn list_insights(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListInsightsQuery>,
) -> Result<Json<Vec<InsightResponse>>> {
    let insights = state
        .repo()
        .list_insights(auth.owner_id, query.category_id)
        .await?;
    Ok(Json(insights.into_iter().map(Into::into).collect()))
}

/// Get an insight by ID
pub async fn get_insight(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(insight_id): Path<Uuid>,
) -> Result<Json<InsightResponse>> {
    let insight = state
        .repo()
        .find_insight(auth.owner_id, insight_id)
        .await?
        .ok_or_else(|| AppError::InsightNotFound {
            id: insight_id.to_string(),
        })?;

    Ok(Json(insight.into()))
}

/// Update an insight's text or tags. Editing question or content clears
/// the embedding, so the insight drops out of matching until the worker
/// regenerates it.
pub async fn update_insight(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(insight_id): Path<Uuid>,
    Json(request): Json<UpdateInsightRequest>,
) -> Result<Json<InsightResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = state.repo();
    let insight = repo
        .find_insight(auth.owner_id, insight_id)
        .await?
        .ok_or_else(|| AppError::InsightNotFound {
            id: insight_id.to_string(),
        })?;

    let updated = repo
        .update_insight(insight, request.question, request.content, request.tags)
        .await?;

    Ok(Json(updated.into()))
}

/// Soft-delete an insight
pub async fn delete_insight(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(insight_id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = state.repo();
    let insight = repo
        .find_insight(auth.owner_id, insight_id)
        .await?
        .ok_or_else(|| AppError::InsightNotFound {
            id: insight_id.to_string(),
        })?;

    repo.deactivate_insight(insight).await?;

    tracing::info!(insight_id = %insight_id, owner_id = %auth.owner_id, "Insight deactivated");

    Ok(StatusCode::NO_CONTENT)
}
