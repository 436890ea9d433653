//! Job posting handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::handlers::matching::MatchRow;
use crate::AppState;
use careerlens_common::{
    auth::AuthContext,
    db::models::JobPosting,
    errors::{AppError, Result},
};

/// Request to create a job posting
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[validate(length(min = 1, max = 500))]
    pub company: String,

    #[validate(length(min = 1, max = 50000))]
    pub description_text: String,
}

#[derive(Serialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub description_text: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<JobPosting> for JobResponse {
    fn from(j: JobPosting) -> Self {
        Self {
            id: j.id,
            title: j.title.clone(),
            company: j.company.clone(),
            description_text: j.description_text.clone(),
            created_at: j.created_at.to_rfc3339(),
            updated_at: j.updated_at.to_rfc3339(),
        }
    }
}

/// Create a job posting
pub async fn create_job(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let job = state
        .repo()
        .create_job(
            auth.owner_id,
            request.title,
            request.company,
            request.description_text,
        )
        .await?;

    tracing::info!(job_id = %job.id, owner_id = %auth.owner_id, "Job posting created");

    Ok((StatusCode::CREATED, Json(job.into())))
}

/// List the caller's job postings
pub async fn list_jobs(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<JobResponse>>> {
    let jobs = state.repo().list_jobs(auth.owner_id).await?;
    Ok(Json(jobs.into_iter().map(Into::into).collect()))
}

#[derive(Serialize)]
pub struct JobDetailResponse {
    #[serde(flatten)]
    pub job: JobResponse,
    /// Stored matches from the most recent match run, best first
    pub matches: Vec<MatchRow>,
}

/// Get a job posting by ID, with its stored match set
pub async fn get_job(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobDetailResponse>> {
    let repo = state.repo();
    let job = repo
        .find_job(auth.owner_id, job_id)
        .await?
        .ok_or_else(|| AppError::JobNotFound {
            id: job_id.to_string(),
        })?;

    let matches = repo.matches_for_job(job_id).await?;

    Ok(Json(JobDetailResponse {
        job: job.into(),
        matches: matches.into_iter().map(Into::into).collect(),
    }))
}
