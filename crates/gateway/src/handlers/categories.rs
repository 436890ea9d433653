//! Career category handlers
//!
//! Categories are a fixed, seeded vocabulary; the API exposes them
//! read-only.

use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use careerlens_common::{
    auth::AuthContext,
    db::models::CareerCategory,
    errors::Result,
};

#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>,
}

impl From<CareerCategory> for CategoryResponse {
    fn from(c: CareerCategory) -> Self {
        let keywords = c.keyword_list();
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            keywords,
        }
    }
}

/// List all active career categories
pub async fn list_categories(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<CategoryResponse>>> {
    let categories = state.repo().list_active_categories().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}
