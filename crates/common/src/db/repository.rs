//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations with proper
//! error handling. The match-set and narrative replace operations run in a
//! single transaction so concurrent readers never observe a partial state.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

/// A scored match row to be persisted, in rank order
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub insight_id: Uuid,
    pub relevance_score: f64,
    pub category_bonus: f64,
    pub final_score: f64,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Career Category Operations
    // ========================================================================

    /// List active categories, ordered by name
    pub async fn list_active_categories(&self) -> Result<Vec<CareerCategory>> {
        CareerCategoryEntity::find()
            .filter(CareerCategoryColumn::IsActive.eq(true))
            .order_by_asc(CareerCategoryColumn::Name)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Find a category by ID
    pub async fn find_category(&self, id: Uuid) -> Result<Option<CareerCategory>> {
        CareerCategoryEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Upsert a category by name; keywords and description are refreshed on
    /// re-seed
    pub async fn upsert_category(
        &self,
        name: &str,
        description: &str,
        keywords: &[&str],
    ) -> Result<CareerCategory> {
        let now = chrono::Utc::now();
        let keyword_json = serde_json::json!(keywords);

        let existing = CareerCategoryEntity::find()
            .filter(CareerCategoryColumn::Name.eq(name))
            .one(self.conn())
            .await?;

        match existing {
            Some(category) => {
                let mut active: CareerCategoryActiveModel = category.into();
                active.description = Set(description.to_string());
                active.keywords = Set(keyword_json);
                active.is_active = Set(true);
                active.updated_at = Set(now.into());
                active.update(self.conn()).await.map_err(Into::into)
            }
            None => {
                let active = CareerCategoryActiveModel {
                    id: Set(Uuid::new_v4()),
                    name: Set(name.to_string()),
                    description: Set(description.to_string()),
                    keywords: Set(keyword_json),
                    is_active: Set(true),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                active.insert(self.conn()).await.map_err(Into::into)
            }
        }
    }

    // ========================================================================
    // Insight Operations
    // ========================================================================

    /// Create an insight, deactivating any prior active insight for the same
    /// (owner, category, insight_type) triple in the same transaction. The
    /// embedding starts absent; the worker fills it in.
    pub async fn create_insight(
        &self,
        owner_id: Uuid,
        category_id: Uuid,
        insight_type: InsightType,
        question: String,
        content: String,
        tags: Vec<String>,
    ) -> Result<Insight> {
        let now = chrono::Utc::now();
        let type_str = String::from(insight_type);
        let txn = self.conn().begin().await?;

        // Supersede the previous active insight of the same kind
        let prior = InsightEntity::find()
            .filter(InsightColumn::OwnerId.eq(owner_id))
            .filter(InsightColumn::CategoryId.eq(category_id))
            .filter(InsightColumn::InsightType.eq(type_str.clone()))
            .filter(InsightColumn::IsActive.eq(true))
            .all(&txn)
            .await?;

        for old in prior {
            let mut active: InsightActiveModel = old.into();
            active.is_active = Set(false);
            active.updated_at = Set(now.into());
            active.update(&txn).await?;
        }

        let insight = InsightActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            category_id: Set(category_id),
            insight_type: Set(type_str),
            question: Set(question),
            content: Set(content),
            embedding: Set(None),
            tags: Set(serde_json::json!(tags)),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(insight)
    }

    /// Find an insight by ID, scoped to its owner
    pub async fn find_insight(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Insight>> {
        InsightEntity::find_by_id(id)
            .filter(InsightColumn::OwnerId.eq(owner_id))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// List an owner's active insights, newest first
    pub async fn list_insights(
        &self,
        owner_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<Vec<Insight>> {
        let mut query = InsightEntity::find()
            .filter(InsightColumn::OwnerId.eq(owner_id))
            .filter(InsightColumn::IsActive.eq(true));

        if let Some(category_id) = category_id {
            query = query.filter(InsightColumn::CategoryId.eq(category_id));
        }

        query
            .order_by_desc(InsightColumn::CreatedAt)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Update an insight's text. Editing question or content clears the
    /// stored embedding so the worker regenerates it from the new text.
    pub async fn update_insight(
        &self,
        insight: Insight,
        question: Option<String>,
        content: Option<String>,
        tags: Option<Vec<String>>,
    ) -> Result<Insight> {
        let text_changed = question.as_ref().is_some_and(|q| *q != insight.question)
            || content.as_ref().is_some_and(|c| *c != insight.content);

        let mut active: InsightActiveModel = insight.into();
        if let Some(question) = question {
            active.question = Set(question);
        }
        if let Some(content) = content {
            active.content = Set(content);
        }
        if let Some(tags) = tags {
            active.tags = Set(serde_json::json!(tags));
        }
        if text_changed {
            active.embedding = Set(None);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(self.conn()).await.map_err(Into::into)
    }

    /// Soft-delete an insight
    pub async fn deactivate_insight(&self, insight: Insight) -> Result<Insight> {
        let mut active: InsightActiveModel = insight.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(self.conn()).await.map_err(Into::into)
    }

    /// Resolve a set of insight IDs to the owner's active insights. IDs that
    /// don't resolve are simply absent from the result.
    pub async fn insights_by_ids(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<Vec<Insight>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        InsightEntity::find()
            .filter(InsightColumn::OwnerId.eq(owner_id))
            .filter(InsightColumn::IsActive.eq(true))
            .filter(InsightColumn::Id.is_in(ids.to_vec()))
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Load an owner's active insights together with their category keyword
    /// lists, optionally restricted to specific categories. Ordered by
    /// creation time so ranking ties break on insertion order.
    pub async fn active_insights_with_keywords(
        &self,
        owner_id: Uuid,
        category_ids: Option<&[Uuid]>,
    ) -> Result<Vec<(Insight, Vec<String>)>> {
        let mut query = InsightEntity::find()
            .filter(InsightColumn::OwnerId.eq(owner_id))
            .filter(InsightColumn::IsActive.eq(true));

        if let Some(ids) = category_ids {
            query = query.filter(InsightColumn::CategoryId.is_in(ids.to_vec()));
        }

        let insights = query
            .order_by_asc(InsightColumn::CreatedAt)
            .all(self.conn())
            .await?;

        let categories: HashMap<Uuid, Vec<String>> = CareerCategoryEntity::find()
            .all(self.conn())
            .await?
            .into_iter()
            .map(|c| (c.id, c.keyword_list()))
            .collect();

        Ok(insights
            .into_iter()
            .map(|insight| {
                let keywords = categories
                    .get(&insight.category_id)
                    .cloned()
                    .unwrap_or_default();
                (insight, keywords)
            })
            .collect())
    }

    /// Active insights whose embedding has not been generated yet (newly
    /// created, or text-edited since the last generation). Oldest first so
    /// nothing starves.
    pub async fn insights_pending_embedding(&self, limit: u64) -> Result<Vec<Insight>> {
        use sea_orm::QuerySelect;

        InsightEntity::find()
            .filter(InsightColumn::IsActive.eq(true))
            .filter(InsightColumn::Embedding.is_null())
            .order_by_asc(InsightColumn::UpdatedAt)
            .limit(limit)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Write a generated embedding back to an insight
    pub async fn set_insight_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<()> {
        let Some(insight) = InsightEntity::find_by_id(id).one(self.conn()).await? else {
            return Ok(());
        };

        let mut active: InsightActiveModel = insight.into();
        active.embedding = Set(Some(super::models::encode_embedding(embedding)));
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(self.conn()).await?;
        Ok(())
    }

    // ========================================================================
    // Job Posting Operations
    // ========================================================================

    /// Create a job posting
    pub async fn create_job(
        &self,
        owner_id: Uuid,
        title: String,
        company: String,
        description_text: String,
    ) -> Result<JobPosting> {
        let now = chrono::Utc::now();

        JobPostingActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            title: Set(title),
            company: Set(company),
            description_text: Set(description_text),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(self.conn())
        .await
        .map_err(Into::into)
    }

    /// Find a job posting by ID, scoped to its owner
    pub async fn find_job(&self, owner_id: Uuid, id: Uuid) -> Result<Option<JobPosting>> {
        JobPostingEntity::find_by_id(id)
            .filter(JobPostingColumn::OwnerId.eq(owner_id))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// List an owner's job postings, newest first
    pub async fn list_jobs(&self, owner_id: Uuid) -> Result<Vec<JobPosting>> {
        JobPostingEntity::find()
            .filter(JobPostingColumn::OwnerId.eq(owner_id))
            .order_by_desc(JobPostingColumn::CreatedAt)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Match Operations
    // ========================================================================

    /// Atomically replace the whole match set for a job: delete-then-insert
    /// in one transaction, so a concurrent reader sees either the old set or
    /// the new set, never a mix. Matches for other jobs are untouched.
    pub async fn replace_matches_for_job(
        &self,
        job_id: Uuid,
        matches: &[NewMatch],
    ) -> Result<Vec<InsightMatch>> {
        let now = chrono::Utc::now();
        let txn = self.conn().begin().await?;

        InsightMatchEntity::delete_many()
            .filter(InsightMatchColumn::JobId.eq(job_id))
            .exec(&txn)
            .await?;

        let rows: Vec<InsightMatchActiveModel> = matches
            .iter()
            .enumerate()
            .map(|(rank, m)| InsightMatchActiveModel {
                id: Set(Uuid::new_v4()),
                job_id: Set(job_id),
                insight_id: Set(m.insight_id),
                rank: Set(rank as i32),
                relevance_score: Set(m.relevance_score),
                category_bonus: Set(m.category_bonus),
                final_score: Set(m.final_score),
                used_in_narrative: Set(false),
                created_at: Set(now.into()),
            })
            .collect();

        if !rows.is_empty() {
            InsightMatchEntity::insert_many(rows).exec(&txn).await?;
        }

        txn.commit().await?;
        self.matches_for_job(job_id).await
    }

    /// Stored matches for a job, best first. The persisted rank pins tie
    /// order, so equal-score rows read back in the order the engine ranked
    /// them.
    pub async fn matches_for_job(&self, job_id: Uuid) -> Result<Vec<InsightMatch>> {
        InsightMatchEntity::find()
            .filter(InsightMatchColumn::JobId.eq(job_id))
            .order_by_asc(InsightMatchColumn::Rank)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Narrative Operations
    // ========================================================================

    /// Atomically replace the narrative of a given type for a job: the prior
    /// narrative and its usage links are deleted, the new narrative and its
    /// (insight, weight) links inserted, and the corresponding match rows
    /// flagged as used, all in one transaction.
    pub async fn replace_narrative(
        &self,
        job_id: Uuid,
        owner_id: Uuid,
        narrative_type: NarrativeType,
        content: String,
        model_used: Option<String>,
        usages: &[(Uuid, f64)],
    ) -> Result<Narrative> {
        let now = chrono::Utc::now();
        let type_str = String::from(narrative_type);
        let txn = self.conn().begin().await?;

        // Remove the prior narrative of this type; usage links cascade
        let prior = NarrativeEntity::find()
            .filter(NarrativeColumn::JobId.eq(job_id))
            .filter(NarrativeColumn::NarrativeType.eq(type_str.clone()))
            .all(&txn)
            .await?;

        for old in prior {
            NarrativeUsageEntity::delete_many()
                .filter(NarrativeUsageColumn::NarrativeId.eq(old.id))
                .exec(&txn)
                .await?;
            NarrativeEntity::delete_by_id(old.id).exec(&txn).await?;
        }

        let narrative = NarrativeActiveModel {
            id: Set(Uuid::new_v4()),
            job_id: Set(job_id),
            owner_id: Set(owner_id),
            narrative_type: Set(type_str),
            content: Set(content),
            model_used: Set(model_used),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let usage_rows: Vec<NarrativeUsageActiveModel> = usages
            .iter()
            .enumerate()
            .map(|(position, (insight_id, weight))| NarrativeUsageActiveModel {
                id: Set(Uuid::new_v4()),
                narrative_id: Set(narrative.id),
                insight_id: Set(*insight_id),
                weight: Set(*weight),
                position: Set(position as i32),
                created_at: Set(now.into()),
            })
            .collect();

        if !usage_rows.is_empty() {
            NarrativeUsageEntity::insert_many(usage_rows).exec(&txn).await?;
        }

        // Flag the match rows whose insights informed this narrative
        let used_ids: Vec<Uuid> = usages.iter().map(|(id, _)| *id).collect();
        if !used_ids.is_empty() {
            use sea_orm::sea_query::Expr;

            InsightMatchEntity::update_many()
                .col_expr(InsightMatchColumn::UsedInNarrative, Expr::value(true))
                .filter(InsightMatchColumn::JobId.eq(job_id))
                .filter(InsightMatchColumn::InsightId.is_in(used_ids))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(narrative)
    }

    /// Find a narrative by ID, scoped to its owner
    pub async fn find_narrative(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Narrative>> {
        NarrativeEntity::find_by_id(id)
            .filter(NarrativeColumn::OwnerId.eq(owner_id))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// List an owner's narratives, newest first
    pub async fn list_narratives(
        &self,
        owner_id: Uuid,
        job_id: Option<Uuid>,
        narrative_type: Option<NarrativeType>,
    ) -> Result<Vec<Narrative>> {
        let mut query = NarrativeEntity::find().filter(NarrativeColumn::OwnerId.eq(owner_id));

        if let Some(job_id) = job_id {
            query = query.filter(NarrativeColumn::JobId.eq(job_id));
        }
        if let Some(t) = narrative_type {
            query = query.filter(NarrativeColumn::NarrativeType.eq(String::from(t)));
        }

        query
            .order_by_desc(NarrativeColumn::CreatedAt)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Usage links for a narrative, in rank order
    pub async fn usages_for_narrative(&self, narrative_id: Uuid) -> Result<Vec<NarrativeUsage>> {
        NarrativeUsageEntity::find()
            .filter(NarrativeUsageColumn::NarrativeId.eq(narrative_id))
            .order_by_asc(NarrativeUsageColumn::Position)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }
}
