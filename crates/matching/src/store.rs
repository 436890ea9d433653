//! Persistence seam for the matching core
//!
//! The engine and selector talk to storage through this trait so the core
//! stays a pure function of its inputs and tests can run against an
//! in-memory store. The production implementation is the repository from
//! `careerlens-common`.

use async_trait::async_trait;
use careerlens_common::db::models::{Insight, InsightMatch};
use careerlens_common::db::{NewMatch, Repository};
use careerlens_common::errors::Result;
use uuid::Uuid;

/// Storage operations the matching core depends on
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// An owner's active insights with their category keyword lists, in
    /// insertion order (ranking ties break on this order)
    async fn active_insights_with_keywords(
        &self,
        owner_id: Uuid,
        category_ids: Option<&[Uuid]>,
    ) -> Result<Vec<(Insight, Vec<String>)>>;

    /// Resolve ids to the owner's active insights; unresolved ids are absent
    async fn insights_by_ids(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<Vec<Insight>>;

    /// Atomically replace the whole match set for a job
    async fn replace_matches_for_job(
        &self,
        job_id: Uuid,
        matches: &[NewMatch],
    ) -> Result<Vec<InsightMatch>>;

    /// Stored matches for a job, best first
    async fn matches_for_job(&self, job_id: Uuid) -> Result<Vec<InsightMatch>>;
}

#[async_trait]
impl MatchStore for Repository {
    async fn active_insights_with_keywords(
        &self,
        owner_id: Uuid,
        category_ids: Option<&[Uuid]>,
    ) -> Result<Vec<(Insight, Vec<String>)>> {
        Repository::active_insights_with_keywords(self, owner_id, category_ids).await
    }

    async fn insights_by_ids(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<Vec<Insight>> {
        Repository::insights_by_ids(self, owner_id, ids).await
    }

    async fn replace_matches_for_job(
        &self,
        job_id: Uuid,
        matches: &[NewMatch],
    ) -> Result<Vec<InsightMatch>> {
        Repository::replace_matches_for_job(self, job_id, matches).await
    }

    async fn matches_for_job(&self, job_id: Uuid) -> Result<Vec<InsightMatch>> {
        Repository::matches_for_job(self, job_id).await
    }
}

/// In-memory store for tests
#[derive(Default)]
pub struct MemoryStore {
    insights: std::sync::Mutex<Vec<(Insight, Vec<String>)>>,
    matches: std::sync::Mutex<std::collections::HashMap<Uuid, Vec<InsightMatch>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an insight with its category keywords
    pub fn add_insight(&self, insight: Insight, keywords: Vec<String>) {
        self.insights.lock().unwrap().push((insight, keywords));
    }

    /// Number of match rows currently stored for a job
    pub fn match_count(&self, job_id: Uuid) -> usize {
        self.matches
            .lock()
            .unwrap()
            .get(&job_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn active_insights_with_keywords(
        &self,
        owner_id: Uuid,
        category_ids: Option<&[Uuid]>,
    ) -> Result<Vec<(Insight, Vec<String>)>> {
        Ok(self
            .insights
            .lock()
            .unwrap()
            .iter()
            .filter(|(i, _)| i.owner_id == owner_id && i.is_active)
            .filter(|(i, _)| {
                category_ids
                    .map(|ids| ids.contains(&i.category_id))
                    .unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    async fn insights_by_ids(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<Vec<Insight>> {
        Ok(self
            .insights
            .lock()
            .unwrap()
            .iter()
            .filter(|(i, _)| i.owner_id == owner_id && i.is_active && ids.contains(&i.id))
            .map(|(i, _)| i.clone())
            .collect())
    }

    async fn replace_matches_for_job(
        &self,
        job_id: Uuid,
        matches: &[NewMatch],
    ) -> Result<Vec<InsightMatch>> {
        let now = chrono::Utc::now();
        let rows: Vec<InsightMatch> = matches
            .iter()
            .enumerate()
            .map(|(rank, m)| InsightMatch {
                id: Uuid::new_v4(),
                job_id,
                insight_id: m.insight_id,
                rank: rank as i32,
                relevance_score: m.relevance_score,
                category_bonus: m.category_bonus,
                final_score: m.final_score,
                used_in_narrative: false,
                created_at: now.into(),
            })
            .collect();

        self.matches.lock().unwrap().insert(job_id, rows.clone());
        Ok(rows)
    }

    async fn matches_for_job(&self, job_id: Uuid) -> Result<Vec<InsightMatch>> {
        let mut rows = self
            .matches
            .lock()
            .unwrap()
            .get(&job_id)
            .cloned()
            .unwrap_or_default();
        rows.sort_by_key(|m| m.rank);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_match(insight_id: Uuid, final_score: f64) -> NewMatch {
        NewMatch {
            insight_id,
            relevance_score: final_score,
            category_bonus: 0.0,
            final_score,
        }
    }

    #[tokio::test]
    async fn test_equal_scores_read_back_in_ranked_order() {
        let store = MemoryStore::new();
        let job_id = Uuid::new_v4();
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let matches: Vec<NewMatch> = ids.iter().map(|id| new_match(*id, 0.75)).collect();

        store.replace_matches_for_job(job_id, &matches).await.unwrap();

        // Ties must come back exactly as ranked, on every read
        for _ in 0..3 {
            let rows = store.matches_for_job(job_id).await.unwrap();
            let read_ids: Vec<Uuid> = rows.iter().map(|m| m.insight_id).collect();
            assert_eq!(read_ids, ids);
            assert_eq!(rows.iter().map(|m| m.rank).collect::<Vec<_>>(), vec![0, 1, 2]);
        }
    }
}
