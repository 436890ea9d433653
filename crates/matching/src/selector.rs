//! Narrative insight selection
//!
//! Picks the insights a narrative is generated from and assigns each a
//! prominence weight. Two paths: the caller names insight ids explicitly
//! (all weighted equally), or the selector takes the top stored matches
//! for the job (weighted by rank).

use std::sync::Arc;

use careerlens_common::db::models::Insight;
use careerlens_common::errors::{AppError, Result};
use tracing::debug;
use uuid::Uuid;

use crate::store::MatchStore;

/// Insights fed to generation when the caller does not name any
pub const DEFAULT_SELECTION_COUNT: usize = 5;

/// Prominence weight for the insight at zero-based rank `rank`:
/// 1.0, 0.8, 0.6, 0.4, 0.2, then floored at 0.1
pub fn rank_weight(rank: usize) -> f64 {
    (1.0 - rank as f64 * 0.2).max(0.1)
}

/// An insight chosen for a narrative, with its prominence weight
#[derive(Clone, Debug)]
pub struct SelectedInsight {
    pub insight: Insight,
    pub weight: f64,
}

/// Resolves which insights a narrative draws on
pub struct NarrativeSelector {
    store: Arc<dyn MatchStore>,
    selection_count: usize,
}

impl NarrativeSelector {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self {
            store,
            selection_count: DEFAULT_SELECTION_COUNT,
        }
    }

    /// Override how many stored matches feed generation by default
    pub fn with_selection_count(mut self, count: usize) -> Self {
        self.selection_count = count.max(1);
        self
    }

    /// Select insights for a narrative about `job_id`.
    ///
    /// With explicit ids, resolution is permissive: ids that are unknown,
    /// inactive, or owned by someone else are silently skipped and request
    /// order is kept. Without ids, the top stored matches are used in rank
    /// order. Either way weights decay by position in the selected order,
    /// and ending up with nothing is [`AppError::NoMatchesAvailable`].
    pub async fn select(
        &self,
        job_id: Uuid,
        owner_id: Uuid,
        explicit_ids: Option<&[Uuid]>,
    ) -> Result<Vec<SelectedInsight>> {
        let selected = match explicit_ids {
            Some(ids) => self.select_explicit(owner_id, ids).await?,
            None => self.select_from_matches(job_id, owner_id).await?,
        };

        if selected.is_empty() {
            return Err(AppError::NoMatchesAvailable {
                job_id: job_id.to_string(),
            });
        }
        debug!(job_id = %job_id, count = selected.len(), "insights selected for narrative");
        Ok(selected)
    }

    async fn select_explicit(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<Vec<SelectedInsight>> {
        let insights = self.store.insights_by_ids(owner_id, ids).await?;

        // Re-impose request order; the store does not guarantee one. Rank,
        // and therefore weight, follows the caller's order
        let mut selected = Vec::with_capacity(insights.len());
        for id in ids {
            if let Some(insight) = insights.iter().find(|i| i.id == *id) {
                if selected
                    .iter()
                    .all(|s: &SelectedInsight| s.insight.id != insight.id)
                {
                    selected.push(SelectedInsight {
                        insight: insight.clone(),
                        weight: rank_weight(selected.len()),
                    });
                }
            }
        }
        Ok(selected)
    }

    async fn select_from_matches(
        &self,
        job_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<SelectedInsight>> {
        let matches = self.store.matches_for_job(job_id).await?;
        let top: Vec<Uuid> = matches
            .iter()
            .take(self.selection_count)
            .map(|m| m.insight_id)
            .collect();
        if top.is_empty() {
            return Ok(Vec::new());
        }

        let insights = self.store.insights_by_ids(owner_id, &top).await?;

        // Rank order comes from the match rows, not the id lookup
        let mut selected = Vec::with_capacity(top.len());
        for (rank, insight_id) in top.iter().enumerate() {
            if let Some(insight) = insights.iter().find(|i| i.id == *insight_id) {
                selected.push(SelectedInsight {
                    insight: insight.clone(),
                    weight: rank_weight(rank),
                });
            }
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use careerlens_common::db::models::InsightType;
    use careerlens_common::db::NewMatch;

    fn insight(owner: Uuid) -> Insight {
        let now = chrono::Utc::now();
        Insight {
            id: Uuid::new_v4(),
            owner_id: owner,
            category_id: Uuid::new_v4(),
            insight_type: String::from(InsightType::LeadershipStyle),
            question: "How do you lead?".into(),
            content: "By example.".into(),
            embedding: None,
            tags: serde_json::json!([]),
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn new_match(insight_id: Uuid, final_score: f64) -> NewMatch {
        NewMatch {
            insight_id,
            relevance_score: final_score,
            category_bonus: 0.0,
            final_score,
        }
    }

    #[test]
    fn test_rank_weights_decay_to_floor() {
        let weights: Vec<f64> = (0..7).map(rank_weight).collect();
        for (got, want) in weights.iter().zip([1.0, 0.8, 0.6, 0.4, 0.2, 0.1, 0.1]) {
            assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
        }
    }

    #[tokio::test]
    async fn test_explicit_ids_keep_order_with_decaying_weights() {
        let owner = Uuid::new_v4();
        let store = Arc::new(MemoryStore::new());
        let a = insight(owner);
        let b = insight(owner);
        let c = insight(owner);
        store.add_insight(a.clone(), vec![]);
        store.add_insight(b.clone(), vec![]);
        store.add_insight(c.clone(), vec![]);

        let selector = NarrativeSelector::new(store);
        let selected = selector
            .select(Uuid::new_v4(), owner, Some(&[b.id, c.id, a.id]))
            .await
            .unwrap();

        // Caller order is kept and the rank decay applies to it
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].insight.id, b.id);
        assert_eq!(selected[1].insight.id, c.id);
        assert_eq!(selected[2].insight.id, a.id);
        for (rank, sel) in selected.iter().enumerate() {
            assert!((sel.weight - rank_weight(rank)).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_unresolved_explicit_ids_do_not_consume_a_rank() {
        let owner = Uuid::new_v4();
        let store = Arc::new(MemoryStore::new());
        let a = insight(owner);
        let b = insight(owner);
        store.add_insight(a.clone(), vec![]);
        store.add_insight(b.clone(), vec![]);

        let selector = NarrativeSelector::new(store);
        let unknown = Uuid::new_v4();
        let selected = selector
            .select(Uuid::new_v4(), owner, Some(&[b.id, unknown, a.id]))
            .await
            .unwrap();

        assert_eq!(selected.len(), 2);
        assert!((selected[0].weight - 1.0).abs() < 1e-9);
        assert!((selected[1].weight - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_explicit_ids_resolving_to_nothing_is_no_matches() {
        let store = Arc::new(MemoryStore::new());
        let selector = NarrativeSelector::new(store);
        let job_id = Uuid::new_v4();
        let result = selector
            .select(job_id, Uuid::new_v4(), Some(&[Uuid::new_v4()]))
            .await;
        assert!(matches!(
            result,
            Err(AppError::NoMatchesAvailable { job_id: j }) if j == job_id.to_string()
        ));
    }

    #[tokio::test]
    async fn test_top_matches_get_decaying_weights() {
        let owner = Uuid::new_v4();
        let store = Arc::new(MemoryStore::new());
        let insights: Vec<Insight> = (0..6).map(|_| insight(owner)).collect();
        for i in &insights {
            store.add_insight(i.clone(), vec![]);
        }

        let job_id = Uuid::new_v4();
        let matches: Vec<NewMatch> = insights
            .iter()
            .enumerate()
            .map(|(i, ins)| new_match(ins.id, 1.0 - i as f64 * 0.1))
            .collect();
        store.replace_matches_for_job(job_id, &matches).await.unwrap();

        let selector = NarrativeSelector::new(store);
        let selected = selector.select(job_id, owner, None).await.unwrap();

        // Five of the six matches, best first, weights decaying
        assert_eq!(selected.len(), DEFAULT_SELECTION_COUNT);
        for (rank, sel) in selected.iter().enumerate() {
            assert_eq!(sel.insight.id, insights[rank].id);
            assert!((sel.weight - rank_weight(rank)).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_configured_selection_count_limits_defaults() {
        let owner = Uuid::new_v4();
        let store = Arc::new(MemoryStore::new());
        let insights: Vec<Insight> = (0..4).map(|_| insight(owner)).collect();
        for i in &insights {
            store.add_insight(i.clone(), vec![]);
        }

        let job_id = Uuid::new_v4();
        let matches: Vec<NewMatch> = insights
            .iter()
            .enumerate()
            .map(|(i, ins)| new_match(ins.id, 1.0 - i as f64 * 0.1))
            .collect();
        store.replace_matches_for_job(job_id, &matches).await.unwrap();

        let selector = NarrativeSelector::new(store).with_selection_count(2);
        let selected = selector.select(job_id, owner, None).await.unwrap();

        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].insight.id, insights[0].id);
        assert_eq!(selected[1].insight.id, insights[1].id);
    }

    #[tokio::test]
    async fn test_no_stored_matches_is_no_matches() {
        let store = Arc::new(MemoryStore::new());
        let selector = NarrativeSelector::new(store);
        let result = selector.select(Uuid::new_v4(), Uuid::new_v4(), None).await;
        assert!(matches!(result, Err(AppError::NoMatchesAvailable { .. })));
    }
}
