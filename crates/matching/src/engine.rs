//! Match engine
//!
//! Scores every active insight against a job posting and persists the
//! result as the job's match set. Scoring is a pure function
//! ([`score_candidates`]); the engine wraps it with storage access and the
//! atomic replace, so recomputing is idempotent and a job never carries a
//! mix of old and new match rows.

use std::sync::Arc;

use careerlens_common::config::MatchingConfig;
use careerlens_common::db::models::{Insight, InsightMatch, JobPosting};
use careerlens_common::db::NewMatch;
use careerlens_common::errors::{AppError, Result};
use tracing::{debug, info};
use uuid::Uuid;

use crate::bonus::category_bonus;
use crate::store::MatchStore;
use crate::vector::cosine_similarity;

/// Tuning knobs for one match run
#[derive(Clone, Copy, Debug)]
pub struct MatchParams {
    /// Matches kept per job after ranking
    pub top_k: usize,

    /// Relevance floor; candidates below it are dropped before the bonus
    /// is applied
    pub min_similarity: f32,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            top_k: 10,
            min_similarity: 0.3,
        }
    }
}

impl From<&MatchingConfig> for MatchParams {
    fn from(cfg: &MatchingConfig) -> Self {
        Self {
            top_k: cfg.top_k,
            min_similarity: cfg.min_similarity,
        }
    }
}

/// How a match run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchStatus {
    /// At least one insight cleared the threshold
    Matched,

    /// No insight cleared the threshold (or none had an embedding); the
    /// job's match set is now empty
    NoEligibleInsights,
}

/// Result of a match run; `matches` are the persisted rows, best first
#[derive(Clone, Debug)]
pub struct MatchOutcome {
    pub status: MatchStatus,
    pub matches: Vec<InsightMatch>,
}

/// One insight as seen by the scorer
#[derive(Clone, Debug)]
pub struct MatchCandidate {
    pub insight_id: Uuid,
    pub embedding: Option<Vec<f32>>,
    pub keywords: Vec<String>,
}

impl MatchCandidate {
    pub fn from_insight(insight: &Insight, keywords: Vec<String>) -> Self {
        Self {
            insight_id: insight.id,
            embedding: insight.parse_embedding(),
            keywords,
        }
    }
}

/// One scored candidate; `final_score` is relevance plus bonus and is
/// deliberately uncapped
#[derive(Clone, Copy, Debug)]
pub struct ScoredCandidate {
    pub insight_id: Uuid,
    pub relevance_score: f64,
    pub category_bonus: f64,
    pub final_score: f64,
}

/// Score candidates against a job embedding and text.
///
/// Candidates without an embedding are skipped. The relevance threshold
/// applies to the similarity alone; the keyword bonus can lift a result
/// above better-matched ones but never rescues one below the floor. Ties
/// keep input order.
pub fn score_candidates(
    job_embedding: &[f32],
    job_text: &str,
    candidates: &[MatchCandidate],
    params: &MatchParams,
) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .filter_map(|c| {
            let embedding = c.embedding.as_ref()?;
            let relevance = cosine_similarity(job_embedding, embedding);
            if relevance < params.min_similarity {
                return None;
            }
            let bonus = category_bonus(job_text, &c.keywords);
            Some(ScoredCandidate {
                insight_id: c.insight_id,
                relevance_score: relevance as f64,
                category_bonus: bonus as f64,
                final_score: (relevance + bonus) as f64,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(params.top_k);
    scored
}

/// Orchestrates a match run: load candidates, score, persist
pub struct MatchEngine {
    store: Arc<dyn MatchStore>,
}

impl MatchEngine {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self { store }
    }

    /// Recompute and persist the match set for a job. Candidates can be
    /// restricted to specific categories.
    ///
    /// The previous set is replaced wholesale, including when nothing
    /// qualifies. Fails with [`AppError::EmbeddingUnavailable`] when the
    /// job embedding is absent; no rows are touched in that case.
    pub async fn compute_matches(
        &self,
        job: &JobPosting,
        job_embedding: Option<&[f32]>,
        params: &MatchParams,
        categories: Option<&[Uuid]>,
    ) -> Result<MatchOutcome> {
        let job_embedding = job_embedding.ok_or_else(|| AppError::EmbeddingUnavailable {
            message: format!("no embedding available for job {}", job.id),
        })?;

        let insights = self
            .store
            .active_insights_with_keywords(job.owner_id, categories)
            .await?;
        debug!(
            job_id = %job.id,
            candidates = insights.len(),
            "scoring insights for job"
        );

        let candidates: Vec<MatchCandidate> = insights
            .iter()
            .map(|(insight, keywords)| MatchCandidate::from_insight(insight, keywords.clone()))
            .collect();

        let job_text = job.match_text();
        let scored = score_candidates(job_embedding, &job_text, &candidates, params);

        let new_matches: Vec<NewMatch> = scored
            .iter()
            .map(|s| NewMatch {
                insight_id: s.insight_id,
                relevance_score: s.relevance_score,
                category_bonus: s.category_bonus,
                final_score: s.final_score,
            })
            .collect();

        let matches = self
            .store
            .replace_matches_for_job(job.id, &new_matches)
            .await?;

        let status = if matches.is_empty() {
            MatchStatus::NoEligibleInsights
        } else {
            MatchStatus::Matched
        };
        info!(
            job_id = %job.id,
            matched = matches.len(),
            skipped = candidates.len() - scored.len(),
            "match run complete"
        );

        Ok(MatchOutcome { status, matches })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use careerlens_common::db::models::InsightType;

    fn encode(v: &[f32]) -> String {
        format!(
            "[{}]",
            v.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(",")
        )
    }

    fn unit(dim_hot: usize) -> Vec<f32> {
        let mut v = vec![0.0; 1536];
        v[dim_hot] = 1.0;
        v
    }

    fn candidate(embedding: Option<Vec<f32>>, keywords: &[&str]) -> MatchCandidate {
        MatchCandidate {
            insight_id: Uuid::new_v4(),
            embedding,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn insight(owner: Uuid, embedding: Option<Vec<f32>>) -> Insight {
        let now = chrono::Utc::now();
        Insight {
            id: Uuid::new_v4(),
            owner_id: owner,
            category_id: Uuid::new_v4(),
            insight_type: String::from(InsightType::CareerMotivation),
            question: "What drives you?".into(),
            content: "Building useful systems.".into(),
            embedding: embedding.as_deref().map(encode),
            tags: serde_json::json!([]),
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn job(owner: Uuid) -> JobPosting {
        let now = chrono::Utc::now();
        JobPosting {
            id: Uuid::new_v4(),
            owner_id: owner,
            title: "Engineering Manager".into(),
            company: "Acme".into(),
            description_text: "Lead a platform team with strong leadership skills.".into(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn test_identical_embedding_with_full_bonus_exceeds_one() {
        let query = unit(0);
        let candidates = vec![candidate(
            Some(unit(0)),
            &["leadership", "platform", "team"],
        )];
        let scored = score_candidates(
            &query,
            "Lead a platform team with strong leadership.",
            &candidates,
            &MatchParams::default(),
        );

        assert_eq!(scored.len(), 1);
        assert!((scored[0].relevance_score - 1.0).abs() < 1e-6);
        assert!((scored[0].category_bonus - 0.3).abs() < 1e-6);
        assert!((scored[0].final_score - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_threshold_filters_before_bonus() {
        // Orthogonal embedding remaps to 0.5, below a 0.9 floor. The full
        // keyword bonus would push the final score past 0.9, but the floor
        // applies to relevance alone.
        let query = unit(0);
        let candidates = vec![candidate(Some(unit(1)), &["leadership", "team", "lead"])];
        let params = MatchParams {
            top_k: 10,
            min_similarity: 0.9,
        };
        let scored = score_candidates(&query, "leadership team lead", &candidates, &params);
        assert!(scored.is_empty());
    }

    #[test]
    fn test_candidates_without_embedding_are_skipped() {
        let query = unit(0);
        let candidates = vec![candidate(None, &[]), candidate(Some(unit(0)), &[])];
        let scored = score_candidates(&query, "", &candidates, &MatchParams::default());
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].insight_id, candidates[1].insight_id);
    }

    #[test]
    fn test_bonus_reorders_above_similarity() {
        // Candidate B has lower similarity but its keywords appear in the
        // job text, so the bonus lifts it above A.
        let query = unit(0);
        let mut close = unit(0);
        close[1] = 0.3;
        let a = candidate(Some(unit(0)), &[]);
        let b = candidate(Some(close), &["leadership", "platform", "team"]);
        let scored = score_candidates(
            &query,
            "leadership of a platform team",
            &[a.clone(), b.clone()],
            &MatchParams::default(),
        );

        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].insight_id, b.insight_id);
        assert!(scored[0].final_score > scored[1].final_score);
    }

    #[test]
    fn test_top_k_truncates_after_ranking() {
        let query = unit(0);
        let candidates: Vec<MatchCandidate> =
            (0..5).map(|_| candidate(Some(unit(0)), &[])).collect();
        let params = MatchParams {
            top_k: 2,
            min_similarity: 0.3,
        };
        let scored = score_candidates(&query, "", &candidates, &params);
        assert_eq!(scored.len(), 2);
        // Ties keep input order
        assert_eq!(scored[0].insight_id, candidates[0].insight_id);
        assert_eq!(scored[1].insight_id, candidates[1].insight_id);
    }

    #[tokio::test]
    async fn test_compute_matches_requires_job_embedding() {
        let store = Arc::new(MemoryStore::new());
        let engine = MatchEngine::new(store);
        let result = engine
            .compute_matches(&job(Uuid::new_v4()), None, &MatchParams::default(), None)
            .await;
        assert!(matches!(
            result,
            Err(AppError::EmbeddingUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_compute_matches_persists_and_reports_status() {
        let owner = Uuid::new_v4();
        let store = Arc::new(MemoryStore::new());
        store.add_insight(insight(owner, Some(unit(0))), vec!["leadership".into()]);
        store.add_insight(insight(owner, None), vec![]);

        let engine = MatchEngine::new(store.clone());
        let job = job(owner);
        let outcome = engine
            .compute_matches(&job, Some(&unit(0)), &MatchParams::default(), None)
            .await
            .unwrap();

        assert_eq!(outcome.status, MatchStatus::Matched);
        assert_eq!(outcome.matches.len(), 1);
        assert!((outcome.matches[0].relevance_score - 1.0).abs() < 1e-6);
        assert!((outcome.matches[0].category_bonus - 0.1).abs() < 1e-6);
        assert!((outcome.matches[0].final_score - 1.1).abs() < 1e-6);
        assert_eq!(store.match_count(job.id), 1);
    }

    #[tokio::test]
    async fn test_recompute_replaces_previous_set() {
        let owner = Uuid::new_v4();
        let store = Arc::new(MemoryStore::new());
        for _ in 0..3 {
            store.add_insight(insight(owner, Some(unit(0))), vec![]);
        }

        let engine = MatchEngine::new(store.clone());
        let job = job(owner);
        let first = engine
            .compute_matches(&job, Some(&unit(0)), &MatchParams::default(), None)
            .await
            .unwrap();
        assert_eq!(first.matches.len(), 3);

        // A tighter run on the same job must leave only its own rows
        let strict = MatchParams {
            top_k: 1,
            min_similarity: 0.3,
        };
        let second = engine
            .compute_matches(&job, Some(&unit(0)), &strict, None)
            .await
            .unwrap();
        assert_eq!(second.matches.len(), 1);
        assert_eq!(store.match_count(job.id), 1);
    }

    #[tokio::test]
    async fn test_category_filter_restricts_candidates() {
        let owner = Uuid::new_v4();
        let store = Arc::new(MemoryStore::new());
        let kept = insight(owner, Some(unit(0)));
        let excluded = insight(owner, Some(unit(0)));
        store.add_insight(kept.clone(), vec![]);
        store.add_insight(excluded, vec![]);

        let engine = MatchEngine::new(store);
        let outcome = engine
            .compute_matches(
                &job(owner),
                Some(&unit(0)),
                &MatchParams::default(),
                Some(&[kept.category_id]),
            )
            .await
            .unwrap();

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].insight_id, kept.id);
    }

    #[tokio::test]
    async fn test_no_eligible_insights_clears_matches() {
        let owner = Uuid::new_v4();
        let store = Arc::new(MemoryStore::new());
        store.add_insight(insight(owner, Some(unit(0))), vec![]);

        let engine = MatchEngine::new(store.clone());
        let job = job(owner);
        engine
            .compute_matches(&job, Some(&unit(0)), &MatchParams::default(), None)
            .await
            .unwrap();
        assert_eq!(store.match_count(job.id), 1);

        // Orthogonal job embedding: remapped similarity 0.5 survives the
        // default floor, so use a stricter one
        let strict = MatchParams {
            top_k: 10,
            min_similarity: 0.9,
        };
        let outcome = engine
            .compute_matches(&job, Some(&unit(1)), &strict, None)
            .await
            .unwrap();
        assert_eq!(outcome.status, MatchStatus::NoEligibleInsights);
        assert!(outcome.matches.is_empty());
        assert_eq!(store.match_count(job.id), 0);
    }
}
