//! CareerLens matching core
//!
//! Scores a user's personal insights against a job posting and selects the
//! insights that feed narrative generation:
//! - Vector math (remapped cosine similarity, top-k selection)
//! - Category keyword bonus (deterministic lexical signal)
//! - Match engine (score, threshold, rank, atomic persist)
//! - Narrative selector (rank-weighted insight selection)
//!
//! The core consumes pre-computed embeddings; it never calls the embedding
//! provider itself.

pub mod bonus;
pub mod engine;
pub mod selector;
pub mod store;
pub mod vector;

pub use bonus::{category_bonus, BONUS_CAP, BONUS_PER_KEYWORD};
pub use engine::{
    score_candidates, MatchCandidate, MatchEngine, MatchOutcome, MatchParams, MatchStatus,
    ScoredCandidate,
};
pub use selector::{rank_weight, NarrativeSelector, SelectedInsight, DEFAULT_SELECTION_COUNT};
pub use store::{MatchStore, MemoryStore};
pub use vector::{cosine_similarity, top_k};
