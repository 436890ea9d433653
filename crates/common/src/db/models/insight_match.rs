//! Insight match entity
//!
//! One scored, ranked association between a job posting and an insight.
//! Exactly one row per (job, insight); recomputation replaces the whole set
//! for a job atomically. Written only by the match engine, read-only to
//! downstream consumers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "insight_matches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub job_id: Uuid,

    pub insight_id: Uuid,

    /// Zero-based position in the ranked set; pins tie order across reads
    pub rank: i32,

    /// Remapped cosine similarity in [0, 1]
    pub relevance_score: f64,

    /// Keyword-overlap bonus in [0, 0.3]
    pub category_bonus: f64,

    /// relevance + bonus; intentionally uncapped (ranking-only, not a
    /// probability)
    pub final_score: f64,

    pub used_in_narrative: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::job_posting::Entity",
        from = "Column::JobId",
        to = "super::job_posting::Column::Id",
        on_delete = "Cascade"
    )]
    Job,

    #[sea_orm(
        belongs_to = "super::insight::Entity",
        from = "Column::InsightId",
        to = "super::insight::Column::Id",
        on_delete = "Cascade"
    )]
    Insight,
}

impl Related<super::job_posting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

impl Related<super::insight::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Insight.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
