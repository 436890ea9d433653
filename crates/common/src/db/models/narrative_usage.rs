//! Narrative insight-usage link
//!
//! Records which insights informed a narrative and with what weight, in
//! rank order. Replaced together with the parent narrative.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "narrative_usages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub narrative_id: Uuid,

    pub insight_id: Uuid,

    /// Rank-based weight in (0, 1]
    pub weight: f64,

    /// Zero-based rank in the selected order
    pub position: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::narrative::Entity",
        from = "Column::NarrativeId",
        to = "super::narrative::Column::Id",
        on_delete = "Cascade"
    )]
    Narrative,

    #[sea_orm(
        belongs_to = "super::insight::Entity",
        from = "Column::InsightId",
        to = "super::insight::Column::Id",
        on_delete = "Cascade"
    )]
    Insight,
}

impl Related<super::narrative::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Narrative.def()
    }
}

impl Related<super::insight::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Insight.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
