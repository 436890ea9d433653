//! Job posting entity
//!
//! The description text is the matching target and is treated as immutable
//! once a match set has been computed against it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job_postings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub owner_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub company: String,

    #[sea_orm(column_type = "Text")]
    pub description_text: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::insight_match::Entity")]
    Matches,

    #[sea_orm(has_many = "super::narrative::Entity")]
    Narratives,
}

impl Related<super::insight_match::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Matches.def()
    }
}

impl Related<super::narrative::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Narratives.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Title and description concatenated; the text the category bonus
    /// keywords are checked against
    pub fn match_text(&self) -> String {
        format!("{} {}", self.title, self.description_text)
    }
}
