//! Generated narrative entity
//!
//! At most one narrative per (job, type); regeneration replaces the prior
//! row and its usage links in one transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The four fixed narrative kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeType {
    CoverLetter,
    Summary,
    Motivation,
    ValueProposition,
}

impl NarrativeType {
    /// All kinds, in declaration order
    pub const ALL: [NarrativeType; 4] = [
        NarrativeType::CoverLetter,
        NarrativeType::Summary,
        NarrativeType::Motivation,
        NarrativeType::ValueProposition,
    ];

    /// Human-readable label
    pub fn display_name(&self) -> &'static str {
        match self {
            NarrativeType::CoverLetter => "Cover Letter",
            NarrativeType::Summary => "Professional Summary",
            NarrativeType::Motivation => "Motivation Statement",
            NarrativeType::ValueProposition => "Value Proposition",
        }
    }
}

impl From<String> for NarrativeType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "cover_letter" => NarrativeType::CoverLetter,
            "summary" => NarrativeType::Summary,
            "motivation" => NarrativeType::Motivation,
            "value_proposition" => NarrativeType::ValueProposition,
            _ => NarrativeType::CoverLetter,
        }
    }
}

impl From<NarrativeType> for String {
    fn from(t: NarrativeType) -> Self {
        match t {
            NarrativeType::CoverLetter => "cover_letter",
            NarrativeType::Summary => "summary",
            NarrativeType::Motivation => "motivation",
            NarrativeType::ValueProposition => "value_proposition",
        }
        .to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "narratives")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub job_id: Uuid,

    pub owner_id: Uuid,

    /// One of the four fixed kinds, stored as text
    #[sea_orm(column_type = "Text")]
    pub narrative_type: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Generation model identifier for provenance
    #[sea_orm(column_type = "Text", nullable)]
    pub model_used: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
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

    #[sea_orm(has_many = "super::narrative_usage::Entity")]
    Usages,
}

impl Related<super::job_posting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

impl Related<super::narrative_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Typed view of the stored narrative_type column
    pub fn kind(&self) -> NarrativeType {
        NarrativeType::from(self.narrative_type.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrative_type_string_round_trip() {
        for kind in NarrativeType::ALL {
            assert_eq!(NarrativeType::from(String::from(kind)), kind);
        }
    }
}
