//! Personal insight entity
//!
//! A user-authored question/answer pair capturing a career motivation or
//! trait. The embedding is computed from question + content and stored as
//! text; it is cleared whenever the text changes so the worker regenerates
//! it (the stored vector always reflects the most recently saved content,
//! or is absent).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The ten fixed insight kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    CareerMotivation,
    LeadershipStyle,
    ProblemSolving,
    TeamCollaboration,
    TechnicalPhilosophy,
    GrowthMindset,
    ConflictResolution,
    DecisionMaking,
    WorkEnvironment,
    LongTermVision,
}

impl InsightType {
    /// All kinds, in declaration order
    pub const ALL: [InsightType; 10] = [
        InsightType::CareerMotivation,
        InsightType::LeadershipStyle,
        InsightType::ProblemSolving,
        InsightType::TeamCollaboration,
        InsightType::TechnicalPhilosophy,
        InsightType::GrowthMindset,
        InsightType::ConflictResolution,
        InsightType::DecisionMaking,
        InsightType::WorkEnvironment,
        InsightType::LongTermVision,
    ];

    /// Human-readable label
    pub fn display_name(&self) -> &'static str {
        match self {
            InsightType::CareerMotivation => "Career Motivation",
            InsightType::LeadershipStyle => "Leadership Style",
            InsightType::ProblemSolving => "Problem Solving",
            InsightType::TeamCollaboration => "Team Collaboration",
            InsightType::TechnicalPhilosophy => "Technical Philosophy",
            InsightType::GrowthMindset => "Growth Mindset",
            InsightType::ConflictResolution => "Conflict Resolution",
            InsightType::DecisionMaking => "Decision Making",
            InsightType::WorkEnvironment => "Work Environment",
            InsightType::LongTermVision => "Long-Term Vision",
        }
    }
}

impl From<String> for InsightType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "career_motivation" => InsightType::CareerMotivation,
            "leadership_style" => InsightType::LeadershipStyle,
            "problem_solving" => InsightType::ProblemSolving,
            "team_collaboration" => InsightType::TeamCollaboration,
            "technical_philosophy" => InsightType::TechnicalPhilosophy,
            "growth_mindset" => InsightType::GrowthMindset,
            "conflict_resolution" => InsightType::ConflictResolution,
            "decision_making" => InsightType::DecisionMaking,
            "work_environment" => InsightType::WorkEnvironment,
            "long_term_vision" => InsightType::LongTermVision,
            _ => InsightType::CareerMotivation,
        }
    }
}

impl From<InsightType> for String {
    fn from(t: InsightType) -> Self {
        match t {
            InsightType::CareerMotivation => "career_motivation",
            InsightType::LeadershipStyle => "leadership_style",
            InsightType::ProblemSolving => "problem_solving",
            InsightType::TeamCollaboration => "team_collaboration",
            InsightType::TechnicalPhilosophy => "technical_philosophy",
            InsightType::GrowthMindset => "growth_mindset",
            InsightType::ConflictResolution => "conflict_resolution",
            InsightType::DecisionMaking => "decision_making",
            InsightType::WorkEnvironment => "work_environment",
            InsightType::LongTermVision => "long_term_vision",
        }
        .to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "insights")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub owner_id: Uuid,

    pub category_id: Uuid,

    /// One of the ten fixed kinds, stored as text
    #[sea_orm(column_type = "Text")]
    pub insight_type: String,

    #[sea_orm(column_type = "Text")]
    pub question: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// 1536-d embedding stored as text ("[f,f,...]"); absent until the
    /// worker has processed the insight
    #[sea_orm(column_type = "Text", nullable)]
    pub embedding: Option<String>,

    /// Free-form tags stored as a JSON array of strings
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: serde_json::Value,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::career_category::Entity",
        from = "Column::CategoryId",
        to = "super::career_category::Column::Id"
    )]
    Category,

    #[sea_orm(has_many = "super::insight_match::Entity")]
    Matches,
}

impl Related<super::career_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::insight_match::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Matches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parse the embedding from stored text format to Vec<f32>
    pub fn parse_embedding(&self) -> Option<Vec<f32>> {
        self.embedding.as_ref().and_then(|s| {
            // Format: "[1.0,2.0,3.0,...]"
            let inner = s.trim_start_matches('[').trim_end_matches(']');
            inner
                .split(',')
                .map(|v| v.trim().parse::<f32>().ok())
                .collect()
        })
    }

    /// The text the embedding is computed from
    pub fn embedding_input(&self) -> String {
        format!("Question: {}\nAnswer: {}", self.question, self.content)
    }

    /// Typed view of the stored insight_type column
    pub fn kind(&self) -> InsightType {
        InsightType::from(self.insight_type.clone())
    }
}

/// Encode an embedding vector into the stored text format
pub(crate) fn encode_embedding(embedding: &[f32]) -> String {
    format!(
        "[{}]",
        embedding
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(",")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(embedding: Option<String>) -> Model {
        Model {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            insight_type: String::from(InsightType::LeadershipStyle),
            question: "How do you lead teams?".into(),
            content: "By listening first.".into(),
            embedding,
            tags: serde_json::json!([]),
            is_active: true,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        }
    }

    #[test]
    fn test_embedding_round_trip() {
        let encoded = encode_embedding(&[0.5, -1.25, 3.0]);
        let model = sample(Some(encoded));
        assert_eq!(model.parse_embedding(), Some(vec![0.5, -1.25, 3.0]));
    }

    #[test]
    fn test_absent_embedding() {
        assert_eq!(sample(None).parse_embedding(), None);
    }

    #[test]
    fn test_embedding_input_combines_question_and_content() {
        let model = sample(None);
        assert_eq!(
            model.embedding_input(),
            "Question: How do you lead teams?\nAnswer: By listening first."
        );
    }

    #[test]
    fn test_insight_type_string_round_trip() {
        for kind in InsightType::ALL {
            assert_eq!(InsightType::from(String::from(kind)), kind);
        }
    }
}
