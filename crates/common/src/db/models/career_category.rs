//! Career category entity
//!
//! Static reference data seeded once; the keyword lists drive the
//! category bonus during matching.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "career_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text", unique)]
    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Ordered keyword list stored as a JSON array of strings
    #[sea_orm(column_type = "JsonBinary")]
    pub keywords: serde_json::Value,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::insight::Entity")]
    Insights,
}

impl Related<super::insight::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Insights.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the JSON keyword column into an ordered list
    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_list_decode() {
        let model = Model {
            id: Uuid::new_v4(),
            name: "Engineering Management".into(),
            description: String::new(),
            keywords: serde_json::json!(["engineering manager", "engineering lead"]),
            is_active: true,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        };
        assert_eq!(
            model.keyword_list(),
            vec!["engineering manager".to_string(), "engineering lead".to_string()]
        );
    }

    #[test]
    fn test_keyword_list_tolerates_bad_json() {
        let model = Model {
            id: Uuid::new_v4(),
            name: "Broken".into(),
            description: String::new(),
            keywords: serde_json::json!({"not": "an array"}),
            is_active: true,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        };
        assert!(model.keyword_list().is_empty());
    }
}
