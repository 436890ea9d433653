//! SeaORM entity models
//!
//! Database entities for CareerLens

mod career_category;
mod insight;
mod insight_match;
mod job_posting;
mod narrative;
mod narrative_usage;

pub use career_category::{
    Entity as CareerCategoryEntity,
    Model as CareerCategory,
    ActiveModel as CareerCategoryActiveModel,
    Column as CareerCategoryColumn,
};

pub(crate) use insight::encode_embedding;
pub use insight::{
    Entity as InsightEntity,
    Model as Insight,
    ActiveModel as InsightActiveModel,
    Column as InsightColumn,
    InsightType,
};

pub use job_posting::{
    Entity as JobPostingEntity,
    Model as JobPosting,
    ActiveModel as JobPostingActiveModel,
    Column as JobPostingColumn,
};

pub use insight_match::{
    Entity as InsightMatchEntity,
    Model as InsightMatch,
    ActiveModel as InsightMatchActiveModel,
    Column as InsightMatchColumn,
};

pub use narrative::{
    Entity as NarrativeEntity,
    Model as Narrative,
    ActiveModel as NarrativeActiveModel,
    Column as NarrativeColumn,
    NarrativeType,
};

pub use narrative_usage::{
    Entity as NarrativeUsageEntity,
    Model as NarrativeUsage,
    ActiveModel as NarrativeUsageActiveModel,
    Column as NarrativeUsageColumn,
};
