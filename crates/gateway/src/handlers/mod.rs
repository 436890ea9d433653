//! API handlers module

pub mod categories;
pub mod health;
pub mod insights;
pub mod jobs;
pub mod matching;
pub mod narratives;
