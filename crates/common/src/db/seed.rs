//! Career category seed data
//!
//! Static reference data for the ten career paths the insight system
//! organizes around. Seeded at gateway startup; re-seeding refreshes
//! keywords and descriptions without duplicating rows.

use crate::db::Repository;
use crate::errors::Result;
use tracing::info;

/// (name, description, keywords)
pub const DEFAULT_CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "CTO (Chief Technology Officer)",
        "Senior technical leadership roles focusing on technology strategy, architecture, and team leadership.",
        &[
            "cto", "chief technology officer", "head of technology",
            "technology director", "vp engineering", "vp technology",
            "chief technical officer", "technology lead",
        ],
    ),
    (
        "Head of IT / IT Director",
        "Leadership roles managing IT infrastructure, operations, and technology systems.",
        &[
            "head of it", "it director", "it manager", "infrastructure director",
            "systems director", "technology operations director", "it leadership",
            "director of information technology",
        ],
    ),
    (
        "Engineering Management",
        "Management roles leading engineering teams and software development organizations.",
        &[
            "engineering manager", "senior engineering manager",
            "director of engineering", "vp engineering", "engineering lead",
            "technical manager", "development manager",
        ],
    ),
    (
        "Product Management",
        "Product strategy and management roles focusing on product development and market fit.",
        &[
            "product manager", "senior product manager", "principal product manager",
            "director of product", "vp product", "head of product",
            "product lead", "product owner",
        ],
    ),
    (
        "Project Management / Program Management",
        "Roles focused on project delivery, program coordination, and process management.",
        &[
            "project manager", "program manager", "senior project manager",
            "project lead", "program lead", "delivery manager",
            "scrum master", "agile coach",
        ],
    ),
    (
        "Technical Leadership / Architect",
        "Senior individual contributor roles with technical leadership responsibilities.",
        &[
            "technical lead", "lead developer", "senior developer",
            "principal engineer", "staff engineer", "architect",
            "solution architect", "technical architect", "lead engineer",
        ],
    ),
    (
        "Consultant / Advisory",
        "Consulting and advisory roles providing expertise to organizations.",
        &[
            "consultant", "senior consultant", "principal consultant",
            "advisor", "technical advisor", "freelancer",
            "independent contractor", "strategic advisor",
        ],
    ),
    (
        "Startup / Founder",
        "Entrepreneurial roles in startups and founding new ventures.",
        &[
            "founder", "co-founder", "ceo", "startup",
            "entrepreneur", "technical founder", "founding engineer",
        ],
    ),
    (
        "Data & Analytics Leadership",
        "Leadership roles in data strategy, analytics, and business intelligence.",
        &[
            "head of data", "data director", "chief data officer",
            "analytics director", "data science manager",
            "business intelligence director",
        ],
    ),
    (
        "DevOps / Infrastructure Leadership",
        "Leadership roles in DevOps, infrastructure, and platform engineering.",
        &[
            "devops manager", "infrastructure manager", "platform manager",
            "sre manager", "cloud architect", "devops lead",
            "infrastructure director", "platform engineering manager",
        ],
    ),
];

/// Seed (or refresh) the default career categories
pub async fn seed_categories(repo: &Repository) -> Result<()> {
    for (name, description, keywords) in DEFAULT_CATEGORIES {
        repo.upsert_category(name, description, keywords).await?;
    }
    info!(count = DEFAULT_CATEGORIES.len(), "Career categories seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_categories() {
        assert_eq!(DEFAULT_CATEGORIES.len(), 10);
    }

    #[test]
    fn test_unique_names_and_nonempty_keywords() {
        let mut names = std::collections::HashSet::new();
        for (name, _, keywords) in DEFAULT_CATEGORIES {
            assert!(names.insert(*name), "duplicate category name: {}", name);
            assert!(!keywords.is_empty());
        }
    }
}
