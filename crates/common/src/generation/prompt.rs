//! Narrative prompt construction
//!
//! The narrative-type → instruction mapping is a closed enum match, not a
//! runtime table: the type set is fixed and exhaustive matching catches a
//! missing template at compile time.

use crate::db::models::{Insight, JobPosting, NarrativeType};

/// System message for all narrative generation
pub const SYSTEM_PROMPT: &str = "You are a professional career advisor and expert writer. \
Create compelling, personalized narrative content that authentically represents the \
candidate while being professional and engaging.";

/// Maximum job description characters included in the prompt
const MAX_JOB_CONTEXT_CHARS: usize = 1000;

/// An insight paired with its category name, as presented to the generator
#[derive(Debug, Clone)]
pub struct InsightContext {
    pub insight: Insight,
    pub category_name: String,
}

impl NarrativeType {
    /// Type-specific task instruction
    pub fn instruction(&self) -> &'static str {
        match self {
            NarrativeType::CoverLetter => {
                "Write a compelling cover letter that tells a cohesive story connecting the \
                 candidate's background to this specific role and company. Be engaging, \
                 professional, and authentic."
            }
            NarrativeType::Summary => {
                "Create a professional summary that positions the candidate as an ideal fit \
                 for this role, highlighting the most relevant qualifications and motivations."
            }
            NarrativeType::Motivation => {
                "Write a motivation statement explaining why the candidate is passionate about \
                 this role and company, drawing on their personal insights."
            }
            NarrativeType::ValueProposition => {
                "Create a value proposition statement that clearly articulates the unique \
                 value the candidate would bring to this role and organization."
            }
        }
    }
}

/// Build the user prompt for narrative generation
pub fn build_prompt(
    job: &JobPosting,
    insights: &[InsightContext],
    narrative_type: NarrativeType,
    custom_prompt: Option<&str>,
) -> String {
    let mut description = job.description_text.as_str();
    if description.len() > MAX_JOB_CONTEXT_CHARS {
        let mut cut = MAX_JOB_CONTEXT_CHARS;
        while !description.is_char_boundary(cut) {
            cut -= 1;
        }
        description = &description[..cut];
    }

    let mut prompt = format!(
        "JOB INFORMATION:\n- Title: {}\n- Company: {}\n- Description/Requirements: {}\n",
        job.title, job.company, description
    );

    prompt.push_str("\nCANDIDATE INSIGHTS:\n");
    for (i, ctx) in insights.iter().enumerate() {
        prompt.push_str(&format!(
            "\nINSIGHT {} - {} ({}):\nQuestion: {}\nResponse: {}\n",
            i + 1,
            ctx.insight.kind().display_name(),
            ctx.category_name,
            ctx.insight.question,
            ctx.insight.content
        ));
    }

    prompt.push_str(&format!("\nTASK: {}\n", narrative_type.instruction()));

    if let Some(custom) = custom_prompt.filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!("\nADDITIONAL INSTRUCTIONS: {}\n", custom));
    }

    prompt.push_str(
        "\nREQUIREMENTS:\n\
         - Use the insights naturally and authentically\n\
         - Make specific connections between the candidate's background and the job requirements\n\
         - Be professional but personable\n\
         - Avoid generic language or cliches\n\
         - Keep it concise and impactful (aim for 200-400 words for cover letters, shorter for other types)\n\
         - Return ONLY the narrative content, no explanations or meta-text\n",
    );

    prompt.push_str(&format!(
        "\nGenerate the {}:\n",
        narrative_type.display_name().to_lowercase()
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::InsightType;
    use uuid::Uuid;

    fn job() -> JobPosting {
        JobPosting {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "VP Engineering".into(),
            company: "Acme".into(),
            description_text: "Lead a distributed engineering org.".into(),
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        }
    }

    fn insight_ctx() -> InsightContext {
        InsightContext {
            insight: Insight {
                id: Uuid::new_v4(),
                owner_id: Uuid::new_v4(),
                category_id: Uuid::new_v4(),
                insight_type: String::from(InsightType::LeadershipStyle),
                question: "How do you lead?".into(),
                content: "Servant leadership.".into(),
                embedding: None,
                tags: serde_json::json!([]),
                is_active: true,
                created_at: chrono::Utc::now().into(),
                updated_at: chrono::Utc::now().into(),
            },
            category_name: "Engineering Management".into(),
        }
    }

    #[test]
    fn test_every_type_has_an_instruction() {
        for kind in NarrativeType::ALL {
            assert!(!kind.instruction().is_empty());
        }
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = build_prompt(&job(), &[insight_ctx()], NarrativeType::CoverLetter, None);
        assert!(prompt.contains("JOB INFORMATION:"));
        assert!(prompt.contains("- Title: VP Engineering"));
        assert!(prompt.contains("INSIGHT 1 - Leadership Style (Engineering Management):"));
        assert!(prompt.contains("TASK:"));
        assert!(prompt.contains("Generate the cover letter:"));
        assert!(!prompt.contains("ADDITIONAL INSTRUCTIONS"));
    }

    #[test]
    fn test_custom_prompt_included() {
        let prompt = build_prompt(
            &job(),
            &[insight_ctx()],
            NarrativeType::Summary,
            Some("Mention remote experience."),
        );
        assert!(prompt.contains("ADDITIONAL INSTRUCTIONS: Mention remote experience."));
    }

    #[test]
    fn test_long_description_truncated() {
        let mut j = job();
        j.description_text = "x".repeat(5000);
        let prompt = build_prompt(&j, &[insight_ctx()], NarrativeType::Motivation, None);
        assert!(!prompt.contains(&"x".repeat(1001)));
    }
}
