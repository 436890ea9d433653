//! Category alignment bonus
//!
//! A deliberately crude lexical signal layered on top of semantic relevance:
//! case-insensitive substring containment of the insight category's keywords
//! in the job text. No word-boundary guard, so a keyword can match inside an
//! unrelated word; a known precision limitation.

/// Bonus increment per distinct matching keyword
pub const BONUS_PER_KEYWORD: f32 = 0.1;

/// Maximum total bonus
pub const BONUS_CAP: f32 = 0.3;

/// Keyword-overlap bonus between a job's text (title + description) and a
/// category keyword list, in [0, BONUS_CAP].
///
/// Each distinct keyword contributes at most once, no matter how often it
/// occurs in the text or how many times it is repeated in the list.
pub fn category_bonus(job_text: &str, keywords: &[String]) -> f32 {
    let haystack = job_text.to_lowercase();
    let mut seen = std::collections::HashSet::new();
    let mut bonus = 0.0f32;

    for keyword in keywords {
        let needle = keyword.to_lowercase();
        if needle.is_empty() || !seen.insert(needle.clone()) {
            continue;
        }
        if haystack.contains(&needle) {
            bonus += BONUS_PER_KEYWORD;
        }
    }

    bonus.min(BONUS_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_no_keywords_no_bonus() {
        assert_eq!(category_bonus("VP Engineering at Acme", &[]), 0.0);
        assert_eq!(category_bonus("", &kw(&["cto"])), 0.0);
    }

    #[test]
    fn test_single_keyword() {
        let bonus = category_bonus("Hiring a CTO to lead our platform", &kw(&["cto"]));
        assert!((bonus - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_case_insensitive() {
        let bonus = category_bonus("ENGINEERING MANAGER wanted", &kw(&["engineering manager"]));
        assert!((bonus - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_monotonic_and_capped() {
        let text = "cto, vp engineering, technology lead, head of technology";
        let one = category_bonus(text, &kw(&["cto"]));
        let two = category_bonus(text, &kw(&["cto", "vp engineering"]));
        let three = category_bonus(text, &kw(&["cto", "vp engineering", "technology lead"]));
        let four = category_bonus(
            text,
            &kw(&["cto", "vp engineering", "technology lead", "head of technology"]),
        );

        assert!(one <= two && two <= three);
        assert!((three - BONUS_CAP).abs() < 1e-6);
        assert!((four - BONUS_CAP).abs() < 1e-6);
    }

    #[test]
    fn test_repeated_occurrences_count_once() {
        let bonus = category_bonus("cto cto cto cto", &kw(&["cto"]));
        assert!((bonus - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_duplicate_keywords_count_once() {
        let bonus = category_bonus("our cto is great", &kw(&["cto", "CTO", "cto"]));
        assert!((bonus - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_substring_match_without_word_boundary() {
        // "architect" matches inside "architecture"; preserved behavior
        let bonus = category_bonus("strong architecture background", &kw(&["architect"]));
        assert!((bonus - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_non_matching_keywords() {
        assert_eq!(
            category_bonus("barista wanted for coffee shop", &kw(&["cto", "founder"])),
            0.0
        );
    }
}
