//! Factual-similarity check between a section's current text and a rewrite
//! candidate. Measures retention of the original's content-bearing tokens
//! (words of three or more letters, plus any numbers) in the candidate.
//! Rewrites are free to rephrase; they are not free to drop facts.

use std::collections::HashSet;

fn fact_tokens(text: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    let mut current = String::new();
    let mut numeric = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if current.is_empty() {
                numeric = ch.is_numeric();
            }
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            if numeric || current.chars().count() >= 3 {
                tokens.insert(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    if !current.is_empty() && (numeric || current.chars().count() >= 3) {
        tokens.insert(current);
    }
    tokens
}

/// Fraction of the original's fact tokens still present in the candidate,
/// in [0, 1]. An original with no fact tokens trivially passes.
pub fn factual_similarity(original: &str, candidate: &str) -> f64 {
    let original_tokens = fact_tokens(original);
    if original_tokens.is_empty() {
        return 1.0;
    }
    let candidate_tokens = fact_tokens(candidate);
    let retained = original_tokens
        .iter()
        .filter(|t| candidate_tokens.contains(*t))
        .count();
    retained as f64 / original_tokens.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_text_is_fully_similar() {
        let text = "Led migration of 12 services at Acme in 2023.";
        assert_eq!(factual_similarity(text, text), 1.0);
    }

    #[test]
    fn test_rephrasing_keeps_similarity_high() {
        let original = "Led migration of 12 services at Acme during 2023, cutting costs.";
        let candidate = "During 2023 I led the Acme migration of 12 services and cut costs.";
        assert!(factual_similarity(original, candidate) > 0.9);
    }

    #[test]
    fn test_dropped_facts_lower_similarity() {
        let original = "Managed 40 enterprise accounts at Globex with 95 percent renewal.";
        let candidate = "I did some account work.";
        assert!(factual_similarity(original, candidate) < 0.3);
    }

    #[test]
    fn test_numbers_count_as_facts() {
        let original = "Revenue grew 3x to 2.4 million in 18 months.";
        let candidate = "Revenue grew substantially to millions over time.";
        // "3", "2", "4", "18" all dropped
        assert!(factual_similarity(original, candidate) < 0.6);
    }

    #[test]
    fn test_empty_original_trivially_passes() {
        assert_eq!(factual_similarity("", "anything at all"), 1.0);
        assert_eq!(factual_similarity("a an to", "x"), 1.0);
    }

    #[test]
    fn test_symmetric_order_of_candidate_does_not_matter() {
        let original = "Built the billing pipeline for Contoso in Geneva.";
        let shuffled = "Geneva Contoso pipeline billing built the for in.";
        assert_eq!(factual_similarity(original, shuffled), 1.0);
    }
}
