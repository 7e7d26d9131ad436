//! Compatibility Scorer — pure, local, deterministic. No network or LLM
//! calls: scoring every discovered listing has to stay cheap, and repeat
//! scoring of the same (listing, profile) pair must be bit-identical.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::models::listing::{CriterionContribution, Listing, ScoredListing};
use crate::models::profile::Profile;
use crate::sources::SourceKind;

/// Category weights. They sum to 10, so a perfect overlap in every category
/// hits the scale's ceiling exactly.
const SKILLS_WEIGHT: f64 = 4.0;
const TITLE_WEIGHT: f64 = 2.0;
const SENIORITY_WEIGHT: f64 = 1.5;
const LOCATION_WEIGHT: f64 = 1.5;
const DOMAIN_WEIGHT: f64 = 1.0;

const SENIORITY_MARKERS: [&str; 9] = [
    "intern",
    "junior",
    "mid",
    "senior",
    "lead",
    "staff",
    "principal",
    "head",
    "director",
];

const DOMAIN_KEYWORDS: [&str; 14] = [
    "data",
    "software",
    "engineering",
    "analytics",
    "cloud",
    "security",
    "product",
    "design",
    "research",
    "finance",
    "sales",
    "marketing",
    "operations",
    "consulting",
];

/// Alphabetic 3+ character tokens, lowercased.
fn tokenize(text: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_alphabetic() {
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            if current.chars().count() >= 3 {
                tokens.insert(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    if current.chars().count() >= 3 {
        tokens.insert(current);
    }
    tokens
}

/// Fraction of `target` tokens covered by `held` tokens, in [0, 1].
fn coverage(held: &HashSet<String>, target: &HashSet<String>) -> f64 {
    if target.is_empty() {
        return 0.0;
    }
    let hits = target.iter().filter(|t| held.contains(*t)).count();
    hits as f64 / target.len() as f64
}

fn markers_in(tokens: &HashSet<String>, markers: &[&str]) -> HashSet<String> {
    markers
        .iter()
        .filter(|m| tokens.contains(**m))
        .map(|m| m.to_string())
        .collect()
}

/// Score one listing against the profile. Pure function of its inputs and
/// the weights above; the rationale records every category's raw overlap and
/// weighted contribution.
pub fn score(listing: &Listing, profile: &Profile) -> ScoredListing {
    let desc_tokens = tokenize(&listing.signal_text());
    let title_tokens = tokenize(&listing.title);
    let profile_tokens = tokenize(&profile.corpus());

    let role_text: String = profile
        .cv
        .experience
        .iter()
        .map(|e| e.title.as_str())
        .chain(profile.cv.skills.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    let role_tokens = tokenize(&role_text);

    let mut rationale: BTreeMap<String, CriterionContribution> = BTreeMap::new();
    let mut total = 0.0f64;
    let mut add = |name: &str, raw: f64, weight: f64| {
        let contribution = raw * weight;
        total += contribution;
        rationale.insert(
            name.to_string(),
            CriterionContribution {
                raw_overlap: raw,
                weight,
                contribution,
            },
        );
    };

    // skills: how much of the posting's language the profile covers
    add("skills", coverage(&profile_tokens, &desc_tokens), SKILLS_WEIGHT);

    // title: alignment between the posting title and past roles/skills
    add("title", coverage(&role_tokens, &title_tokens), TITLE_WEIGHT);

    // seniority: shared marker = 1.0, posting states none = neutral half credit
    let listing_markers = markers_in(
        &title_tokens.union(&desc_tokens).cloned().collect(),
        &SENIORITY_MARKERS,
    );
    let profile_markers = markers_in(&role_tokens, &SENIORITY_MARKERS);
    let seniority_raw = if listing_markers.is_empty() {
        0.5
    } else if listing_markers.intersection(&profile_markers).next().is_some() {
        1.0
    } else {
        0.0
    };
    add("seniority", seniority_raw, SENIORITY_WEIGHT);

    // location: remote postings fit anyone; otherwise the posting's location
    // must show up in the profile text
    let location_raw = if desc_tokens.contains("remote") {
        1.0
    } else {
        coverage(&profile_tokens, &tokenize(&listing.location))
    };
    add("location", location_raw, LOCATION_WEIGHT);

    // domain: shared function keywords
    let listing_domains = markers_in(&desc_tokens, &DOMAIN_KEYWORDS);
    let profile_domains = markers_in(&profile_tokens, &DOMAIN_KEYWORDS);
    let domain_raw = if listing_domains.is_empty() {
        0.0
    } else {
        listing_domains.intersection(&profile_domains).count() as f64
            / listing_domains.len() as f64
    };
    add("domain", domain_raw, DOMAIN_WEIGHT);

    let score = (total.clamp(0.0, 10.0) * 10.0).round() / 10.0;
    debug!(
        listing = %listing.title,
        company = %listing.company,
        score,
        "scored listing"
    );

    ScoredListing {
        listing: listing.clone(),
        score,
        rationale,
    }
}

/// Order per the report contract: score descending, then posted date
/// descending, then source priority order.
pub fn rank(scored: &mut [ScoredListing], priority: &[SourceKind]) {
    let priority_index = |kind: SourceKind| {
        priority
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(priority.len())
    };
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.listing.posted_at.cmp(&a.listing.posted_at))
            .then_with(|| {
                priority_index(a.listing.source).cmp(&priority_index(b.listing.source))
            })
    });
}

#[derive(Debug, Clone)]
pub struct Shortlist {
    pub entries: Vec<ScoredListing>,
    /// Nothing met the threshold; these are the top-N by score instead.
    pub fallback: bool,
}

/// Pure downstream filter: everything at or above the threshold, ordered,
/// truncated to `max_docs`. When nothing passes, fall back to the top
/// `max_docs` by score rather than generating no documents at all.
pub fn shortlist(
    mut scored: Vec<ScoredListing>,
    threshold: f64,
    max_docs: usize,
    priority: &[SourceKind],
) -> Shortlist {
    rank(&mut scored, priority);

    let passing: Vec<ScoredListing> = scored
        .iter()
        .filter(|s| s.score >= threshold)
        .take(max_docs)
        .cloned()
        .collect();

    if !passing.is_empty() || scored.is_empty() {
        return Shortlist {
            entries: passing,
            fallback: false,
        };
    }

    Shortlist {
        entries: scored.into_iter().take(max_docs).collect(),
        fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{CvSections, ExperienceItem};
    use chrono::{Duration, Utc};

    fn listing(id: &str, title: &str, desc: &str) -> Listing {
        Listing {
            source: SourceKind::Indeed,
            external_id: id.to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Zurich".to_string(),
            posted_at: Utc::now(),
            description: desc.to_string(),
            normalized_description: None,
        }
    }

    fn profile() -> Profile {
        Profile {
            cv: CvSections {
                summary: "Senior data engineer focused on analytics pipelines".to_string(),
                experience: vec![ExperienceItem {
                    title: "Senior Data Engineer".to_string(),
                    company: "Beta GmbH".to_string(),
                    bullets: vec![
                        "Built python spark pipelines for analytics in Zurich".to_string()
                    ],
                }],
                skills: vec!["python".to_string(), "sql".to_string(), "spark".to_string()],
                education: vec![],
                raw: "Senior data engineer, python sql spark analytics, Zurich".to_string(),
            },
            memory_entries: vec![],
        }
    }

    #[test]
    fn test_scoring_is_bit_identical_on_repeat() {
        let l = listing("a", "Senior Data Engineer", "python sql spark analytics data");
        let p = profile();
        let first = score(&l, &p);
        let second = score(&l, &p);
        assert_eq!(first.score.to_bits(), second.score.to_bits());
        assert_eq!(first.rationale, second.rationale);
    }

    #[test]
    fn test_score_bounded_and_one_decimal() {
        let l = listing("a", "Senior Data Engineer", "python sql spark analytics data zurich");
        let s = score(&l, &profile());
        assert!(s.score >= 0.0 && s.score <= 10.0);
        assert_eq!((s.score * 10.0).round() / 10.0, s.score);
    }

    #[test]
    fn test_rationale_covers_every_category() {
        let s = score(&listing("a", "Data Engineer", "python"), &profile());
        let keys: Vec<&str> = s.rationale.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["domain", "location", "seniority", "skills", "title"]);
        for c in s.rationale.values() {
            assert!((c.contribution - c.raw_overlap * c.weight).abs() < 1e-12);
        }
    }

    #[test]
    fn test_strong_match_outscores_unrelated_posting() {
        let good = score(
            &listing("a", "Senior Data Engineer", "python sql spark data analytics"),
            &profile(),
        );
        let bad = score(
            &listing("b", "Pastry Chef", "croissants lamination butter ovens"),
            &profile(),
        );
        assert!(good.score > bad.score);
    }

    #[test]
    fn test_empty_description_still_scores_from_minimal_signal() {
        let l = listing("a", "Senior Data Engineer", "   ");
        let s = score(&l, &profile());
        // title + company + location synthesize enough signal to avoid 0.0
        assert!(s.score > 0.0);
    }

    #[test]
    fn test_remote_posting_gets_full_location_credit() {
        let remote = score(
            &listing("a", "Data Engineer", "fully remote python role"),
            &profile(),
        );
        assert_eq!(remote.rationale["location"].raw_overlap, 1.0);
    }

    #[test]
    fn test_rank_breaks_score_ties_by_posted_date_then_priority() {
        let p = profile();
        let newer = score(&listing("a", "Data Engineer", "python sql"), &p);
        let mut older = score(&listing("b", "Data Engineer", "python sql"), &p);
        older.listing.posted_at = newer.listing.posted_at - Duration::days(3);
        let mut other_source = newer.clone();
        other_source.listing.source = SourceKind::Jobup;
        other_source.listing.external_id = "c".to_string();

        let mut scored = vec![older.clone(), other_source.clone(), newer.clone()];
        rank(&mut scored, &SourceKind::DEFAULT_PRIORITY.to_vec());

        assert_eq!(scored[0].listing.external_id, "a"); // newest, indeed
        assert_eq!(scored[1].listing.external_id, "c"); // same date, lower priority
        assert_eq!(scored[2].listing.external_id, "b"); // older
    }

    #[test]
    fn test_shortlist_filters_by_threshold_and_truncates() {
        let p = profile();
        let scored: Vec<ScoredListing> = vec![
            score(&listing("a", "Senior Data Engineer", "python sql spark data analytics"), &p),
            score(&listing("b", "Pastry Chef", "croissants butter"), &p),
        ];
        let high = scored[0].score;
        let list = shortlist(scored, high, 5, &SourceKind::DEFAULT_PRIORITY);
        assert!(!list.fallback);
        assert_eq!(list.entries.len(), 1);
        assert_eq!(list.entries[0].listing.external_id, "a");
    }

    #[test]
    fn test_shortlist_falls_back_to_top_n_when_nothing_passes() {
        let p = profile();
        let scored: Vec<ScoredListing> = vec![
            score(&listing("a", "Data Engineer", "python"), &p),
            score(&listing("b", "Pastry Chef", "croissants"), &p),
        ];
        let list = shortlist(scored, 9.9, 1, &SourceKind::DEFAULT_PRIORITY);
        assert!(list.fallback);
        assert_eq!(list.entries.len(), 1);
        assert_eq!(list.entries[0].listing.external_id, "a");
    }

    #[test]
    fn test_shortlist_of_nothing_is_empty_not_fallback() {
        let list = shortlist(vec![], 7.5, 5, &SourceKind::DEFAULT_PRIORITY);
        assert!(list.entries.is_empty());
        assert!(!list.fallback);
    }
}
