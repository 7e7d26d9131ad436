//! Document Synthesizer — turns a shortlisted listing plus the profile into
//! a structured draft via the generation oracle.
//!
//! The oracle must return exactly the expected section names. Anything
//! missing or extra fails the listing with `MalformedGeneration` — drafts
//! have to be structurally trustworthy before AI-Guard ever sees them, so
//! there is no silent padding or dropping here.

pub mod prompts;

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::info;

use crate::errors::{OracleError, SynthesisError};
use crate::models::draft::{Draft, Section, SectionCategory, SectionOrigin};
use crate::models::listing::Listing;
use crate::models::profile::Profile;

/// The fixed section set every draft carries, in document order.
pub const SECTION_SPECS: [(&str, SectionCategory); 3] = [
    ("summary", SectionCategory::CvSummary),
    ("experience", SectionCategory::CvExperience),
    ("cover-letter-body", SectionCategory::CoverLetterBody),
];

pub fn expected_section_names() -> Vec<&'static str> {
    SECTION_SPECS.iter().map(|(name, _)| *name).collect()
}

/// The text-transformation oracle for synthesis. Implementations own prompt
/// construction; the engine only validates the structural contract.
#[async_trait]
pub trait GenerationOracle: Send + Sync {
    async fn generate(
        &self,
        listing: &Listing,
        profile: &Profile,
        expected_sections: &[&str],
    ) -> Result<HashMap<String, String>, OracleError>;
}

/// Generate a draft for one listing. Fails with `MalformedGeneration` when
/// the oracle's section set differs from the expected one in either
/// direction.
pub async fn synthesize(
    listing: &Listing,
    profile: &Profile,
    oracle: &dyn GenerationOracle,
) -> Result<Draft, SynthesisError> {
    let expected = expected_section_names();
    let mut generated = oracle.generate(listing, profile, &expected).await?;

    let mut missing: Vec<String> = expected
        .iter()
        .filter(|name| !generated.contains_key(**name))
        .map(|name| name.to_string())
        .collect();
    let mut unexpected: Vec<String> = generated
        .keys()
        .filter(|key| !expected.contains(&key.as_str()))
        .cloned()
        .collect();
    missing.sort();
    unexpected.sort();

    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(SynthesisError::MalformedGeneration { missing, unexpected });
    }

    let sections = SECTION_SPECS
        .iter()
        .map(|(name, category)| Section {
            name: name.to_string(),
            category: *category,
            text: generated.remove(*name).unwrap_or_default(),
            origin: SectionOrigin::Synthesized,
        })
        .collect();

    info!(
        listing = %listing.title,
        company = %listing.company,
        "draft synthesized"
    );

    Ok(Draft {
        listing_id: listing.id(),
        sections,
        revision: 0,
    })
}
