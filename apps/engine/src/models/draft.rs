//! Draft documents: the ordered, named sections produced by synthesis and
//! rewritten in place by AI-Guard.

use serde::{Deserialize, Serialize};

use crate::models::listing::ListingId;

/// How a section's current text came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionOrigin {
    Synthesized,
    Rewritten,
}

/// The kind of text a section holds. Passed to the rewrite oracle as a hint
/// so rewrites keep the register appropriate for the document part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionCategory {
    CvSummary,
    CvExperience,
    CoverLetterBody,
}

impl SectionCategory {
    pub fn as_hint(&self) -> &'static str {
        match self {
            SectionCategory::CvSummary => "cv summary paragraph",
            SectionCategory::CvExperience => "cv experience bullets",
            SectionCategory::CoverLetterBody => "cover letter body",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub category: SectionCategory,
    pub text: String,
    pub origin: SectionOrigin,
}

/// A drafted application document set for one listing.
///
/// Section count and names are fixed at synthesis time; AI-Guard only ever
/// replaces a section's text (bumping `revision`), never adds or removes one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub listing_id: ListingId,
    pub sections: Vec<Section>,
    pub revision: u32,
}

impl Draft {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Replace one section's text, marking it rewritten and bumping the draft
    /// revision. Returns false when no section carries that name (the caller
    /// is working from the draft's own section list, so this is a bug guard,
    /// not an expected path).
    pub fn replace_section_text(&mut self, name: &str, text: String) -> bool {
        match self.sections.iter_mut().find(|s| s.name == name) {
            Some(section) => {
                section.text = text;
                section.origin = SectionOrigin::Rewritten;
                self.revision += 1;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceKind;

    fn draft() -> Draft {
        Draft {
            listing_id: ListingId {
                source: SourceKind::Indeed,
                external_id: "jk1".to_string(),
            },
            sections: vec![
                Section {
                    name: "summary".to_string(),
                    category: SectionCategory::CvSummary,
                    text: "original summary".to_string(),
                    origin: SectionOrigin::Synthesized,
                },
                Section {
                    name: "cover-letter-body".to_string(),
                    category: SectionCategory::CoverLetterBody,
                    text: "original body".to_string(),
                    origin: SectionOrigin::Synthesized,
                },
            ],
            revision: 0,
        }
    }

    #[test]
    fn test_replace_section_text_bumps_revision_and_origin() {
        let mut d = draft();
        assert!(d.replace_section_text("summary", "new text".to_string()));
        assert_eq!(d.revision, 1);
        let s = d.section("summary").unwrap();
        assert_eq!(s.text, "new text");
        assert_eq!(s.origin, SectionOrigin::Rewritten);
        // untouched section keeps its origin
        assert_eq!(
            d.section("cover-letter-body").unwrap().origin,
            SectionOrigin::Synthesized
        );
    }

    #[test]
    fn test_replace_unknown_section_is_rejected() {
        let mut d = draft();
        assert!(!d.replace_section_text("footer", "x".to_string()));
        assert_eq!(d.revision, 0);
    }
}
