//! Candidate profile: structured CV sections plus free-text memory entries.
//! Read-only for the duration of a run; memory is appended to only between
//! runs through the memory store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceItem {
    pub title: String,
    pub company: String,
    pub bullets: Vec<String>,
}

/// Structured CV content. `raw` carries the full original CV text — the
/// scorer and the generation prompt both work from it, so ingestion quality
/// degrades gracefully when structured parsing was incomplete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CvSections {
    pub summary: String,
    pub experience: Vec<ExperienceItem>,
    pub skills: Vec<String>,
    pub education: Vec<String>,
    pub raw: String,
}

/// A free-text achievement or preference remembered across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub date: DateTime<Utc>,
    pub topic: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub cv: CvSections,
    pub memory_entries: Vec<MemoryEntry>,
}

impl Profile {
    /// All profile text joined, for token-overlap scoring.
    pub fn corpus(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        parts.push(self.cv.raw.clone());
        parts.push(self.cv.summary.clone());
        parts.extend(self.cv.skills.iter().cloned());
        parts.extend(self.cv.education.iter().cloned());
        for exp in &self.cv.experience {
            parts.push(exp.title.clone());
            parts.push(exp.company.clone());
            parts.extend(exp.bullets.iter().cloned());
        }
        for entry in &self.memory_entries {
            parts.push(entry.topic.clone());
            parts.push(entry.description.clone());
        }
        parts.retain(|p| !p.trim().is_empty());
        parts.join("\n")
    }

    /// Merge additional memory entries (the run-start snapshot) into the
    /// profile, preserving order: existing entries first.
    pub fn with_memory(mut self, entries: Vec<MemoryEntry>) -> Self {
        self.memory_entries.extend(entries);
        self
    }

    /// Compact memory context for generation prompts: one line per entry,
    /// most recent last.
    pub fn memory_digest(&self) -> String {
        self.memory_entries
            .iter()
            .map(|e| format!("[{}] {}: {}", e.date.format("%Y-%m-%d"), e.topic, e.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
