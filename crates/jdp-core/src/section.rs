// SPDX-License-Identifier: MIT OR Apache-2.0
//! Section document model.
//!
//! A JD document is an ordered sequence of [`Section`]s: an optional
//! canonical header, prose lines, and bullet groups collapsed into lists.
//! Every section carries a [`SemanticZone`] tag; the tag starts as
//! [`SemanticZone::Others`] (or [`SemanticZone::Intro`] for pre-header
//! content) and is refined by the semantic tagger.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SemanticZone
// ---------------------------------------------------------------------------

/// Closed set of zone tags labelling a section's role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SemanticZone {
    /// Pre-header content at the top of the document.
    Intro,
    /// Company / position introduction.
    Company,
    /// Main duties.
    Responsibilities,
    /// Required qualifications.
    Requirements,
    /// Preferred qualifications.
    Preferred,
    /// Experience level.
    Experience,
    /// Tech stack.
    Skills,
    /// Employment type (full-time, contract, …).
    EmploymentType,
    /// Work location.
    Location,
    /// Benefits and compensation.
    Benefits,
    /// Application / essay questions.
    ApplicationQuestions,
    /// Hiring process.
    Process,
    /// Everything unclassified.
    Others,
}

/// Every zone tag, in no particular order. Used by exhaustiveness tests.
pub const ALL_ZONES: &[SemanticZone] = &[
    SemanticZone::Intro,
    SemanticZone::Company,
    SemanticZone::Responsibilities,
    SemanticZone::Requirements,
    SemanticZone::Preferred,
    SemanticZone::Experience,
    SemanticZone::Skills,
    SemanticZone::EmploymentType,
    SemanticZone::Location,
    SemanticZone::Benefits,
    SemanticZone::ApplicationQuestions,
    SemanticZone::Process,
    SemanticZone::Others,
];

impl SemanticZone {
    /// Stable wire string (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Company => "company",
            Self::Responsibilities => "responsibilities",
            Self::Requirements => "requirements",
            Self::Preferred => "preferred",
            Self::Experience => "experience",
            Self::Skills => "skills",
            Self::EmploymentType => "employment_type",
            Self::Location => "location",
            Self::Benefits => "benefits",
            Self::ApplicationQuestions => "application_questions",
            Self::Process => "process",
            Self::Others => "others",
        }
    }
}

impl fmt::Display for SemanticZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// One logical section of a JD document.
///
/// `header` is the canonical header key (lower-cased, all whitespace
/// removed) or `None` for the intro bucket. `lines` holds prose in
/// document order; `lists` holds bullet groups, each inner vector one
/// contiguous bullet run with the bullet prefix stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    /// Canonical header key, or `None` for the intro bucket.
    pub header: Option<String>,
    /// Prose lines in document order.
    pub lines: Vec<String>,
    /// Bullet groups; each inner list is one contiguous run.
    pub lists: Vec<Vec<String>>,
    /// Zone tag. `Intro` is fixed at construction and never retagged.
    pub zone: SemanticZone,
}

impl Section {
    /// The headerless intro bucket.
    pub fn intro() -> Self {
        Self {
            header: None,
            lines: Vec::new(),
            lists: Vec::new(),
            zone: SemanticZone::Intro,
        }
    }

    /// A fresh section under the given canonical header key.
    pub fn with_header(key: impl Into<String>) -> Self {
        Self {
            header: Some(key.into()),
            lines: Vec::new(),
            lists: Vec::new(),
            zone: SemanticZone::Others,
        }
    }

    /// Whether the section carries any prose or list content.
    pub fn has_content(&self) -> bool {
        !self.lines.is_empty() || self.lists.iter().any(|l| !l.is_empty())
    }

    /// All content in document order: prose lines first, then list items.
    pub fn flattened_lines(&self) -> Vec<String> {
        let mut out = self.lines.clone();
        for list in &self.lists {
            out.extend(list.iter().cloned());
        }
        out
    }
}
