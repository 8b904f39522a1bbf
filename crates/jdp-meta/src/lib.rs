// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! jdp-meta
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Recruitment period extraction.
pub mod period;
/// Skill set extraction.
pub mod skills;

pub use period::extract_recruitment_period;
pub use skills::SkillMatcher;

use jdp_core::DocumentMeta;
use jdp_keywords::KeywordRegistry;
use std::sync::Arc;

/// Metadata extractor over the line document.
///
/// Runs before (TEXT) or independently of (URL, IMAGE) section building;
/// never raises and always returns a [`DocumentMeta`].
#[derive(Debug, Clone)]
pub struct DocumentMetaExtractor {
    skills: SkillMatcher,
}

impl DocumentMetaExtractor {
    /// Build against a loaded keyword registry; skill patterns are
    /// compiled once here.
    pub fn new(registry: Arc<KeywordRegistry>) -> Self {
        Self {
            skills: SkillMatcher::new(&registry),
        }
    }

    /// Collect recruitment period and skills from the lines.
    pub fn process(&self, lines: &[String]) -> DocumentMeta {
        DocumentMeta {
            recruitment_period: extract_recruitment_period(lines),
            skill_set: self.skills.extract(lines),
        }
    }
}
