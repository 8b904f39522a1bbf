// SPDX-License-Identifier: MIT OR Apache-2.0
//! Semantic zone tagging by header keyword lookup.
//!
//! Headers only; section bodies are never inspected. Priority is the
//! order of [`ZONE_PRIORITY`]: the first group to match wins, which is
//! what keeps "우대사항 및 자격요건" out of `requirements` when
//! `preferred` already claimed it.

use jdp_core::{Section, SemanticZone};
use jdp_keywords::KeywordRegistry;

/// Zone detection order and the keyword group backing each zone.
const ZONE_PRIORITY: &[(SemanticZone, &str)] = &[
    (SemanticZone::Responsibilities, "responsibilities"),
    (SemanticZone::Preferred, "preferred"),
    (SemanticZone::Requirements, "requirements"),
    (SemanticZone::Experience, "experience"),
    (SemanticZone::Company, "company"),
    (SemanticZone::Benefits, "benefits"),
    (SemanticZone::ApplicationQuestions, "application_questions"),
    (SemanticZone::Process, "process"),
    (SemanticZone::Skills, "skills"),
    (SemanticZone::EmploymentType, "employment_type"),
    (SemanticZone::Location, "location"),
];

/// Tag every still-unclassified section.
///
/// Sections already carrying a non-`Others` tag (notably `Intro`) are
/// left untouched.
pub fn tag_sections(sections: Vec<Section>, registry: &KeywordRegistry) -> Vec<Section> {
    sections
        .into_iter()
        .map(|mut sec| {
            if sec.zone == SemanticZone::Others {
                sec.zone = detect_zone(sec.header.as_deref(), registry);
            }
            sec
        })
        .collect()
}

/// Zone for one header key, [`SemanticZone::Others`] when nothing hits.
pub fn detect_zone(header: Option<&str>, registry: &KeywordRegistry) -> SemanticZone {
    let Some(header) = header else {
        return SemanticZone::Others;
    };
    let normalized = normalize(header);
    if normalized.is_empty() {
        return SemanticZone::Others;
    }

    for (zone, group) in ZONE_PRIORITY {
        for kw in registry.section_keywords(group) {
            let kw_norm = normalize(kw);
            if kw_norm.is_empty() {
                continue;
            }
            if normalized.contains(&kw_norm) || kw_norm.contains(&normalized) {
                return *zone;
            }
        }
    }
    SemanticZone::Others
}

fn normalize(text: &str) -> String {
    text.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn registry() -> Arc<KeywordRegistry> {
        Arc::new(KeywordRegistry::builtin())
    }

    fn with_header(header: &str) -> Section {
        Section {
            header: Some(header.into()),
            lines: vec!["내용".into()],
            lists: Vec::new(),
            zone: SemanticZone::Others,
        }
    }

    #[test]
    fn headers_map_to_their_zones() {
        let reg = registry();
        assert_eq!(detect_zone(Some("주요업무"), &reg), SemanticZone::Responsibilities);
        assert_eq!(detect_zone(Some("자격요건"), &reg), SemanticZone::Requirements);
        assert_eq!(detect_zone(Some("우대사항"), &reg), SemanticZone::Preferred);
        assert_eq!(detect_zone(Some("복리후생"), &reg), SemanticZone::Benefits);
        assert_eq!(detect_zone(Some("techstack"), &reg), SemanticZone::Skills);
        assert_eq!(detect_zone(Some("근무지"), &reg), SemanticZone::Location);
    }

    #[test]
    fn unknown_headers_stay_others() {
        assert_eq!(detect_zone(Some("아무말대잔치"), &registry()), SemanticZone::Others);
        assert_eq!(detect_zone(None, &registry()), SemanticZone::Others);
    }

    #[test]
    fn preferred_wins_over_requirements_in_compound_headers() {
        // Contains both groups' keywords; priority order decides.
        assert_eq!(
            detect_zone(Some("우대사항및자격요건"), &registry()),
            SemanticZone::Preferred
        );
    }

    #[test]
    fn intro_sections_are_never_retagged() {
        let intro = Section {
            header: None,
            lines: vec!["회사 소개".into()],
            lists: Vec::new(),
            zone: SemanticZone::Intro,
        };
        let out = tag_sections(vec![intro], &registry());
        assert_eq!(out[0].zone, SemanticZone::Intro);
    }

    #[test]
    fn others_sections_are_retagged() {
        let out = tag_sections(vec![with_header("담당업무")], &registry());
        assert_eq!(out[0].zone, SemanticZone::Responsibilities);
    }
}
