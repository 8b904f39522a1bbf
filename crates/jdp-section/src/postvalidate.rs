// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structural repair of the section stream.
//!
//! All three pipelines produce headers from heuristics, and heuristics
//! misfire in predictable ways: company names promoted to headers by
//! visual signals, decorative headers with no body, platform badges
//! trailing the last section. The rules below fix exactly those, in
//! order: intro absorption, empty-header merge, footer strip.
//!
//! Validation runs on the flattened `(header, lines)` view: list items
//! rejoin the line stream and sections come back out with `lists` empty.

use crate::header::matches_any_keyword;
use jdp_core::{Section, SemanticZone};
use jdp_keywords::KeywordRegistry;

/// Trailing lines this short are footer-badge candidates.
const FOOTER_MAX_LINE_CHARS: usize = 15;
/// Minimum run length before trailing short lines are treated as noise.
const FOOTER_MIN_CONSECUTIVE: usize = 2;

type Entry = (Option<String>, Vec<String>);

/// Repair the section stream. Zone tags are reset: intro content comes
/// out as [`SemanticZone::Intro`], everything else as
/// [`SemanticZone::Others`] for the semantic tagger to refine.
pub fn post_validate(sections: Vec<Section>, registry: &KeywordRegistry) -> Vec<Section> {
    let entries: Vec<Entry> = sections
        .into_iter()
        .map(|sec| {
            let lines = sec.flattened_lines();
            (sec.header, lines)
        })
        .collect();

    let entries = absorb_non_keyword_intro(entries, registry);
    let entries = merge_empty_headers(entries);
    let entries = strip_footer_noise(entries);

    entries
        .into_iter()
        .map(|(header, lines)| match header {
            None => Section {
                header: None,
                lines,
                lists: Vec::new(),
                zone: SemanticZone::Intro,
            },
            Some(key) => Section {
                header: Some(key),
                lines,
                lists: Vec::new(),
                zone: SemanticZone::Others,
            },
        })
        .collect()
}

/// Rule 1: leading sections whose header fails the keyword-coverage gate
/// are folded into the intro bucket, header key included as a line. The
/// walk stops at the first keyword-matching header.
fn absorb_non_keyword_intro(entries: Vec<Entry>, registry: &KeywordRegistry) -> Vec<Entry> {
    if entries.is_empty() {
        return entries;
    }

    let mut intro_lines: Vec<String> = Vec::new();
    let mut first_keyword_idx = entries.len();

    for (i, (header, lines)) in entries.iter().enumerate() {
        match header {
            None => {
                intro_lines.extend(lines.iter().cloned());
            }
            Some(key) if matches_any_keyword(key, registry) => {
                first_keyword_idx = i;
                break;
            }
            Some(key) => {
                intro_lines.push(key.clone());
                intro_lines.extend(lines.iter().cloned());
                first_keyword_idx = i + 1;
            }
        }
    }

    let mut result: Vec<Entry> = Vec::new();
    if !intro_lines.is_empty() {
        result.push((None, intro_lines));
    }
    result.extend(entries.into_iter().skip(first_keyword_idx));
    result
}

/// Rule 2: a header with zero content absorbs subsequent header keys as
/// content lines until one with a body is reached; that body-bearing
/// header's key becomes the first absorbed line.
fn merge_empty_headers(entries: Vec<Entry>) -> Vec<Entry> {
    let mut result: Vec<Entry> = Vec::new();
    let mut i = 0;

    while i < entries.len() {
        let (header, lines) = &entries[i];

        if header.is_none() || !lines.is_empty() {
            result.push((header.clone(), lines.clone()));
            i += 1;
            continue;
        }

        let mut merged: Vec<String> = Vec::new();
        let mut j = i + 1;
        while j < entries.len() {
            let (next_header, next_lines) = &entries[j];
            if let Some(key) = next_header {
                merged.push(key.clone());
            }
            merged.extend(next_lines.iter().cloned());
            j += 1;
            if !next_lines.is_empty() {
                break;
            }
        }

        result.push((header.clone(), merged));
        i = j;
    }

    result
}

/// Rule 3: drop a trailing run of two or more short lines from the last
/// section: platform badges and tag clouds, not JD content.
fn strip_footer_noise(mut entries: Vec<Entry>) -> Vec<Entry> {
    let Some((_, last_lines)) = entries.last_mut() else {
        return entries;
    };
    if last_lines.is_empty() {
        return entries;
    }

    let mut cutoff = last_lines.len();
    for i in (0..last_lines.len()).rev() {
        if last_lines[i].trim().chars().count() > FOOTER_MAX_LINE_CHARS {
            break;
        }
        cutoff = i;
    }

    if last_lines.len() - cutoff >= FOOTER_MIN_CONSECUTIVE {
        last_lines.truncate(cutoff);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn registry() -> Arc<KeywordRegistry> {
        Arc::new(KeywordRegistry::builtin())
    }

    fn section(header: Option<&str>, lines: &[&str]) -> Section {
        Section {
            header: header.map(String::from),
            lines: lines.iter().map(|s| s.to_string()).collect(),
            lists: Vec::new(),
            zone: if header.is_none() {
                SemanticZone::Intro
            } else {
                SemanticZone::Others
            },
        }
    }

    #[test]
    fn non_keyword_leading_headers_fold_into_intro() {
        let sections = vec![
            section(Some("커넥트웨이브"), &["국내 1위 커머스 플랫폼"]),
            section(Some("주요업무"), &["백엔드 API 개발"]),
        ];
        let out = post_validate(sections, &registry());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].header, None);
        assert_eq!(out[0].zone, SemanticZone::Intro);
        assert_eq!(out[0].lines, vec!["커넥트웨이브", "국내 1위 커머스 플랫폼"]);
        assert_eq!(out[1].header.as_deref(), Some("주요업무"));
    }

    #[test]
    fn absorption_stops_at_first_keyword_header() {
        let sections = vec![
            section(Some("포지션소개글"), &["소개"]),
            section(Some("자격요건"), &["Java"]),
            section(Some("아무개헤더"), &["본문"]),
        ];
        let out = post_validate(sections, &registry());
        assert_eq!(out[0].lines, vec!["포지션소개글", "소개"]);
        assert_eq!(out[1].header.as_deref(), Some("자격요건"));
        // Rule 1 never touches sections after the first keyword match.
        assert_eq!(out[2].header.as_deref(), Some("아무개헤더"));
    }

    #[test]
    fn empty_header_absorbs_until_content() {
        let sections = vec![
            section(Some("주요업무"), &["개발"]),
            section(Some("채용전형"), &[]),
            section(Some("채용절차"), &[]),
            section(Some("전형절차"), &["서류 - 면접 - 합격"]),
        ];
        let out = post_validate(sections, &registry());
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].header.as_deref(), Some("채용전형"));
        assert_eq!(
            out[1].lines,
            vec!["채용절차", "전형절차", "서류 - 면접 - 합격"]
        );
    }

    #[test]
    fn trailing_empty_header_keeps_empty_body() {
        let sections = vec![
            section(Some("주요업무"), &["개발"]),
            section(Some("복리후생"), &[]),
        ];
        let out = post_validate(sections, &registry());
        assert_eq!(out.len(), 2);
        assert!(out[1].lines.is_empty());
    }

    #[test]
    fn footer_badge_run_is_stripped() {
        let sections = vec![section(
            Some("복리후생"),
            &["자율 출퇴근과 재택 근무를 지원합니다", "커피·스낵바", "AI 선도기업", "적극채용중"],
        )];
        let out = post_validate(sections, &registry());
        assert_eq!(out[0].lines, vec!["자율 출퇴근과 재택 근무를 지원합니다"]);
    }

    #[test]
    fn single_short_trailing_line_survives() {
        let sections = vec![section(Some("복리후생"), &["자율 출퇴근과 재택 근무를 지원합니다", "간식 제공"])];
        let out = post_validate(sections, &registry());
        assert_eq!(out[0].lines.len(), 2);
    }

    #[test]
    fn list_items_rejoin_the_line_stream() {
        let mut sec = section(Some("자격요건"), &["경력 무관"]);
        sec.lists.push(vec!["Java".into(), "Kotlin".into()]);
        let out = post_validate(vec![sec], &registry());
        assert_eq!(out[0].lines, vec!["경력 무관", "Java", "Kotlin"]);
        assert!(out[0].lists.is_empty());
    }
}
