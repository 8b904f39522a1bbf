// SPDX-License-Identifier: MIT OR Apache-2.0
//! Section building over an ordered line document.
//!
//! Layout only: a line either opens a new section (header) or belongs to
//! the current one. The document starts in a headerless intro section.

use crate::header::{canonical_header_key, LexicalHeaderDetector};
use jdp_core::Section;
use once_cell::sync::Lazy;
use regex::Regex;

/// Bullet line shape after (or without) core normalisation.
static LIST_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[•\-*·–▪]\s+(.*)").expect("valid regex"));

/// Build the section sequence for a line document.
///
/// Bullet groups are collapsed afterwards by [`group_lists`]; this pass
/// only assigns lines to sections.
pub fn build_sections(lines: &[String], detector: &LexicalHeaderDetector) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Section::intro();

    for (idx, line) in lines.iter().enumerate() {
        let stripped = line.trim();
        let next_line = lines.get(idx + 1).map(String::as_str);

        if detector.is_header(stripped, next_line) {
            if current.has_content() {
                sections.push(current);
            }
            current = Section::with_header(canonical_header_key(stripped));
            continue;
        }

        if !stripped.is_empty() {
            current.lines.push(stripped.to_string());
        }
    }

    if current.has_content() {
        sections.push(current);
    }

    sections.into_iter().map(group_lists).collect()
}

/// Collapse contiguous bullet runs inside a section into `lists`.
///
/// Non-bullet lines stay in `lines`; each break between runs commits one
/// list, so a section may interleave prose and several lists. Bullet text
/// is stored without its prefix.
pub fn group_lists(section: Section) -> Section {
    let mut lists: Vec<Vec<String>> = Vec::new();
    let mut current_list: Vec<String> = Vec::new();
    let mut prose: Vec<String> = Vec::new();

    for line in &section.lines {
        if let Some(caps) = LIST_BULLET.captures(line) {
            current_list.push(caps[1].trim().to_string());
        } else {
            if !current_list.is_empty() {
                lists.push(std::mem::take(&mut current_list));
            }
            prose.push(line.clone());
        }
    }
    if !current_list.is_empty() {
        lists.push(current_list);
    }

    Section {
        lines: prose,
        lists,
        ..section
    }
}
