// SPDX-License-Identifier: MIT OR Apache-2.0
//! Blacklist filtering of notice/disclaimer sections.

use jdp_core::Section;

/// Headers whose whole section is legal/notice boilerplate. Whole-key
/// match only; compound headers like "전형절차 및 기타사항" are kept.
const DROP_SECTION_HEADERS: &[&str] = &[
    "유의사항",
    "마감일",
    "참고사항",
    "안내사항",
    "기타사항",
    "notice",
    "disclaimer",
];

/// Drop blacklisted sections; headerless sections always pass.
pub fn filter_sections(sections: Vec<Section>) -> Vec<Section> {
    sections
        .into_iter()
        .filter(|sec| match &sec.header {
            None => true,
            Some(header) => {
                let normalized: String = header
                    .to_lowercase()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                !DROP_SECTION_HEADERS.contains(&normalized.as_str())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jdp_core::SemanticZone;

    fn section(header: Option<&str>) -> Section {
        Section {
            header: header.map(String::from),
            lines: vec!["내용".into()],
            lists: Vec::new(),
            zone: SemanticZone::Others,
        }
    }

    #[test]
    fn blacklisted_headers_are_dropped() {
        let out = filter_sections(vec![
            section(Some("주요업무")),
            section(Some("마감일")),
            section(Some("유의 사항")),
            section(Some("Notice")),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].header.as_deref(), Some("주요업무"));
    }

    #[test]
    fn compound_headers_are_kept() {
        let out = filter_sections(vec![section(Some("전형절차및기타사항"))]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn intro_always_passes() {
        let out = filter_sections(vec![section(None)]);
        assert_eq!(out.len(), 1);
    }
}
