// SPDX-License-Identifier: MIT OR Apache-2.0
//! Skill extraction against the skill vocabulary and alias map.
//!
//! Patterns are compiled once per process. Every canonical name and every
//! alias becomes one case-insensitive pattern; a hit is only accepted at a
//! word boundary, where "word" includes Hangul: `Java` matches inside
//! `Java/Kotlin` but not inside `javascript`, and `node.js` may sit next
//! to `.` or `/` without losing its boundary.

use jdp_core::SkillSet;
use jdp_keywords::KeywordRegistry;
use regex::Regex;
use std::collections::BTreeMap;

/// One compiled skill pattern.
#[derive(Debug, Clone)]
struct SkillPattern {
    regex: Regex,
    canonical: String,
    category: String,
}

/// A single skill hit: the category and canonical name recorded for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillHit {
    /// Vocabulary category the skill belongs to.
    pub category: String,
    /// Canonical skill name.
    pub canonical: String,
}

/// Compiled matcher over the whole skill vocabulary.
#[derive(Debug, Clone)]
pub struct SkillMatcher {
    patterns: Vec<SkillPattern>,
}

impl SkillMatcher {
    /// Compile patterns for every canonical skill and alias.
    pub fn new(registry: &KeywordRegistry) -> Self {
        let mut category_of: BTreeMap<&str, &str> = BTreeMap::new();
        for (category, canonical) in registry.skill_entries() {
            category_of.insert(canonical, category);
        }

        let mut patterns = Vec::new();
        let mut push = |target: &str, canonical: &str, category: &str| {
            let regex = Regex::new(&format!("(?i){}", regex::escape(target)))
                .expect("escaped literal is a valid regex");
            patterns.push(SkillPattern {
                regex,
                canonical: canonical.to_string(),
                category: category.to_string(),
            });
        };

        for (category, canonical) in registry.skill_entries() {
            push(canonical, canonical, category);
        }
        for (alias, canonical) in registry.skill_alias() {
            if let Some(category) = category_of.get(canonical.as_str()) {
                push(alias, canonical, category);
            }
        }

        Self { patterns }
    }

    /// All hits across the lines, in pattern order.
    pub fn scan(&self, lines: &[String]) -> Vec<SkillHit> {
        let mut hits = Vec::new();
        for line in lines {
            for pattern in &self.patterns {
                if pattern
                    .regex
                    .find_iter(line)
                    .any(|m| has_word_boundary(line, m.start(), m.end()))
                {
                    hits.push(SkillHit {
                        category: pattern.category.clone(),
                        canonical: pattern.canonical.clone(),
                    });
                }
            }
        }
        hits
    }

    /// Sorted, de-duplicated canonical names for the document.
    pub fn extract(&self, lines: &[String]) -> SkillSet {
        SkillSet::from_names(self.scan(lines).into_iter().map(|h| h.canonical))
    }
}

/// No word character may touch the match on either side. This is the
/// `(?<!\w)…(?!\w)` the dotted-name patterns need, applied uniformly.
fn has_word_boundary(line: &str, start: usize, end: usize) -> bool {
    let before = line[..start].chars().next_back();
    let after = line[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn matcher() -> SkillMatcher {
        SkillMatcher::new(&Arc::new(KeywordRegistry::builtin()))
    }

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn finds_skills_case_insensitively() {
        let set = matcher().extract(&lines(&["JAVA 백엔드", "kafka 운영"]));
        assert_eq!(set.skills, vec!["java", "kafka"]);
    }

    #[test]
    fn slash_separated_tokens_both_match() {
        let set = matcher().extract(&lines(&["Java/Kotlin 3년 이상"]));
        assert!(set.skills.contains(&"java".to_string()));
        assert!(set.skills.contains(&"kotlin".to_string()));
    }

    #[test]
    fn substrings_of_words_do_not_match() {
        // "java" must not fire inside "javascript"; "go" not inside "mongo".
        let set = matcher().extract(&lines(&["javascript 경험"]));
        assert!(!set.skills.contains(&"java".to_string()));
        assert!(set.skills.contains(&"javascript".to_string()));
        let set = matcher().extract(&lines(&["mongodb 운영"]));
        assert!(!set.skills.contains(&"go".to_string()));
    }

    #[test]
    fn dotted_names_match_next_to_punctuation() {
        let set = matcher().extract(&lines(&["Node.js/Express 환경"]));
        assert!(set.skills.contains(&"node.js".to_string()));
    }

    #[test]
    fn aliases_resolve_to_canonical_names() {
        let set = matcher().extract(&lines(&["k8s 운영 경험", "springboot 기반"]));
        assert!(set.skills.contains(&"kubernetes".to_string()));
        assert!(set.skills.contains(&"spring boot".to_string()));
    }

    #[test]
    fn hangul_adjacent_tokens_are_not_boundaries() {
        // Without the space the token is glued to Hangul, which counts as
        // a word character.
        let set = matcher().extract(&lines(&["자바java경험"]));
        assert!(!set.skills.contains(&"java".to_string()));
    }

    #[test]
    fn output_is_sorted_and_deduplicated() {
        let set = matcher().extract(&lines(&["Kafka, kafka, AWS", "aws 필수"]));
        assert_eq!(set.skills, vec!["aws", "kafka"]);
    }

    #[test]
    fn empty_document_yields_empty_set() {
        assert!(matcher().extract(&[]).is_empty());
    }
}
