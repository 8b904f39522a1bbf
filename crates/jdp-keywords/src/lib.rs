// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! jdp-keywords
#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while loading the keyword policy files.
#[derive(Debug, thiserror::Error)]
pub enum KeywordError {
    /// A policy file could not be read.
    #[error("cannot read keyword file {path}: {source}")]
    Io {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A policy file is not valid YAML.
    #[error("cannot parse keyword file {path}: {source}")]
    Parse {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },

    /// A policy file parsed but has the wrong shape.
    #[error("keyword file {path} has invalid shape: {reason}")]
    Shape {
        /// Path that was requested.
        path: PathBuf,
        /// What was wrong.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Noise patterns
// ---------------------------------------------------------------------------

/// Whole-line UI/system noise patterns, in four buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoisePatterns {
    /// Lines equal to one of these (case-insensitive) are noise.
    pub exact: BTreeSet<String>,
    /// Lines starting with one of these are noise when short enough.
    pub prefix: Vec<String>,
    /// Lines ending with one of these are noise when short enough.
    pub suffix: Vec<String>,
    /// Standalone navigation labels.
    pub navigation: BTreeSet<String>,
}

/// Prefix/suffix patterns only remove a line when the line is at most this
/// many characters longer than the pattern.
const NOISE_LENGTH_SLACK: usize = 30;

impl NoisePatterns {
    /// Whether a whole line is UI/system noise.
    ///
    /// The line must be noise in its entirety; substrings are never
    /// removed from inside a line.
    pub fn is_noise_line(&self, line: &str) -> bool {
        let text = line.trim();
        if text.is_empty() {
            return false;
        }
        let lowered = text.to_lowercase();
        let len = lowered.chars().count();

        if self.exact.contains(&lowered) || self.navigation.contains(&lowered) {
            return true;
        }
        for prefix in &self.prefix {
            if lowered.starts_with(prefix.as_str())
                && len <= prefix.chars().count() + NOISE_LENGTH_SLACK
            {
                return true;
            }
        }
        for suffix in &self.suffix {
            if lowered.ends_with(suffix.as_str())
                && len <= suffix.chars().count() + NOISE_LENGTH_SLACK
            {
                return true;
            }
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable keyword and vocabulary registry.
///
/// Loaded once at startup from the seven policy files and shared by
/// reference afterwards; every collection is lower-cased on load so the
/// hot paths compare without re-normalising the policy side.
#[derive(Clone, Default)]
pub struct KeywordRegistry {
    section_keywords: BTreeMap<String, Vec<String>>,
    header_keywords: BTreeSet<String>,
    meta_keywords: BTreeSet<String>,
    noise: NoisePatterns,
    jd_vocab: BTreeSet<String>,
    skill_vocab: BTreeMap<String, BTreeSet<String>>,
    skill_alias: BTreeMap<String, String>,
}

impl fmt::Debug for KeywordRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordRegistry")
            .field("section_groups", &self.section_keywords.len())
            .field("header_keywords", &self.header_keywords.len())
            .field("meta_keywords", &self.meta_keywords.len())
            .field("jd_vocab", &self.jd_vocab.len())
            .field("skill_categories", &self.skill_vocab.len())
            .field("skill_aliases", &self.skill_alias.len())
            .finish()
    }
}

/// File names the registry expects inside a configuration directory.
const SECTION_FILE: &str = "section_keywords.yml";
const HEADER_FILE: &str = "header_keywords.yml";
const META_FILE: &str = "jd_meta_keywords.yml";
const NOISE_FILE: &str = "noise_keywords.yml";
const VOCAB_FILE: &str = "jd_vocab.yml";
const SKILL_FILE: &str = "skill_vocab.yml";
const ALIAS_FILE: &str = "skill_alias.yml";

impl KeywordRegistry {
    /// Registry built from the policy files embedded in this crate.
    pub fn builtin() -> Self {
        // The embedded copies are known-good; a parse failure here is a
        // build defect, not a runtime condition.
        Self::from_sources(
            include_str!("../config/section_keywords.yml"),
            include_str!("../config/header_keywords.yml"),
            include_str!("../config/jd_meta_keywords.yml"),
            include_str!("../config/noise_keywords.yml"),
            include_str!("../config/jd_vocab.yml"),
            include_str!("../config/skill_vocab.yml"),
            include_str!("../config/skill_alias.yml"),
        )
        .expect("embedded keyword files are valid")
    }

    /// Load all seven policy files from a directory.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, KeywordError> {
        let dir = dir.as_ref();
        let read = |name: &str| -> Result<String, KeywordError> {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| KeywordError::Io { path, source })
        };
        let sections = read(SECTION_FILE)?;
        let headers = read(HEADER_FILE)?;
        let meta = read(META_FILE)?;
        let noise = read(NOISE_FILE)?;
        let vocab = read(VOCAB_FILE)?;
        let skills = read(SKILL_FILE)?;
        let aliases = read(ALIAS_FILE)?;
        Self::from_sources(&sections, &headers, &meta, &noise, &vocab, &skills, &aliases)
    }

    /// Build a registry from raw YAML sources.
    pub fn from_sources(
        sections: &str,
        headers: &str,
        meta: &str,
        noise: &str,
        vocab: &str,
        skills: &str,
        aliases: &str,
    ) -> Result<Self, KeywordError> {
        Ok(Self {
            section_keywords: parse_grouped_lists(sections, SECTION_FILE)?,
            header_keywords: parse_header_keywords(headers)?,
            meta_keywords: parse_meta_keywords(meta)?,
            noise: parse_noise_patterns(noise)?,
            jd_vocab: parse_grouped_lists(vocab, VOCAB_FILE)?
                .into_values()
                .flatten()
                .collect(),
            skill_vocab: parse_grouped_lists(skills, SKILL_FILE)?
                .into_iter()
                .map(|(category, list)| (category, list.into_iter().collect()))
                .collect(),
            skill_alias: parse_alias_map(aliases)?,
        })
    }

    /// Section keywords for one group, empty when the group is absent.
    pub fn section_keywords(&self, group: &str) -> &[String] {
        self.section_keywords
            .get(group)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All header keywords, lower-cased.
    pub fn header_keywords(&self) -> &BTreeSet<String> {
        &self.header_keywords
    }

    /// Whether the lower-cased line is exactly a header keyword.
    pub fn is_header_keyword(&self, lowered: &str) -> bool {
        self.header_keywords.contains(lowered)
    }

    /// Whether the text contains any JD meta keyword.
    pub fn contains_meta_keyword(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.meta_keywords.iter().any(|k| lowered.contains(k.as_str()))
    }

    /// Whole-line noise patterns.
    pub fn noise(&self) -> &NoisePatterns {
        &self.noise
    }

    /// Protected technical vocabulary, canonical-form lower-case tokens.
    pub fn jd_vocab(&self) -> &BTreeSet<String> {
        &self.jd_vocab
    }

    /// Iterate `(category, canonical skill)` pairs.
    pub fn skill_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.skill_vocab
            .iter()
            .flat_map(|(cat, skills)| skills.iter().map(move |s| (cat.as_str(), s.as_str())))
    }

    /// Alias → canonical skill name map.
    pub fn skill_alias(&self) -> &BTreeMap<String, String> {
        &self.skill_alias
    }
}

// ---------------------------------------------------------------------------
// File parsers
// ---------------------------------------------------------------------------

fn shape_err(file: &str, reason: impl Into<String>) -> KeywordError {
    KeywordError::Shape {
        path: PathBuf::from(file),
        reason: reason.into(),
    }
}

fn parse_err(file: &str, source: serde_yaml::Error) -> KeywordError {
    KeywordError::Parse {
        path: PathBuf::from(file),
        source,
    }
}

/// `group -> [entries]` files (section keywords, vocab, skill vocab).
fn parse_grouped_lists(
    yaml: &str,
    file: &str,
) -> Result<BTreeMap<String, Vec<String>>, KeywordError> {
    let raw: BTreeMap<String, Vec<String>> =
        serde_yaml::from_str(yaml).map_err(|e| parse_err(file, e))?;
    if raw.is_empty() {
        return Err(shape_err(file, "expected at least one group"));
    }
    Ok(raw
        .into_iter()
        .map(|(group, entries)| {
            let entries = entries
                .into_iter()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect();
            (group, entries)
        })
        .collect())
}

#[derive(Deserialize)]
struct HeaderKeywordFile {
    header_keywords: Vec<String>,
}

fn parse_header_keywords(yaml: &str) -> Result<BTreeSet<String>, KeywordError> {
    let raw: HeaderKeywordFile =
        serde_yaml::from_str(yaml).map_err(|e| parse_err(HEADER_FILE, e))?;
    if raw.header_keywords.is_empty() {
        return Err(shape_err(HEADER_FILE, "header_keywords must not be empty"));
    }
    Ok(raw
        .header_keywords
        .into_iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect())
}

#[derive(Deserialize)]
struct MetaKeywordFile {
    #[serde(default)]
    meta_keywords: Vec<String>,
}

fn parse_meta_keywords(yaml: &str) -> Result<BTreeSet<String>, KeywordError> {
    let raw: MetaKeywordFile = serde_yaml::from_str(yaml).map_err(|e| parse_err(META_FILE, e))?;
    Ok(raw
        .meta_keywords
        .into_iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect())
}

#[derive(Deserialize)]
struct NoiseFile {
    #[serde(default)]
    exact: Vec<String>,
    #[serde(default)]
    prefix: Vec<String>,
    #[serde(default)]
    suffix: Vec<String>,
    #[serde(default)]
    navigation: Vec<String>,
}

fn parse_noise_patterns(yaml: &str) -> Result<NoisePatterns, KeywordError> {
    let raw: NoiseFile = serde_yaml::from_str(yaml).map_err(|e| parse_err(NOISE_FILE, e))?;
    let lower = |v: Vec<String>| -> Vec<String> {
        v.into_iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    };
    Ok(NoisePatterns {
        exact: lower(raw.exact).into_iter().collect(),
        prefix: lower(raw.prefix),
        suffix: lower(raw.suffix),
        navigation: lower(raw.navigation).into_iter().collect(),
    })
}

/// `canonical -> [aliases]`, flattened to `alias -> canonical`.
fn parse_alias_map(yaml: &str) -> Result<BTreeMap<String, String>, KeywordError> {
    if yaml.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let raw: BTreeMap<String, Vec<String>> =
        serde_yaml::from_str(yaml).map_err(|e| parse_err(ALIAS_FILE, e))?;
    let mut out = BTreeMap::new();
    for (canonical, aliases) in raw {
        let canonical = canonical.trim().to_lowercase();
        for alias in aliases {
            let alias = alias.trim().to_lowercase();
            if !alias.is_empty() {
                out.insert(alias, canonical.clone());
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_loads() {
        let reg = KeywordRegistry::builtin();
        assert!(reg.is_header_keyword("주요업무"));
        assert!(reg.is_header_keyword("requirements"));
        assert!(!reg.section_keywords("responsibilities").is_empty());
        assert!(reg.jd_vocab().contains("kafka"));
        assert_eq!(reg.skill_alias().get("k8s").map(String::as_str), Some("kubernetes"));
    }

    #[test]
    fn header_keywords_are_lowercased_on_load() {
        let reg = KeywordRegistry::builtin();
        // "Requirements" appears capitalised in postings but the set holds
        // the lower-cased form only.
        assert!(reg.is_header_keyword("requirements"));
        assert!(!reg.is_header_keyword("Requirements"));
    }

    #[test]
    fn meta_keyword_containment() {
        let reg = KeywordRegistry::builtin();
        assert!(reg.contains_meta_keyword("전형절차 안내"));
        assert!(!reg.contains_meta_keyword("백엔드 API 개발"));
    }

    #[test]
    fn noise_exact_and_navigation_match_whole_line() {
        let reg = KeywordRegistry::builtin();
        assert!(reg.noise().is_noise_line("지원하기"));
        assert!(reg.noise().is_noise_line("  로그인  "));
        assert!(!reg.noise().is_noise_line("지원하기 전에 꼭 읽어주세요 하단 안내"));
    }

    #[test]
    fn noise_prefix_respects_length_slack() {
        let reg = KeywordRegistry::builtin();
        assert!(reg.noise().is_noise_line("본 채용공고는 수시 마감될 수 있습니다"));
        let long = format!("본 채용공고는 {}", "긴 설명 ".repeat(10));
        assert!(!reg.noise().is_noise_line(&long));
    }

    #[test]
    fn skill_entries_cover_all_categories() {
        let reg = KeywordRegistry::builtin();
        let entries: Vec<_> = reg.skill_entries().collect();
        assert!(entries.contains(&("language", "java")));
        assert!(entries.contains(&("infra", "kafka")));
        assert!(entries.contains(&("framework", "node.js")));
    }

    #[test]
    fn load_dir_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = KeywordRegistry::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, KeywordError::Io { .. }));
    }

    #[test]
    fn load_dir_round_trips_builtin_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "section_keywords.yml",
            "header_keywords.yml",
            "jd_meta_keywords.yml",
            "noise_keywords.yml",
            "jd_vocab.yml",
            "skill_vocab.yml",
            "skill_alias.yml",
        ] {
            let src = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("config")
                .join(name);
            std::fs::copy(src, dir.path().join(name)).unwrap();
        }
        let reg = KeywordRegistry::load_dir(dir.path()).unwrap();
        assert!(reg.is_header_keyword("자격요건"));
    }

    #[test]
    fn empty_alias_file_is_fine() {
        let reg = KeywordRegistry::from_sources(
            "responsibilities: [주요업무]",
            "header_keywords: [주요업무]",
            "meta_keywords: []",
            "exact: []",
            "language: [java]",
            "language: [java]",
            "",
        )
        .unwrap();
        assert!(reg.skill_alias().is_empty());
    }

    #[test]
    fn empty_header_file_is_a_shape_error() {
        let err = KeywordRegistry::from_sources(
            "responsibilities: [주요업무]",
            "header_keywords: []",
            "meta_keywords: []",
            "exact: []",
            "language: [java]",
            "language: [java]",
            "",
        )
        .unwrap_err();
        assert!(matches!(err, KeywordError::Shape { .. }));
    }
}
