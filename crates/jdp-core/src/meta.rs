// SPDX-License-Identifier: MIT OR Apache-2.0
//! Document-level metadata collected alongside the section structure.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// RecruitmentPeriod
// ---------------------------------------------------------------------------

/// How the posting bounds its application window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PeriodType {
    /// Explicit open/close date range.
    Fixed,
    /// Always-open posting (상시채용).
    Always,
    /// Rolling review, closes when filled (수시채용 / 채용시 마감).
    Open,
    /// Nothing detected.
    Unknown,
}

impl PeriodType {
    /// Stable wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "FIXED",
            Self::Always => "ALWAYS",
            Self::Open => "OPEN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recruitment-period metadata for one document.
///
/// `open_date` / `close_date` are the raw matched date strings (e.g.
/// `2026.01.19`); ISO-8601 normalisation happens at serialisation time.
/// Both are present iff `period_type` is [`PeriodType::Fixed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecruitmentPeriod {
    /// Detected period type.
    pub period_type: PeriodType,
    /// Raw open date; `Some` iff `period_type == Fixed`.
    pub open_date: Option<String>,
    /// Raw close date; `Some` iff `period_type == Fixed`.
    pub close_date: Option<String>,
    /// Source lines the detection came from, document order, de-duplicated.
    pub raw_texts: Vec<String>,
}

impl RecruitmentPeriod {
    /// Fixed date range.
    pub fn fixed(
        open_date: impl Into<String>,
        close_date: impl Into<String>,
        raw_texts: Vec<String>,
    ) -> Self {
        Self {
            period_type: PeriodType::Fixed,
            open_date: Some(open_date.into()),
            close_date: Some(close_date.into()),
            raw_texts,
        }
    }

    /// Always-open posting.
    pub fn always(raw_texts: Vec<String>) -> Self {
        Self {
            period_type: PeriodType::Always,
            open_date: None,
            close_date: None,
            raw_texts,
        }
    }

    /// Rolling-review posting.
    pub fn open(raw_texts: Vec<String>) -> Self {
        Self {
            period_type: PeriodType::Open,
            open_date: None,
            close_date: None,
            raw_texts,
        }
    }

    /// No period information found.
    pub fn unknown() -> Self {
        Self {
            period_type: PeriodType::Unknown,
            open_date: None,
            close_date: None,
            raw_texts: Vec::new(),
        }
    }
}

impl Default for RecruitmentPeriod {
    fn default() -> Self {
        Self::unknown()
    }
}

// ---------------------------------------------------------------------------
// SkillSet
// ---------------------------------------------------------------------------

/// De-duplicated, ascending-sorted canonical skill names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SkillSet {
    /// Canonical names, sorted ascending, no duplicates.
    pub skills: Vec<String>,
}

impl SkillSet {
    /// Build from any iterator of names; sorting and de-duplication are
    /// applied here so the invariant holds by construction.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        Self {
            skills: set.into_iter().collect(),
        }
    }

    /// Whether no skill was detected.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DocumentMeta
// ---------------------------------------------------------------------------

/// Per-document metadata bundle travelling next to the canonical map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentMeta {
    /// Recruitment period detection result.
    pub recruitment_period: RecruitmentPeriod,
    /// Detected skills.
    pub skill_set: SkillSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_period_carries_both_dates() {
        let p = RecruitmentPeriod::fixed("2026.01.19", "2026.02.06", vec!["raw".into()]);
        assert_eq!(p.period_type, PeriodType::Fixed);
        assert!(p.open_date.is_some() && p.close_date.is_some());
    }

    #[test]
    fn non_fixed_periods_carry_no_dates() {
        for p in [
            RecruitmentPeriod::always(vec!["상시채용".into()]),
            RecruitmentPeriod::open(vec!["수시채용".into()]),
            RecruitmentPeriod::unknown(),
        ] {
            assert!(p.open_date.is_none() && p.close_date.is_none());
        }
    }

    #[test]
    fn period_type_wire_strings() {
        assert_eq!(serde_json::to_string(&PeriodType::Fixed).unwrap(), r#""FIXED""#);
        assert_eq!(serde_json::to_string(&PeriodType::Always).unwrap(), r#""ALWAYS""#);
    }

    #[test]
    fn skill_set_sorts_and_dedupes() {
        let set = SkillSet::from_names(["kotlin", "aws", "java", "aws"]);
        assert_eq!(set.skills, vec!["aws", "java", "kotlin"]);
    }
}
