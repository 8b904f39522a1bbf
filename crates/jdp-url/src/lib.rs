// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! jdp-url
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Scored main-block extraction from HTML.
pub mod extract;
/// Fetch orchestration across the static and browser legs.
pub mod fetch;
/// Web-specific line noise filtering.
pub mod noise;

pub use extract::{extract_main_block, ParsedPage};
pub use fetch::{
    fetch_page, needs_browser_render, BrowserFetcher, FetchError, HttpFetcher, PageFetcher,
    UnavailableBrowser, EXPAND_BUTTON_TEXTS,
};
pub use noise::filter_url_noise;

/// Keywords whose presence marks an HTML body as an actually-rendered JD.
/// Shared by the render heuristic and the block scorer.
pub const JD_INDICATOR_KEYWORDS: &[&str] = &[
    // KR
    "자격요건",
    "우대사항",
    "담당업무",
    "주요업무",
    "지원자격",
    "복리후생",
    "채용절차",
    "전형절차",
    "기술스택",
    // EN
    "Requirements",
    "Responsibilities",
    "Qualifications",
    "Preferred",
    "Description",
    "Benefits",
    "About the role",
];
