// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! jdp-section
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Section building and bullet-list grouping.
pub mod builder;
/// Canonical-map flattening.
pub mod canonical;
/// Blacklist section filtering.
pub mod filter;
/// Lexical header detection and header-key canonicalisation.
pub mod header;
/// Structural repair of the section stream.
pub mod postvalidate;
/// Semantic zone tagging.
pub mod zone;

pub use builder::{build_sections, group_lists};
pub use canonical::build_canonical_map;
pub use filter::filter_sections;
pub use header::{canonical_header_key, LexicalHeaderDetector};
pub use postvalidate::post_validate;
pub use zone::tag_sections;
