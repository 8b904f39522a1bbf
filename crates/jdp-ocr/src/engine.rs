// SPDX-License-Identifier: MIT OR Apache-2.0
//! OCR engine seam.
//!
//! The recognition engine is an external collaborator: the pipeline only
//! needs fragments with positions and a page confidence. [`FixtureOcrEngine`]
//! serves pre-recorded results for tests and one-shot inspection runs.

use crate::line::OcrFragment;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Recognition result for one image.
#[derive(Debug, Clone)]
pub struct OcrPage {
    /// Raw fragments in engine order.
    pub fragments: Vec<OcrFragment>,
    /// Engine-reported page confidence, 0–100.
    pub confidence: f64,
}

/// Errors an engine adapter may raise.
#[derive(Debug, thiserror::Error)]
pub enum OcrEngineError {
    /// The image file could not be read or decoded.
    #[error("cannot decode image {path}: {reason}")]
    ImageDecode {
        /// Image path as received.
        path: PathBuf,
        /// Decoder detail.
        reason: String,
    },

    /// No engine is wired into this process.
    #[error("no OCR engine is configured")]
    Unavailable,

    /// The engine ran but failed.
    #[error("ocr engine failed: {0}")]
    Engine(String),
}

/// Capability seam to the recognition engine.
pub trait OcrEngine: Send + Sync {
    /// Recognise one image into fragments plus a page confidence.
    fn recognize(&self, image_path: &Path) -> Result<OcrPage, OcrEngineError>;
}

// ---------------------------------------------------------------------------
// DisabledOcrEngine
// ---------------------------------------------------------------------------

/// Placeholder wired when the process has no recognition engine; every
/// call reports [`OcrEngineError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledOcrEngine;

impl OcrEngine for DisabledOcrEngine {
    fn recognize(&self, _image_path: &Path) -> Result<OcrPage, OcrEngineError> {
        Err(OcrEngineError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// FixtureOcrEngine
// ---------------------------------------------------------------------------

/// Engine adapter backed by pre-recorded JSON pages.
///
/// For image path `page1.png` the fixture is `page1.png.json`, either next
/// to the image or under a fixture root:
///
/// ```json
/// {
///   "confidence": 91.5,
///   "fragments": [
///     {"text": "주요업무", "confidence": 95.0,
///      "box": [[10,10],[120,10],[120,44],[10,44]], "height": 34.0}
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixtureOcrEngine {
    root: Option<PathBuf>,
}

#[derive(Deserialize)]
struct FixtureFile {
    confidence: f64,
    fragments: Vec<OcrFragment>,
}

impl FixtureOcrEngine {
    /// Fixtures live next to the image paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixtures live under `root`, keyed by the image file name.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn fixture_path(&self, image_path: &Path) -> PathBuf {
        match &self.root {
            Some(root) => {
                let name = image_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                root.join(format!("{name}.json"))
            }
            None => {
                let mut s = image_path.as_os_str().to_owned();
                s.push(".json");
                PathBuf::from(s)
            }
        }
    }
}

impl OcrEngine for FixtureOcrEngine {
    fn recognize(&self, image_path: &Path) -> Result<OcrPage, OcrEngineError> {
        let path = self.fixture_path(image_path);
        let raw = std::fs::read_to_string(&path).map_err(|e| OcrEngineError::ImageDecode {
            path: image_path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let fixture: FixtureFile =
            serde_json::from_str(&raw).map_err(|e| OcrEngineError::Engine(e.to_string()))?;
        Ok(OcrPage {
            fragments: fixture.fragments,
            confidence: fixture.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_engine_reads_recorded_pages() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("page1.png.json");
        std::fs::write(
            &fixture,
            r#"{"confidence": 91.5, "fragments": [
                {"text": "주요업무", "confidence": 95.0,
                 "box": [[10.0,10.0],[120.0,10.0],[120.0,44.0],[10.0,44.0]],
                 "height": 34.0}
            ]}"#,
        )
        .unwrap();

        let engine = FixtureOcrEngine::new();
        let page = engine.recognize(&dir.path().join("page1.png")).unwrap();
        assert_eq!(page.fragments.len(), 1);
        assert_eq!(page.fragments[0].text, "주요업무");
        assert!((page.confidence - 91.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_fixture_is_a_decode_error() {
        let engine = FixtureOcrEngine::new();
        let err = engine.recognize(Path::new("/nonexistent/image.png")).unwrap_err();
        assert!(matches!(err, OcrEngineError::ImageDecode { .. }));
    }

    #[test]
    fn disabled_engine_reports_unavailable() {
        let err = DisabledOcrEngine.recognize(Path::new("x.png")).unwrap_err();
        assert!(matches!(err, OcrEngineError::Unavailable));
    }
}
