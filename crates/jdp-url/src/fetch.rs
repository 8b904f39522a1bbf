// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fetch orchestration.
//!
//! Static GET first. When the response looks unrendered (too short, an
//! SPA shell, or carrying none of the JD indicator keywords) the request
//! moves to the headless browser leg. The browser is an external
//! collaborator; this module only decides which leg runs.

use crate::JD_INDICATOR_KEYWORDS;
use std::time::Duration;
use tracing::{debug, info};

/// Static GET timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
/// Bodies shorter than this cannot be a rendered JD page.
const MIN_RENDERED_HTML_LEN: usize = 500;

/// Desktop browser user agent for job boards that gate on it.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Markers of an unrendered single-page-app shell.
const SPA_INDICATORS: &[&str] = &[
    r#"<div id="app"></div>"#,
    r#"<div id="root"></div>"#,
    r#"<div id="__next"></div>"#,
    "<body></body>",
    "You need to enable JavaScript to run this app",
];

/// Visible texts of expand/see-more buttons a browser adapter should
/// click after scrolling to the bottom. A page matching none of these is
/// a bounded-latency no-op for the adapter, never an error.
pub const EXPAND_BUTTON_TEXTS: &[&str] = &[
    // KR
    "상세 정보 더 보기",
    "상세정보 더보기",
    "더보기",
    "더 보기",
    "자세히 보기",
    "펼치기",
    "전체보기",
    "내용 더보기",
    // EN
    "Show more",
    "View more",
    "Read more",
    "See more",
    "Expand",
    "Load more",
    "See full description",
];

// ---------------------------------------------------------------------------
// Errors and traits
// ---------------------------------------------------------------------------

/// Failures on either fetch leg.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure on the static leg.
    #[error("static fetch failed: {0}")]
    Http(String),

    /// Non-success HTTP status.
    #[error("http status {0}")]
    Status(u16),

    /// No headless browser is wired into this process.
    #[error("headless browser unavailable")]
    BrowserUnavailable,

    /// The browser leg ran and failed.
    #[error("browser fetch failed: {0}")]
    Browser(String),
}

/// Static page fetcher.
pub trait PageFetcher: Send + Sync {
    /// GET the URL and return the body.
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Headless-browser fetcher.
///
/// Contract for adapters: load the page (60 s ceiling, with a
/// best-effort 10 s network-idle wait), scroll to the bottom for lazy
/// content, click any visible element whose text matches one of
/// [`EXPAND_BUTTON_TEXTS`], and return the rendered DOM. A page with no
/// matching element must complete normally within the load timeout;
/// "nothing to expand" is never an error.
pub trait BrowserFetcher: Send + Sync {
    /// Render the URL and return the final DOM.
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

/// Blocking HTTP client for the static leg.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Build with the standard timeout and user agent.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        response.text().map_err(|e| FetchError::Http(e.to_string()))
    }
}

/// Placeholder wired when the process has no browser sidecar.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBrowser;

impl BrowserFetcher for UnavailableBrowser {
    fn fetch(&self, _url: &str) -> Result<String, FetchError> {
        Err(FetchError::BrowserUnavailable)
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Whether a static response needs the browser leg.
pub fn needs_browser_render(html: &str) -> bool {
    if html.is_empty() || html.len() < MIN_RENDERED_HTML_LEN {
        return true;
    }
    if SPA_INDICATORS.iter().any(|marker| html.contains(marker)) {
        return true;
    }
    // A rendered JD page carries at least one of the indicator keywords;
    // a page with none of them has most likely not loaded its body.
    !JD_INDICATOR_KEYWORDS.iter().any(|kw| html.contains(kw))
}

/// Fetch one page, falling back to the browser leg when the static body
/// is unusable or the static leg fails outright.
pub fn fetch_page(
    url: &str,
    fetcher: &dyn PageFetcher,
    browser: &dyn BrowserFetcher,
) -> Result<String, FetchError> {
    match fetcher.fetch(url) {
        Ok(html) if !needs_browser_render(&html) => Ok(html),
        Ok(_) => {
            info!(url, "static body unrendered, switching to browser");
            browser.fetch(url)
        }
        Err(err) => {
            debug!(url, error = %err, "static fetch failed, trying browser");
            browser.fetch(url)
        }
    }
}
