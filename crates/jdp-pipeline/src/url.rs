// SPDX-License-Identifier: MIT OR Apache-2.0
//! URL pipeline: fetch → extract main block → URL noise filter →
//! sections → canonical tail.

use crate::{canonical_tail, PipelineOutput, SourcePipeline};
use jdp_core::{ErrorCode, JobSource, ProcessingError, RawRequest, stage};
use jdp_keywords::KeywordRegistry;
use jdp_meta::DocumentMetaExtractor;
use jdp_section::{build_sections, LexicalHeaderDetector};
use jdp_url::{extract_main_block, fetch_page, filter_url_noise, BrowserFetcher, PageFetcher};
use std::sync::Arc;
use tracing::{debug, warn};

/// Pipeline for web-URL requests.
pub struct UrlPipeline {
    registry: Arc<KeywordRegistry>,
    fetcher: Box<dyn PageFetcher>,
    browser: Box<dyn BrowserFetcher>,
    detector: LexicalHeaderDetector,
    meta: DocumentMetaExtractor,
}

impl UrlPipeline {
    /// Build against a registry and the two fetch legs.
    pub fn new(
        registry: Arc<KeywordRegistry>,
        fetcher: Box<dyn PageFetcher>,
        browser: Box<dyn BrowserFetcher>,
    ) -> Self {
        Self {
            detector: LexicalHeaderDetector::new(Arc::clone(&registry)),
            meta: DocumentMetaExtractor::new(Arc::clone(&registry)),
            registry,
            fetcher,
            browser,
        }
    }
}

impl SourcePipeline for UrlPipeline {
    fn source(&self) -> JobSource {
        JobSource::Url
    }

    fn process(&self, request: &RawRequest) -> Result<PipelineOutput, ProcessingError> {
        let url = request.url.as_deref().ok_or_else(|| {
            ProcessingError::new(ErrorCode::UrlFetch, "request carries no url")
                .with_stage(stage::FETCH)
        })?;

        let html = fetch_page(url, &*self.fetcher, &*self.browser).map_err(|err| {
            ProcessingError::new(ErrorCode::UrlFetch, err.to_string())
                .with_stage(stage::FETCH)
                .with_source(err)
        })?;
        if html.trim().is_empty() {
            return Err(ProcessingError::new(
                ErrorCode::UrlHtmlParse,
                "fetched document is empty",
            )
            .with_stage(stage::HTML_PARSE));
        }

        let page = extract_main_block(&html);
        debug!(
            request_id = %request.request_id,
            title = %page.title,
            lines = page.lines.len(),
            "main block extracted"
        );
        if page.lines.is_empty() {
            // Nothing textual on the page: an empty success, not an
            // error; the page may legitimately be image-only.
            warn!(request_id = %request.request_id, url, "no body text extracted");
            return Ok(PipelineOutput::default());
        }

        let cleaned = filter_url_noise(page.lines, &self.registry);
        let document_meta = self.meta.process(&cleaned);

        let sections = build_sections(&cleaned, &self.detector);
        let canonical_map = canonical_tail(sections, &self.registry);

        Ok(PipelineOutput {
            canonical_map,
            document_meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jdp_core::{PeriodType, SemanticZone};
    use jdp_url::FetchError;

    struct CannedFetcher(Result<String, ()>);

    impl PageFetcher for CannedFetcher {
        fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            match &self.0 {
                Ok(html) => Ok(html.clone()),
                Err(()) => Err(FetchError::Http("connection refused".into())),
            }
        }
    }

    struct CannedBrowser(Option<String>);

    impl BrowserFetcher for CannedBrowser {
        fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            self.0.clone().ok_or(FetchError::BrowserUnavailable)
        }
    }

    fn request() -> RawRequest {
        RawRequest {
            request_id: "req-url".into(),
            brand_name: "브랜드".into(),
            position_name: "포지션".into(),
            source: JobSource::Url,
            text: None,
            images: Vec::new(),
            url: Some("https://example.com/jd/1".into()),
            event_id: None,
            occurred_at: None,
            version: None,
        }
    }

    fn pipeline(
        fetcher: CannedFetcher,
        browser: CannedBrowser,
    ) -> UrlPipeline {
        UrlPipeline::new(
            Arc::new(KeywordRegistry::builtin()),
            Box::new(fetcher),
            Box::new(browser),
        )
    }

    fn jd_html() -> String {
        format!(
            r#"<html><head><title>채용</title></head><body>
            <div id="content">
              <p>함께 성장할 백엔드 엔지니어를 찾습니다. 대규모 커머스 플랫폼을 함께 만들어 갈 분을 기다립니다.</p>
              <p>주요업무</p>
              <p>• 백엔드 API 개발과 데이터 파이프라인 운영을 담당합니다</p>
              <p>자격요건</p>
              <p>• Java/Kotlin 3년 이상의 개발 경험이 있으신 분</p>
              <p>모집기간</p>
              <p>2026.01.19 ~ 2026.02.06</p>
            </div>
            {}</body></html>"#,
            " ".repeat(600)
        )
    }

    #[test]
    fn static_page_pipelines_to_zones() {
        let out = pipeline(CannedFetcher(Ok(jd_html())), CannedBrowser(None))
            .process(&request())
            .unwrap();
        assert!(out.canonical_map.get(SemanticZone::Responsibilities).is_some());
        assert!(out.canonical_map.get(SemanticZone::Requirements).is_some());
        assert_eq!(
            out.document_meta.recruitment_period.period_type,
            PeriodType::Fixed
        );
    }

    #[test]
    fn spa_shell_uses_browser_result() {
        let shell = format!(r#"<html><body><div id="root"></div>{}</body></html>"#, "x".repeat(600));
        let out = pipeline(
            CannedFetcher(Ok(shell)),
            CannedBrowser(Some(jd_html())),
        )
        .process(&request())
        .unwrap();
        assert!(!out.canonical_map.is_empty());
    }

    #[test]
    fn spa_shell_with_no_browser_is_pipeline_url_001() {
        let shell = format!(r#"<html><body><div id="root"></div>{}</body></html>"#, "x".repeat(600));
        let err = pipeline(CannedFetcher(Ok(shell)), CannedBrowser(None))
            .process(&request())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UrlFetch);
        assert_eq!(err.category(), jdp_core::ErrorCategory::Recoverable);
        assert_eq!(err.stage, "fetch");
    }

    #[test]
    fn fetch_failure_on_both_legs_is_pipeline_url_001() {
        let err = pipeline(CannedFetcher(Err(())), CannedBrowser(None))
            .process(&request())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UrlFetch);
    }

    #[test]
    fn date_only_page_is_fixed_with_empty_map() {
        let html = format!(
            "<html><body><div>자격요건 없음 단독 공고 2026.01.19 ~ 2026.02.06 마감 예정입니다 {}</div></body></html>",
            "내용 ".repeat(40)
        );
        let out = pipeline(CannedFetcher(Ok(html)), CannedBrowser(None))
            .process(&request())
            .unwrap();
        assert_eq!(
            out.document_meta.recruitment_period.period_type,
            PeriodType::Fixed
        );
    }
}
