//! Translation client.
//!
//! Talks to the Google Translate web endpoint:
//! `GET {base_url}/translate_a/single?client=gtx&sl=en&tl=fr&dt=t&q=...`
//! which answers `[[["translated","original",...],...],null,"en",...]`.

use crate::chunk;
use crate::transport::HttpTransport;
use futures_util::future::try_join_all;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use steamwire_core::{
    config::{TranslationConfig, TRANSLATION_QUOTA_WINDOW},
    language::Language,
    ratelimit::{RateLimiter, TRANSLATION_QUOTA, TRANSLATION_SERVICE},
};
use thiserror::Error;
use tracing::{debug, warn};

/// Translation failures. Timeouts, quota errors, and malformed responses
/// all end up here.
#[derive(Debug, Clone, Error)]
pub enum TranslationError {
    #[error("translation upstream error: {0}")]
    Upstream(String),
}

/// A translated text and the language it was translated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    /// Declared source, else the one the upstream detected. `None` when
    /// neither is known or the detected code is unsupported.
    pub source: Option<Language>,
}

/// Paced, chunking translation client.
pub struct TranslationClient {
    transport: Arc<dyn HttpTransport>,
    limiter: Arc<RateLimiter>,
    config: TranslationConfig,
}

impl TranslationClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        limiter: Arc<RateLimiter>,
        config: TranslationConfig,
    ) -> Self {
        Self {
            transport,
            limiter,
            config,
        }
    }

    /// Per-call timeout from config.
    pub fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    /// Declared source language of upstream content, if any.
    pub fn source(&self) -> Option<Language> {
        self.config.source
    }

    /// Translate `text` into `target`.
    ///
    /// Returns the input unchanged, without a request, when `source` equals
    /// `target` or the text is blank. Long text is chunked, chunks are sent
    /// concurrently and reassembled in order. Any chunk failure fails the
    /// whole call. When the upstream reports the text is already in
    /// `target`, the input is returned as is.
    pub async fn translate(
        &self,
        text: &str,
        target: Language,
        source: Option<Language>,
        timeout: Duration,
    ) -> Result<Translation, TranslationError> {
        if source == Some(target) || text.trim().is_empty() {
            return Ok(Translation {
                text: text.to_string(),
                source,
            });
        }

        let chunks = chunk::split(text, self.config.max_chunk_chars);
        if chunks.len() > 1 {
            debug!(
                "translating {} chars in {} chunks to {}",
                text.chars().count(),
                chunks.len(),
                target.code()
            );
        }

        let translated = try_join_all(
            chunks
                .iter()
                .map(|c| self.translate_chunk(c.body, target, source, timeout)),
        )
        .await?;

        let source = source.or_else(|| translated.iter().find_map(|(_, detected)| *detected));
        if source == Some(target) {
            debug!("text is already in {}, keeping it", target.code());
            return Ok(Translation {
                text: text.to_string(),
                source,
            });
        }

        let pieces: Vec<String> = translated.into_iter().map(|(piece, _)| piece).collect();
        Ok(Translation {
            text: chunk::join(&chunks, &pieces),
            source,
        })
    }

    async fn translate_chunk(
        &self,
        text: &str,
        target: Language,
        source: Option<Language>,
        timeout: Duration,
    ) -> Result<(String, Option<Language>), TranslationError> {
        if text.trim().is_empty() {
            return Ok((text.to_string(), None));
        }

        self.limiter
            .pace_quota(
                TRANSLATION_QUOTA,
                self.config.max_per_minute,
                TRANSLATION_QUOTA_WINDOW,
            )
            .await;
        self.limiter
            .pace(TRANSLATION_SERVICE, self.config.pacing())
            .await;

        let url = format!(
            "{}/translate_a/single",
            self.config.base_url.trim_end_matches('/')
        );
        let params = [
            ("client", "gtx".to_string()),
            (
                "sl",
                source.map_or("auto", |l| l.upstream_code()).to_string(),
            ),
            ("tl", target.upstream_code().to_string()),
            ("dt", "t".to_string()),
            ("q", text.to_string()),
        ];

        let body = self
            .transport
            .get_json(&url, &params, timeout)
            .await
            .map_err(|e| {
                warn!("translation request failed: {e}");
                TranslationError::Upstream(e.to_string())
            })?;

        let translated = parse_translation(&body).ok_or_else(|| {
            warn!("translation response had an unexpected shape");
            TranslationError::Upstream("malformed translation response".into())
        })?;
        Ok((translated, detected_language(&body)))
    }
}

/// Concatenate the translated segments of a response.
fn parse_translation(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let mut out = String::new();
    for segment in segments {
        // Non-string heads (e.g. transliteration rows) are skipped.
        if let Some(piece) = segment.get(0).and_then(Value::as_str) {
            out.push_str(piece);
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Source language the upstream detected, from the third element.
fn detected_language(body: &Value) -> Option<Language> {
    body.get(2)
        .and_then(Value::as_str)
        .and_then(Language::from_upstream_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{translation_body, FakeReply, FakeTransport};
    use crate::transport::TransportError;
    use serde_json::json;
    use steamwire_core::ratelimit::Acquire;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn config(max_chunk_chars: usize) -> TranslationConfig {
        TranslationConfig {
            base_url: "https://translate.test/".into(),
            pacing_ms: 0,
            max_chunk_chars,
            ..Default::default()
        }
    }

    fn client(transport: Arc<FakeTransport>, config: TranslationConfig) -> TranslationClient {
        TranslationClient::new(transport, Arc::new(RateLimiter::new()), config)
    }

    #[test]
    fn test_parse_multi_segment_response() {
        let body = json!([
            [
                ["Mise à jour publiée. ", "Update Released. ", null, null, 10],
                ["Bonne lecture.", "Enjoy.", null, null, 10],
                [null, null, "Mize a jour"]
            ],
            null,
            "en"
        ]);
        assert_eq!(
            parse_translation(&body).as_deref(),
            Some("Mise à jour publiée. Bonne lecture.")
        );
    }

    #[test]
    fn test_parse_rejects_unexpected_shape() {
        assert!(parse_translation(&json!({"error": "quota"})).is_none());
        assert!(parse_translation(&json!([[]])).is_none());
        assert!(parse_translation(&json!("text")).is_none());
    }

    #[test]
    fn test_detected_language() {
        assert_eq!(
            detected_language(&translation_body("x", "x", "zh-CN")),
            Some(Language::Chinese)
        );
        assert_eq!(detected_language(&translation_body("x", "x", "nl")), None);
        assert_eq!(detected_language(&json!([[["x", "x"]]])), None);
    }

    #[tokio::test]
    async fn test_detected_target_language_keeps_input() {
        let transport = Arc::new(FakeTransport::new(|req| {
            let q = req.param("q").unwrap_or_default();
            FakeReply::ok(translation_body(&format!("{q}!"), q, "en"))
        }));
        let translator = client(transport.clone(), config(1500));

        let out = translator
            .translate("Update Released", Language::English, None, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(out.text, "Update Released");
        assert_eq!(out.source, Some(Language::English));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_detected_source_is_reported() {
        let transport = Arc::new(FakeTransport::new(|req| {
            let q = req.param("q").unwrap_or_default();
            FakeReply::ok(translation_body("Aktualisierung", q, "en"))
        }));
        let translator = client(transport, config(1500));

        let out = translator
            .translate("Update", Language::German, None, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(out.text, "Aktualisierung");
        assert_eq!(out.source, Some(Language::English));
    }

    #[tokio::test]
    async fn test_same_language_short_circuits() {
        let transport = Arc::new(FakeTransport::new(|_| FakeReply::ok(json!(null))));
        let translator = client(transport.clone(), config(1500));

        let out = translator
            .translate(
                "Update Released",
                Language::English,
                Some(Language::English),
                TIMEOUT,
            )
            .await
            .unwrap();
        assert_eq!(out.text, "Update Released");
        assert_eq!(out.source, Some(Language::English));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_text_makes_no_call() {
        let transport = Arc::new(FakeTransport::new(|_| FakeReply::ok(json!(null))));
        let translator = client(transport.clone(), config(1500));

        let out = translator
            .translate("  ", Language::French, None, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(out.text, "  ");
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_request_parameters() {
        let transport = Arc::new(FakeTransport::new(|req| {
            assert_eq!(req.url, "https://translate.test/translate_a/single");
            assert_eq!(req.param("client"), Some("gtx"));
            assert_eq!(req.param("dt"), Some("t"));
            FakeReply::ok(translation_body("更新", "Update", "en"))
        }));
        let translator = client(transport.clone(), config(1500));

        let out = translator
            .translate("Update", Language::Chinese, None, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(out.text, "更新");
        assert_eq!(out.source, Some(Language::English));
        let calls = transport.calls();
        let call = &calls[0];
        assert_eq!(call.param("sl"), Some("auto"));
        assert_eq!(call.param("tl"), Some("zh-CN"));
        assert_eq!(call.param("q"), Some("Update"));
    }

    #[tokio::test]
    async fn test_chunks_reassembled_in_order_despite_out_of_order_replies() {
        // Earlier chunks answer later, so completion order is reversed.
        let transport = Arc::new(FakeTransport::new(|req| {
            let q = req.param("q").unwrap_or_default().to_string();
            let n: u64 = q
                .trim_start_matches("Part ")
                .trim_end_matches('.')
                .parse()
                .unwrap();
            FakeReply::ok(translation_body(&format!("Partie {n}."), &q, "en"))
                .after(Duration::from_millis(60 - n * 10))
        }));
        let translator = client(transport.clone(), config(8));

        let text = "Part 1. Part 2. Part 3. Part 4. Part 5.";
        let out = translator
            .translate(text, Language::French, Some(Language::English), TIMEOUT)
            .await
            .unwrap();
        assert_eq!(out.text, "Partie 1. Partie 2. Partie 3. Partie 4. Partie 5.");
        assert_eq!(transport.call_count(), 5);
    }

    #[tokio::test]
    async fn test_paragraph_separators_preserved() {
        let transport = Arc::new(FakeTransport::new(|req| {
            let q = req.param("q").unwrap_or_default();
            FakeReply::ok(translation_body(&q.to_uppercase(), q, "en"))
        }));
        let translator = client(transport, config(12));

        let out = translator
            .translate("first para\n\nsecond para", Language::German, None, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(out.text, "FIRST PARA\n\nSECOND PARA");
    }

    #[tokio::test]
    async fn test_single_chunk_failure_fails_whole_call() {
        let transport = Arc::new(FakeTransport::new(|req| {
            let q = req.param("q").unwrap_or_default();
            if q.contains('2') {
                FakeReply::err(TransportError::Status {
                    status: 429,
                    body: "Too Many Requests".into(),
                })
            } else {
                FakeReply::ok(translation_body("ok", q, "en"))
            }
        }));
        let translator = client(transport, config(8));

        let err = translator
            .translate("Part 1. Part 2. Part 3.", Language::French, None, TIMEOUT)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_timeout_is_upstream_error() {
        let transport = Arc::new(FakeTransport::new(|_| FakeReply::err(TransportError::Timeout)));
        let translator = client(transport, config(1500));

        let err = translator
            .translate("Update Released", Language::French, None, TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_malformed_response_is_upstream_error() {
        let transport = Arc::new(FakeTransport::new(|_| FakeReply::ok(json!({"oops": true}))));
        let translator = client(transport, config(1500));

        assert!(translator
            .translate("Hello", Language::Spanish, None, TIMEOUT)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_chunk_requests_are_paced() {
        let transport = Arc::new(FakeTransport::new(|req| {
            let q = req.param("q").unwrap_or_default();
            FakeReply::ok(translation_body(q, q, "en"))
        }));
        let translator = client(
            transport,
            TranslationConfig {
                pacing_ms: 25,
                ..config(8)
            },
        );

        let start = std::time::Instant::now();
        translator
            .translate("Part 1. Part 2. Part 3.", Language::French, None, TIMEOUT)
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_chunk_requests_count_against_minute_quota() {
        let transport = Arc::new(FakeTransport::new(|req| {
            let q = req.param("q").unwrap_or_default();
            FakeReply::ok(translation_body(q, q, "en"))
        }));
        let limiter = Arc::new(RateLimiter::new());
        let translator = TranslationClient::new(
            transport.clone(),
            limiter.clone(),
            TranslationConfig {
                max_per_minute: 3,
                ..config(8)
            },
        );

        translator
            .translate("Part 1. Part 2.", Language::French, None, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(transport.call_count(), 2);

        // One slot left this minute, then the next request has to wait.
        assert_eq!(
            limiter.check_quota(TRANSLATION_QUOTA, 3, TRANSLATION_QUOTA_WINDOW),
            Acquire::Granted
        );
        assert!(matches!(
            limiter.check_quota(TRANSLATION_QUOTA, 3, TRANSLATION_QUOTA_WINDOW),
            Acquire::Wait(remaining)
                if remaining > Duration::from_secs(59)
        ));
    }
}
