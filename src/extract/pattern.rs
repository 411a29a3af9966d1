//! Regex-based extraction of image records
//!
//! The results page embeds per-image JSON blobs containing the keys `ou`
//! (output url), `pt` (page title), and `ru` (referring url) in that
//! left-to-right order. One non-greedy pattern captures all three; any
//! change in key names or ordering silently yields fewer or zero matches.

use std::sync::LazyLock;

use regex::Regex;

use super::{ExtractError, ExtractPolicy, ImageExtractor};
use crate::types::ImageRecord;

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""ou":"(.*?)".*?"pt":"(.*?)".*?"ru":"(.*?)""#).unwrap());

/// Default extraction strategy for the current page format
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }
}

/// Undo the two escape substitutions the page applies to embedded URLs:
/// the literal u003d sequence becomes `=`, the literal u0026 sequence
/// becomes `&`. No other decoding (HTML entities, percent-encoding) is
/// performed.
fn decode_field(raw: &str) -> String {
    raw.replace("\\u003d", "=").replace("\\u0026", "&")
}

impl ImageExtractor for PatternExtractor {
    fn extract(
        &self,
        html: &str,
        max_results: usize,
        policy: ExtractPolicy,
    ) -> Result<Vec<ImageRecord>, ExtractError> {
        let mut records = Vec::new();

        for (index, captures) in IMAGE_RE.captures_iter(html).enumerate() {
            if records.len() >= max_results {
                break;
            }

            let image_url = decode_field(&captures[1]);
            let title = decode_field(&captures[2]);
            let source = decode_field(&captures[3]);

            // The only fallible step: the decoded url has to be absolute
            if let Err(e) = url::Url::parse(&image_url) {
                match policy {
                    ExtractPolicy::Lenient => {
                        tracing::warn!("Skipping image record {}: bad url: {}", index, e);
                        continue;
                    }
                    ExtractPolicy::Strict => {
                        return Err(ExtractError::InvalidRecord {
                            index,
                            reason: format!("bad url: {e}"),
                        });
                    }
                }
            }

            records.push(ImageRecord {
                thumbnail: image_url.clone(),
                url: image_url,
                title,
                source,
            });
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(ou: &str, pt: &str, ru: &str) -> String {
        format!(r#"{{"id":"x","ou":"{ou}","foo":1,"pt":"{pt}","bar":2,"ru":"{ru}"}}"#)
    }

    #[test]
    fn test_extracts_records_in_document_order() {
        let html = format!(
            "{}{}{}",
            blob("https://a.example/1.jpg", "first", "https://a.example/page1"),
            blob("https://b.example/2.jpg", "second", "https://b.example/page2"),
            blob("https://c.example/3.jpg", "third", "https://c.example/page3"),
        );

        let records = PatternExtractor::new()
            .extract(&html, 20, ExtractPolicy::Lenient)
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].title, "first");
        assert_eq!(records[1].title, "second");
        assert_eq!(records[2].title, "third");
        assert_eq!(records[0].url, "https://a.example/1.jpg");
        assert_eq!(records[0].thumbnail, records[0].url);
        assert_eq!(records[2].source, "https://c.example/page3");
    }

    #[test]
    fn test_max_results_caps_the_scan() {
        let html = format!(
            "{}{}{}",
            blob("https://a.example/1.jpg", "first", "https://a.example/p"),
            blob("https://b.example/2.jpg", "second", "https://b.example/p"),
            blob("https://c.example/3.jpg", "third", "https://c.example/p"),
        );

        let records = PatternExtractor::new()
            .extract(&html, 2, ExtractPolicy::Lenient)
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "first");
        assert_eq!(records[1].title, "second");
    }

    #[test]
    fn test_decodes_escape_sequences_in_all_fields() {
        let html = blob(
            "https://a.example/img?id\\u003d1\\u0026size\\u003dbig",
            "cats \\u0026 dogs",
            "https://a.example/page?ref\\u003dsearch",
        );

        let records = PatternExtractor::new()
            .extract(&html, 20, ExtractPolicy::Lenient)
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://a.example/img?id=1&size=big");
        assert_eq!(records[0].title, "cats & dogs");
        assert_eq!(records[0].source, "https://a.example/page?ref=search");
        assert_eq!(records[0].thumbnail, records[0].url);
    }

    #[test]
    fn test_zero_matches_is_empty_not_error() {
        let records = PatternExtractor::new()
            .extract("<html><body>nothing here</body></html>", 20, ExtractPolicy::Lenient)
            .unwrap();
        assert!(records.is_empty());

        let records = PatternExtractor::new()
            .extract("", 20, ExtractPolicy::Strict)
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_lenient_skips_invalid_record() {
        let html = format!(
            "{}{}",
            blob("not-a-url", "broken", "https://a.example/p"),
            blob("https://b.example/ok.jpg", "good", "https://b.example/p"),
        );

        let records = PatternExtractor::new()
            .extract(&html, 20, ExtractPolicy::Lenient)
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "good");
    }

    #[test]
    fn test_strict_aborts_on_invalid_record() {
        let html = format!(
            "{}{}",
            blob("not-a-url", "broken", "https://a.example/p"),
            blob("https://b.example/ok.jpg", "good", "https://b.example/p"),
        );

        let err = PatternExtractor::new()
            .extract(&html, 20, ExtractPolicy::Strict)
            .unwrap_err();

        assert!(matches!(err, ExtractError::InvalidRecord { index: 0, .. }));
    }
}
