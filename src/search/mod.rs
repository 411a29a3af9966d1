//! Image search pipeline: sanitize, build URL, fetch, extract

pub mod url;

use std::sync::Arc;

use anyhow::Result;

use crate::extract::{ExtractPolicy, ImageExtractor};
use crate::fetch::Fetcher;
use crate::types::{AppliedFilters, ImageType, SearchMetadata, SearchOutput};
use crate::util::sanitize_query;

/// Runs one search end to end
#[derive(Clone)]
pub struct SearchService {
    fetcher: Fetcher,
    extractor: Arc<dyn ImageExtractor>,
}

impl SearchService {
    pub fn new(fetcher: Fetcher, extractor: Arc<dyn ImageExtractor>) -> Self {
        Self { fetcher, extractor }
    }

    /// Search for images and return up to `max_results` records with
    /// response metadata. Extraction runs lenient: a single bad record is
    /// skipped, never surfaced to the caller.
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        safe_search: bool,
        image_type: ImageType,
        max_results: usize,
    ) -> Result<SearchOutput> {
        let query = sanitize_query(query);
        let search_url = url::build_search_url(&query, page, max_results, safe_search, image_type);

        tracing::info!("Searching images: {:?} (page {})", query, page);

        let html = self.fetcher.fetch_search_page(&search_url).await?;
        let results = self
            .extractor
            .extract(&html, max_results, ExtractPolicy::Lenient)?;

        if results.is_empty() && !html.is_empty() {
            // Zero records from a non-empty page can mean either no matches
            // or that the page format changed under us.
            tracing::warn!(
                "No image records extracted from {} bytes of HTML; page format may have changed",
                html.len()
            );
        }

        let total_results = results.len();
        let has_more = total_results == max_results;

        Ok(SearchOutput {
            results,
            metadata: SearchMetadata {
                query,
                page,
                total_results,
                has_more,
                filters: AppliedFilters {
                    safe_search,
                    image_type,
                },
            },
        })
    }
}
