//! Search URL construction

use url::Url;

use crate::types::ImageType;

const SEARCH_ENDPOINT: &str = "https://www.google.com/search";

/// Build the image-search URL for a query.
///
/// `page` is 1-based; the `start` offset is `(page - 1) * max_results`.
/// The `tbs` filter parameter carries `safe:active` and/or an `itp:` type
/// token, comma-joined in that order, and is omitted entirely when neither
/// applies.
pub fn build_search_url(
    query: &str,
    page: u32,
    max_results: usize,
    safe_search: bool,
    image_type: ImageType,
) -> String {
    let start = (page.saturating_sub(1) as usize) * max_results;

    let mut url = Url::parse(SEARCH_ENDPOINT).expect("static endpoint URL");
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("q", query);
        pairs.append_pair("tbm", "isch");
        pairs.append_pair("start", &start.to_string());
        pairs.append_pair("sa", "N");

        let tokens = filter_tokens(safe_search, image_type);
        if !tokens.is_empty() {
            pairs.append_pair("tbs", &tokens.join(","));
        }
    }

    url.into()
}

fn filter_tokens(safe_search: bool, image_type: ImageType) -> Vec<&'static str> {
    let mut tokens = Vec::new();
    if safe_search {
        tokens.push("safe:active");
    }
    if let Some(token) = image_type.filter_token() {
        tokens.push(token);
    }
    tokens
}
