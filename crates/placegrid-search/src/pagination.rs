//! Token-based pagination for the nearby-search endpoint.
//!
//! Each page may carry a `next_page_token`. The token is passed back as the
//! `pagetoken` query parameter to fetch the following page. Upstream stops
//! issuing tokens after three pages, so following tokens until absent is
//! bounded in practice; [`MAX_PAGES`] guards against a token that cycles.

use crate::types::NearbySearchResponse;

/// Hard ceiling on pages followed for a single area query.
pub const MAX_PAGES: usize = 10;

/// Extracts the token for the next page, treating an empty or
/// whitespace-only token as the last page.
#[must_use]
pub fn next_page_token(response: &NearbySearchResponse) -> Option<String> {
    response
        .next_page_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(token: Option<&str>) -> NearbySearchResponse {
        NearbySearchResponse {
            status: "OK".to_string(),
            results: Vec::new(),
            next_page_token: token.map(str::to_string),
            error_message: None,
        }
    }

    #[test]
    fn returns_token_when_present() {
        assert_eq!(
            next_page_token(&response(Some("CqQCF"))),
            Some("CqQCF".to_string())
        );
    }

    #[test]
    fn absent_token_ends_pagination() {
        assert_eq!(next_page_token(&response(None)), None);
    }

    #[test]
    fn blank_token_ends_pagination() {
        assert_eq!(next_page_token(&response(Some("  "))), None);
    }
}
