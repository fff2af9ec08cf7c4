//! Stable cache keys for search requests.
//!
//! Callers that cache search results key them by a hash of the normalized
//! request. Coordinates are rounded to three decimal places (~110 m) and radii
//! to whole metres, so requests that differ only by sub-rounding jitter share
//! a key. `max_workers` does not affect the result set and is excluded.

use sha2::{Digest, Sha256};

use crate::places::SearchRequest;

/// Decimal places kept for latitude/longitude in the key.
const COORDINATE_PRECISION: usize = 3;

/// Compute the cache key for `request`.
///
/// SHA-256 over the NUL-separated normalized fields, hex-encoded.
#[must_use]
pub fn cache_key(request: &SearchRequest) -> String {
    let filters = &request.filters;
    let input = format!(
        "{}\x00{:.prec$}\x00{:.prec$}\x00{:.0}\x00{:.0}\x00{}\x00{}\x00{}\x00{}\x00{}",
        request.keyword_or_type.trim().to_lowercase(),
        normalize_zero(request.center.latitude),
        normalize_zero(request.center.longitude),
        request.radius,
        request.sub_radius,
        request.adaptive_sub_radius,
        filters.min_price.map_or(String::new(), |p| p.to_string()),
        filters.max_price.map_or(String::new(), |p| p.to_string()),
        filters.open_now,
        filters
            .place_type
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_lowercase(),
        prec = COORDINATE_PRECISION,
    );
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

/// Rounds to the key precision and folds `-0.000` onto `0.000`.
fn normalize_zero(value: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_PRECISION as i32);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::places::{Coordinate, SearchFilters};

    fn request(lat: f64, lng: f64) -> SearchRequest {
        SearchRequest {
            keyword_or_type: "Coffee Shop".to_string(),
            center: Coordinate::new(lat, lng),
            radius: 5_000.0,
            sub_radius: 2_000.0,
            max_workers: 4,
            adaptive_sub_radius: false,
            filters: SearchFilters::default(),
        }
    }

    #[test]
    fn key_is_hex_sha256() {
        let key = cache_key(&request(51.5074, -0.1278));
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn coordinate_jitter_below_precision_shares_key() {
        let a = cache_key(&request(51.507_41, -0.127_81));
        let b = cache_key(&request(51.507_38, -0.127_84));
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_locations_get_distinct_keys() {
        let a = cache_key(&request(51.5074, -0.1278));
        let b = cache_key(&request(48.8566, 2.3522));
        assert_ne!(a, b);
    }

    #[test]
    fn term_case_and_whitespace_are_ignored() {
        let a = cache_key(&request(51.5074, -0.1278));
        let mut other = request(51.5074, -0.1278);
        other.keyword_or_type = "  coffee shop ".to_string();
        assert_eq!(a, cache_key(&other));
    }

    #[test]
    fn worker_count_does_not_change_key() {
        let a = cache_key(&request(51.5074, -0.1278));
        let mut other = request(51.5074, -0.1278);
        other.max_workers = 16;
        assert_eq!(a, cache_key(&other));
    }

    #[test]
    fn filters_change_key() {
        let a = cache_key(&request(51.5074, -0.1278));
        let mut other = request(51.5074, -0.1278);
        other.filters.open_now = true;
        assert_ne!(a, cache_key(&other));
    }

    #[test]
    fn negative_zero_matches_zero() {
        assert_eq!(
            cache_key(&request(0.0001, -0.0001)),
            cache_key(&request(0.0, 0.0))
        );
    }
}
