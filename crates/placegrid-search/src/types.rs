//! Wire types for the places `nearbysearch` and `details` JSON endpoints.
//!
//! ## Observed shape
//!
//! ### `status`
//! Every response carries a string `status`. `"OK"` and `"ZERO_RESULTS"` are
//! both successes; `"ZERO_RESULTS"` comes with an empty (or absent) `results`
//! array. `"OVER_QUERY_LIMIT"` is a soft rate limit and arrives with HTTP 200,
//! so it has to be checked in the body rather than the status line.
//! `"NOT_FOUND"` on the details endpoint means the place id is stale.
//!
//! ### `next_page_token`
//! Present only when more results exist. The token is not valid immediately;
//! the next request must wait a couple of seconds or the API answers
//! `"INVALID_REQUEST"`. Observed to run out after three pages (60 results).
//!
//! ### `types`
//! Ordered most specific first, e.g. `["cafe", "food", "store",
//! "point_of_interest", "establishment"]`.

use serde::Deserialize;

pub(crate) const STATUS_OK: &str = "OK";
pub(crate) const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
pub(crate) const STATUS_OVER_QUERY_LIMIT: &str = "OVER_QUERY_LIMIT";
pub(crate) const STATUS_NOT_FOUND: &str = "NOT_FOUND";

/// Top-level response from `GET nearbysearch/json`.
#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    pub status: String,

    #[serde(default)]
    pub results: Vec<PlaceSummary>,

    /// Opaque cursor for the next page. Absent on the last page.
    #[serde(default)]
    pub next_page_token: Option<String>,

    #[serde(default)]
    pub error_message: Option<String>,
}

/// One entry of a nearby-search page. Only the id and name are used; the
/// rest of the record comes from the details endpoint.
#[derive(Debug, Deserialize)]
pub struct PlaceSummary {
    /// Stable place id. Summaries without one cannot be deduplicated and
    /// are skipped.
    #[serde(default)]
    pub place_id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    /// Short address. Only used when the detail has no formatted address.
    #[serde(default)]
    pub vicinity: Option<String>,
}

/// Top-level response from `GET details/json`.
#[derive(Debug, Deserialize)]
pub struct PlaceDetailsResponse {
    pub status: String,

    #[serde(default)]
    pub result: Option<PlaceDetails>,

    #[serde(default)]
    pub error_message: Option<String>,
}

/// The detail record for one place.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub formatted_address: Option<String>,

    #[serde(default)]
    pub formatted_phone_number: Option<String>,

    #[serde(default)]
    pub website: Option<String>,

    #[serde(default)]
    pub rating: Option<f64>,

    #[serde(default)]
    pub user_ratings_total: Option<u32>,

    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,

    #[serde(default)]
    pub types: Vec<String>,

    /// `"OPERATIONAL"`, `"CLOSED_TEMPORARILY"` or `"CLOSED_PERMANENTLY"`.
    #[serde(default)]
    pub business_status: Option<String>,

    /// 0 (free) to 4 (very expensive).
    #[serde(default)]
    pub price_level: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
}
