//! Conversion from raw places API shapes to [`placegrid_core::BusinessRecord`].

use placegrid_core::{BusinessRecord, OpenStatus};

use crate::types::{PlaceDetails, PlaceSummary};

/// Name used when neither the detail nor the summary carries one.
const UNKNOWN_NAME: &str = "N/A";

/// Merges a nearby-search summary with its detail record.
///
/// The detail-sourced name wins over the summary name. Empty strings are
/// treated as absent. Returns `None` when the summary has no place id.
#[must_use]
pub fn normalize_place(summary: PlaceSummary, detail: PlaceDetails) -> Option<BusinessRecord> {
    let place_id = summary.place_id.filter(|id| !id.is_empty())?;

    let name = non_empty(detail.name)
        .or_else(|| non_empty(summary.name))
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());

    let mut types = detail.types.into_iter().filter(|t| !t.is_empty());
    let primary_type = types.next();
    let secondary_types: Vec<String> = types.collect();

    Some(BusinessRecord {
        name,
        address: non_empty(detail.formatted_address).or_else(|| non_empty(summary.vicinity)),
        phone: non_empty(detail.formatted_phone_number),
        website: non_empty(detail.website),
        rating: detail.rating,
        total_ratings: detail.user_ratings_total,
        is_open_now: OpenStatus::from(detail.opening_hours.and_then(|h| h.open_now)),
        place_id,
        primary_type,
        secondary_types,
        business_status: non_empty(detail.business_status),
        price_level: detail.price_level,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
