//! The single-area query seam used by the tuner and the coordinator.

use async_trait::async_trait;
use placegrid_core::{BusinessRecord, Coordinate, SearchFilters};

use crate::error::PlacesError;
use crate::event_log::SearchEventLog;

/// Executes one bounded-radius query and returns every business found in it.
///
/// Implementations should treat mid-query transport failures as partial
/// success: return what was collected and record the failure in `log`. An
/// `Err` means the area produced nothing usable at all.
#[async_trait]
pub trait AreaQuery: Send + Sync {
    async fn query_area(
        &self,
        center: Coordinate,
        radius: f64,
        filters: &SearchFilters,
        keyword_or_type: &str,
        log: &SearchEventLog,
    ) -> Result<Vec<BusinessRecord>, PlacesError>;
}

/// How the search term is sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm<'a> {
    /// Sent as the `keyword` parameter.
    Keyword(&'a str),
    /// Sent as the `type` parameter.
    PlaceType(&'a str),
}

impl<'a> SearchTerm<'a> {
    /// Decide between `type` and `keyword`.
    ///
    /// An explicit `place_type` filter always wins. Otherwise a term that
    /// contains an underscore and no space (`"coffee_shop"`) is taken to be a
    /// type token. This is a heuristic on string shape: `"mom_and_pop"` would
    /// be sent as a type. Pass `place_type` to be explicit.
    #[must_use]
    pub fn classify(keyword_or_type: &'a str, filters: &'a SearchFilters) -> Self {
        if let Some(place_type) = filters.place_type.as_deref() {
            return SearchTerm::PlaceType(place_type.trim());
        }
        let term = keyword_or_type.trim();
        if term.contains('_') && !term.contains(' ') {
            SearchTerm::PlaceType(term)
        } else {
            SearchTerm::Keyword(term)
        }
    }

    #[must_use]
    pub fn param(&self) -> (&'static str, &'a str) {
        match self {
            SearchTerm::Keyword(k) => ("keyword", k),
            SearchTerm::PlaceType(t) => ("type", t),
        }
    }
}
