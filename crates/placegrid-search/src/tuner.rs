//! Adaptive sub-radius selection.
//!
//! Probes the search center with a shrinking radius until a probe comes back
//! below the saturation threshold. Only shrinks, and only probes the center.

use placegrid_core::{Coordinate, SearchFilters};
use serde_json::json;

use crate::event_log::SearchEventLog;
use crate::query::AreaQuery;

/// Upstream result cap for one query, across all pages.
pub const RESULT_CAP: usize = 60;

/// Fraction of [`RESULT_CAP`] at which a probe counts as saturated.
pub const DEFAULT_SATURATION_FRACTION: f64 = 0.8;

/// Result count at or above which a query is treated as saturated.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn saturation_threshold(cap: usize, fraction: f64) -> usize {
    (cap as f64 * fraction).ceil().max(1.0) as usize
}

/// Pick a sub-radius for `probe`, starting at `initial` and halving toward
/// `min` while probes return at least `threshold` results.
///
/// Returns the last probed sub-radius. When `initial <= min` exactly one
/// probe runs and `initial` is returned. A failed probe ends tuning at the
/// radius it was attempting, with a WARNING event.
#[allow(clippy::too_many_arguments)]
pub async fn tune_sub_radius(
    query: &dyn AreaQuery,
    probe: Coordinate,
    initial: f64,
    min: f64,
    filters: &SearchFilters,
    keyword_or_type: &str,
    threshold: usize,
    log: &SearchEventLog,
) -> f64 {
    let mut current = initial;
    loop {
        let count = match query
            .query_area(probe, current, filters, keyword_or_type, log)
            .await
        {
            Ok(records) => records.len(),
            Err(e) => {
                log.warning(
                    format!("Radius probe at {current:.0} m failed, keeping it: {e}"),
                    Some(json!({ "sub_radius": current })),
                );
                return current;
            }
        };

        log.debug(
            format!("Radius probe at {current:.0} m returned {count} results"),
            Some(json!({ "sub_radius": current, "count": count, "threshold": threshold })),
        );

        if count < threshold || current <= min {
            return current;
        }
        current = (current / 2.0).max(min);
    }
}
