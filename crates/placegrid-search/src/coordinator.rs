//! Top-level area search: plan a grid, query it concurrently, merge results.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use placegrid_core::{BusinessRecord, SearchRequest};
use serde_json::json;

use crate::error::PlacesError;
use crate::event_log::SearchEventLog;
use crate::grid::{plan_grid, GridPoint};
use crate::merge::ResultMerger;
use crate::query::AreaQuery;
use crate::tuner::{
    saturation_threshold, tune_sub_radius, DEFAULT_SATURATION_FRACTION, RESULT_CAP,
};

/// Largest radius the upstream API accepts for a single query.
pub const MAX_QUERY_RADIUS: f64 = 50_000.0;

/// Tuning and dispatch limits for [`GridSearchCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatorSettings {
    /// Floor for adaptive sub-radius tuning, in metres.
    pub min_sub_radius: f64,
    /// Upstream per-query result cap. A batch this large triggers a WARNING.
    pub result_cap: usize,
    /// Fraction of `result_cap` at which a tuning probe counts as saturated.
    pub saturation_fraction: f64,
    /// Upper bound on the sub-radius sent with each grid query.
    pub max_query_radius: f64,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            min_sub_radius: 500.0,
            result_cap: RESULT_CAP,
            saturation_fraction: DEFAULT_SATURATION_FRACTION,
            max_query_radius: MAX_QUERY_RADIUS,
        }
    }
}

/// Runs one area search end to end.
///
/// Per-area failures never abort the search: each surfaces as a single ERROR
/// event and the remaining areas still run.
pub struct GridSearchCoordinator {
    query: Arc<dyn AreaQuery>,
    settings: CoordinatorSettings,
}

impl GridSearchCoordinator {
    #[must_use]
    pub fn new(query: Arc<dyn AreaQuery>) -> Self {
        Self {
            query,
            settings: CoordinatorSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: CoordinatorSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Search `request.radius` metres around `request.center` and return
    /// businesses deduplicated by `place_id`, first seen first.
    ///
    /// `log` is reset on entry. The request is assumed to be validated.
    pub async fn search(
        &self,
        request: &SearchRequest,
        log: &SearchEventLog,
    ) -> Vec<BusinessRecord> {
        let started = Instant::now();
        log.reset();
        log.info(
            format!(
                "Starting search for '{}' around {} with radius {:.0} m",
                request.keyword_or_type, request.center, request.radius
            ),
            serde_json::to_value(request).ok(),
        );

        let mut merger = ResultMerger::new();
        // Every upstream query, tuning included, stays within the radius limit.
        let mut sub_radius = request.sub_radius.min(self.settings.max_query_radius);

        if request.radius <= sub_radius {
            log.debug("Radius fits in a single query; skipping grid", None);
            match self
                .query
                .query_area(
                    request.center,
                    request.radius,
                    &request.filters,
                    &request.keyword_or_type,
                    log,
                )
                .await
            {
                Ok(batch) => {
                    merger.merge(batch);
                }
                Err(e) => log_area_error(log, request.center.into(), &e),
            }
            return finish(merger, started, log);
        }

        if request.adaptive_sub_radius {
            let tuned = tune_sub_radius(
                self.query.as_ref(),
                request.center,
                sub_radius,
                self.settings.min_sub_radius,
                &request.filters,
                &request.keyword_or_type,
                saturation_threshold(self.settings.result_cap, self.settings.saturation_fraction),
                log,
            )
            .await;
            log.info(
                format!("Adapted sub-radius from {sub_radius:.0} m to {tuned:.0} m"),
                Some(json!({ "initial": sub_radius, "tuned": tuned })),
            );
            sub_radius = tuned;
        }

        let points = plan_grid(request.center, request.radius, sub_radius);
        let total = points.len();
        log.info(
            format!("Breaking search into {total} sub-areas with sub-radius {sub_radius:.0} m"),
            Some(json!({ "points": total, "sub_radius": sub_radius })),
        );
        log.debug(
            "Grid points",
            Some(json!({
                "points": points.iter().map(|p| [p.lat, p.lng]).collect::<Vec<_>>(),
            })),
        );

        let query = self.query.as_ref();
        let filters = &request.filters;
        let term = request.keyword_or_type.as_str();
        let mut results = stream::iter(points)
            .map(|point| async move {
                let result = query
                    .query_area(point.into(), sub_radius, filters, term, log)
                    .await;
                (point, result)
            })
            .buffer_unordered(request.max_workers.max(1));

        let mut completed = 0usize;
        while let Some((point, result)) = results.next().await {
            completed += 1;
            match result {
                Ok(batch) => {
                    let raw = batch.len();
                    let stats = merger.merge(batch);
                    log.info(
                        format!(
                            "Area {point}: {raw} results, {} new, {} duplicates ({:.0}% complete)",
                            stats.new,
                            stats.duplicates,
                            percent(completed, total)
                        ),
                        Some(json!({
                            "lat": point.lat,
                            "lng": point.lng,
                            "raw": raw,
                            "new": stats.new,
                            "duplicates": stats.duplicates,
                            "completed": completed,
                            "total": total,
                        })),
                    );
                    if raw >= self.settings.result_cap {
                        log.warning(
                            format!(
                                "Area {point} returned {raw} results, the per-query cap; \
                                 some businesses may be missing. Try a smaller sub-radius."
                            ),
                            Some(json!({ "lat": point.lat, "lng": point.lng, "raw": raw })),
                        );
                    }
                }
                Err(e) => log_area_error(log, point, &e),
            }
        }

        finish(merger, started, log)
    }
}

fn log_area_error(log: &SearchEventLog, point: GridPoint, err: &PlacesError) {
    log.error(
        format!("Error searching area {point}: {err}"),
        Some(json!({ "lat": point.lat, "lng": point.lng })),
    );
}

#[allow(clippy::cast_precision_loss)]
fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        done as f64 * 100.0 / total as f64
    }
}

fn finish(merger: ResultMerger, started: Instant, log: &SearchEventLog) -> Vec<BusinessRecord> {
    let elapsed = started.elapsed().as_secs_f64();
    log.info(
        format!(
            "Search complete. Total unique businesses found: {} in {elapsed:.2}s",
            merger.len()
        ),
        Some(json!({ "unique": merger.len(), "elapsed_secs": elapsed })),
    );
    merger.into_records()
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
