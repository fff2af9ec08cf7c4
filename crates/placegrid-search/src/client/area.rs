use async_trait::async_trait;
use placegrid_core::{BusinessRecord, Coordinate, SearchFilters};
use serde_json::json;

use super::PlacesClient;
use crate::error::PlacesError;
use crate::event_log::SearchEventLog;
use crate::normalize::normalize_place;
use crate::pagination::{next_page_token, MAX_PAGES};
use crate::query::{AreaQuery, SearchTerm};
use crate::rate_limit::pause;

impl PlacesClient {
    /// Runs one area query: follows page tokens, then enriches each summary
    /// with its detail record.
    ///
    /// A failed search page ends the query and the records collected so far
    /// are returned, with one ERROR event in `log`. A failed or empty detail
    /// lookup drops that single result.
    pub async fn collect_area(
        &self,
        center: Coordinate,
        radius: f64,
        filters: &SearchFilters,
        keyword_or_type: &str,
        log: &SearchEventLog,
    ) -> Vec<BusinessRecord> {
        let term = SearchTerm::classify(keyword_or_type, filters);
        let mut records: Vec<BusinessRecord> = Vec::new();
        let mut page_token: Option<String> = None;

        for page_index in 0..MAX_PAGES {
            pause(self.pacing.before_page(page_index)).await;

            let page = match self
                .search_page(center, radius, &term, filters, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    log.error(
                        format!("Error searching near {center}: {e}"),
                        Some(json!({
                            "lat": center.latitude,
                            "lng": center.longitude,
                            "radius": radius,
                            "page": page_index,
                            "collected": records.len(),
                        })),
                    );
                    return records;
                }
            };

            let next = next_page_token(&page);
            tracing::debug!(
                %center,
                page = page_index,
                results = page.results.len(),
                has_next = next.is_some(),
                "nearby search page"
            );

            for summary in page.results {
                let Some(place_id) = summary
                    .place_id
                    .clone()
                    .filter(|id| !id.trim().is_empty())
                else {
                    continue;
                };

                match self.fetch_detail(&place_id).await {
                    Ok(Some(detail)) => records.extend(normalize_place(summary, detail)),
                    Ok(None) => tracing::debug!(%place_id, "no details returned; skipping"),
                    Err(e) => {
                        tracing::debug!(%place_id, error = %e, "detail lookup failed; skipping");
                    }
                }
                pause(self.pacing.detail_delay).await;
            }

            match next {
                Some(token) => page_token = Some(token),
                None => return records,
            }
        }

        log.warning(
            format!("Stopped paging near {center} after {MAX_PAGES} pages"),
            Some(json!({ "collected": records.len() })),
        );
        records
    }
}

#[async_trait]
impl AreaQuery for PlacesClient {
    async fn query_area(
        &self,
        center: Coordinate,
        radius: f64,
        filters: &SearchFilters,
        keyword_or_type: &str,
        log: &SearchEventLog,
    ) -> Result<Vec<BusinessRecord>, PlacesError> {
        Ok(self
            .collect_area(center, radius, filters, keyword_or_type, log)
            .await)
    }
}
