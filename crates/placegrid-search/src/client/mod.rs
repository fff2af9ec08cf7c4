//! HTTP client for the places `nearbysearch` and `details` endpoints.

mod area;

use std::time::Duration;

use placegrid_core::{AppConfig, Coordinate, SearchFilters, DEFAULT_API_BASE_URL};
use reqwest::{Client, Url};

use crate::error::PlacesError;
use crate::query::SearchTerm;
use crate::rate_limit::{retry_with_backoff, Pacing};
use crate::types::{
    NearbySearchResponse, PlaceDetails, PlaceDetailsResponse, STATUS_NOT_FOUND, STATUS_OK,
    STATUS_OVER_QUERY_LIMIT, STATUS_ZERO_RESULTS,
};

/// Detail fields requested for every result: exactly what
/// [`crate::normalize::normalize_place`] reads.
pub(crate) const DETAIL_FIELDS: &str = "name,formatted_address,formatted_phone_number,website,\
rating,user_ratings_total,opening_hours,types,business_status,price_level";

/// Client for the places API.
///
/// Holds the HTTP client, API key, base URL, pacing and retry policy. Use
/// [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    pacing: Pacing,
    /// Retry attempts after a rate-limited search page.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl PlacesClient {
    /// Creates a client pointed at the production places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_API_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`PlacesError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `join` appends to the base path
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: parsed,
            pacing: Pacing::default(),
            max_retries: 2,
            backoff_base_secs: 2,
        })
    }

    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::with_base_url`].
    pub fn from_config(config: &AppConfig, api_key: &str) -> Result<Self, PlacesError> {
        Ok(Self::with_base_url(
            api_key,
            config.request_timeout_secs,
            &config.user_agent,
            &config.api_base_url,
        )?
        .with_pacing(Pacing::from_config(config))
        .with_retry_policy(config.max_retries, config.retry_backoff_base_secs))
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_secs: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_secs = backoff_base_secs;
        self
    }

    #[must_use]
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Fetches one page of a nearby search.
    ///
    /// Retries with backoff when the API signals rate limiting (HTTP 429 or
    /// an `OVER_QUERY_LIMIT` body status). `ZERO_RESULTS` is returned as an
    /// empty page.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::RateLimited`] after all retries are exhausted.
    /// - [`PlacesError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::Deserialize`] if the body does not parse.
    /// - [`PlacesError::ApiStatus`] for any other error status in the body.
    pub async fn search_page(
        &self,
        center: Coordinate,
        radius: f64,
        term: &SearchTerm<'_>,
        filters: &SearchFilters,
        page_token: Option<&str>,
    ) -> Result<NearbySearchResponse, PlacesError> {
        let url = self.nearby_search_url(center, radius, term, filters, page_token)?;

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self.client.get(url).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(PlacesError::RateLimited {
                        reason: "HTTP 429".to_owned(),
                    });
                }
                if !status.is_success() {
                    return Err(PlacesError::UnexpectedStatus {
                        status: status.as_u16(),
                        endpoint: "nearbysearch",
                    });
                }

                let body = response.text().await?;
                let parsed = serde_json::from_str::<NearbySearchResponse>(&body).map_err(|e| {
                    PlacesError::Deserialize {
                        context: format!("nearby search page around {center}"),
                        source: e,
                    }
                })?;

                match parsed.status.as_str() {
                    STATUS_OK | STATUS_ZERO_RESULTS => Ok(parsed),
                    STATUS_OVER_QUERY_LIMIT => Err(PlacesError::RateLimited {
                        reason: STATUS_OVER_QUERY_LIMIT.to_owned(),
                    }),
                    _ => Err(PlacesError::ApiStatus {
                        endpoint: "nearbysearch",
                        message: parsed.error_message.clone().unwrap_or_default(),
                        status: parsed.status,
                    }),
                }
            }
        })
        .await
    }

    /// Fetches the detail record for one place. Never retried.
    ///
    /// Returns `Ok(None)` when the API reports `NOT_FOUND` or omits the
    /// `result` object.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::UnexpectedStatus`] for a non-2xx status.
    /// - [`PlacesError::Deserialize`] if the body does not parse.
    /// - [`PlacesError::ApiStatus`] for any other error status in the body.
    pub async fn fetch_detail(&self, place_id: &str) -> Result<Option<PlaceDetails>, PlacesError> {
        let url = self.endpoint_url(
            "details/json",
            &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
        )?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::UnexpectedStatus {
                status: status.as_u16(),
                endpoint: "details",
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<PlaceDetailsResponse>(&body).map_err(|e| {
            PlacesError::Deserialize {
                context: format!("details for place {place_id}"),
                source: e,
            }
        })?;

        match parsed.status.as_str() {
            STATUS_OK => Ok(parsed.result),
            STATUS_NOT_FOUND => Ok(None),
            _ => Err(PlacesError::ApiStatus {
                endpoint: "details",
                message: parsed.error_message.unwrap_or_default(),
                status: parsed.status,
            }),
        }
    }

    /// Builds the `nearbysearch/json` URL.
    ///
    /// Radius is sent in whole metres. Price and open-now filters are sent
    /// only when set, so the API filters before results are paged.
    fn nearby_search_url(
        &self,
        center: Coordinate,
        radius: f64,
        term: &SearchTerm<'_>,
        filters: &SearchFilters,
        page_token: Option<&str>,
    ) -> Result<Url, PlacesError> {
        let location = center.to_string();
        let radius = format!("{radius:.0}");
        let min_price = filters.min_price.map(|p| p.to_string());
        let max_price = filters.max_price.map(|p| p.to_string());

        let mut params: Vec<(&str, &str)> = vec![("location", &location), ("radius", &radius)];
        params.push(term.param());
        if let Some(p) = min_price.as_deref() {
            params.push(("minprice", p));
        }
        if let Some(p) = max_price.as_deref() {
            params.push(("maxprice", p));
        }
        if filters.open_now {
            params.push(("opennow", "true"));
        }
        if let Some(token) = page_token {
            params.push(("pagetoken", token));
        }

        self.endpoint_url("nearbysearch/json", &params)
    }

    /// Joins `path` onto the base URL and appends `params` plus the API key.
    fn endpoint_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| PlacesError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
