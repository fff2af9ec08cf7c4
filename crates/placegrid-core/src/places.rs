use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest price level the upstream API accepts for `minprice` / `maxprice`.
pub const MAX_PRICE_LEVEL: u8 = 4;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Optional upstream filters. Passed through every layer unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub min_price: Option<u8>,
    #[serde(default)]
    pub max_price: Option<u8>,
    #[serde(default)]
    pub open_now: bool,
    #[serde(default)]
    pub place_type: Option<String>,
}

/// One top-level area search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text keyword (`"coffee shop"`) or a type token (`"coffee_shop"`).
    pub keyword_or_type: String,
    pub center: Coordinate,
    /// Overall search radius in metres.
    pub radius: f64,
    /// Radius of each grid-point query in metres.
    pub sub_radius: f64,
    pub max_workers: usize,
    #[serde(default)]
    pub adaptive_sub_radius: bool,
    #[serde(default)]
    pub filters: SearchFilters,
}

/// Input rejected before any network call is made.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("search term must be non-empty")]
    EmptySearchTerm,

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("{field} must be a positive number of metres, got {value}")]
    InvalidRadius { field: &'static str, value: f64 },

    #[error("max_workers must be at least 1")]
    NoWorkers,

    #[error("{field} {value} is outside [0, {MAX_PRICE_LEVEL}]")]
    PriceOutOfRange { field: &'static str, value: u8 },

    #[error("min_price {min} is greater than max_price {max}")]
    PriceRangeInverted { min: u8, max: u8 },

    #[error("place_type must be non-empty when set")]
    EmptyPlaceType,
}

impl SearchFilters {
    /// Checks price bounds and the place type.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if let Some(value) = value {
                if value > MAX_PRICE_LEVEL {
                    return Err(ValidationError::PriceOutOfRange { field, value });
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(ValidationError::PriceRangeInverted { min, max });
            }
        }
        if self
            .place_type
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
        {
            return Err(ValidationError::EmptyPlaceType);
        }
        Ok(())
    }
}

impl SearchRequest {
    /// Validates the request at the caller boundary. The search engine itself
    /// assumes a validated request.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.keyword_or_type.trim().is_empty() {
            return Err(ValidationError::EmptySearchTerm);
        }
        let Coordinate {
            latitude,
            longitude,
        } = self.center;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange(longitude));
        }
        for (field, value) in [("radius", self.radius), ("sub_radius", self.sub_radius)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ValidationError::InvalidRadius { field, value });
            }
        }
        if self.max_workers == 0 {
            return Err(ValidationError::NoWorkers);
        }
        self.filters.validate()
    }
}

/// Whether the business reported itself open at query time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenStatus {
    Yes,
    No,
    #[default]
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl From<Option<bool>> for OpenStatus {
    fn from(open_now: Option<bool>) -> Self {
        match open_now {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::NotAvailable,
        }
    }
}

impl std::fmt::Display for OpenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenStatus::Yes => write!(f, "Yes"),
            OpenStatus::No => write!(f, "No"),
            OpenStatus::NotAvailable => write!(f, "N/A"),
        }
    }
}

/// A business found by the search. Identity is `place_id`: two records with
/// the same id are the same business whatever their other fields say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub total_ratings: Option<u32>,
    pub is_open_now: OpenStatus,
    pub place_id: String,
    pub primary_type: Option<String>,
    #[serde(default)]
    pub secondary_types: Vec<String>,
    pub business_status: Option<String>,
    pub price_level: Option<u8>,
}

impl BusinessRecord {
    /// A record carrying only a name and id; the remaining fields are empty.
    #[must_use]
    pub fn minimal(name: impl Into<String>, place_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            phone: None,
            website: None,
            rating: None,
            total_ratings: None,
            is_open_now: OpenStatus::NotAvailable,
            place_id: place_id.into(),
            primary_type: None,
            secondary_types: Vec::new(),
            business_status: None,
            price_level: None,
        }
    }
}
