pub mod client;
pub mod coordinator;
pub mod error;
pub mod event_log;
pub mod grid;
pub mod merge;
pub mod normalize;
pub mod pagination;
pub mod query;
pub mod rate_limit;
pub mod tuner;
pub mod types;

pub use client::PlacesClient;
pub use coordinator::{CoordinatorSettings, GridSearchCoordinator, MAX_QUERY_RADIUS};
pub use error::PlacesError;
pub use event_log::{EventLevel, SearchEvent, SearchEventLog};
pub use grid::{plan_grid, GridPoint};
pub use merge::{MergeStats, ResultMerger};
pub use normalize::normalize_place;
pub use query::{AreaQuery, SearchTerm};
pub use rate_limit::Pacing;
pub use tuner::{tune_sub_radius, RESULT_CAP};
pub use types::{NearbySearchResponse, PlaceDetails, PlaceDetailsResponse, PlaceSummary};
