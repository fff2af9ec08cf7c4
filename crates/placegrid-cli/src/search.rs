//! `search` command: resolve a request, run the grid search, export JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, ValueEnum};
use placegrid_core::{AppConfig, BusinessRecord, Coordinate, SearchFilters, SearchRequest};
use placegrid_search::{CoordinatorSettings, GridSearchCoordinator, PlacesClient, SearchEventLog};
use serde::{Deserialize, Serialize};

/// Search term used when neither a flag nor a params file names one.
const DEFAULT_TERM: &str = "business";

/// Overall radius in metres when none is given.
const DEFAULT_RADIUS: f64 = 1_000.0;

#[derive(Debug, Default, Args)]
pub struct SearchArgs {
    /// Keyword ("coffee shop") or place type token ("coffee_shop")
    #[arg(long)]
    pub term: Option<String>,
    /// Center latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Center longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lng: Option<f64>,
    /// Search radius in metres
    #[arg(long)]
    pub radius: Option<f64>,
    /// Radius of each grid query in metres (defaults to the configured value)
    #[arg(long)]
    pub sub_radius: Option<f64>,
    /// Maximum concurrent grid queries
    #[arg(long)]
    pub max_workers: Option<usize>,
    /// Shrink the sub-radius until the center is no longer saturated
    #[arg(long)]
    pub adaptive: bool,
    /// Minimum price level (0-4)
    #[arg(long)]
    pub min_price: Option<u8>,
    /// Maximum price level (0-4)
    #[arg(long)]
    pub max_price: Option<u8>,
    /// Only return places open right now
    #[arg(long)]
    pub open_now: bool,
    /// Explicit place type; sent as `type` instead of guessing from the term
    #[arg(long)]
    pub place_type: Option<String>,
    /// JSON file with search parameters; flags override its values
    #[arg(long)]
    pub params_file: Option<PathBuf>,
    /// Inline JSON search parameters; flags override, and it overrides --params-file
    #[arg(long)]
    pub json_params: Option<String>,
    /// API key (overrides GOOGLE_API_KEY and the config file)
    #[arg(long)]
    pub api_key: Option<String>,
    /// Write results to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Output format for the results
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
    /// Print the search event log to stderr when done
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// Search parameters read from `--params-file` or `--json-params`.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[serde(alias = "term", alias = "keyword_or_type")]
    pub search_term: Option<String>,
    #[serde(alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(alias = "lng")]
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
    pub sub_radius: Option<f64>,
    pub max_workers: Option<usize>,
    #[serde(alias = "adaptive")]
    pub adaptive_sub_radius: Option<bool>,
    pub min_price: Option<u8>,
    pub max_price: Option<u8>,
    pub open_now: Option<bool>,
    pub place_type: Option<String>,
}

impl SearchParams {
    /// Overlay `other` on `self`; fields set in `other` win.
    #[must_use]
    fn overlay(self, other: SearchParams) -> SearchParams {
        SearchParams {
            search_term: other.search_term.or(self.search_term),
            latitude: other.latitude.or(self.latitude),
            longitude: other.longitude.or(self.longitude),
            radius: other.radius.or(self.radius),
            sub_radius: other.sub_radius.or(self.sub_radius),
            max_workers: other.max_workers.or(self.max_workers),
            adaptive_sub_radius: other.adaptive_sub_radius.or(self.adaptive_sub_radius),
            min_price: other.min_price.or(self.min_price),
            max_price: other.max_price.or(self.max_price),
            open_now: other.open_now.or(self.open_now),
            place_type: other.place_type.or(self.place_type),
        }
    }
}

impl From<&SearchArgs> for SearchParams {
    fn from(args: &SearchArgs) -> Self {
        Self {
            search_term: args.term.clone(),
            latitude: args.lat,
            longitude: args.lng,
            radius: args.radius,
            sub_radius: args.sub_radius,
            max_workers: args.max_workers,
            adaptive_sub_radius: args.adaptive.then_some(true),
            min_price: args.min_price,
            max_price: args.max_price,
            open_now: args.open_now.then_some(true),
            place_type: args.place_type.clone(),
        }
    }
}

fn read_params_file(path: &Path) -> anyhow::Result<SearchParams> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read params file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse params file {}", path.display()))
}

/// Resolve a validated request. Precedence: flags, then `--json-params`,
/// then `--params-file`, then config defaults.
///
/// # Errors
///
/// Returns an error if a params source cannot be read, the center is
/// missing, or the request fails validation.
pub(crate) fn resolve_request(
    args: &SearchArgs,
    config: &AppConfig,
) -> anyhow::Result<SearchRequest> {
    let mut params = SearchParams::default();
    if let Some(path) = args.params_file.as_deref() {
        params = params.overlay(read_params_file(path)?);
    }
    if let Some(raw) = args.json_params.as_deref() {
        let inline: SearchParams =
            serde_json::from_str(raw).context("failed to parse --json-params")?;
        params = params.overlay(inline);
    }
    let params = params.overlay(SearchParams::from(args));

    let (Some(latitude), Some(longitude)) = (params.latitude, params.longitude) else {
        anyhow::bail!("latitude and longitude are required (--lat/--lng or a params file)");
    };

    let request = SearchRequest {
        keyword_or_type: params
            .search_term
            .unwrap_or_else(|| DEFAULT_TERM.to_string()),
        center: Coordinate::new(latitude, longitude),
        radius: params.radius.unwrap_or(DEFAULT_RADIUS),
        sub_radius: params.sub_radius.unwrap_or(config.sub_radius),
        max_workers: params.max_workers.unwrap_or(config.max_workers),
        adaptive_sub_radius: params
            .adaptive_sub_radius
            .unwrap_or(config.adaptive_sub_radius),
        filters: SearchFilters {
            min_price: params.min_price,
            max_price: params.max_price,
            open_now: params.open_now.unwrap_or(false),
            place_type: params.place_type,
        },
    };
    request.validate().context("invalid search request")?;
    Ok(request)
}

/// Run one search and export the results.
///
/// # Errors
///
/// Returns an error if the request is invalid, no API key is configured, the
/// HTTP client cannot be built, or the results cannot be written. Upstream
/// failures during the search are reported as events, not errors.
pub(crate) async fn run_search(args: &SearchArgs, config: &AppConfig) -> anyhow::Result<()> {
    let request = resolve_request(args, config)?;
    let api_key = args
        .api_key
        .clone()
        .or_else(|| config.api_key.clone())
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "an API key is required: pass --api-key, set GOOGLE_API_KEY, \
                 or run `placegrid config set-api-key <KEY>`"
            )
        })?;

    let client = PlacesClient::from_config(config, &api_key)
        .map_err(|e| anyhow::anyhow!("failed to build places client: {e}"))?;
    let coordinator = GridSearchCoordinator::new(Arc::new(client)).with_settings(
        CoordinatorSettings {
            min_sub_radius: config.min_sub_radius,
            ..CoordinatorSettings::default()
        },
    );

    tracing::debug!(
        cache_key = %placegrid_core::cache_key(&request),
        "resolved search request"
    );
    eprintln!(
        "Searching for \"{}\" within {:.0} m of {}...",
        request.keyword_or_type, request.radius, request.center
    );

    let log = SearchEventLog::new();
    let records = coordinator.search(&request, &log).await;
    eprintln!("Found {} businesses matching criteria.", records.len());

    if args.verbose {
        for event in log.drain() {
            eprintln!(
                "{} [{}] {}",
                event.timestamp.format("%H:%M:%S%.3f"),
                event.level,
                event.message
            );
        }
    }

    write_results(&records, args.output.as_deref(), args.format)
}

/// CSV column order. `secondary_types` is joined with `", "`.
const CSV_HEADERS: [&str; 12] = [
    "name",
    "address",
    "phone",
    "website",
    "rating",
    "total_ratings",
    "is_open_now",
    "place_id",
    "primary_type",
    "secondary_types",
    "business_status",
    "price_level",
];

/// One CSV line; field order matches [`CSV_HEADERS`].
#[derive(Serialize)]
struct CsvRow<'a> {
    name: &'a str,
    address: Option<&'a str>,
    phone: Option<&'a str>,
    website: Option<&'a str>,
    rating: Option<f64>,
    total_ratings: Option<u32>,
    is_open_now: String,
    place_id: &'a str,
    primary_type: Option<&'a str>,
    secondary_types: String,
    business_status: Option<&'a str>,
    price_level: Option<u8>,
}

impl<'a> From<&'a BusinessRecord> for CsvRow<'a> {
    fn from(r: &'a BusinessRecord) -> Self {
        Self {
            name: &r.name,
            address: r.address.as_deref(),
            phone: r.phone.as_deref(),
            website: r.website.as_deref(),
            rating: r.rating,
            total_ratings: r.total_ratings,
            is_open_now: r.is_open_now.to_string(),
            place_id: &r.place_id,
            primary_type: r.primary_type.as_deref(),
            secondary_types: r.secondary_types.join(", "),
            business_status: r.business_status.as_deref(),
            price_level: r.price_level,
        }
    }
}

fn render_csv(records: &[BusinessRecord]) -> anyhow::Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV output: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn render(records: &[BusinessRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(records).context("failed to serialize results")
        }
        OutputFormat::Csv => render_csv(records),
    }
}

fn write_results(
    records: &[BusinessRecord],
    output: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let rendered = render(records, format)?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write results to {}", path.display()))?;
            eprintln!("Results written to {}", path.display());
        }
        None => {
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
