//! Query kinds and their descriptors
//!
//! Each supported request shape is a `QueryKind`. Its `QueryDescriptor` knows
//! which parameters it accepts, how long its results stay fresh, and how to
//! turn validated parameters into both an upstream URL and a cache path.
//! URL and cache path are always derived from the same `Discriminator`, so a
//! cache entry identifies exactly one upstream resource.

pub mod predictions;
pub mod service_status;
pub mod stations;
pub mod xml;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use roxmltree::Document;

use crate::data::{get_line_by_code, Line, ResponseDocument};
use crate::error::{ProxyError, Result};

/// Query parameter naming the query kind
pub const REQUEST: &str = "request";
/// Query parameter carrying a line code
pub const LINE: &str = "line";
/// Query parameter carrying a station code
pub const STATION: &str = "station";
/// Query parameter restricting status feeds to incidents
pub const INCIDENTS_ONLY: &str = "incidentsonly";

/// Cache segment used by status feeds when not restricted to incidents
const FULL: &str = "full";

/// Extension appended to every cache file
const CACHE_EXTENSION: &str = "json";

/// Freshness window for live predictions and status feeds
pub const LIVE_TTL: Duration = Duration::from_secs(30);

/// Freshness window for the station list (four weeks)
pub const STATION_LIST_TTL: Duration = Duration::from_secs(4 * 7 * 24 * 60 * 60);

/// Request parameters as received, keyed by name
pub type RequestParams = BTreeMap<String, String>;

/// Shapes a parsed upstream document into a response
pub type Shaper = fn(&Document<'_>) -> Result<ResponseDocument>;

/// Parses the loose boolean vocabulary used by TrackerNet and by clients
///
/// `1`, `true`, `yes`, `y` and `on` (any case) are true; anything else is false.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// The supported request shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    DetailedPrediction,
    SummaryPrediction,
    LineStatus,
    StationStatus,
    StationList,
}

impl QueryKind {
    /// All query kinds
    pub const ALL: [QueryKind; 5] = [
        QueryKind::DetailedPrediction,
        QueryKind::SummaryPrediction,
        QueryKind::LineStatus,
        QueryKind::StationStatus,
        QueryKind::StationList,
    ];

    /// Resolves the value of the `request` parameter
    pub fn from_request(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.segment() == value)
            .ok_or_else(|| ProxyError::UnknownQueryKind(value.to_string()))
    }

    /// Name used in requests, upstream paths and cache paths
    pub fn segment(&self) -> &'static str {
        match self {
            QueryKind::DetailedPrediction => "predictiondetailed",
            QueryKind::SummaryPrediction => "predictionsummary",
            QueryKind::LineStatus => "linestatus",
            QueryKind::StationStatus => "stationstatus",
            QueryKind::StationList => "stationslist",
        }
    }

    /// The descriptor for this kind
    pub fn descriptor(&self) -> &'static QueryDescriptor {
        match self {
            QueryKind::DetailedPrediction => &DETAILED_PREDICTION,
            QueryKind::SummaryPrediction => &SUMMARY_PREDICTION,
            QueryKind::LineStatus => &LINE_STATUS,
            QueryKind::StationStatus => &STATION_STATUS,
            QueryKind::StationList => &STATION_LIST,
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// How a query produces its response document
#[derive(Clone, Copy)]
pub enum Shaping {
    /// One upstream document, shaped by the given function
    Document(Shaper),
    /// One summary fetch per line, aggregated into a station list
    FanOut,
}

impl fmt::Debug for Shaping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shaping::Document(_) => f.write_str("Document"),
            Shaping::FanOut => f.write_str("FanOut"),
        }
    }
}

/// Validated values that identify one upstream resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discriminator {
    LineStation { line: &'static Line, station: String },
    Line(&'static Line),
    Incidents { only: bool },
    Everything,
}

impl Discriminator {
    /// Path segments appended to the upstream URL
    pub fn url_segments(&self) -> Vec<&str> {
        match self {
            Discriminator::LineStation { line, station } => vec![line.code, station.as_str()],
            Discriminator::Line(line) => vec![line.code],
            Discriminator::Incidents { only: true } => vec![INCIDENTS_ONLY],
            Discriminator::Incidents { only: false } | Discriminator::Everything => Vec::new(),
        }
    }

    /// Path segments below the query directory in the cache
    pub fn cache_segments(&self) -> Vec<&str> {
        match self {
            Discriminator::Incidents { only: false } => vec![FULL],
            other => other.url_segments(),
        }
    }
}

/// Everything needed to serve one query kind
pub struct QueryDescriptor {
    pub kind: QueryKind,
    /// Parameters kept from the raw request; all others are dropped
    pub params: &'static [&'static str],
    /// Parameters that must be present
    pub required: &'static [&'static str],
    /// How long a cached response stays fresh
    pub ttl: Duration,
    pub shaping: Shaping,
    validate: fn(&RequestParams) -> Result<Discriminator>,
}

impl fmt::Debug for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryDescriptor")
            .field("kind", &self.kind)
            .field("params", &self.params)
            .field("ttl", &self.ttl)
            .field("shaping", &self.shaping)
            .finish()
    }
}

static DETAILED_PREDICTION: QueryDescriptor = QueryDescriptor {
    kind: QueryKind::DetailedPrediction,
    params: &[REQUEST, LINE, STATION],
    required: &[LINE, STATION],
    ttl: LIVE_TTL,
    shaping: Shaping::Document(predictions::shape_detailed),
    validate: validate_line_station,
};

static SUMMARY_PREDICTION: QueryDescriptor = QueryDescriptor {
    kind: QueryKind::SummaryPrediction,
    params: &[REQUEST, LINE],
    required: &[LINE],
    ttl: LIVE_TTL,
    shaping: Shaping::Document(predictions::shape_summary),
    validate: validate_line,
};

static LINE_STATUS: QueryDescriptor = QueryDescriptor {
    kind: QueryKind::LineStatus,
    params: &[REQUEST, INCIDENTS_ONLY],
    required: &[],
    ttl: LIVE_TTL,
    shaping: Shaping::Document(service_status::shape_line_status),
    validate: validate_incidents,
};

static STATION_STATUS: QueryDescriptor = QueryDescriptor {
    kind: QueryKind::StationStatus,
    params: &[REQUEST, INCIDENTS_ONLY],
    required: &[],
    ttl: LIVE_TTL,
    shaping: Shaping::Document(service_status::shape_station_status),
    validate: validate_incidents,
};

static STATION_LIST: QueryDescriptor = QueryDescriptor {
    kind: QueryKind::StationList,
    params: &[REQUEST],
    required: &[],
    ttl: STATION_LIST_TTL,
    shaping: Shaping::FanOut,
    validate: validate_nothing,
};

impl QueryDescriptor {
    /// Keeps only the parameters this query accepts
    pub fn filter_params(&self, raw: &RequestParams) -> RequestParams {
        raw.iter()
            .filter(|(name, _)| self.params.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Fails with `MissingParameter` for the first absent required parameter
    pub fn check_required(&self, params: &RequestParams) -> Result<()> {
        match self.required.iter().find(|name| !params.contains_key(**name)) {
            Some(name) => Err(ProxyError::MissingParameter(*name)),
            None => Ok(()),
        }
    }

    /// Validates parameters into the values identifying the upstream resource
    pub fn discriminator(&self, params: &RequestParams) -> Result<Discriminator> {
        (self.validate)(params)
    }

    /// Builds the upstream URL for the given parameters
    pub fn request_url(&self, base_url: &str, params: &RequestParams) -> Result<String> {
        Ok(self.url_for(base_url, &self.discriminator(params)?))
    }

    /// Builds the cache path for the given parameters
    pub fn cache_key(&self, cache_root: &Path, params: &RequestParams) -> Result<PathBuf> {
        Ok(self.cache_path_for(cache_root, &self.discriminator(params)?))
    }

    /// Upstream URL: `<base>/<kind>[/<segment>...]`
    pub fn url_for(&self, base_url: &str, discriminator: &Discriminator) -> String {
        let mut url = format!("{}/{}", base_url.trim_end_matches('/'), self.kind.segment());
        for segment in discriminator.url_segments() {
            url.push('/');
            url.push_str(segment);
        }
        url
    }

    /// Cache path: `<root>/<kind>[/<segment>...].json`
    pub fn cache_path_for(&self, cache_root: &Path, discriminator: &Discriminator) -> PathBuf {
        let mut segments = vec![self.kind.segment()];
        segments.extend(discriminator.cache_segments());

        let mut path = cache_root.to_path_buf();
        if let Some((file_stem, dirs)) = segments.split_last() {
            for dir in dirs {
                path.push(dir);
            }
            path.push(format!("{}.{}", file_stem, CACHE_EXTENSION));
        }
        path
    }
}

fn require<'a>(params: &'a RequestParams, name: &'static str) -> Result<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or(ProxyError::MissingParameter(name))
}

fn line_param(params: &RequestParams) -> Result<&'static Line> {
    let code = require(params, LINE)?;
    get_line_by_code(code)
        .ok_or_else(|| ProxyError::invalid(LINE, format!("Line code '{}' is not valid", code)))
}

fn station_param(params: &RequestParams) -> Result<String> {
    let station = require(params, STATION)?.trim();
    if station.is_empty() {
        return Err(ProxyError::invalid(STATION, "Station code is empty"));
    }
    if !station.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ProxyError::invalid(
            STATION,
            format!("Station code '{}' is not valid", station),
        ));
    }
    Ok(station.to_string())
}

fn validate_line_station(params: &RequestParams) -> Result<Discriminator> {
    Ok(Discriminator::LineStation {
        line: line_param(params)?,
        station: station_param(params)?,
    })
}

fn validate_line(params: &RequestParams) -> Result<Discriminator> {
    line_param(params).map(Discriminator::Line)
}

fn validate_incidents(params: &RequestParams) -> Result<Discriminator> {
    let only = params
        .get(INCIDENTS_ONLY)
        .map(|value| parse_bool(value))
        .unwrap_or(false);
    Ok(Discriminator::Incidents { only })
}

fn validate_nothing(_params: &RequestParams) -> Result<Discriminator> {
    Ok(Discriminator::Everything)
}
