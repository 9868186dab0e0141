//! Response documents served by the proxy
//!
//! This module contains the JSON shapes produced from upstream XML, one per
//! query kind, plus the static line table. Field names are part of the public
//! interface and must not change.

pub mod lines;

pub use lines::{all_lines, get_line_by_code};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A line of the Underground network
///
/// Uses `&'static str` fields so the LINES table can be built statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// Single-letter code used by TrackerNet
    pub code: &'static str,
    /// Human-readable line name
    pub name: &'static str,
}

/// Any finished response document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseDocument {
    Detailed(DetailedPrediction),
    Summary(SummaryPrediction),
    Status(StatusReport),
    StationList(StationList),
}

impl ResponseDocument {
    /// Serializes the document into its compact JSON form
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Detailed predictions for one station on one line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedPrediction {
    pub information: DetailedInformation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedInformation {
    /// Upstream creation timestamp, verbatim
    pub created: String,
    pub linecode: String,
    pub linename: String,
    pub stations: Vec<DetailedStation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedStation {
    pub stationcode: String,
    pub stationname: String,
    pub platforms: Vec<DetailedPlatform>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedPlatform {
    pub platformname: String,
    pub platformnumber: i64,
    pub trains: Vec<DetailedTrain>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedTrain {
    pub lcid: String,
    pub timeto: String,
    pub secondsto: String,
    pub location: String,
    pub destination: String,
    pub destcode: i64,
    pub tripno: i64,
}

/// Summary predictions for every station on one line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryPrediction {
    /// Value of the upstream `Time@TimeStamp` attribute
    pub created: String,
    pub stations: Vec<SummaryStation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStation {
    pub stationcode: String,
    pub stationname: String,
    pub platforms: Vec<SummaryPlatform>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryPlatform {
    pub platformname: String,
    pub platformcode: i64,
    pub trains: Vec<SummaryTrain>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTrain {
    pub trainnumber: i64,
    pub tripno: i64,
    pub destcode: i64,
    pub destination: String,
    pub timeto: String,
    pub location: String,
}

/// What a status report describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSubject {
    Line,
    Station,
}

impl StatusSubject {
    /// Key prefix used in the serialized report ("line" or "station")
    pub fn prefix(&self) -> &'static str {
        match self {
            StatusSubject::Line => "line",
            StatusSubject::Station => "station",
        }
    }
}

/// Service status for every line or every station
///
/// Serializes as `{"<prefix>": [entry, ...]}`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub subject: StatusSubject,
    pub entries: Vec<StatusEntry>,
}

/// One status record
///
/// `subject_id` and `subject_name` serialize as `<prefix>id` and
/// `<prefix>name`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEntry {
    pub id: i64,
    pub details: String,
    pub subject_id: i64,
    pub subject_name: String,
    pub statusid: String,
    pub status: String,
    pub description: String,
    pub active: bool,
}

/// Borrowed view pairing an entry with the prefix it serializes under
struct PrefixedEntry<'a> {
    prefix: &'static str,
    entry: &'a StatusEntry,
}

impl Serialize for PrefixedEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entry = self.entry;
        let mut map = serializer.serialize_map(Some(8))?;
        map.serialize_entry("id", &entry.id)?;
        map.serialize_entry("details", &entry.details)?;
        map.serialize_entry(&format!("{}id", self.prefix), &entry.subject_id)?;
        map.serialize_entry(&format!("{}name", self.prefix), &entry.subject_name)?;
        map.serialize_entry("statusid", &entry.statusid)?;
        map.serialize_entry("status", &entry.status)?;
        map.serialize_entry("description", &entry.description)?;
        map.serialize_entry("active", &entry.active)?;
        map.end()
    }
}

impl Serialize for StatusReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let prefix = self.subject.prefix();
        let entries: Vec<PrefixedEntry<'_>> = self
            .entries
            .iter()
            .map(|entry| PrefixedEntry { prefix, entry })
            .collect();

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(prefix, &entries)?;
        map.end()
    }
}

/// Stations grouped by line, built from one summary fetch per line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationList {
    pub lines: Vec<LineStations>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStations {
    pub linecode: String,
    pub linename: String,
    pub stations: Vec<StationRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRef {
    pub stationcode: String,
    pub stationname: String,
}
