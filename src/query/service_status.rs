//! Shaping of line and station service status feeds
//!
//! Both feeds share one layout: a list of `<XStatus>` records, each holding an
//! `<X>` element naming the subject and a `<Status>` element describing it.

use roxmltree::Document;

use super::parse_bool;
use super::xml::{self, Tag};
use crate::data::{ResponseDocument, StatusEntry, StatusReport, StatusSubject};
use crate::error::Result;

/// Namespace of both status feeds
pub const STATUS_NAMESPACE: &str = "http://webservices.lul.co.uk/";

/// Tags needed to read one status feed
struct StatusTags {
    record: Tag,
    subject: Tag,
    status: Tag,
}

const LINE_TAGS: StatusTags = StatusTags {
    record: Tag::qualified(STATUS_NAMESPACE, "LineStatus"),
    subject: Tag::qualified(STATUS_NAMESPACE, "Line"),
    status: Tag::qualified(STATUS_NAMESPACE, "Status"),
};

const STATION_TAGS: StatusTags = StatusTags {
    record: Tag::qualified(STATUS_NAMESPACE, "StationStatus"),
    subject: Tag::qualified(STATUS_NAMESPACE, "Station"),
    status: Tag::qualified(STATUS_NAMESPACE, "Status"),
};

/// Shapes a line status document
pub fn shape_line_status(doc: &Document<'_>) -> Result<ResponseDocument> {
    report(doc, StatusSubject::Line).map(ResponseDocument::Status)
}

/// Shapes a station status document
pub fn shape_station_status(doc: &Document<'_>) -> Result<ResponseDocument> {
    report(doc, StatusSubject::Station).map(ResponseDocument::Status)
}

pub fn report(doc: &Document<'_>, subject: StatusSubject) -> Result<StatusReport> {
    let tags = match subject {
        StatusSubject::Line => &LINE_TAGS,
        StatusSubject::Station => &STATION_TAGS,
    };

    let entries = xml::children(doc.root_element(), tags.record)
        .map(|record| -> Result<StatusEntry> {
            let item = xml::child(record, tags.subject)?;
            let status = xml::child(record, tags.status)?;

            Ok(StatusEntry {
                id: xml::int_attr(record, "ID")?,
                details: xml::attr(record, "StatusDetails"),
                subject_id: xml::int_attr(item, "ID")?,
                subject_name: xml::attr(item, "Name"),
                statusid: xml::attr(status, "ID"),
                status: xml::attr(status, "CssClass"),
                description: xml::attr(status, "Description"),
                active: parse_bool(&xml::attr(status, "IsActive")),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(StatusReport { subject, entries })
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const LINE_STATUS_XML: &str = include_str!("../../tests/fixtures/linestatus.xml");
    pub const STATION_STATUS_XML: &str = include_str!("../../tests/fixtures/stationstatus.xml");
}

#[cfg(test)]
mod tests {
    use super::fixtures::{LINE_STATUS_XML, STATION_STATUS_XML};
    use super::*;
    use serde_json::json;

    #[test]
    fn test_line_status_entries() {
        let doc = xml::parse(LINE_STATUS_XML).unwrap();
        let report = report(&doc, StatusSubject::Line).unwrap();

        assert_eq!(report.entries.len(), 2);
        let central = &report.entries[1];
        assert_eq!(central.id, 1);
        assert_eq!(central.subject_id, 2);
        assert_eq!(central.subject_name, "Central");
        assert_eq!(central.statusid, "MD");
        assert_eq!(central.status, "DisruptedService");
        assert_eq!(central.description, "Minor Delays");
        assert!(central.details.starts_with("Minor delays"));
        assert!(central.active, "IsActive=\"True\" should parse as active");
    }

    #[test]
    fn test_line_status_json_shape() {
        let doc = xml::parse(LINE_STATUS_XML).unwrap();
        let json = shape_line_status(&doc).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value["line"][0],
            json!({
                "id": 0,
                "details": "",
                "lineid": 1,
                "linename": "Bakerloo",
                "statusid": "GS",
                "status": "GoodService",
                "description": "Good Service",
                "active": true
            })
        );
    }

    #[test]
    fn test_station_status_json_shape() {
        let doc = xml::parse(STATION_STATUS_XML).unwrap();
        let json = shape_station_status(&doc).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let entry = &value["station"][0];
        assert_eq!(entry["stationid"], 212);
        assert_eq!(entry["stationname"], "Covent Garden");
        assert_eq!(entry["active"], false);
        assert!(value.get("line").is_none());
    }

    #[test]
    fn test_wrong_namespace_yields_no_entries() {
        let xml_text = LINE_STATUS_XML.replace("webservices.lul.co.uk", "example.com");
        let doc = xml::parse(&xml_text).unwrap();
        let report = report(&doc, StatusSubject::Line).unwrap();
        assert!(report.entries.is_empty());
    }

    #[test]
    fn test_record_without_status_is_malformed() {
        let xml_text = r#"<ArrayOfLineStatus xmlns="http://webservices.lul.co.uk/">
            <LineStatus ID="0" StatusDetails=""><Line ID="1" Name="Bakerloo" /></LineStatus>
        </ArrayOfLineStatus>"#;
        let doc = xml::parse(xml_text).unwrap();
        assert!(report(&doc, StatusSubject::Line).is_err());
    }
}
