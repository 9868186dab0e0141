//! Station list aggregation
//!
//! TrackerNet has no station directory, so the list is assembled from one
//! summary prediction per line. Any failed line fails the whole list.

use std::collections::BTreeMap;

use futures::stream::{self, StreamExt, TryStreamExt};
use roxmltree::Document;
use tracing::debug;

use super::predictions::SUMMARY_STATION;
use super::xml;
use super::{QueryKind, RequestParams, LINE};
use crate::data::{all_lines, Line, LineStations, ResponseDocument, StationList, StationRef};
use crate::error::Result;
use crate::fetch::UpstreamClient;

/// Maximum number of per-line fetches in flight
pub const FAN_OUT_LIMIT: usize = 4;

/// Reads station codes and names from a summary prediction document
pub fn shape_line_stations(doc: &Document<'_>) -> Result<Vec<StationRef>> {
    Ok(xml::children(doc.root_element(), SUMMARY_STATION)
        .map(|station| StationRef {
            stationcode: xml::attr(station, "Code"),
            stationname: xml::attr(station, "N"),
        })
        .collect())
}

/// Builds the station list for every known line
pub async fn collect(upstream: &UpstreamClient) -> Result<ResponseDocument> {
    collect_lines(upstream, all_lines())
        .await
        .map(ResponseDocument::StationList)
}

/// Builds the station list for the given lines
///
/// Lines keep their input order in the result. The first failed fetch is
/// returned and no partial list is produced.
pub async fn collect_lines(upstream: &UpstreamClient, lines: &[Line]) -> Result<StationList> {
    let lines: Vec<LineStations> = stream::iter(lines)
        .map(|line| fetch_line(upstream, line))
        .buffered(FAN_OUT_LIMIT)
        .try_collect()
        .await?;

    Ok(StationList { lines })
}

async fn fetch_line(upstream: &UpstreamClient, line: &Line) -> Result<LineStations> {
    let params: RequestParams = BTreeMap::from([(LINE.to_string(), line.code.to_string())]);
    let url = QueryKind::SummaryPrediction
        .descriptor()
        .request_url(upstream.base_url(), &params)?;

    let stations = upstream.fetch(&url, shape_line_stations).await?;
    debug!(line = line.code, count = stations.len(), "collected stations");

    Ok(LineStations {
        linecode: line.code.to_string(),
        linename: line.name.to_string(),
        stations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::get_line_by_code;
    use crate::error::ProxyError;
    use crate::query::predictions::fixtures::SUMMARY_XML;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lines(codes: &[&str]) -> Vec<Line> {
        codes
            .iter()
            .map(|code| *get_line_by_code(code).unwrap())
            .collect()
    }

    #[test]
    fn test_shape_line_stations() {
        let doc = xml::parse(SUMMARY_XML).unwrap();
        let stations = shape_line_stations(&doc).unwrap();

        let codes: Vec<&str> = stations.iter().map(|s| s.stationcode.as_str()).collect();
        assert_eq!(codes, ["BNK", "CHL", "HOL"]);
        assert_eq!(stations[2].stationname, "Holborn.");
    }

    #[tokio::test]
    async fn test_collect_keeps_line_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/predictionsummary/c"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUMMARY_XML))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/predictionsummary/w"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<ROOT><Time TimeStamp="2026/10/18 09:15:02"/><S Code="BNK" N="Bank."/><S Code="WLO" N="Waterloo."/></ROOT>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let upstream = UpstreamClient::with_base_url(server.uri()).unwrap();
        let list = collect_lines(&upstream, &lines(&["w", "c"])).await.unwrap();

        assert_eq!(list.lines.len(), 2);
        assert_eq!(list.lines[0].linecode, "w");
        assert_eq!(list.lines[0].linename, "Waterloo & City");
        assert_eq!(list.lines[0].stations.len(), 2);
        assert_eq!(list.lines[1].linecode, "c");
        assert_eq!(list.lines[1].stations[0].stationcode, "BNK");
    }

    #[tokio::test]
    async fn test_collect_fails_on_any_line() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/predictionsummary/c"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUMMARY_XML))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/predictionsummary/j"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let upstream = UpstreamClient::with_base_url(server.uri()).unwrap();
        let err = collect_lines(&upstream, &lines(&["c", "j"]))
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::UpstreamError(status) if status.code == 503));
    }

    #[tokio::test]
    async fn test_collect_requests_every_line() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUMMARY_XML))
            .expect(all_lines().len() as u64)
            .mount(&server)
            .await;

        let upstream = UpstreamClient::with_base_url(server.uri()).unwrap();
        let document = collect(&upstream).await.unwrap();

        let ResponseDocument::StationList(list) = document else {
            panic!("expected a station list");
        };
        let codes: Vec<&str> = list.lines.iter().map(|l| l.linecode.as_str()).collect();
        assert_eq!(codes, ["b", "c", "d", "h", "j", "m", "n", "p", "v", "w"]);
    }
}
