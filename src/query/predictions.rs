//! Shaping of TrackerNet prediction feeds
//!
//! Detailed predictions come from a namespaced document describing one
//! station; summary predictions come from an unqualified document covering a
//! whole line.

use roxmltree::Document;

use super::xml::{self, Tag};
use crate::data::{
    DetailedInformation, DetailedPlatform, DetailedPrediction, DetailedStation, DetailedTrain,
    ResponseDocument, SummaryPlatform, SummaryPrediction, SummaryStation, SummaryTrain,
};
use crate::error::Result;

/// Namespace of the detailed prediction feed
pub const DETAILED_NAMESPACE: &str = "http://trackernet.lul.co.uk";

const DETAILED_CREATED: Tag = Tag::qualified(DETAILED_NAMESPACE, "WhenCreated");
const DETAILED_LINE: Tag = Tag::qualified(DETAILED_NAMESPACE, "Line");
const DETAILED_LINE_NAME: Tag = Tag::qualified(DETAILED_NAMESPACE, "LineName");
const DETAILED_STATION: Tag = Tag::qualified(DETAILED_NAMESPACE, "S");
const DETAILED_PLATFORM: Tag = Tag::qualified(DETAILED_NAMESPACE, "P");
const DETAILED_TRAIN: Tag = Tag::qualified(DETAILED_NAMESPACE, "T");

pub(crate) const SUMMARY_TIME: Tag = Tag::local("Time");
pub(crate) const SUMMARY_STATION: Tag = Tag::local("S");
const SUMMARY_PLATFORM: Tag = Tag::local("P");
const SUMMARY_TRAIN: Tag = Tag::local("T");

/// Shapes a detailed prediction document
pub fn shape_detailed(doc: &Document<'_>) -> Result<ResponseDocument> {
    detailed(doc).map(ResponseDocument::Detailed)
}

/// Shapes a summary prediction document
pub fn shape_summary(doc: &Document<'_>) -> Result<ResponseDocument> {
    summary(doc).map(ResponseDocument::Summary)
}

pub fn detailed(doc: &Document<'_>) -> Result<DetailedPrediction> {
    let root = doc.root_element();

    let stations = xml::children(root, DETAILED_STATION)
        .map(|station| -> Result<DetailedStation> {
            let platforms = xml::children(station, DETAILED_PLATFORM)
                .map(|platform| -> Result<DetailedPlatform> {
                    let trains = xml::children(platform, DETAILED_TRAIN)
                        .map(|train| -> Result<DetailedTrain> {
                            Ok(DetailedTrain {
                                lcid: xml::attr(train, "LCID"),
                                timeto: xml::attr(train, "TimeTo"),
                                secondsto: xml::attr(train, "SecondsTo"),
                                location: xml::attr(train, "Location"),
                                destination: xml::attr(train, "Destination"),
                                destcode: xml::int_attr(train, "DestCode")?,
                                tripno: xml::int_attr(train, "TripNo")?,
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;

                    Ok(DetailedPlatform {
                        platformname: xml::attr(platform, "N"),
                        platformnumber: xml::required_int_attr(platform, "Num")?,
                        trains,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(DetailedStation {
                stationcode: xml::attr(station, "Code"),
                stationname: xml::attr(station, "N"),
                platforms,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DetailedPrediction {
        information: DetailedInformation {
            created: xml::text(xml::child(root, DETAILED_CREATED)?),
            linecode: xml::text(xml::child(root, DETAILED_LINE)?),
            linename: xml::text(xml::child(root, DETAILED_LINE_NAME)?),
            stations,
        },
    })
}

pub fn summary(doc: &Document<'_>) -> Result<SummaryPrediction> {
    let root = doc.root_element();
    let created = xml::attr(xml::child(root, SUMMARY_TIME)?, "TimeStamp");

    let stations = xml::children(root, SUMMARY_STATION)
        .map(|station| -> Result<SummaryStation> {
            let platforms = xml::children(station, SUMMARY_PLATFORM)
                .map(|platform| -> Result<SummaryPlatform> {
                    let trains = xml::children(platform, SUMMARY_TRAIN)
                        .map(|train| -> Result<SummaryTrain> {
                            Ok(SummaryTrain {
                                trainnumber: xml::int_attr(train, "S")?,
                                tripno: xml::int_attr(train, "T")?,
                                destcode: xml::int_attr(train, "D")?,
                                destination: xml::attr(train, "DE"),
                                timeto: xml::attr(train, "C"),
                                location: xml::attr(train, "L"),
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;

                    Ok(SummaryPlatform {
                        platformname: xml::attr(platform, "N"),
                        platformcode: xml::int_attr(platform, "Code")?,
                        trains,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(SummaryStation {
                stationcode: xml::attr(station, "Code"),
                stationname: xml::attr(station, "N"),
                platforms,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SummaryPrediction { created, stations })
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const DETAILED_XML: &str = include_str!("../../tests/fixtures/predictiondetailed.xml");
    pub const SUMMARY_XML: &str = include_str!("../../tests/fixtures/predictionsummary.xml");
}
