use std::{
    fmt,
    str::FromStr,
};

use color_eyre::eyre::WrapErr;
use reqwest::Client;
use serde::Deserialize;
use structopt::StructOpt;
use thiserror::Error as ThisError;
use url::Url;

use crate::{
    args::SearchConfig,
    auth::Credentials,
    Error,
};

/// The catalog caps a search at this many records. We don't paginate, so any
/// further matches are simply absent from the result.
pub const MAX_RECORDS: usize = 500;

pub const DEFAULT_HOST: &'static str = "https://peps.cnes.fr";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collection {
    S1,
    S2,
    S3,
}

impl Collection {
    pub const VARIANTS: &'static [&'static str] = &["S1", "S2", "S3"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S1 => "S1",
            Self::S2 => "S2",
            Self::S3 => "S3",
        }
    }
}

#[derive(Debug, ThisError)]
#[error("unknown collection `{0}`, expected one of S1, S2, S3")]
pub struct UnknownCollection(String);

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "S1" => Ok(Self::S1),
            "S2" => Ok(Self::S2),
            "S3" => Ok(Self::S3),
            _ => Err(UnknownCollection(s.to_owned())),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The way to specify the search target.
///
/// Coordinates are kept as given on the command line and passed to the
/// catalog verbatim.
#[derive(Clone, Debug, PartialEq, Eq, StructOpt)]
pub enum SpatialTarget {
    /// City or town used as a keyword, e.g.: location -l Gdansk
    Location {
        /// Location to use as a keyword
        #[structopt(short, long)]
        location: String,
    },

    /// Point given with --lon and --lat
    Point {
        /// Longitude in decimal degrees
        #[structopt(long, allow_hyphen_values = true)]
        lon: String,

        /// Latitude in decimal degrees
        #[structopt(long, allow_hyphen_values = true)]
        lat: String,
    },

    /// Rectangle given with --lonmin --lonmax --latmin --latmax
    Rectangle {
        /// Minimal longitude in decimal degrees
        #[structopt(long = "lonmin", allow_hyphen_values = true)]
        lon_min: String,

        /// Maximal longitude in decimal degrees
        #[structopt(long = "lonmax", allow_hyphen_values = true)]
        lon_max: String,

        /// Minimal latitude in decimal degrees
        #[structopt(long = "latmin", allow_hyphen_values = true)]
        lat_min: String,

        /// Maximal latitude in decimal degrees
        #[structopt(long = "latmax", allow_hyphen_values = true)]
        lat_max: String,
    },
}

impl SpatialTarget {
    pub fn query_fragment(&self) -> String {
        match self {
            Self::Location { location } => format!("q={location}"),
            Self::Point { lon, lat } => format!("lat={lat}&lon={lon}"),
            // the catalog expects the latitude pair first
            Self::Rectangle {
                lon_min,
                lon_max,
                lat_min,
                lat_max,
            } => format!("box={lat_min},{lat_max},{lon_min},{lon_max}"),
        }
    }
}

fn host_prefix(host: &Url) -> &str {
    host.as_str().trim_end_matches('/')
}

pub fn build_search_url(config: &SearchConfig) -> String {
    format!(
        "{host}/resto/api/collections/{collection}/search.json?{target}&startDate={start}&completionDate={end}&maxRecords={MAX_RECORDS}",
        host = host_prefix(&config.host),
        collection = config.collection,
        target = config.target.query_fragment(),
        start = config.start_date,
        end = config.end_date,
    )
}

pub fn build_download_url(config: &SearchConfig, id: &str) -> String {
    format!(
        "{host}/resto/collections/{collection}/{id}/download/?issuerId={issuer}",
        host = host_prefix(&config.host),
        collection = config.collection,
        issuer = config.issuer,
    )
}

/// A single catalog search result.
#[derive(Clone, Debug, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub properties: ProductProperties,
}

impl ProductRecord {
    pub fn product_identifier(&self) -> &str {
        &self.properties.product_identifier
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductProperties {
    pub product_identifier: String,

    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    features: Vec<ProductRecord>,
}

pub fn parse_search_response(body: &[u8]) -> Result<Vec<ProductRecord>, Error> {
    let response: SearchResponse =
        serde_json::from_slice(body).wrap_err("failed to decode catalog search response")?;
    Ok(response.features)
}

pub async fn search(
    client: &Client,
    url: &str,
    credentials: &Credentials,
) -> Result<Vec<ProductRecord>, Error> {
    let response = client
        .get(url)
        .basic_auth(&credentials.username, Some(&credentials.password))
        .send()
        .await?
        .error_for_status()?;

    let body = response.bytes().await?;
    let records = parse_search_response(&body)?;

    tracing::debug!(records = records.len(), "search complete");
    if records.len() >= MAX_RECORDS {
        tracing::warn!(
            "catalog returned {MAX_RECORDS} records, further results are not fetched. narrow the search."
        );
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::tests::config;

    #[test]
    fn location_fragment() {
        let target = SpatialTarget::Location {
            location: "Gdansk".to_owned(),
        };
        assert_eq!(target.query_fragment(), "q=Gdansk");
    }

    #[test]
    fn point_fragment() {
        let target = SpatialTarget::Point {
            lon: "18.6".to_owned(),
            lat: "54.3".to_owned(),
        };
        assert_eq!(target.query_fragment(), "lat=54.3&lon=18.6");
    }

    #[test]
    fn rectangle_fragment_puts_latitude_first() {
        let target = SpatialTarget::Rectangle {
            lon_min: "1".to_owned(),
            lon_max: "2".to_owned(),
            lat_min: "3".to_owned(),
            lat_max: "4".to_owned(),
        };
        assert_eq!(target.query_fragment(), "box=3,4,1,2");
    }

    #[test]
    fn search_url() {
        let config = config(SpatialTarget::Location {
            location: "Gdansk".to_owned(),
        });
        assert_eq!(
            build_search_url(&config),
            "https://peps.cnes.fr/resto/api/collections/S2/search.json?q=Gdansk&startDate=2024-01-01&completionDate=2024-02-01&maxRecords=500"
        );
    }

    #[test]
    fn download_url() {
        let config = config(SpatialTarget::Location {
            location: "Gdansk".to_owned(),
        });
        assert_eq!(
            build_download_url(&config, "abc-123"),
            "https://peps.cnes.fr/resto/collections/S2/abc-123/download/?issuerId=peps"
        );
    }

    #[test]
    fn collection_parsing() {
        assert_eq!("S1".parse::<Collection>().unwrap(), Collection::S1);
        assert_eq!("s3".parse::<Collection>().unwrap(), Collection::S3);
        assert!("S4".parse::<Collection>().is_err());
        assert_eq!(Collection::S2.to_string(), "S2");
    }

    #[test]
    fn parses_features() {
        let body = br#"{
            "type": "FeatureCollection",
            "features": [
                {"id": "a", "properties": {"productIdentifier": "S2A_ONE_R008", "cloudCover": 3}},
                {"id": "b", "properties": {"productIdentifier": "S2B_TWO_R012"}}
            ]
        }"#;
        let records = parse_search_response(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[0].product_identifier(), "S2A_ONE_R008");
        assert_eq!(records[0].properties.other["cloudCover"], 3);
        assert_eq!(records[1].product_identifier(), "S2B_TWO_R012");
    }

    #[test]
    fn missing_features_is_an_error() {
        assert!(parse_search_response(br#"{"type": "FeatureCollection"}"#).is_err());
        assert!(parse_search_response(b"<html>not json</html>").is_err());
    }
}
