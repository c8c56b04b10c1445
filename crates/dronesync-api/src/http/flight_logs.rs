// Flight data record endpoints
//
// Lite flight records are listed, downloaded one by one and deleted on
// the drone once safely stored locally.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::Error;
use crate::http::client::DroneClient;

const BASE_API: &str = "api/v1/fdr/lite_records";

/// One flight record available on the drone.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlightLogRecord {
    pub name: String,
    #[serde(deserialize_with = "drone_date")]
    pub date: DateTime<Utc>,
    /// Server path of the record content.
    #[serde(rename = "url")]
    pub url_path: String,
}

/// Accept RFC 3339 as well as the drone's compact `20190926T153004+0200` form.
fn drone_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if let Ok(date) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_str(&raw, "%Y%m%dT%H%M%S%z") {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y%m%dT%H%M%S")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

impl DroneClient {
    /// List the flight records stored on the drone.
    ///
    /// `GET /api/v1/fdr/lite_records`
    pub async fn list_flight_logs(&self) -> Result<Vec<FlightLogRecord>, Error> {
        let url = self.api_url(BASE_API)?;
        debug!("listing flight logs");
        self.get_json(url).await
    }

    /// Download a record's content to `destination`.
    pub async fn download_flight_log(
        &self,
        record: &FlightLogRecord,
        destination: &Path,
    ) -> Result<(), Error> {
        let url = self.api_url(&record.url_path)?;
        self.download(url, destination).await
    }

    /// Delete a record from the drone.
    ///
    /// `DELETE /api/v1/fdr/lite_records/lite_records/{name}`
    pub async fn delete_flight_log(&self, record: &FlightLogRecord) -> Result<(), Error> {
        let url = self.api_url(&format!("{BASE_API}/lite_records/{}", record.name))?;
        debug!(name = %record.name, "deleting flight log");
        self.delete(url).await
    }
}
