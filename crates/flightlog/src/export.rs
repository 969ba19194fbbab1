//! Export views over the flight log.
//!
//! Two shapes are offered: a table of the fifteen visible columns, and a
//! JSON object keyed by record key carrying the same fields plus take-off and
//! landing times.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::duration::FlightDuration;
use crate::error::{Error, Result};
use crate::flight::{FlightRecord, TIME_FORMAT};

/// Header row of the tabular export.
pub const TABULAR_COLUMNS: [&str; 15] = [
    "Date",
    "Number",
    "Model",
    "Duration",
    "Carrier",
    "Departure",
    "Destination",
    "Departure IATA",
    "Destination IATA",
    "Departure latitude",
    "Departure longitude",
    "Departure city",
    "Destination city",
    "Destination latitude",
    "Destination longitude",
];

/// One record rendered as [`TABULAR_COLUMNS`] cells.
#[must_use]
pub fn tabular_row(record: &FlightRecord) -> [String; 15] {
    [
        record.key.clone(),
        record.flight_number.clone(),
        record.plane_model.clone(),
        record.flight_duration.to_string(),
        record.carrier.clone(),
        record.departure.clone(),
        record.destination.clone(),
        record.iata_departure.clone(),
        record.iata_destination.clone(),
        record.latitude_departure.to_string(),
        record.longitude_departure.to_string(),
        record.city_departure.clone(),
        record.city_destination.clone(),
        record.latitude_destination.to_string(),
        record.longitude_destination.to_string(),
    ]
}

/// Every record as a table row, in the order given.
#[must_use]
pub fn tabular_rows(records: &[FlightRecord]) -> Vec<[String; 15]> {
    records.iter().map(tabular_row).collect()
}

/// Write the header and one tab-separated line per record.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_tabular<W: Write>(mut out: W, records: &[FlightRecord]) -> Result<()> {
    writeln!(out, "{}", TABULAR_COLUMNS.join("\t"))?;
    for row in tabular_rows(records) {
        writeln!(out, "{}", row.join("\t"))?;
    }
    out.flush()?;
    Ok(())
}

/// Entry of the keyed export.
#[derive(Debug, Serialize)]
struct KeyedEntry<'a> {
    date: &'a str,
    flight_number: &'a str,
    plane_model: &'a str,
    take_off_time: String,
    landing_time: String,
    flight_duration: FlightDuration,
    departure: &'a str,
    destination: &'a str,
    carrier: &'a str,
    iata_departure: &'a str,
    iata_destination: &'a str,
    latitude_departure: f64,
    longitude_departure: f64,
    latitude_destination: f64,
    longitude_destination: f64,
    city_departure: &'a str,
    city_destination: &'a str,
}

impl<'a> From<&'a FlightRecord> for KeyedEntry<'a> {
    fn from(record: &'a FlightRecord) -> Self {
        Self {
            date: &record.key,
            flight_number: &record.flight_number,
            plane_model: &record.plane_model,
            take_off_time: record.take_off_time.format(TIME_FORMAT).to_string(),
            landing_time: record.landing_time.format(TIME_FORMAT).to_string(),
            flight_duration: record.flight_duration,
            departure: &record.departure,
            destination: &record.destination,
            carrier: &record.carrier,
            iata_departure: &record.iata_departure,
            iata_destination: &record.iata_destination,
            latitude_departure: record.latitude_departure,
            longitude_departure: record.longitude_departure,
            latitude_destination: record.latitude_destination,
            longitude_destination: record.longitude_destination,
            city_departure: &record.city_departure,
            city_destination: &record.city_destination,
        }
    }
}

/// Build the keyed JSON object.
///
/// # Errors
///
/// Returns [`Error::Json`] if a record cannot be serialized, which happens
/// only for non-finite coordinates.
pub fn keyed_json(records: &[FlightRecord]) -> Result<Value> {
    let mut object = Map::with_capacity(records.len());
    for record in records {
        let entry = serde_json::to_value(KeyedEntry::from(record))?;
        object.insert(record.key.clone(), entry);
    }
    Ok(Value::Object(object))
}

/// Write the keyed JSON export to `path`, pretty-printed.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_keyed_json(path: impl AsRef<Path>, records: &[FlightRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let value = keyed_json(records)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &value)?;
    writer.flush()?;

    info!("Exported {} flights to {}", records.len(), path.display());
    Ok(())
}
