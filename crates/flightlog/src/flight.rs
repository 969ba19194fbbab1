//! Core flight record types.
//!
//! [`NewFlight`] is what a caller builds before anything is written: the
//! flight date plus every user-supplied field. [`FlightRecord`] is what the
//! store hands back, with its derived key and the duration snapshot taken at
//! write time.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::duration::FlightDuration;
use crate::error::{Error, Result};
use crate::key;

/// Serde adapter storing times of day as `HH:MM:SS`.
mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M:%S";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&text, FORMAT).map_err(serde::de::Error::custom)
    }
}

pub use time_of_day::FORMAT as TIME_FORMAT;

/// One logged flight as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    /// Unique identity, `YYYY-MM-DD` with an optional `-(n)` disambiguator.
    pub key: String,
    /// Carrier flight number, e.g. `BA117`.
    pub flight_number: String,
    /// Aircraft model, e.g. `Boeing 777-300ER`.
    pub plane_model: String,
    /// Local time of take-off.
    #[serde(with = "time_of_day")]
    pub take_off_time: NaiveTime,
    /// Local time of landing.
    #[serde(with = "time_of_day")]
    pub landing_time: NaiveTime,
    /// Elapsed time, computed from take-off and landing when written.
    pub flight_duration: FlightDuration,
    /// Departure airport name.
    pub departure: String,
    /// Destination airport name.
    pub destination: String,
    /// Operating carrier.
    pub carrier: String,
    /// Departure airport IATA code.
    pub iata_departure: String,
    /// Destination airport IATA code.
    pub iata_destination: String,
    /// Departure airport latitude.
    pub latitude_departure: f64,
    /// Departure airport longitude.
    pub longitude_departure: f64,
    /// Destination airport latitude.
    pub latitude_destination: f64,
    /// Destination airport longitude.
    pub longitude_destination: f64,
    /// Departure city.
    pub city_departure: String,
    /// Destination city.
    pub city_destination: String,
}

impl FlightRecord {
    /// Build a record from a candidate flight and an already-derived key.
    ///
    /// The duration is computed here, once.
    #[must_use]
    pub fn from_new(key: String, flight: &NewFlight) -> Self {
        Self {
            key,
            flight_number: flight.flight_number.clone(),
            plane_model: flight.plane_model.clone(),
            take_off_time: flight.take_off_time,
            landing_time: flight.landing_time,
            flight_duration: flight.duration(),
            departure: flight.departure.clone(),
            destination: flight.destination.clone(),
            carrier: flight.carrier.clone(),
            iata_departure: flight.iata_departure.clone(),
            iata_destination: flight.iata_destination.clone(),
            latitude_departure: flight.latitude_departure,
            longitude_departure: flight.longitude_departure,
            latitude_destination: flight.latitude_destination,
            longitude_destination: flight.longitude_destination,
            city_departure: flight.city_departure.clone(),
            city_destination: flight.city_destination.clone(),
        }
    }

    /// The flight date encoded in the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedKey`] if the key is not date-shaped.
    pub fn date(&self) -> Result<NaiveDate> {
        key::strip_disambiguator(&self.key)
    }

    /// The 4-digit year prefix of the key.
    #[must_use]
    pub fn year(&self) -> &str {
        self.key.get(..4).unwrap_or(&self.key)
    }

    /// Check every mandatory field, including the key's shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first empty field, or
    /// [`Error::MalformedKey`] if the key is not date-shaped.
    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(Error::Validation { field: "key" });
        }
        NewFlight::from_record(self)?.validate()
    }
}

/// A flight as entered by the user, before a key is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFlight {
    /// Calendar date of the flight; the source of the record key.
    pub date: NaiveDate,
    /// Carrier flight number.
    pub flight_number: String,
    /// Aircraft model.
    pub plane_model: String,
    /// Local time of take-off.
    #[serde(with = "time_of_day")]
    pub take_off_time: NaiveTime,
    /// Local time of landing.
    #[serde(with = "time_of_day")]
    pub landing_time: NaiveTime,
    /// Departure airport name.
    pub departure: String,
    /// Destination airport name.
    pub destination: String,
    /// Operating carrier.
    pub carrier: String,
    /// Departure airport IATA code.
    pub iata_departure: String,
    /// Destination airport IATA code.
    pub iata_destination: String,
    /// Departure airport latitude.
    pub latitude_departure: f64,
    /// Departure airport longitude.
    pub longitude_departure: f64,
    /// Destination airport latitude.
    pub latitude_destination: f64,
    /// Destination airport longitude.
    pub longitude_destination: f64,
    /// Departure city.
    pub city_departure: String,
    /// Destination city.
    pub city_destination: String,
}

impl NewFlight {
    /// Turn a stored record back into an editable candidate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedKey`] if the record's key is not date-shaped.
    pub fn from_record(record: &FlightRecord) -> Result<Self> {
        Ok(Self {
            date: record.date()?,
            flight_number: record.flight_number.clone(),
            plane_model: record.plane_model.clone(),
            take_off_time: record.take_off_time,
            landing_time: record.landing_time,
            departure: record.departure.clone(),
            destination: record.destination.clone(),
            carrier: record.carrier.clone(),
            iata_departure: record.iata_departure.clone(),
            iata_destination: record.iata_destination.clone(),
            latitude_departure: record.latitude_departure,
            longitude_departure: record.longitude_departure,
            latitude_destination: record.latitude_destination,
            longitude_destination: record.longitude_destination,
            city_departure: record.city_departure.clone(),
            city_destination: record.city_destination.clone(),
        })
    }

    /// Elapsed time between take-off and landing.
    #[must_use]
    pub fn duration(&self) -> FlightDuration {
        FlightDuration::between(self.take_off_time, self.landing_time)
    }

    /// Check that no mandatory field is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        validate_fields(&[
            ("flight_number", &self.flight_number),
            ("plane_model", &self.plane_model),
            ("departure", &self.departure),
            ("destination", &self.destination),
            ("carrier", &self.carrier),
            ("iata_departure", &self.iata_departure),
            ("iata_destination", &self.iata_destination),
            ("city_departure", &self.city_departure),
            ("city_destination", &self.city_destination),
        ])?;
        validate_coordinates(&[
            ("latitude_departure", self.latitude_departure),
            ("longitude_departure", self.longitude_departure),
            ("latitude_destination", self.latitude_destination),
            ("longitude_destination", self.longitude_destination),
        ])
    }
}

fn validate_fields(fields: &[(&'static str, &String)]) -> Result<()> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((field, _)) => Err(Error::Validation { field: *field }),
        None => Ok(()),
    }
}

fn validate_coordinates(fields: &[(&'static str, f64)]) -> Result<()> {
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some((field, _)) => Err(Error::Validation { field: *field }),
        None => Ok(()),
    }
}
