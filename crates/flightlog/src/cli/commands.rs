//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands, and turns the
//! flight arguments of `add` and `edit` into a [`NewFlight`].

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Subcommand};

use crate::error::{Error, Result};
use crate::flight::{FlightRecord, NewFlight};
use crate::reference::AirportDirectory;

/// Parse a time of day given as `HH:MM` or `HH:MM:SS`.
fn parse_time_of_day(text: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|_| format!("'{text}' is not a time of day (expected HH:MM or HH:MM:SS)"))
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Flight date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: NaiveDate,

    /// Flight number, e.g. BA117
    #[arg(short, long)]
    pub number: String,

    /// Aircraft model
    #[arg(short, long)]
    pub model: String,

    /// Take-off time (HH:MM or HH:MM:SS)
    #[arg(long, value_parser = parse_time_of_day)]
    pub take_off: NaiveTime,

    /// Landing time (HH:MM or HH:MM:SS)
    #[arg(long, value_parser = parse_time_of_day)]
    pub landing: NaiveTime,

    /// Departure airport IATA code
    #[arg(long)]
    pub from: String,

    /// Destination airport IATA code
    #[arg(long)]
    pub to: String,

    /// Operating carrier
    #[arg(long)]
    pub carrier: String,

    /// Explicit airport details instead of reference lookups
    #[command(flatten)]
    pub airports: AirportOverrides,
}

impl AddCommand {
    /// Build the candidate flight, resolving airports through `directory`
    /// wherever no explicit details were given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAirport`] if a code needs resolving and the
    /// directory is unavailable or doesn't know it.
    pub fn to_new_flight(&self, directory: Option<&AirportDirectory>) -> Result<NewFlight> {
        let departure = self.airports.departure(&self.from, directory)?;
        let destination = self.airports.destination(&self.to, directory)?;

        Ok(NewFlight {
            date: self.date,
            flight_number: self.number.clone(),
            plane_model: self.model.clone(),
            take_off_time: self.take_off,
            landing_time: self.landing,
            departure: departure.name,
            destination: destination.name,
            carrier: self.carrier.clone(),
            iata_departure: normalize_code(&self.from),
            iata_destination: normalize_code(&self.to),
            latitude_departure: departure.latitude,
            longitude_departure: departure.longitude,
            latitude_destination: destination.latitude,
            longitude_destination: destination.longitude,
            city_departure: departure.city,
            city_destination: destination.city,
        })
    }
}

/// Edit command arguments. Only the given fields change.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Key of the flight to edit
    pub key: String,

    /// New flight date (YYYY-MM-DD); may re-key the flight
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// New flight number
    #[arg(short, long)]
    pub number: Option<String>,

    /// New aircraft model
    #[arg(short, long)]
    pub model: Option<String>,

    /// New take-off time
    #[arg(long, value_parser = parse_time_of_day)]
    pub take_off: Option<NaiveTime>,

    /// New landing time
    #[arg(long, value_parser = parse_time_of_day)]
    pub landing: Option<NaiveTime>,

    /// New departure airport IATA code
    #[arg(long)]
    pub from: Option<String>,

    /// New destination airport IATA code
    #[arg(long)]
    pub to: Option<String>,

    /// New carrier
    #[arg(long)]
    pub carrier: Option<String>,

    /// Explicit airport details instead of reference lookups
    #[command(flatten)]
    pub airports: AirportOverrides,
}

impl EditCommand {
    /// Apply the given changes on top of the stored record.
    ///
    /// A changed airport code is re-resolved; explicit details always win.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedKey`] for a record with a bad key, or
    /// [`Error::UnknownAirport`] if a new code cannot be resolved.
    pub fn apply(
        &self,
        record: &FlightRecord,
        directory: Option<&AirportDirectory>,
    ) -> Result<NewFlight> {
        let mut flight = NewFlight::from_record(record)?;
        let overrides = &self.airports;

        if let Some(date) = self.date {
            flight.date = date;
        }
        if let Some(number) = &self.number {
            flight.flight_number.clone_from(number);
        }
        if let Some(model) = &self.model {
            flight.plane_model.clone_from(model);
        }
        if let Some(take_off) = self.take_off {
            flight.take_off_time = take_off;
        }
        if let Some(landing) = self.landing {
            flight.landing_time = landing;
        }
        if let Some(carrier) = &self.carrier {
            flight.carrier.clone_from(carrier);
        }

        let departure = match &self.from {
            Some(code) => {
                flight.iata_departure = normalize_code(code);
                overrides.departure(code, directory)?
            }
            None => overrides.departure_over(Endpoint {
                name: flight.departure.clone(),
                city: flight.city_departure.clone(),
                latitude: flight.latitude_departure,
                longitude: flight.longitude_departure,
            }),
        };
        let destination = match &self.to {
            Some(code) => {
                flight.iata_destination = normalize_code(code);
                overrides.destination(code, directory)?
            }
            None => overrides.destination_over(Endpoint {
                name: flight.destination.clone(),
                city: flight.city_destination.clone(),
                latitude: flight.latitude_destination,
                longitude: flight.longitude_destination,
            }),
        };

        flight.departure = departure.name;
        flight.city_departure = departure.city;
        flight.latitude_departure = departure.latitude;
        flight.longitude_departure = departure.longitude;
        flight.destination = destination.name;
        flight.city_destination = destination.city;
        flight.latitude_destination = destination.latitude;
        flight.longitude_destination = destination.longitude;

        Ok(flight)
    }
}

/// Airport details that bypass the reference dataset.
#[derive(Debug, Default, Args)]
pub struct AirportOverrides {
    /// Departure airport name
    #[arg(long)]
    pub departure_name: Option<String>,

    /// Departure city
    #[arg(long)]
    pub departure_city: Option<String>,

    /// Departure latitude
    #[arg(long, allow_hyphen_values = true)]
    pub departure_lat: Option<f64>,

    /// Departure longitude
    #[arg(long, allow_hyphen_values = true)]
    pub departure_lon: Option<f64>,

    /// Destination airport name
    #[arg(long)]
    pub destination_name: Option<String>,

    /// Destination city
    #[arg(long)]
    pub destination_city: Option<String>,

    /// Destination latitude
    #[arg(long, allow_hyphen_values = true)]
    pub destination_lat: Option<f64>,

    /// Destination longitude
    #[arg(long, allow_hyphen_values = true)]
    pub destination_lon: Option<f64>,
}

/// Resolved name, city and position of one end of a flight.
#[derive(Debug, Clone, PartialEq)]
struct Endpoint {
    name: String,
    city: String,
    latitude: f64,
    longitude: f64,
}

/// Explicit values for one endpoint, any of which may be absent.
struct Given<'a> {
    name: Option<&'a String>,
    city: Option<&'a String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl Given<'_> {
    fn complete(&self) -> Option<Endpoint> {
        Some(Endpoint {
            name: self.name?.clone(),
            city: self.city?.clone(),
            latitude: self.latitude?,
            longitude: self.longitude?,
        })
    }

    fn over(&self, base: Endpoint) -> Endpoint {
        Endpoint {
            name: self.name.cloned().unwrap_or(base.name),
            city: self.city.cloned().unwrap_or(base.city),
            latitude: self.latitude.unwrap_or(base.latitude),
            longitude: self.longitude.unwrap_or(base.longitude),
        }
    }

    fn resolve(&self, code: &str, directory: Option<&AirportDirectory>) -> Result<Endpoint> {
        if let Some(endpoint) = self.complete() {
            return Ok(endpoint);
        }

        let unknown = || Error::UnknownAirport {
            iata: code.to_string(),
        };
        let airport = directory.ok_or_else(unknown)?.lookup(code)?.ok_or_else(unknown)?;
        Ok(self.over(Endpoint {
            name: airport.name,
            city: airport.city,
            latitude: airport.latitude,
            longitude: airport.longitude,
        }))
    }
}

impl AirportOverrides {
    fn given_departure(&self) -> Given<'_> {
        Given {
            name: self.departure_name.as_ref(),
            city: self.departure_city.as_ref(),
            latitude: self.departure_lat,
            longitude: self.departure_lon,
        }
    }

    fn given_destination(&self) -> Given<'_> {
        Given {
            name: self.destination_name.as_ref(),
            city: self.destination_city.as_ref(),
            latitude: self.destination_lat,
            longitude: self.destination_lon,
        }
    }

    fn departure(&self, code: &str, directory: Option<&AirportDirectory>) -> Result<Endpoint> {
        self.given_departure().resolve(code, directory)
    }

    fn destination(&self, code: &str, directory: Option<&AirportDirectory>) -> Result<Endpoint> {
        self.given_destination().resolve(code, directory)
    }

    fn departure_over(&self, base: Endpoint) -> Endpoint {
        self.given_departure().over(base)
    }

    fn destination_over(&self, base: Endpoint) -> Endpoint {
        self.given_destination().over(base)
    }

    /// Whether no departure or destination detail was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.departure_name.is_none()
            && self.departure_city.is_none()
            && self.departure_lat.is_none()
            && self.departure_lon.is_none()
            && self.destination_name.is_none()
            && self.destination_city.is_none()
            && self.destination_lat.is_none()
            && self.destination_lon.is_none()
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show flights from this year
    #[arg(short, long)]
    pub year: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Key of the flight to show
    pub key: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export commands.
#[derive(Debug, Subcommand)]
pub enum ExportCommand {
    /// Write every flight as a JSON object keyed by flight key
    Json {
        /// Output file, resolved against the export directory
        #[arg(default_value = "flights.json")]
        output: PathBuf,
    },

    /// Print every flight as a tab-separated table
    Table {
        /// Write to this file instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Airport lookup arguments.
#[derive(Debug, Args)]
pub struct AirportCommand {
    /// IATA code to look up; lists every code when omitted
    pub code: Option<String>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::tests::sample_flight;
    use crate::reference::tests::create_test_airports;

    fn add_command(from: &str, to: &str) -> AddCommand {
        AddCommand {
            date: NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
            number: "AF1081".to_string(),
            model: "Airbus A320".to_string(),
            take_off: NaiveTime::from_hms_opt(7, 10, 0).unwrap(),
            landing: NaiveTime::from_hms_opt(9, 25, 0).unwrap(),
            from: from.to_string(),
            to: to.to_string(),
            carrier: "Air France".to_string(),
            airports: AirportOverrides::default(),
        }
    }

    fn edit_command(key: &str) -> EditCommand {
        EditCommand {
            key: key.to_string(),
            date: None,
            number: None,
            model: None,
            take_off: None,
            landing: None,
            from: None,
            to: None,
            carrier: None,
            airports: AirportOverrides::default(),
        }
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(
            parse_time_of_day("07:10").unwrap(),
            NaiveTime::from_hms_opt(7, 10, 0).unwrap()
        );
        assert_eq!(
            parse_time_of_day("23:59:30").unwrap(),
            NaiveTime::from_hms_opt(23, 59, 30).unwrap()
        );
        assert!(parse_time_of_day("7pm").is_err());
        assert!(parse_time_of_day("25:00").is_err());
    }

    #[test]
    fn test_add_resolves_airports() {
        let path = create_test_airports("cli_add");
        let directory = AirportDirectory::open(&path).unwrap();

        let flight = add_command("cdg", "LHR").to_new_flight(Some(&directory)).unwrap();
        assert_eq!(flight.iata_departure, "CDG");
        assert_eq!(flight.departure, "Charles de Gaulle");
        assert_eq!(flight.city_departure, "Paris");
        assert_eq!(flight.city_destination, "London");
        assert_eq!(flight.duration().to_string(), "2:15:00");
        assert!(flight.validate().is_ok());

        drop(directory);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_add_unknown_airport() {
        let path = create_test_airports("cli_unknown");
        let directory = AirportDirectory::open(&path).unwrap();

        let err = add_command("ZZZ", "LHR")
            .to_new_flight(Some(&directory))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownAirport { iata } if iata == "ZZZ"));

        drop(directory);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_add_with_explicit_details_needs_no_directory() {
        let mut cmd = add_command("XXA", "XXB");
        cmd.airports = AirportOverrides {
            departure_name: Some("Alpha Field".to_string()),
            departure_city: Some("Alpha".to_string()),
            departure_lat: Some(10.0),
            departure_lon: Some(-20.0),
            destination_name: Some("Bravo Field".to_string()),
            destination_city: Some("Bravo".to_string()),
            destination_lat: Some(-30.0),
            destination_lon: Some(40.0),
        };
        assert!(!cmd.airports.is_empty());

        let flight = cmd.to_new_flight(None).unwrap();
        assert_eq!(flight.departure, "Alpha Field");
        assert_eq!(flight.city_destination, "Bravo");

        let err = add_command("XXA", "XXB").to_new_flight(None).unwrap_err();
        assert!(matches!(err, Error::UnknownAirport { .. }));
    }

    #[test]
    fn test_partial_override_fills_from_directory() {
        let path = create_test_airports("cli_partial");
        let directory = AirportDirectory::open(&path).unwrap();

        let mut cmd = add_command("LHR", "JFK");
        cmd.airports.destination_city = Some("NYC".to_string());
        let flight = cmd.to_new_flight(Some(&directory)).unwrap();
        assert_eq!(flight.city_destination, "NYC");
        assert_eq!(flight.destination, "John F Kennedy Intl");

        drop(directory);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_edit_keeps_unchanged_fields() {
        let record = FlightRecord::from_new("2021-05-01-(1)".to_string(), &sample_flight("2021-05-01"));

        let mut cmd = edit_command(&record.key);
        cmd.carrier = Some("Virgin Atlantic".to_string());
        cmd.landing = Some(NaiveTime::from_hms_opt(12, 0, 0).unwrap());

        let flight = cmd.apply(&record, None).unwrap();
        assert_eq!(flight.carrier, "Virgin Atlantic");
        assert_eq!(flight.date, NaiveDate::from_ymd_opt(2021, 5, 1).unwrap());
        assert_eq!(flight.iata_departure, "LHR");
        assert_eq!(flight.city_departure, "London");
        assert_eq!(flight.duration().to_string(), "3:30:00");
    }

    #[test]
    fn test_edit_new_destination_is_resolved() {
        let path = create_test_airports("cli_edit");
        let directory = AirportDirectory::open(&path).unwrap();
        let record = FlightRecord::from_new("2021-05-01".to_string(), &sample_flight("2021-05-01"));

        let mut cmd = edit_command(&record.key);
        cmd.to = Some("CDG".to_string());
        let flight = cmd.apply(&record, Some(&directory)).unwrap();
        assert_eq!(flight.iata_destination, "CDG");
        assert_eq!(flight.city_destination, "Paris");
        assert_eq!(flight.city_departure, "London");

        drop(directory);
        let _ = std::fs::remove_file(&path);
    }
}
