//! `SQLite` schema definitions for flightlog.
//!
//! The store is a single table. Its column list is shared by every query so
//! row decoding can rely on column positions.

/// SQL statement to create the flights table.
pub const CREATE_FLIGHTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS flights (
    key TEXT PRIMARY KEY NOT NULL,
    flight_number TEXT NOT NULL,
    plane_model TEXT NOT NULL,
    take_off_time TEXT NOT NULL,
    landing_time TEXT NOT NULL,
    flight_duration TEXT NOT NULL,
    departure TEXT NOT NULL,
    destination TEXT NOT NULL,
    carrier TEXT NOT NULL,
    iata_departure TEXT NOT NULL,
    iata_destination TEXT NOT NULL,
    latitude_departure REAL NOT NULL,
    longitude_departure REAL NOT NULL,
    latitude_destination REAL NOT NULL,
    longitude_destination REAL NOT NULL,
    city_departure TEXT NOT NULL,
    city_destination TEXT NOT NULL
)
";

/// The flights table columns, in storage order.
pub const COLUMN_NAMES: [&str; 17] = [
    "key",
    "flight_number",
    "plane_model",
    "take_off_time",
    "landing_time",
    "flight_duration",
    "departure",
    "destination",
    "carrier",
    "iata_departure",
    "iata_destination",
    "latitude_departure",
    "longitude_departure",
    "latitude_destination",
    "longitude_destination",
    "city_departure",
    "city_destination",
];

/// Column list for `SELECT` statements, matching [`COLUMN_NAMES`].
pub const SELECT_COLUMNS: &str = r"
    key, flight_number, plane_model, take_off_time, landing_time,
    flight_duration, departure, destination, carrier,
    iata_departure, iata_destination,
    latitude_departure, longitude_departure,
    latitude_destination, longitude_destination,
    city_departure, city_destination
";

/// SQL statement to insert one flight.
pub const INSERT_FLIGHT: &str = r"
INSERT INTO flights (
    key, flight_number, plane_model, take_off_time, landing_time,
    flight_duration, departure, destination, carrier,
    iata_departure, iata_destination,
    latitude_departure, longitude_departure,
    latitude_destination, longitude_destination,
    city_departure, city_destination
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_FLIGHTS_TABLE];
