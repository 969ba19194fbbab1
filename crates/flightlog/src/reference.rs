//! Read-only reference airport dataset.
//!
//! The airports file is a separate `SQLite` database with a single
//! `airports(iata, name, city, latitude, longitude)` table. It is opened once
//! and handed to whoever needs to resolve an IATA code.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Code used by the dataset for its "no selection" row.
const PLACEHOLDER_CODE: &str = "---";

/// One airport from the reference dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airport {
    /// Three-letter IATA code.
    pub iata: String,
    /// Airport name.
    pub name: String,
    /// City served.
    pub city: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Lookup handle over the reference airports file.
#[derive(Debug)]
pub struct AirportDirectory {
    path: PathBuf,
    conn: Connection,
}

impl AirportDirectory {
    /// Open the airports file read-only.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
            |source| Error::DatabaseOpen {
                path: path.clone(),
                source,
            },
        )?;

        debug!("Opened airport reference data at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Get the path to the airports file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Find an airport by IATA code, case-insensitively.
    ///
    /// Returns `None` for unknown codes and for the placeholder row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn lookup(&self, iata: &str) -> Result<Option<Airport>> {
        let code = iata.trim().to_uppercase();
        if code.is_empty() || code == PLACEHOLDER_CODE {
            return Ok(None);
        }

        let airport = self
            .conn
            .query_row(
                "SELECT iata, name, city, latitude, longitude FROM airports WHERE iata = ?1",
                [&code],
                |row| {
                    Ok(Airport {
                        iata: row.get(0)?,
                        name: row.get(1)?,
                        city: row.get(2)?,
                        latitude: row.get(3)?,
                        longitude: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(airport)
    }

    /// Like [`lookup`](Self::lookup), but an unknown code is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAirport`] if the code is not in the dataset.
    pub fn require(&self, iata: &str) -> Result<Airport> {
        self.lookup(iata)?.ok_or_else(|| Error::UnknownAirport {
            iata: iata.to_string(),
        })
    }

    /// Every IATA code in the dataset, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn codes(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT iata FROM airports WHERE iata != ?1 ORDER BY iata ASC")?;
        let codes = stmt
            .query_map([PLACEHOLDER_CODE], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(codes)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Write a small airports file and return its path.
    pub(crate) fn create_test_airports(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "flightlog_airports_{}_{name}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE airports (iata TEXT, name TEXT, city TEXT, latitude REAL, longitude REAL);
             INSERT INTO airports VALUES ('---', '', '', 0.0, 0.0);
             INSERT INTO airports VALUES ('LHR', 'London Heathrow', 'London', 51.4706, -0.461941);
             INSERT INTO airports VALUES ('JFK', 'John F Kennedy Intl', 'New York', 40.639751, -73.778925);
             INSERT INTO airports VALUES ('CDG', 'Charles de Gaulle', 'Paris', 49.012779, 2.55);",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_lookup_known_code() {
        let path = create_test_airports("lookup");
        let airports = AirportDirectory::open(&path).unwrap();

        let lhr = airports.lookup("LHR").unwrap().unwrap();
        assert_eq!(lhr.name, "London Heathrow");
        assert_eq!(lhr.city, "London");
        assert!((lhr.latitude - 51.4706).abs() < f64::EPSILON);

        assert_eq!(airports.lookup(" jfk ").unwrap().unwrap().iata, "JFK");

        drop(airports);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_lookup_unknown_code_is_none() {
        let path = create_test_airports("unknown");
        let airports = AirportDirectory::open(&path).unwrap();

        assert!(airports.lookup("ZZZ").unwrap().is_none());
        assert!(airports.lookup("---").unwrap().is_none());
        assert!(airports.lookup("").unwrap().is_none());
        assert!(matches!(
            airports.require("ZZZ").unwrap_err(),
            Error::UnknownAirport { .. }
        ));

        drop(airports);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_codes_sorted_without_placeholder() {
        let path = create_test_airports("codes");
        let airports = AirportDirectory::open(&path).unwrap();

        assert_eq!(airports.codes().unwrap(), ["CDG", "JFK", "LHR"]);

        drop(airports);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let path = std::env::temp_dir().join("flightlog_airports_missing_dir/none.db");
        assert!(matches!(
            AirportDirectory::open(path).unwrap_err(),
            Error::DatabaseOpen { .. }
        ));
    }
}
