//! Storage layer for flightlog.
//!
//! This module provides `SQLite`-based persistent storage for flight records.
//! Every check-then-write sequence (key derivation followed by the insert,
//! bulk replacement) runs inside a single `IMMEDIATE` transaction, and all
//! mutating methods take `&mut self`, so one store instance has exactly one
//! writer at a time.

pub mod migrations;
pub mod schema;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, TransactionBehavior};
use tracing::{debug, info};

use crate::duration::FlightDuration;
use crate::error::{Error, Result};
use crate::flight::{FlightRecord, NewFlight, TIME_FORMAT};
use crate::key;

use schema::{INSERT_FLIGHT, SELECT_COLUMNS};

/// How long a writer waits for another process holding the write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The authoritative set of flight records.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Record creation with collision-free key derivation
/// - Ordered retrieval by key
/// - In-place edits that re-key a record when its date changes
/// - Atomic bulk replacement, import and backup
#[derive(Debug)]
pub struct FlightStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl FlightStore {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        if path.exists() {
            debug!("Opening flight log at {}", path.display());
        } else {
            info!("Creating new flight log at {}", path.display());
        }
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // WAL lets readers keep seeing the last committed dataset while a
        // bulk replace is in progress.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        migrations::initialize_schema(&conn)?;

        debug!("Flight log opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Open an existing store without write access.
    ///
    /// Used for import sources; the file is never created or migrated.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or holds no flights table.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
            |source| Error::DatabaseOpen {
                path: path.clone(),
                source,
            },
        )?;

        migrations::verify_schema(&conn)?;
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate and persist a new flight.
    ///
    /// The key is derived from the flight date against the current key set
    /// within the same transaction as the insert. Returns the assigned key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a mandatory field is empty, or a
    /// storage error if the write fails. Nothing is written on failure.
    pub fn create(&mut self, flight: &NewFlight) -> Result<String> {
        flight.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing = keys_in(&tx)?;
        let key = key::derive(flight.date, existing.iter().map(String::as_str));
        let record = FlightRecord::from_new(key, flight);
        insert_record(&tx, &record)?;
        tx.commit()?;

        info!(
            "Logged flight {} as {} ({})",
            record.flight_number, record.key, record.flight_duration
        );
        Ok(record.key)
    }

    /// Get every record, ordered by key ascending.
    ///
    /// Ordering is byte-wise on the key, so disambiguated duplicates sort
    /// directly after their base date.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn read_all(&self) -> Result<Vec<FlightRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM flights ORDER BY key ASC"
        ))?;

        let rows = stmt
            .query_map([], RawFlight::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawFlight::decode).collect()
    }

    /// Get a single record by key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has this key.
    pub fn read(&self, key: &str) -> Result<FlightRecord> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM flights WHERE key = ?1"),
                [key],
                RawFlight::from_row,
            )
            .optional()?;

        raw.ok_or_else(|| Error::not_found(key))?.decode()
    }

    /// Replace the fields of an existing record.
    ///
    /// The duration is recomputed from the new times. When the flight date
    /// changes the key is re-derived against every key except this record's
    /// own; otherwise the key is kept. Returns the record's key after the edit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a mandatory field is empty, or
    /// [`Error::NotFound`] if no record has this key. Nothing is written on
    /// failure.
    pub fn update(&mut self, key: &str, flight: &NewFlight) -> Result<String> {
        flight.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !exists_in(&tx, key)? {
            return Err(Error::not_found(key));
        }

        let new_key = if key::strip_disambiguator(key).ok() == Some(flight.date) {
            key.to_string()
        } else {
            let existing = keys_in(&tx)?;
            let others = existing
                .iter()
                .map(String::as_str)
                .filter(|other| *other != key);
            key::derive(flight.date, others)
        };

        let record = FlightRecord::from_new(new_key, flight);
        tx.execute("DELETE FROM flights WHERE key = ?1", [key])?;
        insert_record(&tx, &record)?;
        tx.commit()?;

        if record.key == key {
            info!("Updated flight {}", key);
        } else {
            info!("Updated flight {} and re-keyed it as {}", key, record.key);
        }
        Ok(record.key)
    }

    /// Permanently remove a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has this key, including when
    /// it was already deleted.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        let affected = self
            .conn
            .execute("DELETE FROM flights WHERE key = ?1", [key])?;
        if affected == 0 {
            return Err(Error::not_found(key));
        }

        info!("Deleted flight {}", key);
        Ok(())
    }

    /// Discard the current dataset and adopt `records` in its place.
    ///
    /// Every record is validated before anything is touched, and the swap is
    /// a single transaction, so readers observe either the old dataset or the
    /// new one in full. Returns the number of records adopted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`], [`Error::MalformedKey`] or
    /// [`Error::DuplicateKey`] for a bad dataset, or a storage error. The
    /// existing data is unchanged on failure.
    pub fn replace_all(&mut self, records: &[FlightRecord]) -> Result<usize> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in records {
            record.validate()?;
            if !seen.insert(record.key.as_str()) {
                return Err(Error::DuplicateKey {
                    key: record.key.clone(),
                });
            }
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let discarded = tx.execute("DELETE FROM flights", [])?;
        for record in records {
            insert_record(&tx, record)?;
        }
        tx.commit()?;

        info!(
            "Replaced {} flights with {} imported flights",
            discarded,
            records.len()
        );
        Ok(records.len())
    }

    /// Replace the dataset with the contents of another flight log file.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or its records are
    /// invalid. The existing data is unchanged on failure.
    pub fn import_from(&mut self, source: impl AsRef<Path>) -> Result<usize> {
        let source = source.as_ref();
        debug!("Importing flight log from {}", source.display());
        let records = Self::open_read_only(source)?.read_all()?;
        self.replace_all(&records)
    }

    /// Write a consistent copy of the store to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackupExists`] if `target` already exists, or an
    /// error if the copy cannot be written.
    pub fn backup_to(&self, target: impl AsRef<Path>) -> Result<()> {
        let target = target.as_ref();
        if target.exists() {
            return Err(Error::BackupExists {
                path: target.to_path_buf(),
            });
        }

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let target_str = target.to_string_lossy().into_owned();
        self.conn.execute("VACUUM INTO ?1", [target_str])?;

        info!("Backed up flight log to {}", target.display());
        Ok(())
    }

    /// Get every key, ordered ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn keys(&self) -> Result<Vec<String>> {
        keys_in(&self.conn)
    }

    /// Whether a record with this key exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn contains(&self, key: &str) -> Result<bool> {
        exists_in(&self.conn, key)
    }

    /// Count stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM flights", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn keys_in(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT key FROM flights ORDER BY key ASC")?;
    let keys = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(keys)
}

fn exists_in(conn: &Connection, key: &str) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM flights WHERE key = ?1", [key], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn insert_record(conn: &Connection, record: &FlightRecord) -> Result<()> {
    let take_off = record.take_off_time.format(TIME_FORMAT).to_string();
    let landing = record.landing_time.format(TIME_FORMAT).to_string();
    let duration = record.flight_duration.to_string();

    conn.execute(
        INSERT_FLIGHT,
        params![
            record.key,
            record.flight_number,
            record.plane_model,
            take_off,
            landing,
            duration,
            record.departure,
            record.destination,
            record.carrier,
            record.iata_departure,
            record.iata_destination,
            record.latitude_departure,
            record.longitude_departure,
            record.latitude_destination,
            record.longitude_destination,
            record.city_departure,
            record.city_destination,
        ],
    )?;
    debug!("Inserted flight {}", record.key);
    Ok(())
}

/// A flights row as stored, before text columns are parsed.
struct RawFlight {
    key: String,
    flight_number: String,
    plane_model: String,
    take_off_time: String,
    landing_time: String,
    flight_duration: String,
    departure: String,
    destination: String,
    carrier: String,
    iata_departure: String,
    iata_destination: String,
    latitude_departure: f64,
    longitude_departure: f64,
    latitude_destination: f64,
    longitude_destination: f64,
    city_departure: String,
    city_destination: String,
}

impl RawFlight {
    /// Read a row selected with [`SELECT_COLUMNS`].
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            flight_number: row.get(1)?,
            plane_model: row.get(2)?,
            take_off_time: row.get(3)?,
            landing_time: row.get(4)?,
            flight_duration: row.get(5)?,
            departure: row.get(6)?,
            destination: row.get(7)?,
            carrier: row.get(8)?,
            iata_departure: row.get(9)?,
            iata_destination: row.get(10)?,
            latitude_departure: row.get(11)?,
            longitude_departure: row.get(12)?,
            latitude_destination: row.get(13)?,
            longitude_destination: row.get(14)?,
            city_departure: row.get(15)?,
            city_destination: row.get(16)?,
        })
    }

    fn decode(self) -> Result<FlightRecord> {
        let take_off_time = decode_time(&self.key, "take_off_time", &self.take_off_time)?;
        let landing_time = decode_time(&self.key, "landing_time", &self.landing_time)?;
        let flight_duration = FlightDuration::parse(&self.flight_duration)
            .map_err(|e| Error::corrupt_record(&self.key, e.to_string()))?;

        Ok(FlightRecord {
            key: self.key,
            flight_number: self.flight_number,
            plane_model: self.plane_model,
            take_off_time,
            landing_time,
            flight_duration,
            departure: self.departure,
            destination: self.destination,
            carrier: self.carrier,
            iata_departure: self.iata_departure,
            iata_destination: self.iata_destination,
            latitude_departure: self.latitude_departure,
            longitude_departure: self.longitude_departure,
            latitude_destination: self.latitude_destination,
            longitude_destination: self.longitude_destination,
            city_departure: self.city_departure,
            city_destination: self.city_destination,
        })
    }
}

fn decode_time(key: &str, column: &str, text: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(text, TIME_FORMAT)
        .map_err(|e| Error::corrupt_record(key, format!("{column} '{text}': {e}")))
}
