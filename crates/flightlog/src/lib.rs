//! `flightlog` - A personal flight log with statistics
//!
//! This library provides the core of the flight log: collision-free record
//! keys derived from flight dates, a single-file `SQLite` record store, and
//! aggregate statistics over the stored flights. Reference airport lookup,
//! exports and the last-access log sit alongside it.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod duration;
pub mod error;
pub mod export;
pub mod flight;
pub mod key;
pub mod logging;
pub mod reference;
pub mod session;
pub mod stats;
pub mod storage;

pub use config::Config;
pub use duration::FlightDuration;
pub use error::{Error, Result};
pub use flight::{FlightRecord, NewFlight};
pub use logging::init_logging;
pub use reference::{Airport, AirportDirectory};
pub use session::LastAccess;
pub use stats::{compute, Aggregates};
pub use storage::FlightStore;
