//! Command-line interface for flightlog.
//!
//! This module provides the CLI structure and command handlers for the
//! `flightlog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, AirportCommand, AirportOverrides, ConfigCommand, EditCommand, ExportCommand,
    ListCommand, ShowCommand, StatsCommand,
};

/// flightlog - Keep a log of the flights you have taken
///
/// Records each flight with its route, times, carrier and aircraft in a local
/// database, and reports statistics over the whole log.
#[derive(Debug, Parser)]
#[command(name = "flightlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log a new flight
    Add(AddCommand),

    /// List logged flights
    List(ListCommand),

    /// Show one flight
    Show(ShowCommand),

    /// Change fields of a logged flight
    Edit(EditCommand),

    /// Delete a logged flight
    Delete {
        /// Key of the flight to delete
        key: String,
    },

    /// Show statistics over every logged flight
    Stats(StatsCommand),

    /// Export the flight log
    #[command(subcommand)]
    Export(ExportCommand),

    /// Replace the flight log with the contents of another log file
    Import {
        /// Flight log database to import
        file: PathBuf,
    },

    /// Write a copy of the flight log
    Backup {
        /// Destination file; must not exist
        file: PathBuf,
    },

    /// Look up reference airports
    Airport(AirportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
