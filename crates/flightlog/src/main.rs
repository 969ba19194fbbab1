//! `flightlog` - CLI for the personal flight log
//!
//! This binary provides the command-line interface for logging flights,
//! browsing and editing the log, and reporting statistics over it.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs::File;
use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};

use flightlog::cli::{
    AddCommand, AirportCommand, Cli, Command, ConfigCommand, EditCommand, ExportCommand,
    ListCommand, ShowCommand,
};
use flightlog::{
    export, init_logging, stats, Aggregates, AirportDirectory, Config, FlightRecord, FlightStore,
    LastAccess,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    if config.session.enabled {
        match LastAccess::load(config.last_access_path()) {
            Ok(Some(last)) => debug!("Last used {}", last.time),
            Ok(None) => debug!("First run"),
            Err(e) => warn!("Could not read last-access log: {}", e),
        }
    }

    // Execute the command
    let result = run(&config, cli.command);

    if config.session.enabled {
        if let Err(e) = LastAccess::record(config.last_access_path()) {
            warn!("Could not write last-access log: {}", e);
        }
    }

    result
}

fn run(config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Add(cmd) => handle_add(config, &cmd),
        Command::List(cmd) => handle_list(config, &cmd),
        Command::Show(cmd) => handle_show(config, &cmd),
        Command::Edit(cmd) => handle_edit(config, &cmd),
        Command::Delete { key } => {
            open_store(config)?
                .delete(&key)
                .with_context(|| format!("deleting flight {key}"))?;
            println!("Deleted {key}");
            Ok(())
        }
        Command::Stats(cmd) => handle_stats(config, cmd.json),
        Command::Export(cmd) => handle_export(config, cmd),
        Command::Import { file } => {
            let count = open_store(config)?
                .import_from(&file)
                .with_context(|| format!("importing {}", file.display()))?;
            println!("Imported {count} flights from {}", file.display());
            Ok(())
        }
        Command::Backup { file } => {
            open_store(config)?
                .backup_to(&file)
                .with_context(|| format!("backing up to {}", file.display()))?;
            println!("Backed up flight log to {}", file.display());
            Ok(())
        }
        Command::Airport(cmd) => handle_airport(config, &cmd),
        Command::Config(cmd) => handle_config(config, cmd),
    }
}

fn open_store(config: &Config) -> Result<FlightStore> {
    let path = config.database_path();
    FlightStore::open(&path).with_context(|| format!("opening flight log {}", path.display()))
}

/// The reference airports, if the file is present.
fn open_airports(config: &Config) -> Result<Option<AirportDirectory>> {
    let path = config.airports_path();
    if !path.exists() {
        debug!("No airport reference data at {}", path.display());
        return Ok(None);
    }
    let directory = AirportDirectory::open(&path)
        .with_context(|| format!("opening airport data {}", path.display()))?;
    Ok(Some(directory))
}

fn handle_add(config: &Config, cmd: &AddCommand) -> Result<()> {
    let airports = open_airports(config)?;
    let flight = cmd.to_new_flight(airports.as_ref())?;

    let key = open_store(config)?.create(&flight)?;
    println!("Logged {} as {key} ({})", flight.flight_number, flight.duration());
    Ok(())
}

fn handle_list(config: &Config, cmd: &ListCommand) -> Result<()> {
    let records: Vec<FlightRecord> = open_store(config)?
        .read_all()?
        .into_iter()
        .filter(|r| cmd.year.as_deref().map_or(true, |year| r.year() == year))
        .collect();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No flights logged.");
        return Ok(());
    }
    for record in &records {
        println!(
            "{:<16} {:<8} {} -> {}  {:>8}  {}",
            record.key,
            record.flight_number,
            record.iata_departure,
            record.iata_destination,
            record.flight_duration.to_string(),
            record.carrier
        );
    }
    Ok(())
}

fn handle_show(config: &Config, cmd: &ShowCommand) -> Result<()> {
    let record = open_store(config)?.read(&cmd.key)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("Flight {}", record.key);
    println!("==================");
    println!("  Number:       {}", record.flight_number);
    println!("  Aircraft:     {}", record.plane_model);
    println!("  Carrier:      {}", record.carrier);
    println!(
        "  From:         {} ({}), {} [{}, {}]",
        record.departure,
        record.iata_departure,
        record.city_departure,
        record.latitude_departure,
        record.longitude_departure
    );
    println!(
        "  To:           {} ({}), {} [{}, {}]",
        record.destination,
        record.iata_destination,
        record.city_destination,
        record.latitude_destination,
        record.longitude_destination
    );
    println!("  Take-off:     {}", record.take_off_time);
    println!("  Landing:      {}", record.landing_time);
    println!("  Duration:     {}", record.flight_duration);
    Ok(())
}

fn handle_edit(config: &Config, cmd: &EditCommand) -> Result<()> {
    let mut store = open_store(config)?;
    let record = store.read(&cmd.key)?;
    let airports = open_airports(config)?;
    let flight = cmd.apply(&record, airports.as_ref())?;

    let key = store.update(&cmd.key, &flight)?;
    if key == cmd.key {
        println!("Updated {key}");
    } else {
        println!("Updated {} (now {key})", cmd.key);
    }
    Ok(())
}

fn handle_stats(config: &Config, json: bool) -> Result<()> {
    let records = open_store(config)?.read_all()?;
    let aggregates = stats::compute(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&aggregates)?);
    } else {
        print_aggregates(&aggregates);
    }
    Ok(())
}

fn print_aggregates(aggregates: &Aggregates) {
    if aggregates.is_empty() {
        println!("No flights logged.");
        return;
    }

    let leader = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    println!("Flight statistics");
    println!("-----------------");
    println!("Flights:         {}", aggregates.total_flights);
    println!("Total time:      {}", aggregates.total_duration);
    println!("Average time:    {}", aggregates.average_duration);
    println!("Longest flight:  {}", aggregates.longest_duration);
    println!("Cities:          {}", aggregates.distinct_cities);
    println!("Airports:        {}", aggregates.distinct_airports);
    println!("Top airport:     {}", leader(&aggregates.top_airport));
    println!("Top city:        {}", leader(&aggregates.top_city));
    println!("Top carrier:     {}", leader(&aggregates.top_carrier));
    println!("Top aircraft:    {}", leader(&aggregates.top_aircraft));
    println!("Busiest year:    {}", leader(&aggregates.year_most_flown));
}

fn handle_export(config: &Config, cmd: ExportCommand) -> Result<()> {
    let records = open_store(config)?.read_all()?;

    match cmd {
        ExportCommand::Json { output } => {
            let path = config.export_path(&output);
            export::write_keyed_json(&path, &records)
                .with_context(|| format!("exporting to {}", path.display()))?;
            println!("Exported {} flights to {}", records.len(), path.display());
        }
        ExportCommand::Table { output: Some(output) } => {
            let path = config.export_path(&output);
            let file = File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            export::write_tabular(BufWriter::new(file), &records)?;
            println!("Exported {} flights to {}", records.len(), path.display());
        }
        ExportCommand::Table { output: None } => {
            export::write_tabular(io::stdout().lock(), &records)?;
        }
    }
    Ok(())
}

fn handle_airport(config: &Config, cmd: &AirportCommand) -> Result<()> {
    let path = config.airports_path();
    let airports = AirportDirectory::open(&path)
        .with_context(|| format!("opening airport data {}", path.display()))?;

    match &cmd.code {
        Some(code) => {
            let airport = airports.require(code)?;
            println!("{} - {}", airport.iata, airport.name);
            println!("  City:     {}", airport.city);
            println!("  Position: {}, {}", airport.latitude, airport.longitude);
        }
        None => {
            for code in airports.codes()? {
                println!("{code}");
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Reference]");
                println!("  Airports path:      {}", config.airports_path().display());
                println!();
                println!("[Session]");
                println!("  Enabled:            {}", config.session.enabled);
                println!("  Last access path:   {}", config.last_access_path().display());
                println!();
                println!("[Export]");
                match &config.export.directory {
                    Some(dir) => println!("  Directory:          {}", dir.display()),
                    None => println!("  Directory:          (current directory)"),
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
