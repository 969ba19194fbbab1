//! Aggregate statistics over the flight log.
//!
//! [`compute`] is a pure function of the records it is given, normally the
//! full output of [`FlightStore::read_all`](crate::storage::FlightStore::read_all).
//! Frequency leaders are chosen by highest count, with ties going to whichever
//! value was seen first during the scan.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use serde::Serialize;

use crate::duration::FlightDuration;
use crate::flight::FlightRecord;

/// Summary metrics for a set of flights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregates {
    /// Number of flights.
    pub total_flights: usize,
    /// Sum of every flight duration.
    pub total_duration: FlightDuration,
    /// Total duration floor-divided by the number of flights.
    pub average_duration: FlightDuration,
    /// The single longest flight.
    pub longest_duration: FlightDuration,
    /// Distinct cities across departures and destinations.
    pub distinct_cities: usize,
    /// Distinct IATA codes across departures and destinations.
    pub distinct_airports: usize,
    /// Most visited airport by IATA code.
    pub top_airport: Option<String>,
    /// Most flown carrier.
    pub top_carrier: Option<String>,
    /// Most flown aircraft model.
    pub top_aircraft: Option<String>,
    /// Most visited city.
    pub top_city: Option<String>,
    /// Year with the most flights.
    pub year_most_flown: Option<String>,
}

impl Aggregates {
    /// The "no data" value: zero counts and durations, no leaders.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            total_flights: 0,
            total_duration: FlightDuration::ZERO,
            average_duration: FlightDuration::ZERO,
            longest_duration: FlightDuration::ZERO,
            distinct_cities: 0,
            distinct_airports: 0,
            top_airport: None,
            top_carrier: None,
            top_aircraft: None,
            top_city: None,
            year_most_flown: None,
        }
    }

    /// Whether these aggregates describe no flights at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_flights == 0
    }
}

impl Default for Aggregates {
    fn default() -> Self {
        Self::empty()
    }
}

/// Compute every aggregate over `records` in a single pass.
#[must_use]
pub fn compute(records: &[FlightRecord]) -> Aggregates {
    let Some(count) = NonZeroUsize::new(records.len()) else {
        return Aggregates::empty();
    };

    let mut total_duration = FlightDuration::ZERO;
    let mut longest_duration = records[0].flight_duration;
    let mut airports = FrequencyCounter::default();
    let mut carriers = FrequencyCounter::default();
    let mut aircraft = FrequencyCounter::default();
    let mut cities = FrequencyCounter::default();
    let mut years = FrequencyCounter::default();

    for record in records {
        total_duration += record.flight_duration;
        longest_duration = longest_duration.max(record.flight_duration);

        airports.observe(&record.iata_departure);
        airports.observe(&record.iata_destination);
        cities.observe(&record.city_departure);
        cities.observe(&record.city_destination);
        carriers.observe(&record.carrier);
        aircraft.observe(&record.plane_model);
        years.observe(record.year());
    }

    Aggregates {
        total_flights: count.get(),
        total_duration,
        average_duration: total_duration.div_floor(count),
        longest_duration,
        distinct_cities: cities.distinct(),
        distinct_airports: airports.distinct(),
        top_airport: airports.leader(),
        top_carrier: carriers.leader(),
        top_aircraft: aircraft.leader(),
        top_city: cities.leader(),
        year_most_flown: years.leader(),
    }
}

/// Counts occurrences while remembering first-seen order.
#[derive(Debug, Default)]
struct FrequencyCounter<'a> {
    /// Distinct values in the order they were first observed.
    order: Vec<&'a str>,
    counts: HashMap<&'a str, usize>,
}

impl<'a> FrequencyCounter<'a> {
    fn observe(&mut self, value: &'a str) {
        let count = self.counts.entry(value).or_insert(0);
        if *count == 0 {
            self.order.push(value);
        }
        *count += 1;
    }

    fn distinct(&self) -> usize {
        self.order.len()
    }

    /// The most frequent value; the earliest seen wins a tie.
    fn leader(&self) -> Option<String> {
        let mut best: Option<(&str, usize)> = None;
        for &value in &self.order {
            let count = self.counts.get(value).copied().unwrap_or(0);
            // Strictly greater, so an equal later count never displaces.
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value.to_string())
    }
}
