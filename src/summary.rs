//! Dashboard statistics over a list of shows.
//!
//! Everything here is pure: the caller supplies `today`, so the same rows
//! and the same day always give the same numbers.

use crate::amount::amount_or_zero;
use crate::constants::DASHBOARD_UPCOMING_LIMIT;
use crate::shows::{Act, ShowRecord};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowSummary {
    pub total_shows: usize,
    pub upcoming: usize,
    pub ingresos: f64,
    pub adelantos: f64,
    pub viaticos: f64,
    /// Mean distance over shows with a positive distance; `0.0` when none qualify.
    pub km_avg: f64,
}

/// Today's date from the local wall clock, without a time of day.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// A show is upcoming when its date is today or later. Undated shows never are.
pub fn is_upcoming(record: &ShowRecord, today: NaiveDate) -> bool {
    record.show_date.map_or(false, |date| date >= today)
}

pub fn summarize(records: &[ShowRecord], today: NaiveDate) -> ShowSummary {
    let sum = |field: fn(&ShowRecord) -> Option<f64>| {
        records.iter().fold(0.0, |acc, r| acc + amount_or_zero(field(r)))
    };

    let (km_total, km_count) = records
        .iter()
        .map(|r| amount_or_zero(r.km_distance))
        .filter(|km| *km > 0.0)
        .fold((0.0, 0usize), |(total, count), km| (total + km, count + 1));

    ShowSummary {
        total_shows: records.len(),
        upcoming: records.iter().filter(|r| is_upcoming(r, today)).count(),
        ingresos: sum(|r| r.show_cost),
        adelantos: sum(|r| r.advance_paid),
        viaticos: sum(|r| r.viaticos_cobrados),
        km_avg: if km_count == 0 { 0.0 } else { km_total / km_count as f64 },
    }
}

/// Summaries for all shows and for each act, plus the next few shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub all: ShowSummary,
    pub jeyf: ShowSummary,
    pub elgudi: ShowSummary,
    pub upcoming: Vec<ShowRecord>,
}

impl Dashboard {
    /// Rows with no recognised act count in `all` only.
    pub fn build(records: &[ShowRecord], today: NaiveDate) -> Self {
        let for_act = |act: Act| {
            let rows: Vec<ShowRecord> =
                records.iter().filter(|r| r.artist == Some(act)).cloned().collect();
            summarize(&rows, today)
        };

        Self {
            all: summarize(records, today),
            jeyf: for_act(Act::Jeyf),
            elgudi: for_act(Act::Elgudi),
            upcoming: records
                .iter()
                .filter(|r| is_upcoming(r, today))
                .take(DASHBOARD_UPCOMING_LIMIT)
                .cloned()
                .collect(),
        }
    }
}
