use crate::model::{DailySummary, ForecastEntry};

/// Maximum number of day cards shown.
pub const MAX_DAYS: usize = 5;

/// Collapse 3-hour entries into one summary per calendar date.
///
/// The first entry of each date (in input order) represents the whole day; nothing is
/// averaged. Dates past the fifth are ignored. Empty input means no forecast has been
/// loaded yet and yields an empty list.
pub fn daily_summaries(entries: &[ForecastEntry]) -> Vec<DailySummary> {
    let mut days: Vec<DailySummary> = Vec::with_capacity(MAX_DAYS);

    for entry in entries {
        if days.len() == MAX_DAYS {
            break;
        }

        let date = entry.date();
        if days.iter().any(|d| d.date == date) {
            continue;
        }

        days.push(DailySummary { date, entry: entry.clone() });
    }

    days
}
