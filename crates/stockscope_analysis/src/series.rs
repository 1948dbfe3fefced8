use chrono::NaiveDate;
use thiserror::Error;

use crate::data_point::WeeklyPoint;

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("Invalid starting year {0}")]
    InvalidYear(i32),
    #[error("No data on or after {0}")]
    EmptyRange(i32),
}

/// Ascending sort by row date. Idempotent.
pub fn sort_by_date(points: &mut [WeeklyPoint]) {
    points.sort_by_key(|p| p.date);
}

pub fn year_start(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}

/// Keep the rows dated on or after January 1st of `year`. On a sorted input
/// this is the contiguous suffix of the table. An empty result is an error:
/// every later stage assumes at least one row.
pub fn filter_from_year(
    points: Vec<WeeklyPoint>,
    year: i32,
) -> Result<Vec<WeeklyPoint>, SeriesError> {
    let boundary = year_start(year).ok_or(SeriesError::InvalidYear(year))?;

    let filtered: Vec<WeeklyPoint> = points.into_iter().filter(|p| p.date >= boundary).collect();
    if filtered.is_empty() {
        return Err(SeriesError::EmptyRange(year));
    }

    Ok(filtered)
}
