use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One shaped row of the weekly table. A value field stays `None` when the
/// provider sent something that does not parse as a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPoint {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl WeeklyPoint {
    /// True when the row can be drawn as a candle.
    pub fn has_ohlc(&self) -> bool {
        self.open.is_some() && self.high.is_some() && self.low.is_some() && self.close.is_some()
    }
}
