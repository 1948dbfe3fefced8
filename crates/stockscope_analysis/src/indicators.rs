use polars::prelude::*;

use crate::data_point::WeeklyPoint;

pub const SHORT_WINDOW: usize = 4;
pub const LONG_WINDOW: usize = 12;

pub struct Indicators {
    pub data: LazyFrame,
}

fn window(size: usize) -> RollingOptionsFixedWindow {
    RollingOptionsFixedWindow {
        window_size: size,
        // Trailing averages only: positions before the window fills stay null.
        min_periods: size,
        ..Default::default()
    }
}

impl Indicators {
    pub fn new(data: &[WeeklyPoint]) -> Self {
        let msx = data
            .iter()
            .map(|d| {
                d.date
                    .and_hms_opt(0, 0, 0)
                    .expect("Midnight is always a valid time")
                    .and_utc()
                    .timestamp_millis()
            })
            .collect::<Vec<_>>();
        let datetime = Column::new("datetime".into(), msx.clone());
        let at = Column::new("at".into(), msx)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .expect("Failed to cast column");

        Self {
            data: DataFrame::new(vec![
                Column::new(
                    "open".into(),
                    data.iter().map(|d| d.open).collect::<Vec<_>>(),
                ),
                Column::new(
                    "high".into(),
                    data.iter().map(|d| d.high).collect::<Vec<_>>(),
                ),
                Column::new("low".into(), data.iter().map(|d| d.low).collect::<Vec<_>>()),
                Column::new(
                    "close".into(),
                    data.iter().map(|d| d.close).collect::<Vec<_>>(),
                ),
                Column::new(
                    "volume".into(),
                    data.iter().map(|d| d.volume).collect::<Vec<_>>(),
                ),
                datetime,
                at,
            ])
            .expect("Failed to create DataFrame")
            .lazy(),
        }
    }

    /// Trailing simple moving averages of the weekly close.
    /// - ma4: 4-week moving average
    /// - ma12: 12-week moving average
    pub fn calculate_moving_averages(frame: LazyFrame) -> LazyFrame {
        frame.with_columns([
            col("close").alias("ma4").rolling_mean(window(SHORT_WINDOW)),
            col("close").alias("ma12").rolling_mean(window(LONG_WINDOW)),
        ])
    }

    pub fn calculate(self) -> PolarsResult<DataFrame> {
        let Self { data } = self;

        let data = Self::calculate_moving_averages(data);

        let mut df = data.collect()?;
        df.rechunk_mut();

        Ok(df)
    }
}

/// Pull a float column out of the calculated frame, nulls preserved.
pub fn column_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    Ok(df.column(name)?.f64()?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn weekly_closes(closes: &[f64]) -> Vec<WeeklyPoint> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 6).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| WeeklyPoint {
                date: start + chrono::Duration::weeks(i as i64),
                open: Some(close),
                high: Some(close + 1.0),
                low: Some(close - 1.0),
                close: Some(close),
                volume: Some(100.0),
            })
            .collect()
    }

    #[test]
    fn short_average_fills_after_four_weeks() {
        let points = weekly_closes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let df = Indicators::new(&points).calculate().expect("calculate");

        assert_eq!(df.height(), 6);
        let ma4 = column_values(&df, "ma4").expect("ma4 column");
        assert_eq!(ma4[..3], [None, None, None]);
        assert_eq!(ma4[3], Some(2.5));
        assert_eq!(ma4[4], Some(3.5));
        assert_eq!(ma4[5], Some(4.5));
    }

    #[test]
    fn long_average_needs_twelve_weeks() {
        let closes: Vec<f64> = (1..=13).map(f64::from).collect();
        let points = weekly_closes(&closes);
        let df = Indicators::new(&points).calculate().expect("calculate");

        let ma12 = column_values(&df, "ma12").expect("ma12 column");
        assert!(ma12[..11].iter().all(Option::is_none));
        // Mean of 1..=12, then of 2..=13.
        assert_eq!(ma12[11], Some(6.5));
        assert_eq!(ma12[12], Some(7.5));
    }

    #[test]
    fn short_history_yields_all_nulls() {
        let points = weekly_closes(&[10.0, 11.0, 12.0]);
        let df = Indicators::new(&points).calculate().expect("calculate");

        let ma4 = column_values(&df, "ma4").expect("ma4 column");
        assert!(ma4.iter().all(Option::is_none));
        let ma12 = column_values(&df, "ma12").expect("ma12 column");
        assert!(ma12.iter().all(Option::is_none));
    }

    #[test]
    fn average_aligns_with_trailing_window() {
        let closes = [3.0, 9.0, 6.0, 12.0, 15.0, 0.0, 21.0, 9.0];
        let points = weekly_closes(&closes);
        let df = Indicators::new(&points).calculate().expect("calculate");

        let ma4 = column_values(&df, "ma4").expect("ma4 column");
        for (i, value) in ma4.iter().enumerate() {
            if i < SHORT_WINDOW - 1 {
                assert!(value.is_none());
            } else {
                let mean: f64 =
                    closes[i + 1 - SHORT_WINDOW..=i].iter().sum::<f64>() / SHORT_WINDOW as f64;
                assert_eq!(*value, Some(mean));
            }
        }
    }
}
