use chrono::NaiveDate;
use stockscope_alphavantage::AlphaVantageClient;
use stockscope_alphavantage::weekly::{Weekly, WeeklyBar, WeeklyParams, WeeklyResponse};
use stockscope_analysis::data_point::WeeklyPoint;
use thiserror::Error;

/// Key the tool ships with; override with $ALPHAVANTAGE_API_KEY.
pub const DEFAULT_API_KEY: &str = "76XX92VOVAVFF1ID";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    InvalidSymbol(String),
    #[error("{0}")]
    RateLimited(String),
    #[error("{0}")]
    MalformedPayload(String),
}

pub async fn fetch_weekly_series(
    symbol: &str,
    api_key: &str,
) -> Result<Vec<WeeklyPoint>, FetchError> {
    let client = AlphaVantageClient::new(api_key);

    let response = client
        .call::<Weekly>(WeeklyParams::builder().symbol(symbol).build())
        .await?;

    shape_response(response)
}

/// Classify the in-band API outcomes, then transpose the date-keyed map
/// into typed rows. Every bad outcome is fatal here; nothing downstream
/// ever sees a half-shaped table.
pub fn shape_response(response: WeeklyResponse) -> Result<Vec<WeeklyPoint>, FetchError> {
    if let Some(message) = response.error_message {
        return Err(FetchError::InvalidSymbol(message));
    }
    if let Some(note) = response.note.or(response.information) {
        return Err(FetchError::RateLimited(note));
    }

    let series = response.time_series.ok_or_else(|| {
        FetchError::MalformedPayload(
            "The response data does not contain 'Weekly Time Series'. \
             Please check the API key and the stock symbol."
                .to_string(),
        )
    })?;

    series
        .into_iter()
        .map(|(date, bar)| shape_row(&date, bar))
        .collect()
}

fn shape_row(date: &str, bar: WeeklyBar) -> Result<WeeklyPoint, FetchError> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|err| {
        FetchError::MalformedPayload(format!(
            "Unparseable date key '{date}' in 'Weekly Time Series': {err}"
        ))
    })?;

    Ok(WeeklyPoint {
        date,
        open: coerce(&bar.open),
        high: coerce(&bar.high),
        low: coerce(&bar.low),
        close: coerce(&bar.close),
        volume: coerce(&bar.volume),
    })
}

/// Numeric coercion; failures become the missing-value marker, not errors.
fn coerce(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok()
}
