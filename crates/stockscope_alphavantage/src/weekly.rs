use std::collections::BTreeMap;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::method::Method;

#[derive(Serialize, Deserialize, Debug, Builder)]
#[builder(on(String, into))]
pub struct WeeklyParams {
    pub symbol: String,
}

/// Top-level weekly payload. The API signals failures in-band: an
/// `Error Message` for unknown symbols, a `Note` (or, on newer plans,
/// `Information`) when the request was throttled. Only one of those and
/// the series itself is ever populated at a time.
#[derive(Serialize, Deserialize, Debug)]
pub struct WeeklyResponse {
    #[serde(rename = "Meta Data")]
    pub meta_data: Option<WeeklyMetaData>,
    #[serde(rename = "Weekly Time Series")]
    pub time_series: Option<BTreeMap<String, WeeklyBar>>,
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WeeklyMetaData {
    #[serde(rename = "1. Information")]
    pub information: String,
    #[serde(rename = "2. Symbol")]
    pub symbol: String,
    #[serde(rename = "3. Last Refreshed")]
    pub last_refreshed: String,
    #[serde(rename = "4. Time Zone")]
    pub time_zone: String,
}

/// One week of OHLCV data, keyed by its closing date in the response map.
/// All fields arrive as decimal strings and are coerced downstream.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WeeklyBar {
    #[serde(rename = "1. open")]
    pub open: String,
    #[serde(rename = "2. high")]
    pub high: String,
    #[serde(rename = "3. low")]
    pub low: String,
    #[serde(rename = "4. close")]
    pub close: String,
    #[serde(rename = "5. volume")]
    pub volume: String,
}

pub struct Weekly;

impl Method for Weekly {
    const PATH: &'static str = "https://www.alphavantage.co/query";
    const FUNCTION: &'static str = "TIME_SERIES_WEEKLY";

    type Response = WeeklyResponse;
    type Params = WeeklyParams;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_weekly_series() {
        let body = r#"{
            "Meta Data": {
                "1. Information": "Weekly Prices (open, high, low, close) and Volumes",
                "2. Symbol": "TSLA",
                "3. Last Refreshed": "2024-01-12",
                "4. Time Zone": "US/Eastern"
            },
            "Weekly Time Series": {
                "2024-01-12": {
                    "1. open": "236.1400",
                    "2. high": "238.9000",
                    "3. low": "210.8800",
                    "4. close": "218.8900",
                    "5. volume": "537804567"
                },
                "2024-01-05": {
                    "1. open": "250.0800",
                    "2. high": "251.2500",
                    "3. low": "231.8900",
                    "4. close": "237.4900",
                    "5. volume": "484103616"
                }
            }
        }"#;

        let response: WeeklyResponse = serde_json::from_str(body).expect("Failed to decode");
        assert!(response.error_message.is_none());
        assert!(response.note.is_none());

        let meta = response.meta_data.expect("Missing meta data");
        assert_eq!(meta.symbol, "TSLA");

        let series = response.time_series.expect("Missing time series");
        assert_eq!(series.len(), 2);
        assert_eq!(series["2024-01-05"].close, "237.4900");
        assert_eq!(series["2024-01-12"].volume, "537804567");
    }

    #[test]
    fn decodes_error_payload() {
        let body = r#"{"Error Message": "Invalid API call. Please retry or visit the documentation."}"#;

        let response: WeeklyResponse = serde_json::from_str(body).expect("Failed to decode");
        assert!(response.time_series.is_none());
        assert!(response.error_message.unwrap().starts_with("Invalid API call"));
    }

    #[test]
    fn decodes_rate_limit_note() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 25 requests per day."}"#;

        let response: WeeklyResponse = serde_json::from_str(body).expect("Failed to decode");
        assert!(response.time_series.is_none());
        assert!(response.note.unwrap().contains("25 requests per day"));
    }

    #[test]
    fn weekly_params_serialize_as_query() {
        let params = WeeklyParams::builder().symbol("MSFT").build();
        let query = serde_json::to_value(&params).expect("Failed to serialize");
        assert_eq!(query["symbol"], "MSFT");
    }
}
