pub mod method;
pub mod weekly;

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Alpha Vantage serves every endpoint from the same `/query` path; the
/// `function` selector and the API key travel as query parameters on each
/// call.
pub struct AlphaVantageClient {
    api_key: String,
    reqwest: Client,
}

impl AlphaVantageClient {
    pub fn new(api_key: &str) -> Self {
        let reqwest = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            api_key: api_key.to_string(),
            reqwest,
        }
    }

    pub(crate) async fn get<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        url: &str,
        function: &str,
        params: &P,
    ) -> reqwest::Result<T> {
        let response = self
            .reqwest
            .get(url)
            .query(&[("function", function), ("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await?;

        Ok(response)
    }

    pub async fn call<M: method::Method>(&self, params: M::Params) -> reqwest::Result<M::Response> {
        self.get(M::PATH, M::FUNCTION, &params).await
    }
}
