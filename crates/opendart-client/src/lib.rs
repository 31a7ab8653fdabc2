pub mod config;
pub mod status;

pub use config::OpenDartConfig;
pub use status::status_description;

use async_trait::async_trait;
use dart_core::{DartError, DartResult, RawStatementResponse, StatementRequest, StatementSource};
use reqwest::Client;
use tracing::{debug, info, warn};

/// Client for the OpenDART disclosure API. One attempt per call, no retry.
#[derive(Clone)]
pub struct OpenDartClient {
    config: OpenDartConfig,
    client: Client,
}

impl OpenDartClient {
    pub fn new(config: OpenDartConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    pub fn from_env() -> DartResult<Self> {
        Ok(Self::new(OpenDartConfig::from_env()?))
    }

    /// Key accounts of a single company's statement (`fnlttSinglAcnt.json`).
    ///
    /// The body is returned as-is, including non-success statuses.
    pub async fn get_financial_statement(
        &self,
        request: &StatementRequest,
    ) -> DartResult<RawStatementResponse> {
        let url = format!("{}/fnlttSinglAcnt.json", self.config.base_url);
        let year = request.year.to_string();

        info!(
            "Requesting statement corp_code={} year={} report={}",
            request.corp_code,
            request.year,
            request.report_code.label()
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("crtfc_key", self.config.api_key.as_str()),
                ("corp_code", request.corp_code.as_str()),
                ("bsns_year", year.as_str()),
                ("reprt_code", request.report_code.code()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(DartError::Api(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body = response.text().await.map_err(transport_error)?;
        let data: RawStatementResponse = serde_json::from_str(&body)?;

        match data.status.as_deref() {
            Some("000") => debug!("Statement returned {} lines", data.list.len()),
            Some(status) => warn!(
                "OpenDART status {} ({}): {}",
                status,
                status_description(status),
                data.message.as_deref().unwrap_or_default()
            ),
            None => debug!("Statement response carried no status"),
        }

        Ok(data)
    }

    /// Download the full corporation code archive (`corpCode.xml`, zipped).
    pub async fn download_corp_codes(&self) -> DartResult<Vec<u8>> {
        let url = format!("{}/corpCode.xml", self.config.base_url);
        info!("Downloading corporation code archive");

        let response = self
            .client
            .get(&url)
            .query(&[("crtfc_key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(DartError::Api(format!("HTTP {}", response.status())));
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        info!("Downloaded {} bytes", bytes.len());

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl StatementSource for OpenDartClient {
    async fn fetch_statement(&self, request: &StatementRequest) -> DartResult<RawStatementResponse> {
        self.get_financial_statement(request).await
    }
}

fn transport_error(err: reqwest::Error) -> DartError {
    if err.is_timeout() {
        DartError::Api(format!("Request timed out: {}", err))
    } else {
        DartError::Api(err.to_string())
    }
}
