// InfluxDB repository implementation
use crate::application::telemetry_repository::{QueryError, TelemetryRepository};
use crate::infrastructure::config::InfluxSettings;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    client: reqwest::Client,
    url: String,
    token: String,
    org: String,
}

impl InfluxRepository {
    pub fn new(settings: &InfluxSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: settings.url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            org: settings.org.clone(),
        })
    }

    fn build_query_url(&self) -> String {
        format!("{}/api/v2/query?org={}", self.url, urlencoding::encode(&self.org))
    }

    fn classify(&self, err: reqwest::Error) -> QueryError {
        if err.is_connect() {
            QueryError::Unreachable {
                endpoint: self.url.clone(),
                message: err.to_string(),
            }
        } else if err.is_timeout() {
            QueryError::Timeout(err.to_string())
        } else {
            QueryError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl TelemetryRepository for InfluxRepository {
    async fn query_csv(&self, flux: &str) -> Result<String, QueryError> {
        let url = self.build_query_url();

        tracing::debug!("Executing Flux query: {}", flux);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "application/vnd.flux")
            .header("Accept", "application/csv")
            .body(flux.to_string())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("InfluxDB query failed with status {}: {}", status, body);
            return Err(QueryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                QueryError::Timeout(e.to_string())
            } else {
                QueryError::Body(e.to_string())
            }
        })
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
