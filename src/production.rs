use tracing::{debug, instrument};

use crate::envoy::Envoy;
use crate::error::EnvoyError;
use crate::readings::ProductionSnapshot;

const PRODUCTION_PATH: &str = "/production.json";

impl Envoy {
    /// Polls `/production.json` once. The endpoint needs no authentication.
    #[instrument(skip_all, fields(url = %self.url))]
    pub async fn get_production(&self) -> Result<ProductionSnapshot, EnvoyError> {
        let url = self.endpoint(PRODUCTION_PATH);
        let response = self
            .client
            .get(&url)
            .timeout(self.options.request_timeout)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnvoyError::Status { url, status });
        }

        let body = response.text().await.map_err(|e| self.request_error(e))?;
        let snapshot: ProductionSnapshot =
            serde_json::from_str(&body).map_err(|source| EnvoyError::Decode {
                payload: body.clone(),
                source,
            })?;
        debug!(
            production = snapshot.production.len(),
            consumption = snapshot.consumption.len(),
            storage = snapshot.storage.len(),
            "decoded production snapshot"
        );
        Ok(snapshot)
    }

    fn request_error(&self, e: reqwest::Error) -> EnvoyError {
        if e.is_timeout() {
            EnvoyError::Timeout(self.options.request_timeout)
        } else {
            EnvoyError::Transport(e)
        }
    }
}
