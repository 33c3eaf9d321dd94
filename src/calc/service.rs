//! Client side of the external calculator service that owns the DPS formulas.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::data::loadout::EquipmentProjection;
use crate::data::params::CalculationParameters;

#[derive(Debug, thiserror::Error)]
pub enum CalculationServiceError {
    #[error("calculator service unreachable: {0}")]
    Network(String),

    #[error("calculator service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("calculator service returned an unreadable payload: {0}")]
    Payload(String),
}

/// Result payload. `dps` is the headline number; everything else is passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub dps: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestInSlotResponse {
    pub equipment: EquipmentProjection,
}

#[async_trait]
pub trait Calculator: Send + Sync {
    async fn calculate(
        &self,
        params: &CalculationParameters,
    ) -> Result<CalculationResult, CalculationServiceError>;

    /// Loadout the service considers optimal for `params`, as item ids per slot.
    async fn best_in_slot(
        &self,
        params: &CalculationParameters,
    ) -> Result<EquipmentProjection, CalculationServiceError>;
}

/// JSON-over-HTTP calculator: `POST {base}/calculate` and `POST {base}/best-in-slot`.
#[derive(Debug, Clone)]
pub struct HttpCalculator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCalculator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CalculationServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CalculationServiceError::Network(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &CalculationParameters,
    ) -> Result<T, CalculationServiceError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, fields = params.len(), "calling calculator service");
        let response = self
            .client
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(|err| CalculationServiceError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CalculationServiceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| CalculationServiceError::Payload(err.to_string()))
    }
}

#[async_trait]
impl Calculator for HttpCalculator {
    async fn calculate(
        &self,
        params: &CalculationParameters,
    ) -> Result<CalculationResult, CalculationServiceError> {
        self.post("calculate", params).await
    }

    async fn best_in_slot(
        &self,
        params: &CalculationParameters,
    ) -> Result<EquipmentProjection, CalculationServiceError> {
        let response: BestInSlotResponse = self.post("best-in-slot", params).await?;
        Ok(response.equipment)
    }
}
