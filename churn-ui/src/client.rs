//! HTTP client for the prediction service

use churn_common::api::{ErrorResponse, PredictResponse};
use churn_common::{ChurnLabel, FeatureVector};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("churn-ui/", env!("CARGO_PKG_VERSION"));

/// Failures talking to the prediction service
///
/// All of these are recoverable from the client's point of view: the user
/// sees the message and can resubmit.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Service unreachable, connection dropped or timed out
    #[error("Erro ao conectar com a API. Verifique se o backend está rodando. Detalhes: {0}")]
    Network(String),

    /// Service answered with a non-2xx status
    #[error("A API respondeu com erro {status}: {message}")]
    Status { status: u16, message: String },

    /// Service answered 2xx with a body we cannot read
    #[error("Resposta inválida da API: {0}")]
    Decode(String),
}

/// Thin wrapper around `reqwest::Client` bound to the `/predict` URL
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl PredictionClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one feature vector and return the service's label
    pub async fn predict(&self, features: &FeatureVector) -> Result<ChurnLabel, ClientError> {
        debug!("POST {} {:?}", self.endpoint, features);

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(features)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| {
                    if text.is_empty() {
                        status.canonical_reason().unwrap_or("unknown error").to_string()
                    } else {
                        text
                    }
                });
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(body.churn_prediction)
    }
}
