//! Caller side of the itinerary relay.
//!
//! Posts an [`ItineraryRequest`] to the relay endpoint and returns the
//! generated text. A non-2xx response surfaces the relay's body text as the
//! error message.

use familygems_core::catalog::Location;
use familygems_core::itinerary::{ItineraryRequest, MultiStopOptions};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The relay answered with a non-2xx status. Displays the body as-is.
    #[error("{body}")]
    Rejected { status: u16, body: String },

    #[error("Request cancelled")]
    Cancelled,
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    text: String,
}

#[derive(Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RelayClient {
    /// `endpoint` is the full relay URL, e.g. `http://host/api/v1/itinerary`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub async fn generate(&self, request: &ItineraryRequest) -> Result<String, RelayError> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RelayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: RelayResponse = response.json().await?;
        Ok(parsed.text)
    }

    /// Like [`generate`](Self::generate), abandoning the request as soon as
    /// `cancel` fires.
    pub async fn generate_cancellable(
        &self,
        request: &ItineraryRequest,
        cancel: &CancellationToken,
    ) -> Result<String, RelayError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(RelayError::Cancelled),
            result = self.generate(request) => result,
        }
    }

    pub async fn generate_single_stop(&self, location: &Location) -> Result<String, RelayError> {
        self.generate(&ItineraryRequest::Single {
            location: Box::new(location.clone()),
        })
        .await
    }

    pub async fn generate_multi_stop(
        &self,
        locations: &[Location],
        options: &MultiStopOptions,
    ) -> Result<String, RelayError> {
        self.generate(&ItineraryRequest::MultiStop {
            locations: locations.to_vec(),
            multi_stop_options: options.clone(),
        })
        .await
    }
}
