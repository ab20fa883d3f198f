//! Transmitter - single HTTP POST per batch

use std::collections::HashMap;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Request};
use tracing::{debug, instrument};

use contracts::{ContractError, SinkConfig};

use crate::transform::Payload;

/// Posts payloads to a fixed target with one reusable client
///
/// Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Transmitter {
    sink_name: String,
    client: Client,
    url: String,
    headers: HashMap<String, String>,
    strict_status: bool,
}

impl Transmitter {
    /// Build the client for a sink
    ///
    /// The target address is kept as configured; a malformed address is
    /// reported when a request is built.
    pub fn new(sink_name: impl Into<String>, config: &SinkConfig) -> Result<Self, ContractError> {
        let sink_name = sink_name.into();

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ContractError::sink_creation(&sink_name, format!("http client: {e}")))?;

        Ok(Self {
            sink_name,
            client,
            url: config.addr.clone(),
            headers: config.headers.clone(),
            strict_status: config.strict_status,
        })
    }

    /// Send one payload
    ///
    /// Any received response counts as delivered unless strict status
    /// checking is enabled. The response body is drained either way.
    ///
    /// # Errors
    /// - [`ContractError::RequestBuild`] if the request cannot be built (nothing is sent)
    /// - [`ContractError::Transport`] on connection, DNS, TLS or timeout failure
    /// - [`ContractError::RemoteStatus`] for non-2xx responses in strict mode
    #[instrument(
        name = "transmitter_post",
        skip(self, payload),
        fields(sink = %self.sink_name, bytes = payload.body.len())
    )]
    pub async fn post(&self, payload: Payload) -> Result<(), ContractError> {
        let request = self.build_request(payload)?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ContractError::Transport {
                sink_name: self.sink_name.clone(),
                url: self.url.clone(),
                source: Box::new(e),
            })?;

        let status = response.status();
        match response.bytes().await {
            Ok(body) => debug!(sink = %self.sink_name, %status, drained = body.len(), "Response received"),
            Err(e) => debug!(sink = %self.sink_name, %status, error = %e, "Response body drain failed"),
        }

        if self.strict_status && !status.is_success() {
            return Err(ContractError::RemoteStatus {
                sink_name: self.sink_name.clone(),
                status: status.as_u16(),
            });
        }

        Ok(())
    }

    /// Extra headers go on first; `Content-Type` is always the variant's value.
    fn build_request(&self, payload: Payload) -> Result<Request, ContractError> {
        let mut builder = self.client.post(self.url.as_str());
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut request = builder
            .body(payload.body)
            .build()
            .map_err(|e| ContractError::RequestBuild {
                sink_name: self.sink_name.clone(),
                source: Box::new(e),
            })?;
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(payload.content_type));
        Ok(request)
    }
}
