//! HttpSink - encode, transform and POST one batch per call

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, instrument, warn};

use contracts::{
    Batch, BatchSink, Codec, CompressionErrorPolicy, ContractError, LifecycleState, SinkConfig,
    SinkContext, SinkResult, SinkType,
};

use crate::codec::JsonCodec;
use crate::encoder::{assemble_array, encode_fragments};
use crate::transform::{GzipBase64, Identity, Payload, WireTransform};
use crate::transmitter::Transmitter;

/// Sink posting JSON arrays as `application/json`
pub type JsonHttpSink = HttpSink<Identity>;

/// Sink posting gzip+base64 JSON arrays as `text/plain`
pub type GzipBase64HttpSink = HttpSink<GzipBase64>;

/// HTTP batch sink, generic over the wire transform
pub struct HttpSink<T: WireTransform> {
    name: String,
    config: SinkConfig,
    transform: T,
    codec: Arc<dyn Codec>,
    transmitter: Option<Transmitter>,
    state: LifecycleState,
}

impl<T: WireTransform> HttpSink<T> {
    /// Create a sink in the `Created` state with the default JSON codec
    pub fn new(config: SinkConfig, transform: T) -> Self {
        Self {
            name: config.name.clone(),
            config,
            transform,
            codec: Arc::new(JsonCodec::new()),
            transmitter: None,
            state: LifecycleState::Created,
        }
    }

    /// Replace the per-event codec
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    /// Encode a non-empty batch into the wire payload
    fn encode_payload(&self, batch: &Batch) -> Result<Payload, ContractError> {
        let fragments = encode_fragments(self.codec.as_ref(), &self.name, batch);
        let array = assemble_array(&fragments);

        debug!(
            sink = %self.name,
            events = batch.len(),
            encoded = fragments.len(),
            array_bytes = array.len(),
            "Batch encoded"
        );

        let body = match self.transform.apply(array) {
            Ok(body) => body,
            Err(e) => match self.config.on_compression_error {
                CompressionErrorPolicy::Fail => {
                    return Err(ContractError::Compression {
                        sink_name: self.name.clone(),
                        source: e,
                    });
                }
                CompressionErrorPolicy::SendEmpty => {
                    warn!(sink = %self.name, error = %e, "Compression failed, sending empty payload");
                    Bytes::new()
                }
            },
        };

        Ok(Payload {
            body,
            content_type: self.transform.content_type(),
        })
    }
}

impl JsonHttpSink {
    pub fn json(config: SinkConfig) -> Self {
        Self::new(config, Identity)
    }
}

impl GzipBase64HttpSink {
    pub fn gzip_base64(config: SinkConfig) -> Self {
        Self::new(config, GzipBase64::default())
    }
}

impl<T: WireTransform> BatchSink for HttpSink<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn sink_type(&self) -> SinkType {
        T::SINK_TYPE
    }

    fn state(&self) -> LifecycleState {
        self.state
    }

    #[instrument(name = "http_sink_init", skip(self, ctx), fields(sink = %ctx.name))]
    fn init(&mut self, ctx: &SinkContext) -> Result<(), ContractError> {
        match self.state {
            LifecycleState::Created | LifecycleState::Initialized => {}
            state => return Err(ContractError::invalid_state(&self.name, "init", state)),
        }

        let transmitter = Transmitter::new(&ctx.name, &self.config)?;
        self.name = ctx.name.clone();
        self.transmitter = Some(transmitter);
        self.state = LifecycleState::Initialized;

        debug!(sink = %self.name, target = %self.config.addr, "HttpSink initialized");
        Ok(())
    }

    fn start(&mut self) -> Result<(), ContractError> {
        if self.state != LifecycleState::Initialized {
            return Err(ContractError::invalid_state(&self.name, "start", self.state));
        }
        self.state = LifecycleState::Running;
        let sink_type = T::SINK_TYPE;
        info!(sink = %self.name, %sink_type, "HttpSink started");
        Ok(())
    }

    #[instrument(
        name = "http_sink_consume",
        skip(self, batch),
        fields(sink = %self.name, events = batch.len())
    )]
    async fn consume(&self, batch: &Batch) -> Option<SinkResult> {
        if batch.is_empty() {
            return None;
        }

        let transmitter = match (self.state, self.transmitter.as_ref()) {
            (LifecycleState::Running, Some(transmitter)) => transmitter,
            (state, _) => {
                return Some(SinkResult::fail(ContractError::invalid_state(
                    &self.name, "consume", state,
                )));
            }
        };

        let payload = match self.encode_payload(batch) {
            Ok(payload) => payload,
            Err(e) => return Some(SinkResult::fail(e)),
        };

        Some(transmitter.post(payload).await.into())
    }

    fn stop(&mut self) {
        self.transmitter = None;
        self.state = LifecycleState::Stopped;
        info!(sink = %self.name, "HttpSink stopped");
    }
}
