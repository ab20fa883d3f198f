//! SinkRegistry - sink type to factory mapping

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use contracts::{BoxedSink, Codec, ContractError, SinkConfig, SinkContext, SinkType};

use crate::codec::JsonCodec;
use crate::handle::SinkHandle;
use crate::sink::{GzipBase64HttpSink, JsonHttpSink};

/// Builds a sink in the `Created` state from its configuration
pub type SinkFactory =
    Arc<dyn Fn(&SinkConfig, Arc<dyn Codec>) -> Result<BoxedSink, ContractError> + Send + Sync>;

/// Explicit sink registry
///
/// Owned by whoever assembles the pipeline; there is no process-wide table.
#[derive(Clone)]
pub struct SinkRegistry {
    factories: HashMap<SinkType, SinkFactory>,
    codec: Arc<dyn Codec>,
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SinkRegistry {
    /// Empty registry using the JSON codec
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            codec: Arc::new(JsonCodec::new()),
        }
    }

    /// Registry with both HTTP variants registered
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(SinkType::HttpJson, Arc::new(json_factory));
        registry.register(SinkType::HttpGzipBase64, Arc::new(gzip_base64_factory));
        registry
    }

    /// Codec handed to every factory
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }

    /// Register a factory, returning the one it replaces
    pub fn register(&mut self, sink_type: SinkType, factory: SinkFactory) -> Option<SinkFactory> {
        debug!(%sink_type, "Sink factory registered");
        self.factories.insert(sink_type, factory)
    }

    pub fn contains(&self, sink_type: SinkType) -> bool {
        self.factories.contains_key(&sink_type)
    }

    /// Registered types in stable order
    pub fn registered_types(&self) -> Vec<SinkType> {
        let mut types: Vec<SinkType> = self.factories.keys().copied().collect();
        types.sort_by_key(|t| t.as_str());
        types
    }

    /// Build a sink for `config`
    ///
    /// # Errors
    /// Returns [`ContractError::SinkCreation`] if no factory is registered for the type.
    #[instrument(
        name = "registry_create",
        skip(self, config),
        fields(sink = %config.name, sink_type = %config.sink_type)
    )]
    pub fn create(&self, config: &SinkConfig) -> Result<BoxedSink, ContractError> {
        let factory = self.factories.get(&config.sink_type).ok_or_else(|| {
            ContractError::sink_creation(
                &config.name,
                format!("no factory registered for sink type '{}'", config.sink_type),
            )
        })?;
        factory(config, Arc::clone(&self.codec))
    }

    /// Build a sink and hand it to a freshly spawned [`SinkHandle`]
    pub fn spawn(&self, config: &SinkConfig) -> Result<SinkHandle, ContractError> {
        let sink = self.create(config)?;
        Ok(SinkHandle::spawn(
            sink,
            SinkContext::new(&config.name),
            config.queue_capacity,
        ))
    }
}

fn json_factory(config: &SinkConfig, codec: Arc<dyn Codec>) -> Result<BoxedSink, ContractError> {
    Ok(Box::new(JsonHttpSink::json(config.clone()).with_codec(codec)))
}

fn gzip_base64_factory(
    config: &SinkConfig,
    codec: Arc<dyn Codec>,
) -> Result<BoxedSink, ContractError> {
    Ok(Box::new(
        GzipBase64HttpSink::gzip_base64(config.clone()).with_codec(codec),
    ))
}
