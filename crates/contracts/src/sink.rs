//! BatchSink trait - pipeline output interface
//!
//! Defines the lifecycle and delivery contract every sink implements.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::{Batch, ContractError, SinkType};

/// Terminal outcome of one delivery attempt
///
/// A batch is atomic at the transport boundary: there is no partial success.
#[derive(Debug)]
pub enum SinkResult {
    /// Delivery accepted by the transport
    Success,
    /// Delivery failed, cause preserved for the caller
    Failure(ContractError),
}

impl SinkResult {
    pub fn fail(err: ContractError) -> Self {
        Self::Failure(err)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Failure cause, if any
    pub fn error(&self) -> Option<&ContractError> {
        match self {
            Self::Success => None,
            Self::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<(), ContractError> {
        match self {
            Self::Success => Ok(()),
            Self::Failure(err) => Err(err),
        }
    }
}

impl From<Result<(), ContractError>> for SinkResult {
    fn from(result: Result<(), ContractError>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(err) => Self::Failure(err),
        }
    }
}

/// Sink lifecycle state
///
/// `Created -> Initialized -> Running -> Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Configuration held, no network resources
    #[default]
    Created,
    /// Client allocated, target resolved
    Initialized,
    /// Accepting batches
    Running,
    /// Terminal
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Context handed to a sink at `init`
#[derive(Debug, Clone)]
pub struct SinkContext {
    /// Stable name the sink binds for logging/metrics
    pub name: String,
}

impl SinkContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Batch delivery trait
///
/// The pipeline calls `init` then `start` before any `consume`, and `stop`
/// once the sink is retired. `consume` takes `&self`: overlapping calls are
/// allowed and the sink performs no locking of its own.
#[trait_variant::make(BatchSink: Send)]
pub trait LocalBatchSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Registered sink type
    fn sink_type(&self) -> SinkType;

    /// Current lifecycle state
    fn state(&self) -> LifecycleState;

    /// Bind name and allocate transport resources
    ///
    /// # Errors
    /// Returns an error if called after `start` or if the client cannot be built.
    fn init(&mut self, ctx: &SinkContext) -> Result<(), ContractError>;

    /// Mark the sink ready
    fn start(&mut self) -> Result<(), ContractError>;

    /// Deliver one batch
    ///
    /// Returns `None` for an empty batch: nothing was attempted and the
    /// caller must treat it as a no-op.
    async fn consume(&self, batch: &Batch) -> Option<SinkResult>;

    /// Retire the sink
    fn stop(&mut self);
}

/// Boxed future returned by [`DynBatchSink::consume_boxed`]
pub type ConsumeFuture<'a> = Pin<Box<dyn Future<Output = Option<SinkResult>> + Send + 'a>>;

/// Object-safe form of [`BatchSink`], used by factories
pub trait DynBatchSink: Send + Sync {
    fn name(&self) -> &str;
    fn sink_type(&self) -> SinkType;
    fn state(&self) -> LifecycleState;
    fn init(&mut self, ctx: &SinkContext) -> Result<(), ContractError>;
    fn start(&mut self) -> Result<(), ContractError>;
    fn consume_boxed<'a>(&'a self, batch: &'a Batch) -> ConsumeFuture<'a>;
    fn stop(&mut self);
}

/// Type-erased sink as produced by a registry
pub type BoxedSink = Box<dyn DynBatchSink>;

impl<S: BatchSink + Sync> DynBatchSink for S {
    fn name(&self) -> &str {
        BatchSink::name(self)
    }

    fn sink_type(&self) -> SinkType {
        BatchSink::sink_type(self)
    }

    fn state(&self) -> LifecycleState {
        BatchSink::state(self)
    }

    fn init(&mut self, ctx: &SinkContext) -> Result<(), ContractError> {
        BatchSink::init(self, ctx)
    }

    fn start(&mut self) -> Result<(), ContractError> {
        BatchSink::start(self)
    }

    fn consume_boxed<'a>(&'a self, batch: &'a Batch) -> ConsumeFuture<'a> {
        Box::pin(BatchSink::consume(self, batch))
    }

    fn stop(&mut self) {
        BatchSink::stop(self)
    }
}

impl BatchSink for BoxedSink {
    fn name(&self) -> &str {
        DynBatchSink::name(&**self)
    }

    fn sink_type(&self) -> SinkType {
        DynBatchSink::sink_type(&**self)
    }

    fn state(&self) -> LifecycleState {
        DynBatchSink::state(&**self)
    }

    fn init(&mut self, ctx: &SinkContext) -> Result<(), ContractError> {
        DynBatchSink::init(&mut **self, ctx)
    }

    fn start(&mut self) -> Result<(), ContractError> {
        DynBatchSink::start(&mut **self)
    }

    async fn consume(&self, batch: &Batch) -> Option<SinkResult> {
        DynBatchSink::consume_boxed(&**self, batch).await
    }

    fn stop(&mut self) {
        DynBatchSink::stop(&mut **self)
    }
}
