//! Codec trait - per-event serialization seam

use bytes::Bytes;

use crate::{ContractError, Event};

/// Per-event encoder
///
/// Called once per event. The returned bytes must be valid JSON syntax for a
/// single array element; sinks join fragments without re-validating them.
pub trait Codec: Send + Sync {
    /// Codec name (used for logging)
    fn name(&self) -> &str;

    /// Encode one event into a self-contained fragment
    ///
    /// # Errors
    /// Returns [`ContractError::Encode`] when the event cannot be represented.
    fn encode(&self, event: &Event) -> Result<Bytes, ContractError>;
}
