//! Wire variant transforms
//!
//! The only step where the two sink variants differ: what happens to the
//! assembled JSON array before it is posted, and which content type it carries.

use std::io::{self, Write};

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use bytes::Bytes;
use flate2::{write::GzEncoder, Compression};

use contracts::SinkType;

/// Fully assembled wire body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub body: Bytes,
    pub content_type: &'static str,
}

/// Payload transform strategy, fixed per sink instance
pub trait WireTransform: Send + Sync + 'static {
    /// Sink type this transform is registered under
    const SINK_TYPE: SinkType;

    /// Value of the `Content-Type` request header
    fn content_type(&self) -> &'static str;

    /// Turn the JSON array bytes into the wire body
    ///
    /// # Errors
    /// Returns the underlying I/O error if compression fails.
    fn apply(&self, array: Bytes) -> io::Result<Bytes>;
}

/// Plain JSON array, sent as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl WireTransform for Identity {
    const SINK_TYPE: SinkType = SinkType::HttpJson;

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn apply(&self, array: Bytes) -> io::Result<Bytes> {
        Ok(array)
    }
}

/// base64(gzip(array)), standard padded alphabet
#[derive(Debug, Clone, Copy)]
pub struct GzipBase64 {
    level: Compression,
}

impl GzipBase64 {
    pub fn new(level: Compression) -> Self {
        Self { level }
    }
}

impl Default for GzipBase64 {
    fn default() -> Self {
        Self::new(Compression::default())
    }
}

impl WireTransform for GzipBase64 {
    const SINK_TYPE: SinkType = SinkType::HttpGzipBase64;

    fn content_type(&self) -> &'static str {
        "text/plain"
    }

    fn apply(&self, array: Bytes) -> io::Result<Bytes> {
        let compressed = gzip(&array, self.level)?;
        Ok(Bytes::from(BASE64_STANDARD.encode(compressed)))
    }
}

/// Compress into a complete gzip member; the stream is finished before returning
fn gzip(src: &[u8], level: Compression) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(src.len() / 2 + 32), level);
    encoder.write_all(src)?;
    encoder.flush()?;
    encoder.finish()
}
