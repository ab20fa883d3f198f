//! # HTTP Sink
//!
//! 批次投递模块。
//!
//! 负责：
//! - 逐条编码事件，丢弃编码失败的事件
//! - 拼接 JSON 数组，按 sink 类型做线上变换 (明文 / gzip+base64)
//! - 单次 HTTP POST 投递并归类结果
//! - 按类型构建 sink，并以独立队列驱动其生命周期

pub mod codec;
pub mod encoder;
pub mod handle;
pub mod metrics;
pub mod registry;
pub mod sink;
pub mod transform;
pub mod transmitter;

pub use codec::{JsonCodec, RawJsonCodec};
pub use contracts::{Batch, BatchSink, Event, SinkResult};
pub use encoder::{assemble_array, encode_fragments};
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use registry::{SinkFactory, SinkRegistry};
pub use sink::{GzipBase64HttpSink, HttpSink, JsonHttpSink};
pub use transform::{GzipBase64, Identity, Payload, WireTransform};
pub use transmitter::Transmitter;
