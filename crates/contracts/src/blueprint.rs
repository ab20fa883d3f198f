//! PipelineBlueprint - Config Loader 输出
//!
//! 描述投递管道的全部 sink 配置：类型、目标地址、可选的超时与头部。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use validator::Validate;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的管道配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 输出路由配置
    pub sinks: Vec<SinkConfig>,
}

/// Sink 输出配置
///
/// 初始化后只读，在 sink 整个生命周期内保持不变。
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinkConfig {
    /// Sink 名称
    #[validate(length(min = 1, message = "sink name cannot be empty"))]
    pub name: String,

    /// Sink 类型
    pub sink_type: SinkType,

    /// 推送目标 URL
    #[validate(url(message = "addr must be an absolute URL"))]
    pub addr: String,

    /// 请求超时 (毫秒)，缺省则不设超时
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// 额外请求头
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// 为 true 时非 2xx 状态码视为失败
    #[serde(default)]
    pub strict_status: bool,

    /// 压缩失败处理策略
    #[serde(default)]
    pub on_compression_error: CompressionErrorPolicy,

    /// 队列容量
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1, message = "queue_capacity must be >= 1"))]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    100
}

impl SinkConfig {
    /// 以默认选项创建配置
    pub fn new(name: impl Into<String>, sink_type: SinkType, addr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink_type,
            addr: addr.into(),
            timeout_ms: None,
            headers: HashMap::new(),
            strict_status: false,
            on_compression_error: CompressionErrorPolicy::default(),
            queue_capacity: default_queue_capacity(),
        }
    }

    /// 请求超时
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// JSON 数组明文推送
    #[serde(alias = "mgnbury")]
    HttpJson,
    /// JSON 数组 gzip 压缩后 base64 编码推送
    #[serde(alias = "smbury")]
    HttpGzipBase64,
}

impl SinkType {
    pub const ALL: [SinkType; 2] = [SinkType::HttpJson, SinkType::HttpGzipBase64];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HttpJson => "http_json",
            Self::HttpGzipBase64 => "http_gzip_base64",
        }
    }
}

impl fmt::Display for SinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 压缩失败策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionErrorPolicy {
    /// 整批失败
    #[default]
    Fail,
    /// 以空内容继续编码并发送 (兼容旧行为)
    SendEmpty,
}
