//! Event / Batch - pipeline input
//!
//! 上游管道交给 sink 的结构化记录。

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 单条事件
///
/// 头部为结构化字段，正文为原始字节 (零拷贝)。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// 事件头部字段
    #[serde(default)]
    pub header: Map<String, Value>,

    /// 事件正文
    pub body: Bytes,
}

impl Event {
    /// 以正文创建事件
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            header: Map::new(),
            body: body.into(),
        }
    }

    /// 追加一个头部字段
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.header.insert(key.into(), value.into());
        self
    }
}

/// 一批事件
///
/// 有序；在一次 `consume` 调用期间由管道持有，sink 只借用不保留。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    events: Vec<Event>,
}

impl Batch {
    /// 由事件列表创建
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// 批内事件 (原始顺序)
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl From<Vec<Event>> for Batch {
    fn from(events: Vec<Event>) -> Self {
        Self::new(events)
    }
}

impl FromIterator<Event> for Batch {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
