//! 投递指标收集模块
//!
//! 记录每个 sink 的批次投递结果、批大小与耗时。

use std::time::Duration;

use metrics::{counter, histogram};

/// 投递耗时直方图 (毫秒)
pub const LATENCY_METRIC: &str = "batch_sink_delivery_latency_ms";

/// 批大小直方图 (事件数)
pub const BATCH_EVENTS_METRIC: &str = "batch_sink_batch_events";

/// 批次投递结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// 投递被传输层接受
    Success,
    /// 投递失败
    Failure,
    /// 空批次，未发送
    Skipped,
}

impl BatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Skipped => "skipped",
        }
    }
}

/// 记录一次批次投递结果
///
/// # Example
///
/// ```ignore
/// use observability::metrics::{record_batch_outcome, BatchOutcome};
///
/// record_batch_outcome("collector", BatchOutcome::Success, elapsed);
/// ```
pub fn record_batch_outcome(sink_name: &str, outcome: BatchOutcome, elapsed: Duration) {
    counter!(
        "batch_sink_batches_total",
        "sink" => sink_name.to_string(),
        "status" => outcome.as_str()
    )
    .increment(1);

    if outcome != BatchOutcome::Skipped {
        histogram!(LATENCY_METRIC, "sink" => sink_name.to_string())
        .record(elapsed.as_secs_f64() * 1000.0);
    }
}

/// 记录批次大小 (事件数)
pub fn record_batch_events(sink_name: &str, events: usize) {
    histogram!(BATCH_EVENTS_METRIC, "sink" => sink_name.to_string()).record(events as f64);
    counter!("batch_sink_events_total", "sink" => sink_name.to_string()).increment(events as u64);
}

/// 记录因队列已满被拒绝的批次
pub fn record_batch_rejected(sink_name: &str) {
    counter!("batch_sink_batches_rejected_total", "sink" => sink_name.to_string()).increment(1);
}

/// 投递指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DeliveryAggregator {
    /// 成功批次数
    pub delivered: u64,

    /// 失败批次数
    pub failed: u64,

    /// 空批次数
    pub skipped: u64,

    /// 批大小统计
    pub batch_events: RunningStats,

    /// 投递耗时统计 (毫秒)
    pub latency_ms: RunningStats,
}

impl DeliveryAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, outcome: BatchOutcome, events: usize, elapsed: Duration) {
        match outcome {
            BatchOutcome::Success => self.delivered += 1,
            BatchOutcome::Failure => self.failed += 1,
            BatchOutcome::Skipped => {
                self.skipped += 1;
                return;
            }
        }
        self.batch_events.push(events as f64);
        self.latency_ms.push(elapsed.as_secs_f64() * 1000.0);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> DeliverySummary {
        let attempted = self.delivered + self.failed;
        DeliverySummary {
            delivered: self.delivered,
            failed: self.failed,
            skipped: self.skipped,
            failure_rate: if attempted > 0 {
                self.failed as f64 / attempted as f64 * 100.0
            } else {
                0.0
            },
            batch_events: StatsSummary::from(&self.batch_events),
            latency_ms: StatsSummary::from(&self.latency_ms),
        }
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct DeliverySummary {
    pub delivered: u64,
    pub failed: u64,
    pub skipped: u64,
    pub failure_rate: f64,
    pub batch_events: StatsSummary,
    pub latency_ms: StatsSummary,
}

impl std::fmt::Display for DeliverySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Delivery Summary ===")?;
        writeln!(f, "Delivered batches: {}", self.delivered)?;
        writeln!(
            f,
            "Failed batches: {} ({:.2}%)",
            self.failed, self.failure_rate
        )?;
        writeln!(f, "Skipped (empty) batches: {}", self.skipped)?;
        writeln!(f, "Events per batch: {}", self.batch_events)?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
