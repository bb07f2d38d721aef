//! 传感器叠加管道指标收集模块
//!
//! 采集循环、相机重试与合成循环的运行指标。

use std::collections::BTreeMap;

use metrics::{counter, gauge, histogram};

/// 记录一次成功发布的读数
pub fn record_reading_published(sensor_id: &str) {
    counter!(
        "sensor_overlay_readings_published_total",
        "sensor_id" => sensor_id.to_string()
    )
    .increment(1);
}

/// 记录因缓冲区已满而丢弃的读数（策略丢弃，不是错误）
pub fn record_reading_dropped(sensor_id: &str) {
    counter!(
        "sensor_overlay_readings_dropped_total",
        "sensor_id" => sensor_id.to_string()
    )
    .increment(1);
}

/// 记录相机的一次瞬时读取失败
pub fn record_transient_read_failure(device_id: i32) {
    counter!(
        "sensor_overlay_transient_read_failures_total",
        "device_id" => device_id.to_string()
    )
    .increment(1);
}

/// 记录传感器致命失败
pub fn record_sensor_failure(sensor_id: &str) {
    counter!(
        "sensor_overlay_sensor_failures_total",
        "sensor_id" => sensor_id.to_string()
    )
    .increment(1);
}

/// 记录缓存中某传感器的最新序号
pub fn record_last_seq(sensor_id: &str, seq: u64) {
    gauge!(
        "sensor_overlay_last_seq",
        "sensor_id" => sensor_id.to_string()
    )
    .set(seq as f64);
}

/// 记录一帧合成耗时（秒）
pub fn record_tick(duration_secs: f64) {
    counter!("sensor_overlay_ticks_total").increment(1);
    histogram!("sensor_overlay_tick_seconds").record(duration_secs);
}

/// 新鲜度指标聚合器
///
/// 在内存中聚合每帧耗时与各传感器读数年龄，便于输出摘要。
#[derive(Debug, Clone, Default)]
pub struct FreshnessAggregator {
    /// 总帧数
    pub total_ticks: u64,

    /// 每帧合成耗时 (毫秒)
    pub tick_stats: RunningStats,

    /// 各传感器读数在展示时的年龄 (毫秒)
    pub age_stats: BTreeMap<String, RunningStats>,
}

impl FreshnessAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一帧
    pub fn record_tick(&mut self, duration_ms: f64) {
        self.total_ticks += 1;
        self.tick_stats.push(duration_ms);
    }

    /// 记录某传感器当前展示读数的年龄
    pub fn record_age(&mut self, sensor_id: &str, age_ms: f64) {
        self.age_stats
            .entry(sensor_id.to_string())
            .or_default()
            .push(age_ms);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_ticks: self.total_ticks,
            tick_ms: StatsSummary::from(&self.tick_stats),
            reading_age_ms: self
                .age_stats
                .iter()
                .map(|(id, stats)| (id.clone(), StatsSummary::from(stats)))
                .collect(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_ticks: u64,
    pub tick_ms: StatsSummary,
    pub reading_age_ms: BTreeMap<String, StatsSummary>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Freshness Summary ===")?;
        writeln!(f, "Total ticks: {}", self.total_ticks)?;
        writeln!(f, "Tick time (ms): {}", self.tick_ms)?;

        if !self.reading_age_ms.is_empty() {
            writeln!(f, "Reading age at display (ms):")?;
            for (sensor, stats) in &self.reading_age_ms {
                writeln!(f, "  {}: {}", sensor, stats)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default, PartialEq)]
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
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

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
