use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Instant;

/// Observer for extraction runs.
///
/// Use cases report progress, per-stage timings and metrics through this
/// trait so the CLI and tests can watch the same orchestration code.
pub trait PipelineLogger: Send {
    fn progress(&mut self, current: usize, total: usize);

    /// How long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Per-frame value, e.g. faces found in a frame.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-run report. Default: no-op.
    fn summary(&self) {}
}

/// Discards every event.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Count, sum and extremes of a stream of samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunningStat {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl RunningStat {
    fn first(value: f64) -> Self {
        Self {
            count: 1,
            sum: value,
            min: value,
            max: value,
        }
    }

    fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

fn record(stats: &mut BTreeMap<String, RunningStat>, key: &str, value: f64) {
    match stats.get_mut(key) {
        Some(stat) => stat.add(value),
        None => {
            stats.insert(key.to_string(), RunningStat::first(value));
        }
    }
}

/// Reports through `log::info!`: a progress line at every `step_percent`
/// of the run (and on the last frame), and a per-stage report at the end.
pub struct SummaryLogger {
    step_percent: usize,
    next_report: usize,
    frames: usize,
    stages: BTreeMap<String, RunningStat>,
    metrics: BTreeMap<String, RunningStat>,
    started: Instant,
}

impl SummaryLogger {
    /// `step_percent` is clamped to 1..=100.
    pub fn new(step_percent: usize) -> Self {
        Self {
            step_percent: step_percent.clamp(1, 100),
            next_report: 0,
            frames: 0,
            stages: BTreeMap::new(),
            metrics: BTreeMap::new(),
            started: Instant::now(),
        }
    }

    pub fn stage(&self, name: &str) -> Option<RunningStat> {
        self.stages.get(name).copied()
    }

    pub fn metric_stat(&self, name: &str) -> Option<RunningStat> {
        self.metrics.get(name).copied()
    }

    /// End-of-run report, or `None` when no frame was processed.
    pub fn report(&self) -> Option<String> {
        if self.frames == 0 {
            return None;
        }
        let secs = self.started.elapsed().as_secs_f64();
        let mut out = format!("{} frames in {secs:.2}s", self.frames);
        if secs > 0.0 {
            let _ = write!(out, " ({:.1} frames/s)", self.frames as f64 / secs);
        }
        for (name, stat) in &self.stages {
            let _ = write!(
                out,
                "\n  {name:<10} mean {:>7.2}ms  min {:>7.2}ms  max {:>7.2}ms",
                stat.mean(),
                stat.min(),
                stat.max()
            );
        }
        for (name, stat) in &self.metrics {
            let _ = write!(
                out,
                "\n  {name:<10} {:.0} over {} frames, at most {:.0} per frame",
                stat.sum(),
                stat.count(),
                stat.max()
            );
        }
        Some(out)
    }
}

impl Default for SummaryLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for SummaryLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames = current;
        if total == 0 {
            return;
        }
        let percent = current * 100 / total;
        if percent >= self.next_report || current == total {
            log::info!("{current}/{total} frames ({percent}%)");
            self.next_report = (percent / self.step_percent + 1) * self.step_percent;
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        record(&mut self.stages, stage, duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        record(&mut self.metrics, name, value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(report) = self.report() {
            log::info!("{report}");
        }
    }
}
