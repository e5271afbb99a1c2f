use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters for one engine subcommand.
#[derive(Default)]
struct CommandStats {
    runs: AtomicUsize,
    failures: AtomicUsize,
    total_time_us: AtomicU64,
}

impl CommandStats {
    fn record(&self, duration: Duration, success: bool) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        self.total_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CommandSnapshot {
        let runs = self.runs.load(Ordering::Relaxed);
        let total_us = self.total_time_us.load(Ordering::Relaxed) as f64;
        CommandSnapshot {
            runs,
            failures: self.failures.load(Ordering::Relaxed),
            avg_time_ms: if runs > 0 {
                total_us / runs as f64 / 1000.0
            } else {
                0.0
            },
        }
    }
}

#[derive(Default)]
pub struct Metrics {
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,

    init: CommandStats,
    index: CommandStats,
    prompt_tune: CommandStats,
    update: CommandStats,
    query: CommandStats,

    visualizations_rendered: AtomicUsize,
    entities_referenced: AtomicUsize,
    relationships_referenced: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// `command` is the engine subcommand name; unknown names are ignored.
    pub fn record_engine(&self, command: &str, duration: Duration, success: bool) {
        let stats = match command {
            "init" => &self.init,
            "index" => &self.index,
            "prompt-tune" => &self.prompt_tune,
            "update" => &self.update,
            "query" => &self.query,
            _ => return,
        };
        stats.record(duration, success);
    }

    pub fn record_references(&self, entities: usize, relationships: usize, rendered: bool) {
        self.entities_referenced.fetch_add(entities, Ordering::Relaxed);
        self.relationships_referenced
            .fetch_add(relationships, Ordering::Relaxed);
        if rendered {
            self.visualizations_rendered.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            init: self.init.snapshot(),
            index: self.index.snapshot(),
            prompt_tune: self.prompt_tune.snapshot(),
            update: self.update.snapshot(),
            query: self.query.snapshot(),
            visualizations_rendered: self.visualizations_rendered.load(Ordering::Relaxed),
            entities_referenced: self.entities_referenced.load(Ordering::Relaxed),
            relationships_referenced: self.relationships_referenced.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CommandSnapshot {
    pub runs: usize,
    pub failures: usize,
    pub avg_time_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub init: CommandSnapshot,
    pub index: CommandSnapshot,
    pub prompt_tune: CommandSnapshot,
    pub update: CommandSnapshot,
    pub query: CommandSnapshot,
    pub visualizations_rendered: usize,
    pub entities_referenced: usize,
    pub relationships_referenced: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
