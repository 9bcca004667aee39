/*
 * Timer Module
 *
 * Collects wall-clock samples per named operation (for example
 * "flock.update") and summarizes them as mean / min / max.
 */

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::info;

#[derive(Clone, Debug)]
struct TimedOperation {
    total: Duration,
    min: Duration,
    max: Duration,
    samples: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingSummary {
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
    pub samples: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Timer {
    operations: HashMap<&'static str, TimedOperation>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    // Run `f`, recording how long it took under `name`
    pub fn time<T, F: FnOnce() -> T>(&mut self, name: &'static str, f: F) -> T {
        let start = Instant::now();
        let value = f();
        self.record(name, start.elapsed());
        value
    }

    pub fn record(&mut self, name: &'static str, elapsed: Duration) {
        self.operations
            .entry(name)
            .and_modify(|op| {
                op.total += elapsed;
                op.min = op.min.min(elapsed);
                op.max = op.max.max(elapsed);
                op.samples += 1;
            })
            .or_insert(TimedOperation {
                total: elapsed,
                min: elapsed,
                max: elapsed,
                samples: 1,
            });
    }

    pub fn get(&self, name: &str) -> Option<TimingSummary> {
        self.operations.get(name).map(summarize)
    }

    // Sorted by operation name
    pub fn summary(&self) -> Vec<(&'static str, TimingSummary)> {
        let mut summary: Vec<_> = self
            .operations
            .iter()
            .map(|(name, op)| (*name, summarize(op)))
            .collect();
        summary.sort_by_key(|(name, _)| *name);
        summary
    }

    pub fn report(&self) {
        for (name, timing) in self.summary() {
            info!(
                operation = name,
                samples = timing.samples,
                mean_ms = timing.mean.as_secs_f64() * 1000.0,
                min_ms = timing.min.as_secs_f64() * 1000.0,
                max_ms = timing.max.as_secs_f64() * 1000.0,
                "timing"
            );
        }
    }

    pub fn clear(&mut self) {
        self.operations.clear();
    }
}

fn summarize(op: &TimedOperation) -> TimingSummary {
    // samples is never zero: entries are created with their first sample
    let mean = op.total.div_f64(op.samples as f64);
    TimingSummary {
        mean,
        min: op.min,
        max: op.max,
        samples: op.samples,
    }
}
