/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that contains performance metrics
 * and population statistics to be displayed in the UI and overlay.
 */

use std::time::Duration;

use crate::flock::FlockStats;
use crate::timer::Timer;

// Debug information to display
#[derive(Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub ticks_per_frame: usize,
    pub stats: FlockStats,
    pub timer: Timer,
}

impl DebugInfo {
    // Mean time spent in one flock update, in milliseconds
    pub fn update_ms(&self) -> f64 {
        self.timer
            .get("flock.update")
            .map(|timing| timing.mean.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("FPS: {:.1}", self.fps),
            format!("Frame time: {:.2} ms", self.frame_time.as_secs_f64() * 1000.0),
            format!("Update: {:.3} ms ({} ticks)", self.update_ms(), self.ticks_per_frame),
            format!("Boids: {} ({} outside)", self.stats.population, self.stats.outside_bound),
            format!(
                "Speed: {:.1} avg [{:.1}, {:.1}]",
                self.stats.mean_speed, self.stats.min_speed, self.stats.max_speed
            ),
            format!("Centroid: ({:.0}, {:.0})", self.stats.centroid.x, self.stats.centroid.y),
        ]
    }
}
