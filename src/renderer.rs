/*
 * Renderer Module
 *
 * This module handles the rendering of the flocking simulation.
 * It draws the containment bound, every boid as a triangle pointing along
 * its heading, the debug overlay and the egui panel.
 *
 * The renderer never reads boids directly: it draws from a PoseBuffer that
 * the flock fills through the PoseSink contract once per frame.
 */

use nannou::prelude::*;

use crate::app::Model;
use crate::pose::{Pose, PoseSink};
use crate::ui;
use crate::BOID_SIZE;

/// Packed `[x, y, heading]` triples, one per boid slot.
#[derive(Clone, Debug, Default)]
pub struct PoseBuffer {
    data: Vec<[f32; 3]>,
}

impl PoseBuffer {
    pub fn with_capacity(count: usize) -> Self {
        Self {
            data: Vec::with_capacity(count),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[[f32; 3]] {
        &self.data
    }
}

impl PoseSink for PoseBuffer {
    fn set_pose(&mut self, slot: usize, pose: Pose) {
        if slot >= self.data.len() {
            self.data.resize(slot + 1, [0.0; 3]);
        }
        self.data[slot] = [pose.x as f32, pose.y as f32, pose.heading as f32];
    }

    fn submit(&mut self, poses: &[Pose]) {
        self.data.clear();
        self.data
            .extend(poses.iter().map(|pose| [pose.x as f32, pose.y as f32, pose.heading as f32]));
    }
}

// Triangle pointing along +x, scaled to the boid size
fn boid_points(size: f32) -> [Point2; 3] {
    [
        pt2(size, 0.0),
        pt2(-size, size / 2.0),
        pt2(-size, -size / 2.0),
    ]
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let world = &model.world;

    // Containment bound around the origin
    let center = world.world_to_screen(Vec2::ZERO);
    draw.ellipse()
        .xy(center)
        .radius(model.flock.bound_radius() as f32 * world.zoom)
        .no_fill()
        .stroke_weight(1.0)
        .stroke(rgba(0.3, 0.3, 0.3, 1.0));

    let points = boid_points(BOID_SIZE * world.zoom);
    let color = rgb(0.2, 0.4, 1.0);
    for &[x, y, heading] in model.pose_buffer.as_slice() {
        let screen_pos = world.world_to_screen(vec2(x, y));
        draw.polygon()
            .color(color)
            .points(points.iter().cloned())
            .xy(screen_pos)
            .rotate(heading);
    }

    if model.params.show_debug {
        // Perception ranges around the first boid
        if let Some(&[x, y, _]) = model.pose_buffer.as_slice().first() {
            let screen_pos = world.world_to_screen(vec2(x, y));
            let flocking = &model.params.flocking;
            let ranges = [
                (flocking.separation_range, RED),
                (flocking.align_range, GREEN),
                (flocking.cohesion_range, BLUE),
            ];
            for (range, color) in ranges {
                draw.ellipse()
                    .xy(screen_pos)
                    .radius(range as f32 * world.zoom)
                    .no_fill()
                    .stroke(color)
                    .stroke_weight(1.0);
            }
        }

        ui::draw_debug_info(&draw, &model.debug_info, app.window_rect());
    }

    // A lost frame is not worth tearing the app down for
    if let Err(err) = draw.to_frame(app, &frame) {
        tracing::warn!(?err, "failed to draw frame");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        tracing::warn!(?err, "failed to draw ui");
    }
}
