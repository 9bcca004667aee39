/*
 * World Module
 *
 * This module defines the World struct: the mapping between simulation
 * coordinates and the window. It is set once at startup and again on every
 * resize, and it carries the zoom / pan state driven by the mouse.
 *
 * The simulation origin sits at the window center and one world unit is one
 * pixel at zoom 1.0.
 */

use nannou::prelude::*;
use tracing::{debug, warn};

pub struct World {
    pub width: f32,
    pub height: f32,
    pub position: Vec2,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub is_dragging: bool,
    pub last_cursor_pos: Vec2,
}

impl World {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            position: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 8.0,
            is_dragging: false,
            last_cursor_pos: Vec2::ZERO,
        }
    }

    // Establish the viewport; called at setup and on resize
    pub fn set(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) {
            warn!(width, height, "ignoring degenerate viewport size");
            return;
        }
        self.width = width;
        self.height = height;
        debug!(width, height, "viewport set");
    }

    /// Column-major orthographic matrix mapping world units to clip space.
    pub fn projection_matrix(&self) -> [f32; 16] {
        let sx = 2.0 * self.zoom / self.width;
        let sy = 2.0 * self.zoom / self.height;
        [
            sx, 0.0, 0.0, 0.0,
            0.0, sy, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            -self.position.x * sx, -self.position.y * sy, 0.0, 1.0,
        ]
    }

    // Convert a point from world space to screen space
    pub fn world_to_screen(&self, point: Vec2) -> Vec2 {
        (point - self.position) * self.zoom
    }

    // Convert a point from screen space to world space
    pub fn screen_to_world(&self, point: Vec2) -> Vec2 {
        point / self.zoom + self.position
    }

    // Zoom around the cursor so the world point under it stays put
    pub fn zoom(&mut self, scroll_delta: f32, cursor_position: Vec2) {
        let zoom_factor = 1.0 + scroll_delta * 0.1;
        let cursor_world_before = self.screen_to_world(cursor_position);

        self.zoom = (self.zoom * zoom_factor).clamp(self.min_zoom, self.max_zoom);

        let cursor_world_after = self.screen_to_world(cursor_position);
        self.position += cursor_world_before - cursor_world_after;
    }

    pub fn start_drag(&mut self, position: Vec2) {
        self.last_cursor_pos = position;
        self.is_dragging = true;
    }

    // Pan by the cursor movement since the last drag event
    pub fn drag(&mut self, position: Vec2) {
        if self.is_dragging {
            let delta = position - self.last_cursor_pos;
            if delta.length_squared() > 0.0 {
                self.position -= delta / self.zoom;
                self.last_cursor_pos = position;
            }
        }
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }

    pub fn reset_view(&mut self) {
        self.position = Vec2::ZERO;
        self.zoom = 1.0;
    }
}
