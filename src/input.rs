/*
 * Input Module
 *
 * This module handles user input events for the flocking simulation.
 *
 * Features:
 * - Panning with mouse drag
 * - Zooming with mouse wheel
 * - Keyboard shortcuts: Space pauses, R resets the flock,
 *   D toggles debug info, C recenters the view
 * - Viewport updates on resize
 */

use nannou::prelude::*;
use nannou::winit::event::{MouseButton, MouseScrollDelta, TouchPhase};
use tracing::info;

use crate::app::Model;

// Mouse moved event handler
pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    if model.world.is_dragging {
        model.world.drag(pos);
    }
    model.mouse_position = pos;
}

// Mouse pressed event handler
pub fn mouse_pressed(_app: &App, model: &mut Model, button: MouseButton) {
    // Clicks on the control panel belong to egui
    if button == MouseButton::Left && !model.egui.ctx().is_pointer_over_area() {
        model.world.start_drag(model.mouse_position);
    }
}

// Mouse released event handler
pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        model.world.end_drag();
    }
}

// Mouse wheel event handler for zooming
pub fn mouse_wheel(_app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }
    let scroll = match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
    };
    model.world.zoom(scroll, model.mouse_position);
}

// Keyboard shortcuts, ignored while egui has keyboard focus
pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    if model.egui.ctx().wants_keyboard_input() {
        return;
    }
    match key {
        Key::Space => {
            model.params.pause_simulation = !model.params.pause_simulation;
            info!(paused = model.params.pause_simulation, "simulation pause toggled");
        }
        Key::R => model.reset_flock(),
        Key::D => model.params.show_debug = !model.params.show_debug,
        Key::C => model.world.reset_view(),
        _ => {}
    }
}

// Keep the viewport, and a window-derived bound radius, in sync with the window
pub fn resized(_app: &App, model: &mut Model, size: Vec2) {
    model.world.set(size.x, size.y);
    if model.params.bound_radius.is_none() {
        model.params.window_width = size.x as u32;
        model.params.window_height = size.y as u32;
        let radius = model.params.bound_radius();
        if model.flock.set_bound_radius(radius).is_ok() {
            info!(radius, "bound radius follows window size");
        }
    }
}

// Pass raw window events to egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
