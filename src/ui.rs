/*
 * UI Module
 *
 * This module contains functions for creating and updating the user interface
 * using nannou_egui. It exposes the flocking tunables as sliders and reports
 * which parameters changed so the app can re-tune or rebuild the flock.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::params::{FlockingParams, ParamChanges, SimulationParams};

/// What the user asked for during this UI frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct UiResponse {
    pub reset_requested: bool,
    pub changes: ParamChanges,
}

// Build the control panel and report requested actions
pub fn update_ui(egui: &mut Egui, params: &mut SimulationParams, debug_info: &DebugInfo) -> UiResponse {
    let mut reset_requested = false;

    params.take_snapshot();

    let ctx = egui.begin_frame();

    egui::Window::new("Flock Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Population", |ui| {
                ui.add(
                    egui::Slider::new(&mut params.population, SimulationParams::get_population_range())
                        .text("Boids"),
                );
                if ui.button("Reset Flock").clicked() {
                    reset_requested = true;
                }
            });

            let flocking = &mut params.flocking;
            ui.collapsing("Steering Limits", |ui| {
                ui.add(
                    egui::Slider::new(&mut flocking.max_speed, FlockingParams::get_speed_range())
                        .text("Max Speed"),
                );
                ui.add(
                    egui::Slider::new(&mut flocking.max_force, FlockingParams::get_force_range())
                        .text("Max Force"),
                );
            });

            ui.collapsing("Perception Ranges", |ui| {
                ui.add(
                    egui::Slider::new(&mut flocking.align_range, FlockingParams::get_range_range())
                        .text("Alignment Range"),
                );
                ui.add(
                    egui::Slider::new(&mut flocking.cohesion_range, FlockingParams::get_range_range())
                        .text("Cohesion Range"),
                );
                ui.add(
                    egui::Slider::new(&mut flocking.separation_range, FlockingParams::get_range_range())
                        .text("Separation Range"),
                );
            });

            // Larger weights mean weaker rules
            ui.collapsing("Rule Weights (divisors)", |ui| {
                ui.add(
                    egui::Slider::new(&mut flocking.align_weight, FlockingParams::get_weight_range())
                        .text("Alignment"),
                );
                ui.add(
                    egui::Slider::new(&mut flocking.cohesion_weight, FlockingParams::get_weight_range())
                        .text("Cohesion"),
                );
                ui.add(
                    egui::Slider::new(&mut flocking.separation_weight, FlockingParams::get_weight_range())
                        .text("Separation"),
                );
            });

            ui.collapsing("Performance", |ui| {
                ui.checkbox(&mut flocking.parallel, "Parallel Update");
                ui.separator();
                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Update: {:.3} ms", debug_info.update_ms()));
                ui.label(format!("Ticks this frame: {}", debug_info.ticks_per_frame));
            });

            ui.checkbox(&mut params.show_debug, "Show Debug Info");
            ui.checkbox(&mut params.pause_simulation, "Pause Simulation");
        });

    UiResponse {
        reset_requested,
        changes: params.detect_changes(),
    }
}

// Draw debug information in the top-right corner, clear of the control panel
pub fn draw_debug_info(draw: &nannou::Draw, debug_info: &DebugInfo, window_rect: nannou::geom::Rect) {
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 260.0;
    let lines = debug_info.lines();
    let panel_height = line_height * lines.len() as f32 + margin;
    let panel_x = window_rect.right() - panel_width / 2.0;
    let panel_y = window_rect.top() - panel_height / 2.0;

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    let text_x = panel_x;
    let text_y = window_rect.top() - margin;

    for (i, text) in lines.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);
        draw.text(text)
            .x_y(text_x, y)
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
