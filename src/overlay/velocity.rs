// Copyright 2025 Windvane Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Animated velocity overlay drawn on top of the basemap.
//!
//! Implemented as a walkers map plugin: each frame the current particle
//! trails are projected to screen space and stroked with the ramp color for
//! the local wind speed. The simulation itself is stepped by the app at the
//! configured frame rate; this plugin only draws.

use egui::{Align2, Color32, FontId, Pos2, Rect, Response, Stroke, Ui};
use walkers::{lon_lat, MapMemory, Plugin, Position, Projector};

use super::config::{direction_degrees, LegendPosition, VelocityConfig};
use super::particles::ParticleField;
use crate::tiles::{WebMercator, TILE_SIZE};
use crate::wind::model::{WindField, WindVector};

/// Margin between the legend box and the map edge, pixels
const LEGEND_MARGIN: f32 = 10.0;

/// Velocity overlay plugin for a single frame
pub struct VelocityOverlay<'a> {
    pub field: &'a WindField,
    pub particles: &'a ParticleField,
    pub config: &'a VelocityConfig,
    /// Configured viewport center; the projection falls back to it until the
    /// user detaches the map by panning
    pub home: Position,
}

impl VelocityOverlay<'_> {
    fn to_screen(projector: &Projector, lon: f64, lat: f64) -> Pos2 {
        let projected = projector.project(lon_lat(lon, lat));
        egui::pos2(projected.x, projected.y)
    }

    /// Geographic position under the pointer, via the inverse Web Mercator
    /// transform around the current map center.
    fn pointer_position(
        &self,
        response: &Response,
        memory: &MapMemory,
    ) -> Option<(f64, f64)> {
        let pointer = response.hover_pos()?;
        let center = memory.detached().unwrap_or(self.home);
        let zoom = memory.zoom();

        let center_x = WebMercator::lon_to_x(center.x(), zoom);
        let center_y = WebMercator::lat_to_y(center.y(), zoom);
        let map_center = response.rect.center();

        let tile_x = center_x + f64::from(pointer.x - map_center.x) / TILE_SIZE;
        let tile_y = center_y + f64::from(pointer.y - map_center.y) / TILE_SIZE;

        Some((
            WebMercator::tile_to_lat(tile_y, zoom),
            WebMercator::tile_to_lon(tile_x, zoom),
        ))
    }

    /// Readout text for the wind under the pointer
    fn legend_text(&self, pointer: Option<(f64, f64)>) -> String {
        let sampled: Option<WindVector> =
            pointer.and_then(|(lat, lon)| self.field.sample(lat, lon));

        match sampled {
            Some(wind) => {
                let direction =
                    direction_degrees(wind.u, wind.v, self.config.display.angle_convention);
                format!(
                    "Wind {:.1} {} @ {:03.0}°",
                    wind.speed(),
                    self.config.display.speed_unit,
                    direction
                )
            }
            None => self.config.display.empty_string.to_string(),
        }
    }

    fn draw_trails(&self, ui: &Ui, response: &Response, projector: &Projector) {
        let painter = ui.painter().with_clip_rect(response.rect);

        for particle in self.particles.iter() {
            let from = Self::to_screen(projector, particle.prev_lon, particle.prev_lat);
            let to = Self::to_screen(projector, particle.lon, particle.lat);

            if !response.rect.contains(to) && !response.rect.contains(from) {
                continue;
            }

            let Some(wind) = self.field.sample(particle.lat, particle.lon) else {
                continue;
            };

            let color = self.config.color_for_speed(wind.speed());
            painter.line_segment([from, to], Stroke::new(self.config.line_width, color));
        }
    }

    fn draw_legend(&self, ui: &Ui, response: &Response, memory: &MapMemory) {
        let painter = ui.painter();

        let mut text = self.legend_text(self.pointer_position(response, memory));
        if let Some(ref_time) = self.field.ref_time() {
            text.push_str(&format!("\nGFS {} UTC", ref_time.format("%Y-%m-%d %H:%M")));
        }

        let galley = painter.layout_no_wrap(text, FontId::proportional(12.0), Color32::WHITE);

        let padding = egui::vec2(8.0, 5.0);
        let size = galley.size() + padding * 2.0;
        let rect = response.rect;
        let min = match self.config.display.position {
            LegendPosition::TopLeft => rect.left_top() + egui::vec2(LEGEND_MARGIN, LEGEND_MARGIN),
            LegendPosition::TopRight => {
                rect.right_top() + egui::vec2(-LEGEND_MARGIN - size.x, LEGEND_MARGIN)
            }
            LegendPosition::BottomLeft => {
                rect.left_bottom() + egui::vec2(LEGEND_MARGIN, -LEGEND_MARGIN - size.y)
            }
            LegendPosition::BottomRight => {
                rect.right_bottom() + egui::vec2(-LEGEND_MARGIN - size.x, -LEGEND_MARGIN - size.y)
            }
        };
        let box_rect = Rect::from_min_size(min, size);

        painter.rect_filled(
            box_rect,
            egui::CornerRadius::same(3),
            Color32::from_rgba_unmultiplied(0, 0, 0, 180),
        );
        painter.galley(box_rect.min + padding, galley, Color32::WHITE);
    }
}

impl Plugin for VelocityOverlay<'_> {
    fn run(
        self: Box<Self>,
        ui: &mut Ui,
        response: &Response,
        projector: &Projector,
        memory: &MapMemory,
    ) {
        self.draw_trails(ui, response, projector);

        if self.config.display.show_values {
            self.draw_legend(ui, response, memory);
        }
    }
}

/// Red annotation attached near the attribution line when the wind document
/// cannot be loaded. The basemap stays usable underneath.
pub fn draw_load_error(ui: &Ui, map_rect: Rect, message: &str) {
    let painter = ui.painter();

    let galley = painter.layout_no_wrap(
        message.to_string(),
        FontId::proportional(12.0),
        Color32::WHITE,
    );

    let padding = egui::vec2(12.0, 6.0);
    let center = map_rect.center_bottom() + egui::vec2(0.0, -30.0);
    let bubble_rect = Rect::from_center_size(center, galley.size() + padding * 2.0);

    painter.rect_filled(
        bubble_rect,
        egui::CornerRadius::same(5),
        Color32::from_rgb(220, 50, 50),
    );
    painter.text(
        center,
        Align2::CENTER_CENTER,
        message,
        FontId::proportional(12.0),
        Color32::WHITE,
    );
}
