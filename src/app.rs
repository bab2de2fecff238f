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

//! Main application: map surface, load flow, and overlay attachment.
//!
//! The flow is a short state machine: the map is usable immediately, the
//! wind document loads in the background, and the result attaches either the
//! velocity overlay or a persistent error annotation. Terminal states never
//! transition back to loading; the document is fetched once per run.

use std::time::{Duration, Instant};

use egui::{Align2, Color32, FontId};
use walkers::{lon_lat, HttpTiles, Map, MapMemory, Position};

use crate::config::AppConfig;
use crate::overlay::velocity::draw_load_error;
use crate::overlay::{ParticleField, VelocityConfig, VelocityOverlay};
use crate::tiles;
use crate::wind::model::WindField;
use crate::wind::{loader, LoadError, WindComponent, WindLoader};

/// Startup map viewport. Immutable once the app is constructed; panning and
/// zooming live in the map widget's own memory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(center_lat: f64, center_lon: f64, zoom: f64) -> Self {
        Self {
            center_lat,
            center_lon,
            zoom,
        }
    }

    /// Map home position (used until the user pans away)
    pub fn home(&self) -> Position {
        lon_lat(self.center_lon, self.center_lat)
    }
}

/// Where the load flow currently stands
enum Phase {
    /// Fetch in flight
    Loading(WindLoader),
    /// Overlay attached and animating
    Active {
        field: WindField,
        particles: ParticleField,
    },
    /// Document parsed but no usable field could be built; the map stays
    /// bare and the failure is visible only on the log
    Degraded,
    /// Load or parse failed; the message stays on the map for the session
    Failed(String),
}

/// Decide the terminal phase from a finished fetch.
///
/// This is the single catch boundary: both anticipated failure kinds
/// (network and parse) become one user-visible message, while field assembly
/// problems stay diagnostic-only.
fn resolve_phase(
    result: Result<Vec<WindComponent>, LoadError>,
    config: &VelocityConfig,
) -> Phase {
    match result {
        Ok(components) => match WindField::from_components(components) {
            Ok(field) => {
                let particles = ParticleField::new(&field, config);
                log::info!(
                    "Velocity overlay attached: {} particles over {} grid cells",
                    particles.len(),
                    field.cell_count()
                );
                Phase::Active { field, particles }
            }
            Err(e) => {
                log::error!("Wind overlay construction failed: {}", e);
                Phase::Degraded
            }
        },
        Err(e) => Phase::Failed(loader::user_message(&e)),
    }
}

/// Wind map application window
pub struct WindMapApp {
    viewport: Viewport,
    tiles: HttpTiles,
    map_memory: MapMemory,
    velocity_config: VelocityConfig,
    phase: Phase,
    last_step: Instant,
}

impl WindMapApp {
    pub fn new(ctx: &egui::Context, config: &AppConfig, data_source: String) -> Self {
        let viewport = Viewport::new(config.center_lat, config.center_lon, config.default_zoom);

        let mut map_memory = MapMemory::default();
        if map_memory.set_zoom(viewport.zoom).is_err() {
            log::warn!("Configured zoom {} is out of range, keeping default", viewport.zoom);
        }

        Self {
            viewport,
            tiles: tiles::basemap_tiles(ctx),
            map_memory,
            velocity_config: VelocityConfig::default(),
            phase: Phase::Loading(WindLoader::spawn(data_source, ctx.clone())),
            last_step: Instant::now(),
        }
    }

    /// Consume the fetch result once it arrives
    fn poll_loader(&mut self) {
        if let Phase::Loading(load) = &self.phase {
            if let Some(result) = load.take_result() {
                self.phase = resolve_phase(result, &self.velocity_config);
            }
        }
    }

    /// Advance the particle simulation at the configured frame rate
    fn step_particles(&mut self) {
        if let Phase::Active { field, particles } = &mut self.phase {
            if self.last_step.elapsed() >= self.velocity_config.frame_period() {
                particles.step(field, &self.velocity_config);
                self.last_step = Instant::now();
            }
        }
    }

    fn draw_map(&mut self, ui: &mut egui::Ui) {
        let home = self.viewport.home();

        let mut map = Map::new(Some(&mut self.tiles), &mut self.map_memory, home);
        if let Phase::Active { field, particles } = &self.phase {
            map = map.with_plugin(VelocityOverlay {
                field,
                particles,
                config: &self.velocity_config,
                home,
            });
        }
        let response = ui.add(map);
        let rect = response.rect;

        // Attribution (required by the OSM tile usage policy)
        ui.painter().text(
            rect.right_bottom() + egui::vec2(-10.0, -10.0),
            Align2::RIGHT_BOTTOM,
            "© OpenStreetMap contributors",
            FontId::proportional(10.0),
            Color32::from_black_alpha(180),
        );

        if let Phase::Failed(message) = &self.phase {
            draw_load_error(ui, rect, message);
        }
    }
}

impl eframe::App for WindMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader();
        self.step_particles();

        match &self.phase {
            // Animate at the configured frame rate
            Phase::Active { .. } => ctx.request_repaint_after(self.velocity_config.frame_period()),
            // Poll for the fetch result; the loader also repaints on finish
            Phase::Loading(_) => ctx.request_repaint_after(Duration::from_millis(200)),
            // Nothing animates; repaint on interaction only
            Phase::Degraded | Phase::Failed(_) => {}
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_map(ui);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wind::loader::ERROR_PHRASE;
    use crate::wind::model::WindHeader;

    fn components(nx: usize, ny: usize) -> Vec<WindComponent> {
        let header = |parameter_number| WindHeader {
            parameter_number,
            parameter_number_name: None,
            parameter_unit: Some("m.s-1".to_string()),
            ref_time: None,
            nx,
            ny,
            lo1: -80.0,
            la1: 25.0,
            dx: 0.5,
            dy: 0.5,
        };
        vec![
            WindComponent {
                header: header(2),
                data: vec![5.0; nx * ny],
            },
            WindComponent {
                header: header(3),
                data: vec![0.0; nx * ny],
            },
        ]
    }

    #[test]
    fn test_viewport_matches_inputs() {
        let viewport = Viewport::new(15.0, -70.0, 4.0);
        assert!((viewport.center_lat - 15.0).abs() < 1e-12);
        assert!((viewport.center_lon + 70.0).abs() < 1e-12);
        assert!((viewport.zoom - 4.0).abs() < 1e-12);

        let home = viewport.home();
        assert!((home.x() + 70.0).abs() < 1e-12);
        assert!((home.y() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_successful_load_attaches_overlay() {
        let config = VelocityConfig::default();
        let phase = resolve_phase(Ok(components(60, 60)), &config);
        match phase {
            Phase::Active { field, particles } => {
                assert_eq!(field.cell_count(), 3600);
                assert_eq!(particles.len(), 12);
            }
            _ => panic!("expected the overlay to attach"),
        }
    }

    #[test]
    fn test_network_failure_shows_message() {
        let config = VelocityConfig::default();
        let phase = resolve_phase(
            Err(LoadError::Network("404 Not Found".to_string())),
            &config,
        );
        match phase {
            Phase::Failed(message) => {
                assert!(message.contains(ERROR_PHRASE));
                assert!(message.contains("404 Not Found"));
            }
            _ => panic!("expected the failure message"),
        }
    }

    #[test]
    fn test_parse_failure_shows_message() {
        let config = VelocityConfig::default();
        let parse_error = serde_json::from_str::<Vec<WindComponent>>("not json").unwrap_err();
        let phase = resolve_phase(Err(LoadError::Parse(parse_error)), &config);
        match phase {
            Phase::Failed(message) => assert!(message.contains(ERROR_PHRASE)),
            _ => panic!("expected the failure message"),
        }
    }

    #[test]
    fn test_unusable_field_degrades_silently() {
        let config = VelocityConfig::default();
        let mut incomplete = components(10, 10);
        incomplete.pop(); // drop the V component
        let phase = resolve_phase(Ok(incomplete), &config);
        assert!(matches!(phase, Phase::Degraded));
    }

    #[test]
    fn test_independent_flows_share_no_state() {
        let config = VelocityConfig::default();
        let first = resolve_phase(Ok(components(60, 60)), &config);
        let second = resolve_phase(
            Err(LoadError::Network("503 Service Unavailable".to_string())),
            &config,
        );

        // One flow failing leaves the other's overlay untouched
        assert!(matches!(first, Phase::Active { .. }));
        assert!(matches!(second, Phase::Failed(_)));
    }
}
