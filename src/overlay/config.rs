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

//! Velocity overlay rendering parameters.
//!
//! The configuration is a fixed set chosen once at startup and never derived
//! from the data. Defaults mirror the values used by the original hurricane
//! map: 0-15 m/s color range, 1/300 particle density, 15 fps animation.

use std::time::Duration;

use egui::Color32;

/// How wind direction is reported in the on-map readout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleConvention {
    /// Direction the wind blows toward, clockwise from north
    BearingCw,
    /// Direction the wind blows toward, counterclockwise from north
    BearingCcw,
    /// Direction the wind blows from, clockwise from north
    MeteoCw,
    /// Direction the wind blows from, counterclockwise from north
    MeteoCcw,
}

/// Corner of the map hosting the wind readout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// On-map readout options
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    /// Show the speed/direction readout at the pointer position
    pub show_values: bool,

    /// Unit label appended to the speed readout
    pub speed_unit: &'static str,

    pub angle_convention: AngleConvention,

    pub position: LegendPosition,

    /// Text shown when the pointer is outside the wind field
    pub empty_string: &'static str,
}

/// Fixed rendering parameters for the velocity overlay
#[derive(Debug, Clone)]
pub struct VelocityConfig {
    /// Speed floor below which a particle is retired, m/s
    pub min_velocity: f64,

    /// Speed mapped to the top of the color ramp, m/s
    pub max_velocity: f64,

    /// Degrees of motion per m/s per animation frame
    pub velocity_scale: f64,

    /// Particles per grid cell
    pub particle_multiplier: f64,

    /// Hard cap on the particle population
    pub max_particles: usize,

    /// Frames a particle lives before being respawned elsewhere
    pub max_particle_age: u32,

    /// Stroke width of particle trails, pixels
    pub line_width: f32,

    /// Animation refresh rate, frames per second
    pub frame_rate: f32,

    /// Ramp colors mapped low to high speed
    pub color_scale: Vec<Color32>,

    pub display: DisplayOptions,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            min_velocity: 0.0,
            max_velocity: 15.0,
            velocity_scale: 0.01,
            particle_multiplier: 1.0 / 300.0,
            max_particles: 5000,
            max_particle_age: 90,
            line_width: 2.0,
            frame_rate: 15.0,
            color_scale: vec![
                Color32::from_rgb(255, 255, 255), // white at low speeds
                Color32::from_rgb(100, 200, 255),
                Color32::from_rgb(0, 100, 255),
                Color32::from_rgb(255, 255, 0),
                Color32::from_rgb(255, 100, 0),
                Color32::from_rgb(255, 0, 0), // red at high speeds
            ],
            display: DisplayOptions {
                show_values: true,
                speed_unit: "m/s",
                angle_convention: AngleConvention::BearingCcw,
                position: LegendPosition::BottomLeft,
                empty_string: "No wind data",
            },
        }
    }
}

impl VelocityConfig {
    /// Time between animation frames
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.frame_rate.max(1.0))
    }

    /// Particle population for a grid of the given cell count
    pub fn particle_count(&self, cell_count: usize) -> usize {
        let count = (cell_count as f64 * self.particle_multiplier).round() as usize;
        count.clamp(1, self.max_particles)
    }

    /// Map a wind speed onto the color ramp.
    ///
    /// Speeds at or below `min_velocity` take the first ramp color, speeds at
    /// or above `max_velocity` the last; in between, adjacent ramp colors are
    /// blended linearly.
    pub fn color_for_speed(&self, speed: f64) -> Color32 {
        let stops = &self.color_scale;
        if stops.is_empty() {
            return Color32::WHITE;
        }
        if stops.len() == 1 {
            return stops[0];
        }

        let span = (self.max_velocity - self.min_velocity).max(f64::EPSILON);
        let t = ((speed - self.min_velocity) / span).clamp(0.0, 1.0);
        let scaled = t * (stops.len() - 1) as f64;
        let idx = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = (scaled - idx as f64) as f32;

        let (a, b) = (stops[idx], stops[idx + 1]);
        let lerp = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * frac) as u8;
        Color32::from_rgb(lerp(a.r(), b.r()), lerp(a.g(), b.g()), lerp(a.b(), b.b()))
    }
}

/// Wind direction in degrees under the given reporting convention.
///
/// `u` is the eastward and `v` the northward component in m/s.
pub fn direction_degrees(u: f64, v: f64, convention: AngleConvention) -> f64 {
    // Bearing the wind blows toward, clockwise from true north
    let toward = u.atan2(v).to_degrees().rem_euclid(360.0);

    let clockwise = match convention {
        AngleConvention::BearingCw | AngleConvention::BearingCcw => toward,
        AngleConvention::MeteoCw | AngleConvention::MeteoCcw => (toward + 180.0).rem_euclid(360.0),
    };

    match convention {
        AngleConvention::BearingCw | AngleConvention::MeteoCw => clockwise,
        AngleConvention::BearingCcw | AngleConvention::MeteoCcw => {
            (360.0 - clockwise).rem_euclid(360.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_map() {
        let config = VelocityConfig::default();
        assert!((config.min_velocity - 0.0).abs() < 1e-12);
        assert!((config.max_velocity - 15.0).abs() < 1e-12);
        assert!((config.velocity_scale - 0.01).abs() < 1e-12);
        assert!((config.particle_multiplier - 1.0 / 300.0).abs() < 1e-12);
        assert_eq!(config.color_scale.len(), 6);
        assert_eq!(config.display.empty_string, "No wind data");
        assert_eq!(config.display.angle_convention, AngleConvention::BearingCcw);
        assert_eq!(config.display.position, LegendPosition::BottomLeft);
    }

    #[test]
    fn test_particle_count_scales_with_grid() {
        let config = VelocityConfig::default();
        // 60x60 grid at 1/300 density
        assert_eq!(config.particle_count(3600), 12);
        // Tiny grids still animate something
        assert_eq!(config.particle_count(10), 1);
        // Huge grids hit the cap
        assert_eq!(config.particle_count(10_000_000), config.max_particles);
    }

    #[test]
    fn test_color_ramp_endpoints() {
        let config = VelocityConfig::default();
        assert_eq!(config.color_for_speed(-5.0), Color32::from_rgb(255, 255, 255));
        assert_eq!(config.color_for_speed(0.0), Color32::from_rgb(255, 255, 255));
        assert_eq!(config.color_for_speed(15.0), Color32::from_rgb(255, 0, 0));
        assert_eq!(config.color_for_speed(100.0), Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn test_color_ramp_interpolates_between_stops() {
        let config = VelocityConfig::default();
        // Halfway between the first two stops: 1.5 m/s over a 0-15 range
        let color = config.color_for_speed(1.5);
        assert_eq!(color, Color32::from_rgb(177, 227, 255));
    }

    #[test]
    fn test_frame_period() {
        let config = VelocityConfig::default();
        let period = config.frame_period();
        assert!((period.as_secs_f32() - 1.0 / 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_direction_conventions() {
        // Due east wind
        assert!((direction_degrees(1.0, 0.0, AngleConvention::BearingCw) - 90.0).abs() < 1e-9);
        assert!((direction_degrees(1.0, 0.0, AngleConvention::BearingCcw) - 270.0).abs() < 1e-9);
        assert!((direction_degrees(1.0, 0.0, AngleConvention::MeteoCw) - 270.0).abs() < 1e-9);
        assert!((direction_degrees(1.0, 0.0, AngleConvention::MeteoCcw) - 90.0).abs() < 1e-9);

        // Due north wind blows toward 0, from 180
        assert!((direction_degrees(0.0, 1.0, AngleConvention::BearingCw) - 0.0).abs() < 1e-9);
        assert!((direction_degrees(0.0, 1.0, AngleConvention::MeteoCw) - 180.0).abs() < 1e-9);
    }
}
