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

//! Wind particle simulation.
//!
//! Particles live in geographic coordinates so that panning and zooming the
//! map never disturbs the animation. Each frame a particle drifts along the
//! locally sampled wind vector; it respawns at a random position when it
//! ages out, leaves the field, or drops below the configured speed floor.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::VelocityConfig;
use crate::wind::model::WindField;

/// One animated particle with its previous position for trail strokes
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub lon: f64,
    pub lat: f64,
    pub prev_lon: f64,
    pub prev_lat: f64,
    pub age: u32,
}

/// Population of wind particles advancing over a wind field
#[derive(Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    rng: StdRng,
}

impl ParticleField {
    /// Seed a population sized from the grid cell count.
    pub fn new(field: &WindField, config: &VelocityConfig) -> Self {
        Self::with_rng(field, config, StdRng::from_os_rng())
    }

    /// Seed with a caller-supplied RNG for deterministic tests.
    pub fn with_rng(field: &WindField, config: &VelocityConfig, mut rng: StdRng) -> Self {
        let count = config.particle_count(field.cell_count());
        let particles = (0..count)
            .map(|_| {
                let mut particle = Self::random_particle(field, &mut rng);
                // Stagger ages so the population does not respawn in lockstep
                particle.age = rng.random_range(0..config.max_particle_age.max(1));
                particle
            })
            .collect();

        Self { particles, rng }
    }

    fn random_particle(field: &WindField, rng: &mut StdRng) -> Particle {
        let (west, south, east, north) = field.bounds();
        let lon = rng.random_range(west..=east);
        let lat = rng.random_range(south..=north);
        Particle {
            lon,
            lat,
            prev_lon: lon,
            prev_lat: lat,
            age: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Advance every particle by one animation frame.
    pub fn step(&mut self, field: &WindField, config: &VelocityConfig) {
        let rng = &mut self.rng;

        for particle in &mut self.particles {
            particle.age += 1;
            if particle.age >= config.max_particle_age {
                *particle = Self::random_particle(field, rng);
                continue;
            }

            let Some(wind) = field.sample(particle.lat, particle.lon) else {
                *particle = Self::random_particle(field, rng);
                continue;
            };

            if wind.speed() < config.min_velocity {
                *particle = Self::random_particle(field, rng);
                continue;
            }

            let (lon, lat) = (particle.lon, particle.lat);

            // Longitude step widens toward the poles to keep apparent motion
            // uniform under the Mercator basemap
            let cos_lat = lat.to_radians().cos().max(0.1);
            let next_lon = lon + wind.u * config.velocity_scale / cos_lat;
            let next_lat = lat + wind.v * config.velocity_scale;

            if field.contains(next_lat, next_lon) {
                particle.prev_lon = lon;
                particle.prev_lat = lat;
                particle.lon = next_lon;
                particle.lat = next_lat;
            } else {
                *particle = Self::random_particle(field, rng);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wind::model::{WindComponent, WindHeader};

    fn uniform_field(nx: usize, ny: usize, u: f64, v: f64) -> WindField {
        let header = |parameter_number| WindHeader {
            parameter_number,
            parameter_number_name: None,
            parameter_unit: None,
            ref_time: None,
            nx,
            ny,
            lo1: -80.0,
            la1: 25.0,
            dx: 0.5,
            dy: 0.5,
        };
        WindField::from_components(vec![
            WindComponent {
                header: header(2),
                data: vec![u; nx * ny],
            },
            WindComponent {
                header: header(3),
                data: vec![v; nx * ny],
            },
        ])
        .unwrap()
    }

    fn seeded(field: &WindField, config: &VelocityConfig) -> ParticleField {
        ParticleField::with_rng(field, config, StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_population_proportional_to_grid() {
        let config = VelocityConfig::default();
        let field = uniform_field(60, 60, 1.0, 0.0);
        let particles = seeded(&field, &config);
        assert_eq!(particles.len(), 12);
        assert!(!particles.is_empty());
    }

    #[test]
    fn test_particles_spawn_inside_field() {
        let config = VelocityConfig::default();
        let field = uniform_field(30, 30, 1.0, 1.0);
        let particles = seeded(&field, &config);
        for p in particles.iter() {
            assert!(field.contains(p.lat, p.lon));
        }
    }

    #[test]
    fn test_step_moves_with_the_wind() {
        let mut config = VelocityConfig::default();
        config.max_particle_age = u32::MAX; // never retire during the test
        let field = uniform_field(30, 30, 2.0, 0.0);
        let mut particles = seeded(&field, &config);

        let before: Vec<Particle> = particles.iter().copied().collect();
        particles.step(&field, &config);

        for (old, new) in before.iter().zip(particles.iter()) {
            if new.age == 0 {
                continue; // respawned at the eastern edge
            }
            assert!(new.lon > old.lon, "eastward wind must move particles east");
            assert!((new.lat - old.lat).abs() < 1e-12);
            assert!((new.prev_lon - old.lon).abs() < 1e-12);
        }
    }

    #[test]
    fn test_particles_stay_inside_field() {
        let mut config = VelocityConfig::default();
        config.velocity_scale = 0.2; // exaggerate motion to force exits
        let field = uniform_field(10, 10, 25.0, 25.0);
        let mut particles = seeded(&field, &config);

        for _ in 0..200 {
            particles.step(&field, &config);
            for p in particles.iter() {
                assert!(field.contains(p.lat, p.lon));
            }
        }
    }

    #[test]
    fn test_old_particles_respawn() {
        let mut config = VelocityConfig::default();
        config.max_particle_age = 2;
        let field = uniform_field(30, 30, 0.1, 0.0);
        let mut particles = seeded(&field, &config);

        for _ in 0..3 {
            particles.step(&field, &config);
        }
        for p in particles.iter() {
            assert!(p.age < config.max_particle_age);
        }
    }
}
