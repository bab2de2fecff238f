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

//! Wind-field document model and grid sampling.
//!
//! The wind document is a JSON array of two component records (U and V wind,
//! GRIB parameter numbers 2 and 3) as emitted by the GFS processing pipeline.
//! Each record carries a header describing a regular lat/lon grid anchored at
//! its northwest corner plus a flat row-major data array. The loader only
//! checks that the document parses; grid consistency is enforced here when
//! the field is assembled for rendering.

use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;

/// GRIB parameter number for the U (eastward) wind component
pub const U_PARAMETER_NUMBER: i64 = 2;

/// GRIB parameter number for the V (northward) wind component
pub const V_PARAMETER_NUMBER: i64 = 3;

/// Timestamp format written by the GFS pipeline, e.g. "2025-10-27 00:00:00"
const REF_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One component record of the wind document
#[derive(Debug, Clone, Deserialize)]
pub struct WindComponent {
    pub header: WindHeader,
    pub data: Vec<f64>,
}

/// Grid metadata attached to each component
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindHeader {
    /// GRIB parameter number (2 = U, 3 = V)
    pub parameter_number: i64,

    #[serde(default)]
    pub parameter_number_name: Option<String>,

    /// Unit of the data values, e.g. "m.s-1"
    #[serde(default)]
    pub parameter_unit: Option<String>,

    /// Model reference time, e.g. "2025-10-27 00:00:00"
    #[serde(default)]
    pub ref_time: Option<String>,

    /// Grid width in samples
    pub nx: usize,

    /// Grid height in samples
    pub ny: usize,

    /// Longitude of the first (northwest) sample, degrees
    pub lo1: f64,

    /// Latitude of the first (northwest) sample, degrees
    pub la1: f64,

    /// Longitude step between columns, degrees east
    pub dx: f64,

    /// Latitude step between rows, degrees south
    pub dy: f64,
}

impl WindHeader {
    fn same_grid(&self, other: &WindHeader) -> bool {
        self.nx == other.nx
            && self.ny == other.ny
            && (self.lo1 - other.lo1).abs() < 1e-9
            && (self.la1 - other.la1).abs() < 1e-9
            && (self.dx - other.dx).abs() < 1e-9
            && (self.dy - other.dy).abs() < 1e-9
    }
}

/// Failure to assemble a renderable field from a parsed document.
///
/// These are the "malformed but parseable" cases. They are reported on the
/// log only; the basemap stays usable with no overlay.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("wind document has no {0}-component grid")]
    MissingComponent(char),

    #[error("U and V component grids do not describe the same area")]
    GridMismatch,

    #[error("{component}-component has {actual} samples, expected {nx}x{ny}")]
    DataLength {
        component: char,
        actual: usize,
        nx: usize,
        ny: usize,
    },

    #[error("grid is degenerate (nx={nx}, ny={ny}, dx={dx}, dy={dy})")]
    DegenerateGrid { nx: usize, ny: usize, dx: f64, dy: f64 },
}

/// A sampled wind vector in m/s: `u` east, `v` north.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindVector {
    pub u: f64,
    pub v: f64,
}

impl WindVector {
    /// Wind speed (vector magnitude)
    pub fn speed(&self) -> f64 {
        self.u.hypot(self.v)
    }
}

/// Assembled U/V wind grid supporting bilinear sampling at arbitrary
/// lat/lon positions.
#[derive(Debug, Clone)]
pub struct WindField {
    nx: usize,
    ny: usize,
    lo1: f64,
    la1: f64,
    dx: f64,
    dy: f64,
    u: Vec<f64>,
    v: Vec<f64>,
    ref_time: Option<NaiveDateTime>,
    unit: Option<String>,
}

impl WindField {
    /// Assemble a field from the parsed document components.
    ///
    /// Accepts the components in either order and ignores extra records.
    pub fn from_components(components: Vec<WindComponent>) -> Result<Self, FieldError> {
        let mut u_component = None;
        let mut v_component = None;

        for component in components {
            match component.header.parameter_number {
                U_PARAMETER_NUMBER => u_component = Some(component),
                V_PARAMETER_NUMBER => v_component = Some(component),
                other => {
                    log::debug!("Ignoring wind component with parameter number {}", other);
                }
            }
        }

        let u_component = u_component.ok_or(FieldError::MissingComponent('U'))?;
        let v_component = v_component.ok_or(FieldError::MissingComponent('V'))?;

        if !u_component.header.same_grid(&v_component.header) {
            return Err(FieldError::GridMismatch);
        }

        let header = u_component.header;
        let (nx, ny) = (header.nx, header.ny);

        if nx < 2 || ny < 2 || header.dx <= 0.0 || header.dy <= 0.0 {
            return Err(FieldError::DegenerateGrid {
                nx,
                ny,
                dx: header.dx,
                dy: header.dy,
            });
        }

        for (component, data) in [('U', &u_component.data), ('V', &v_component.data)] {
            if data.len() != nx * ny {
                return Err(FieldError::DataLength {
                    component,
                    actual: data.len(),
                    nx,
                    ny,
                });
            }
        }

        let ref_time = header
            .ref_time
            .as_deref()
            .and_then(|s| NaiveDateTime::parse_from_str(s, REF_TIME_FORMAT).ok());

        Ok(Self {
            nx,
            ny,
            lo1: header.lo1,
            la1: header.la1,
            dx: header.dx,
            dy: header.dy,
            u: u_component.data,
            v: v_component.data,
            ref_time,
            unit: header.parameter_unit,
        })
    }

    /// Number of grid cells, used to size the particle population
    pub fn cell_count(&self) -> usize {
        self.nx * self.ny
    }

    /// Model reference time, if the document carried a parseable one
    pub fn ref_time(&self) -> Option<NaiveDateTime> {
        self.ref_time
    }

    /// Unit string from the document header, e.g. "m.s-1"
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Geographic bounds as (west, south, east, north) degrees.
    ///
    /// East may exceed 180 for grids anchored at 0 longitude; longitude
    /// queries are normalized into that range before sampling.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let west = self.lo1;
        let east = self.lo1 + self.dx * (self.nx - 1) as f64;
        let north = self.la1;
        let south = self.la1 - self.dy * (self.ny - 1) as f64;
        (west, south, east, north)
    }

    /// Whether the grid spans the full circle of longitudes
    fn wraps_globe(&self) -> bool {
        self.dx * self.nx as f64 >= 360.0 - 1e-6
    }

    /// Normalize a longitude into the grid's coordinate range
    fn normalize_lon(&self, lon: f64) -> f64 {
        let span_end = self.lo1 + 360.0;
        let mut lon = lon;
        while lon < self.lo1 {
            lon += 360.0;
        }
        while lon >= span_end {
            lon -= 360.0;
        }
        lon
    }

    fn at(&self, i: usize, j: usize) -> WindVector {
        let idx = j * self.nx + i;
        WindVector {
            u: self.u[idx],
            v: self.v[idx],
        }
    }

    /// Whether the position falls inside the sampled area
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.sample(lat, lon).is_some()
    }

    /// Bilinearly interpolated wind vector at the position, or `None`
    /// outside the grid.
    pub fn sample(&self, lat: f64, lon: f64) -> Option<WindVector> {
        let fj = (self.la1 - lat) / self.dy;
        if fj < 0.0 || fj > (self.ny - 1) as f64 {
            return None;
        }

        let fi = (self.normalize_lon(lon) - self.lo1) / self.dx;
        if !self.wraps_globe() && fi > (self.nx - 1) as f64 {
            return None;
        }

        let j0 = (fj.floor() as usize).min(self.ny - 2);
        let j1 = j0 + 1;
        let i0 = (fi.floor() as usize).min(self.nx - 1);
        // The last column interpolates against the first when the grid wraps
        let i1 = if i0 + 1 < self.nx {
            i0 + 1
        } else if self.wraps_globe() {
            0
        } else {
            return None;
        };

        let tx = fi - fi.floor();
        let ty = fj - fj.floor();

        let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t;
        let (nw, ne) = (self.at(i0, j0), self.at(i1, j0));
        let (sw, se) = (self.at(i0, j1), self.at(i1, j1));

        Some(WindVector {
            u: lerp(lerp(nw.u, ne.u, tx), lerp(sw.u, se.u, tx), ty),
            v: lerp(lerp(nw.v, ne.v, tx), lerp(sw.v, se.v, tx), ty),
        })
    }
}
