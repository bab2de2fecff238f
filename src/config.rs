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

//! Application configuration management.
//!
//! Persistent TOML configuration for the startup viewport and the wind data
//! source. Every field has a serde default so partially written configs keep
//! loading across versions.

use serde::{Deserialize, Serialize};

/// Default wind document location, relative to the working directory
pub const DEFAULT_WIND_DATA_SOURCE: &str = "data/wind.json";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Startup map center latitude
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,

    /// Startup map center longitude
    #[serde(default = "default_center_lon")]
    pub center_lon: f64,

    /// Startup map zoom level
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,

    /// Wind document location: local path or http(s) URL
    #[serde(default = "default_wind_data_source")]
    pub wind_data_source: String,
}

// Default value functions for serde

fn default_center_lat() -> f64 {
    15.0 // Caribbean
}

fn default_center_lon() -> f64 {
    -70.0
}

fn default_zoom() -> f64 {
    4.0
}

fn default_wind_data_source() -> String {
    DEFAULT_WIND_DATA_SOURCE.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            center_lat: default_center_lat(),
            center_lon: default_center_lon(),
            default_zoom: default_zoom(),
            wind_data_source: default_wind_data_source(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating the default file if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load("windvane-desktop", "config")
    }

    /// Save configuration to disk
    #[allow(dead_code)]
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store("windvane-desktop", "config", self)
    }
}
