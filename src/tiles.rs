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

//! OpenStreetMap basemap tile source and Web Mercator helpers.

use std::path::PathBuf;

use walkers::sources::{Attribution, TileSource};
use walkers::{HttpOptions, HttpTiles, TileId};

/// Tile size used by the OSM raster pyramid, in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Web Mercator projection utilities
#[derive(Debug)]
pub struct WebMercator;

impl WebMercator {
    /// Convert latitude to a fractional tile Y coordinate at the given zoom
    pub fn lat_to_y(lat: f64, zoom: f64) -> f64 {
        let lat_rad = lat.to_radians();
        let n = 2_f64.powf(zoom);
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0;
        y * n
    }

    /// Convert longitude to a fractional tile X coordinate at the given zoom
    pub fn lon_to_x(lon: f64, zoom: f64) -> f64 {
        let n = 2_f64.powf(zoom);
        ((lon + 180.0) / 360.0) * n
    }

    /// Convert a fractional tile Y coordinate back to latitude
    pub fn tile_to_lat(y: f64, zoom: f64) -> f64 {
        let n = 2_f64.powf(zoom);
        let lat_rad = ((std::f64::consts::PI * (1.0 - 2.0 * y / n)).sinh()).atan();
        lat_rad.to_degrees()
    }

    /// Convert a fractional tile X coordinate back to longitude
    pub fn tile_to_lon(x: f64, zoom: f64) -> f64 {
        let n = 2_f64.powf(zoom);
        x / n * 360.0 - 180.0
    }
}

/// Tile source for the standard OpenStreetMap basemap
/// Uses subdomain load balancing across a-c.tile.openstreetmap.org
#[derive(Debug)]
pub struct OsmTileSource;

impl TileSource for OsmTileSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        // Subdomain load balancing (a, b, c) based on tile coordinates
        let subdomain = ['a', 'b', 'c'][((tile_id.x + tile_id.y) % 3) as usize];

        format!(
            "https://{}.tile.openstreetmap.org/{}/{}/{}.png",
            subdomain, tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenStreetMap contributors",
            url: "https://www.openstreetmap.org/copyright",
            logo_light: None,
            logo_dark: None,
        }
    }

    // Default tile_size() (256px) and max_zoom() are correct for OSM
}

/// Create the basemap tile fetcher with an on-disk HTTP cache.
pub fn basemap_tiles(ctx: &egui::Context) -> HttpTiles {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("windvane-desktop")
        .join("tiles");

    let http_options = HttpOptions {
        cache: Some(cache_dir),
        ..Default::default()
    };

    HttpTiles::with_options(OsmTileSource, http_options, ctx.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_url_template() {
        let url = OsmTileSource.tile_url(TileId { x: 2, y: 1, zoom: 4 });
        assert_eq!(url, "https://a.tile.openstreetmap.org/4/2/1.png");
    }

    #[test]
    fn test_tile_url_subdomain_balancing() {
        let a = OsmTileSource.tile_url(TileId { x: 0, y: 0, zoom: 1 });
        let b = OsmTileSource.tile_url(TileId { x: 1, y: 0, zoom: 1 });
        let c = OsmTileSource.tile_url(TileId { x: 1, y: 1, zoom: 1 });
        assert!(a.starts_with("https://a."));
        assert!(b.starts_with("https://b."));
        assert!(c.starts_with("https://c."));
    }

    #[test]
    fn test_attribution_names_osm() {
        let attribution = OsmTileSource.attribution();
        assert!(attribution.text.contains("OpenStreetMap"));
    }

    #[test]
    fn test_mercator_round_trip() {
        let zoom = 4.0;
        for &(lat, lon) in &[(15.0, -70.0), (0.0, 0.0), (-33.5, 151.2), (60.0, 179.9)] {
            let x = WebMercator::lon_to_x(lon, zoom);
            let y = WebMercator::lat_to_y(lat, zoom);
            assert!((WebMercator::tile_to_lon(x, zoom) - lon).abs() < 1e-9);
            assert!((WebMercator::tile_to_lat(y, zoom) - lat).abs() < 1e-9);
        }
    }

    #[test]
    fn test_mercator_origin() {
        // The equator/prime-meridian intersection sits at the center of the pyramid
        let zoom = 1.0;
        assert!((WebMercator::lon_to_x(0.0, zoom) - 1.0).abs() < 1e-12);
        assert!((WebMercator::lat_to_y(0.0, zoom) - 1.0).abs() < 1e-12);
    }
}
