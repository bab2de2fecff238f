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

//! One-shot wind document loader.
//!
//! The document is fetched exactly once per run on a background thread, with
//! no retry, timeout, or cancellation. The thread publishes its result into a
//! shared slot and requests a repaint; the UI thread consumes the result on
//! the next frame.

use std::sync::{Arc, Mutex};

use thiserror::Error;

use super::model::WindComponent;

/// Fixed phrase opening every user-visible load failure message
pub const ERROR_PHRASE: &str = "Could not load wind data";

/// Why the wind document could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    /// The server answered with a non-success status
    #[error("network error - {0}")]
    Network(String),

    /// The request could not be completed at all
    #[error("network error - {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not a valid wind document
    #[error("wind data is not valid JSON ({0})")]
    Parse(#[from] serde_json::Error),

    /// A local wind data file could not be read
    #[error("could not read wind data file ({0})")]
    Io(#[from] std::io::Error),
}

/// Message shown on the map when loading fails.
///
/// All anticipated failures funnel into this single message; the backend
/// scripts are the only way to (re)generate the document.
pub fn user_message(error: &LoadError) -> String {
    format!(
        "{}: {}. Run the backend scripts to generate data/wind.json.",
        ERROR_PHRASE, error
    )
}

/// Fetch and parse the wind document from an http(s) URL or a local path.
pub fn fetch_wind_document(source: &str) -> Result<Vec<WindComponent>, LoadError> {
    let body = if source.starts_with("http://") || source.starts_with("https://") {
        let response = reqwest::blocking::get(source)?;
        let status = response.status();
        if !status.is_success() {
            // e.g. "404 Not Found"
            return Err(LoadError::Network(status.to_string()));
        }
        response.text()?
    } else {
        std::fs::read_to_string(source)?
    };

    Ok(serde_json::from_str(&body)?)
}

/// Result slot shared between the fetch thread and the UI
#[derive(Debug)]
enum LoadState {
    Pending,
    Done(Result<Vec<WindComponent>, LoadError>),
}

/// Handle to the in-flight (or finished) wind document fetch
#[derive(Debug)]
pub struct WindLoader {
    state: Arc<Mutex<LoadState>>,
}

impl WindLoader {
    /// Start fetching on a background thread.
    pub fn spawn(source: String, ctx: egui::Context) -> Self {
        let state = Arc::new(Mutex::new(LoadState::Pending));
        let slot = state.clone();

        std::thread::spawn(move || {
            log::info!("Fetching wind data from {}", source);
            let result = fetch_wind_document(&source);
            match &result {
                Ok(components) => {
                    log::info!("Wind data loaded ({} component grids)", components.len());
                }
                Err(e) => log::error!("Failed to load wind data: {}", e),
            }

            *slot.lock().expect("wind loader slot poisoned") = LoadState::Done(result);
            ctx.request_repaint();
        });

        Self { state }
    }

    /// Take the finished result, if any. Returns `None` while the fetch is
    /// still in flight; yields the result at most once.
    pub fn take_result(&self) -> Option<Result<Vec<WindComponent>, LoadError>> {
        let mut state = self.state.lock().expect("wind loader slot poisoned");
        match &*state {
            LoadState::Pending => None,
            LoadState::Done(_) => {
                match std::mem::replace(&mut *state, LoadState::Pending) {
                    LoadState::Done(result) => Some(result),
                    LoadState::Pending => unreachable!(),
                }
            }
        }
    }
}
