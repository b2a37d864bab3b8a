/*
 * Copyright (c) 2025. Herald Contributors
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Configuration for the Herald runtime.
///
/// Loaded from TOML files in XDG-compliant directories, so diagnostics
/// capture and sizing can be changed without recompiling the host.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HeraldConfig {
    /// Diagnostics capture configuration.
    pub diagnostics: DiagnosticsConfig,
    /// Sizing hints.
    pub limits: LimitsConfig,
}

/// Diagnostics capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Whether emission capture starts enabled.
    pub capture_enabled: bool,
    /// Ring-buffer capacity for captured emission records.
    pub record_capacity: usize,
}

/// Sizing hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Expected number of distinct message types, used to presize the
    /// per-category dispatch tables of a new bus.
    pub expected_message_types: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            capture_enabled: false,
            record_capacity: 256,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            expected_message_types: 64,
        }
    }
}

impl HeraldConfig {
    /// Load configuration from XDG-compliant locations.
    ///
    /// Attempts `$XDG_CONFIG_HOME/herald/config.toml` first, then the
    /// platform fallbacks the `xdg` crate resolves. If no configuration file
    /// is found, returns the default configuration. If a configuration file
    /// exists but is malformed, logs an error and uses defaults.
    pub fn load() -> Self {
        use tracing::{error, info};

        let xdg_dirs = match xdg::BaseDirectories::with_prefix("herald") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        let config_path = xdg_dirs.find_config_file("config.toml");

        if let Some(path) = config_path {
            info!("Loading configuration from: {}", path.display());
            match std::fs::read_to_string(&path) {
                Ok(config_str) => match toml::from_str::<Self>(&config_str) {
                    Ok(config) => {
                        info!("Successfully loaded configuration");
                        config
                    }
                    Err(e) => {
                        error!("Failed to parse configuration file {}: {}", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    error!("Failed to read configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            }
        } else {
            info!("No configuration file found, using defaults");
            Self::default()
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations.
    pub static ref CONFIG: HeraldConfig = HeraldConfig::load();
}
