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

use crate::common::{BusRuntime, HeraldConfig};

/// Entry point for assembling a Herald runtime.
///
/// `HeraldApp` builds a [`BusRuntime`] from configuration; everything else
/// hangs off the runtime. Hosts are expected to launch their own runtime
/// and pass its bus to whatever needs one; [`global`](Self::global) exists
/// only as the documented fallback for integrations that cannot thread a
/// bus through.
#[derive(Default, Debug, Clone, Copy)]
pub struct HeraldApp;

impl HeraldApp {
    /// Launches a runtime using the globally loaded configuration.
    pub fn launch() -> BusRuntime {
        let app: HeraldApp = Default::default();
        app.into()
    }

    /// Launches a runtime from an explicit configuration, bypassing the
    /// XDG lookup.
    pub fn launch_with_config(config: &HeraldConfig) -> BusRuntime {
        BusRuntime::new(config)
    }

    /// The process-wide default runtime, created lazily on first use.
    pub fn global() -> BusRuntime {
        GLOBAL.clone()
    }
}

lazy_static! {
    static ref GLOBAL: BusRuntime = HeraldApp::launch();
}
