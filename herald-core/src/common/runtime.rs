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

use std::sync::Arc;

use tracing::debug;

use crate::common::{DiagnosticsRecorder, HeraldApp, HeraldConfig, MessageBus, RuntimeContext, CONFIG};

/// One assembled routing runtime: a [`RuntimeContext`] plus its default
/// [`MessageBus`].
///
/// Cheap to clone; clones share the same context and bus. Hosts that want
/// isolated routing domains call [`new_bus`](Self::new_bus) for additional
/// buses sharing this runtime's counters and diagnostics.
#[derive(Clone, Debug)]
pub struct BusRuntime {
    context: Arc<RuntimeContext>,
    bus: MessageBus,
    config: HeraldConfig,
}

impl BusRuntime {
    pub(crate) fn new(config: &HeraldConfig) -> Self {
        let context = Arc::new(RuntimeContext::new(config));
        let bus = MessageBus::new(context.clone(), config.limits.expected_message_types);
        debug!("bus runtime assembled");
        Self {
            context,
            bus,
            config: config.clone(),
        }
    }

    /// The runtime's default bus.
    pub fn bus(&self) -> MessageBus {
        self.bus.clone()
    }

    /// Creates an additional, independent bus sharing this runtime's
    /// context (handle counters and diagnostics).
    pub fn new_bus(&self) -> MessageBus {
        MessageBus::new(
            self.context.clone(),
            self.config.limits.expected_message_types,
        )
    }

    /// The shared runtime context.
    pub fn context(&self) -> Arc<RuntimeContext> {
        self.context.clone()
    }

    /// The diagnostics recorder shared by this runtime's buses.
    pub fn diagnostics(&self) -> &DiagnosticsRecorder {
        self.context.diagnostics()
    }

    /// Restores the runtime's counters and flags to their startup baseline.
    /// See [`RuntimeContext::reset`] for what is and is not affected.
    pub fn reset(&self) {
        self.context.reset();
    }
}

impl From<HeraldApp> for BusRuntime {
    fn from(_: HeraldApp) -> Self {
        BusRuntime::new(&CONFIG)
    }
}
