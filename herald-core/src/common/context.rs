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

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use lazy_static::lazy_static;
use tracing::{debug, instrument};

use crate::common::{DiagnosticsRecorder, HeraldConfig};
use crate::message::InstanceId;
use crate::subscription::RegistrationHandle;

lazy_static! {
    // Reset may be triggered from a different lifecycle phase than normal
    // dispatch, so it serializes process-wide.
    static ref RESET_LOCK: Mutex<()> = Mutex::new(());
}

/// The counters and flags one runtime shares between its buses.
///
/// Everything with process-wide identity requirements lives here, owned by
/// whichever bootstrap assembled the runtime, rather than in ambient mutable
/// globals. The one exception is the type-slot table, which must survive
/// [`reset`](Self::reset) and therefore stays in
/// [`TypeSlotRegistry`](crate::message::TypeSlotRegistry).
#[derive(Debug)]
pub struct RuntimeContext {
    handle_seq: AtomicU64,
    instance_seq: AtomicU64,
    diagnostics: DiagnosticsRecorder,
    baseline: Baseline,
}

/// Startup values restored by `reset`.
#[derive(Clone, Debug)]
struct Baseline {
    capture: bool,
    first_handle: u64,
    first_instance: u64,
}

impl RuntimeContext {
    pub(crate) fn new(config: &HeraldConfig) -> Self {
        Self {
            handle_seq: AtomicU64::new(1),
            instance_seq: AtomicU64::new(1),
            diagnostics: DiagnosticsRecorder::new(
                config.diagnostics.capture_enabled,
                config.diagnostics.record_capacity,
            ),
            baseline: Baseline {
                capture: config.diagnostics.capture_enabled,
                first_handle: 1,
                first_instance: 1,
            },
        }
    }

    pub(crate) fn mint_handle(&self) -> RegistrationHandle {
        RegistrationHandle::new(self.handle_seq.fetch_add(1, Ordering::Relaxed))
    }

    /// Mints a fresh identifier for a synthetic owner, a subscriber that is
    /// not backed by a host-managed entity but still needs addressing.
    pub fn mint_instance_id(&self) -> InstanceId {
        let raw = self.instance_seq.fetch_add(1, Ordering::Relaxed);
        InstanceId::from_nonzero(NonZeroU64::new(raw).expect("instance id counter wrapped"))
    }

    /// The diagnostics recorder shared by this context's buses.
    pub fn diagnostics(&self) -> &DiagnosticsRecorder {
        &self.diagnostics
    }

    /// Restores every counter and flag to its captured startup baseline:
    /// the handle and instance-id sequences, the diagnostics capture toggle,
    /// and the recorded history.
    ///
    /// The type-slot table is deliberately excluded so slot numbers cached
    /// anywhere stay valid across the reset.
    #[instrument(skip(self))]
    pub fn reset(&self) {
        let _guard = RESET_LOCK.lock().expect("reset lock poisoned");
        self.handle_seq
            .store(self.baseline.first_handle, Ordering::Relaxed);
        self.instance_seq
            .store(self.baseline.first_instance, Ordering::Relaxed);
        self.diagnostics.reset(self.baseline.capture);
        debug!("runtime context reset to startup baseline; type slots retained");
    }
}
