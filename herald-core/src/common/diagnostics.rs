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

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use dashmap::DashMap;
use tracing::debug;

use crate::message::{AddressKey, EmitRecord, MessageCategory, TypeSlot};
use crate::subscription::RegistrationHandle;

/// Optional capture of emission history and per-handle call counts.
///
/// While capture is off (the default) the recorder costs one atomic load
/// per emit and keeps no state, so it can stay compiled into release builds
/// and be flipped on through configuration or at runtime when routing needs
/// to be inspected.
///
/// Consumers read through [`records`](Self::records) and
/// [`call_count`](Self::call_count); both return copies, never views into
/// live state.
#[derive(Debug)]
pub struct DiagnosticsRecorder {
    capture: AtomicBool,
    sequence: AtomicU64,
    capacity: usize,
    records: Mutex<VecDeque<EmitRecord>>,
    call_counts: DashMap<RegistrationHandle, u64>,
}

impl DiagnosticsRecorder {
    pub(crate) fn new(capture: bool, capacity: usize) -> Self {
        Self {
            capture: AtomicBool::new(capture),
            sequence: AtomicU64::new(0),
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
            call_counts: DashMap::new(),
        }
    }

    /// Turns capture on or off. Idempotent and safe at any time, including
    /// between two emissions of the same message type.
    pub fn set_capture(&self, on: bool) {
        let was = self.capture.swap(on, Ordering::Relaxed);
        if was != on {
            debug!(capture = on, "diagnostics capture toggled");
        }
    }

    /// True while emissions are being recorded.
    pub fn is_capturing(&self) -> bool {
        self.capture.load(Ordering::Relaxed)
    }

    /// The ring-buffer capacity this recorder was built with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of emissions recorded since startup or the last reset.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }

    pub(crate) fn record_emission(
        &self,
        category: MessageCategory,
        type_name: &'static str,
        slot: TypeSlot,
        key: AddressKey,
    ) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let mut records = self.records.lock().expect("diagnostics ring lock poisoned");
        records.push_back(EmitRecord::new(sequence, category, type_name, slot, key));
        while records.len() > self.capacity {
            records.pop_front();
        }
    }

    pub(crate) fn count_call(&self, handle: RegistrationHandle) {
        *self.call_counts.entry(handle).or_insert(0) += 1;
    }

    /// How many times the subscription behind `handle` has been invoked
    /// while capture was on.
    pub fn call_count(&self, handle: RegistrationHandle) -> u64 {
        self.call_counts.get(&handle).map_or(0, |count| *count)
    }

    /// A copy of the retained emission records, oldest first.
    pub fn records(&self) -> Vec<EmitRecord> {
        self.records
            .lock()
            .expect("diagnostics ring lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Drops all retained records and call counts. Capture state is left
    /// unchanged.
    pub fn clear(&self) {
        self.records
            .lock()
            .expect("diagnostics ring lock poisoned")
            .clear();
        self.call_counts.clear();
    }

    pub(crate) fn reset(&self, capture_baseline: bool) {
        self.set_capture(capture_baseline);
        self.clear();
        self.sequence.store(0, Ordering::Relaxed);
    }
}
