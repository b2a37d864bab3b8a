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

use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use lazy_static::lazy_static;
use tracing::trace;

use crate::traits::BusMessage;

/// A process-stable integer assigned once per distinct message type.
///
/// Slots index the per-category subscriber tables, so a slot cached anywhere
/// in the process stays valid for the process lifetime: slots are never
/// reused, never renumbered, and deliberately survive a runtime
/// [`reset`](crate::common::BusRuntime::reset). A stale slot can at worst be
/// out of range, never alias a different type.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TypeSlot(usize);

impl TypeSlot {
    /// The slot's position in a per-category table.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TypeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

lazy_static! {
    static ref SLOTS: DashMap<TypeId, TypeSlot> = DashMap::new();
}

static NEXT_SLOT: AtomicUsize = AtomicUsize::new(0);

/// Process-wide registry mapping message types to their [`TypeSlot`]s.
///
/// The mapping is allocate-on-first-use and append-only. Keying by `TypeId`
/// through a sharded map keeps `slot_for` an O(1) lookup without a runtime
/// type-name comparison on the emit path.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeSlotRegistry;

impl TypeSlotRegistry {
    /// Returns the slot for `M`, allocating the next unused one on first use.
    pub fn slot_for<M: BusMessage>() -> TypeSlot {
        let type_id = TypeId::of::<M>();
        if let Some(slot) = SLOTS.get(&type_id) {
            return *slot;
        }
        *SLOTS.entry(type_id).or_insert_with(|| {
            let slot = TypeSlot(NEXT_SLOT.fetch_add(1, Ordering::Relaxed));
            trace!(
                message_type = std::any::type_name::<M>(),
                slot = slot.0,
                "allocated type slot"
            );
            slot
        })
    }

    /// One past the highest slot allocated so far; used to presize
    /// per-category tables when a bus is constructed.
    pub fn high_water() -> usize {
        NEXT_SLOT.load(Ordering::Relaxed)
    }
}
