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

use std::fmt;
use std::sync::Arc;

use derive_new::new;

use crate::common::{ErasedHandler, ErasedInterceptor, ObserverRef, Priority, SharedList};
use crate::message::{InstanceId, MessageCategory, TypeSlot};
use crate::subscription::token::TokenGate;
use crate::subscription::RegistrationHandle;

/// One subscription stored in a dispatch list: identity, ordering keys, the
/// owning token's liveness gate, and the erased callback.
#[derive(Clone, new)]
pub(crate) struct Entry<F> {
    pub(crate) handle: RegistrationHandle,
    pub(crate) priority: Priority,
    pub(crate) gate: Option<TokenGate>,
    pub(crate) callback: F,
}

impl<F> Entry<F> {
    /// Delivery order: ascending priority, then ascending handle.
    pub(crate) fn sort_key(&self) -> (Priority, RegistrationHandle) {
        (self.priority, self.handle)
    }

    /// False while the owning token is disabled. Entries without a token
    /// (registered directly on the bus) are always live.
    pub(crate) fn is_live(&self) -> bool {
        self.gate.as_ref().map_or(true, TokenGate::is_enabled)
    }
}

impl<F> fmt::Debug for Entry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("handle", &self.handle)
            .field("priority", &self.priority)
            .field("live", &self.is_live())
            .finish_non_exhaustive()
    }
}

pub(crate) type SubscriberEntry = Entry<ErasedHandler>;
pub(crate) type InterceptorEntry = Entry<ErasedInterceptor>;
pub(crate) type ObserverEntry = Entry<ObserverRef>;

/// Where a handle's entry lives, for O(1) deregistration.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Location {
    Interceptor {
        category: MessageCategory,
        slot: TypeSlot,
    },
    Handler {
        category: MessageCategory,
        slot: TypeSlot,
        /// `Some` for exact-key targeted/broadcast entries; `None` for
        /// untargeted and "any" entries.
        key: Option<InstanceId>,
    },
    PostProcessor {
        category: MessageCategory,
        slot: TypeSlot,
    },
    Observer,
}

/// Returns a new list version with `entry` inserted at its sorted position.
pub(crate) fn push_sorted<F: Clone>(
    list: &SharedList<Entry<F>>,
    entry: Entry<F>,
) -> SharedList<Entry<F>> {
    let mut next = list.as_ref().clone();
    let at = next
        .binary_search_by_key(&entry.sort_key(), Entry::sort_key)
        .unwrap_or_else(|at| at);
    next.insert(at, entry);
    Arc::new(next)
}

/// Returns a new list version with the entry for `handle` removed.
pub(crate) fn without_handle<F: Clone>(
    list: &SharedList<Entry<F>>,
    handle: RegistrationHandle,
) -> SharedList<Entry<F>> {
    Arc::new(
        list.iter()
            .filter(|entry| entry.handle != handle)
            .cloned()
            .collect(),
    )
}
