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

use tracing::{instrument, trace};

use crate::common::BusInner;
use crate::message::{AddressKey, TypeSlotRegistry};
use crate::traits::BusMessage;

/// Whether an interceptor lets the current emission continue.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum InterceptDecision {
    /// Continue the pipeline; later interceptors and handlers see the
    /// (possibly mutated) working message.
    Deliver,
    /// Abort the emission: no further interceptor, handler, post-processor,
    /// or observer runs for it.
    Reject,
}

impl BusInner {
    /// Runs the delivery pipeline for one emission.
    ///
    /// Stage order: interceptors, then exact-key handlers, then "any"
    /// handlers, then post-processors, then global observers. Every stage
    /// list is walked ascending (priority, handle) over an `Arc` snapshot
    /// taken as the stage begins, so re-entrant registration or removal
    /// from inside a callback neither corrupts the walk nor changes which
    /// subscribers this emission reaches.
    ///
    /// A panicking callback unwinds through the emit call: remaining
    /// subscribers of the emission are not invoked, and no internal lock is
    /// held across callbacks, so the bus stays usable afterwards. Callers
    /// that need isolation wrap their own callbacks.
    #[instrument(
        level = "trace",
        skip(self, message),
        fields(message_type = std::any::type_name::<M>(), %key)
    )]
    pub(crate) fn dispatch<M: BusMessage>(&self, key: AddressKey, mut message: M) {
        let category = key.category();
        let slot = TypeSlotRegistry::slot_for::<M>();
        let diagnostics = self.context.diagnostics();
        let capture = diagnostics.is_capturing();
        if capture {
            diagnostics.record_emission(category, std::any::type_name::<M>(), slot, key);
        }
        let table = self.table(category);

        let interceptors = table.interceptors.get(&slot).map(|list| list.value().clone());
        if let Some(interceptors) = interceptors {
            for entry in interceptors.iter() {
                if !entry.is_live() {
                    continue;
                }
                if capture {
                    diagnostics.count_call(entry.handle);
                }
                if (entry.callback.as_ref())(key, &mut message) == InterceptDecision::Reject {
                    trace!(interceptor = %entry.handle, "emission rejected by interceptor");
                    return;
                }
            }
        }

        let exact = key
            .instance()
            .and_then(|instance| table.exact.get(&(slot, instance)))
            .map(|list| list.value().clone());
        let any = table.any.get(&slot).map(|list| list.value().clone());
        for entry in exact
            .iter()
            .flat_map(|list| list.iter())
            .chain(any.iter().flat_map(|list| list.iter()))
        {
            if !entry.is_live() {
                continue;
            }
            if capture {
                diagnostics.count_call(entry.handle);
            }
            (entry.callback.as_ref())(key, &mut message);
        }

        let post = table.post.get(&slot).map(|list| list.value().clone());
        if let Some(post) = post {
            for entry in post.iter() {
                if !entry.is_live() {
                    continue;
                }
                if capture {
                    diagnostics.count_call(entry.handle);
                }
                (entry.callback.as_ref())(key, &mut message);
            }
        }

        let observers = self.observers_snapshot();
        for entry in observers.iter() {
            if !entry.is_live() {
                continue;
            }
            match key {
                AddressKey::None => entry.callback.on_untargeted(&message),
                AddressKey::Target(target) => entry.callback.on_targeted(target, &message),
                AddressKey::Source(source) => entry.callback.on_broadcast(source, &message),
            }
        }
    }
}
