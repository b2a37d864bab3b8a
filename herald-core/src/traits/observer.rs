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

use crate::message::InstanceId;
use crate::traits::BusMessage;

/// Receives every message of every type within a category, after all
/// interceptors, handlers, and post-processors have run.
///
/// Observers see the final working copy of the message, type-erased; use
/// [`BusMessage::as_any`] to downcast, or [`dyn_clone::clone_box`] to retain
/// a copy. All methods default to no-ops so an implementor only overrides
/// the categories it cares about.
///
/// Register with
/// [`MessageBus::register_observer`](crate::common::MessageBus::register_observer),
/// which returns a single [`RegistrationHandle`](crate::subscription::RegistrationHandle)
/// covering all three callbacks.
pub trait GlobalObserver: Send + Sync {
    /// Called once per untargeted emission.
    fn on_untargeted(&self, message: &dyn BusMessage) {
        let _ = message;
    }

    /// Called once per targeted emission, with the addressee.
    fn on_targeted(&self, target: InstanceId, message: &dyn BusMessage) {
        let _ = (target, message);
    }

    /// Called once per broadcast emission, with the source.
    fn on_broadcast(&self, source: InstanceId, message: &dyn BusMessage) {
        let _ = (source, message);
    }
}
