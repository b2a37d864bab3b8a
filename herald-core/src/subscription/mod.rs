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

//! Subscription identity and lifecycle: handles, stored entries, and the
//! per-owner registration token.

pub use handle::RegistrationHandle;
pub use token::RegistrationToken;

pub(crate) use entry::{
    push_sorted, without_handle, Entry, InterceptorEntry, Location, ObserverEntry,
    SubscriberEntry,
};
pub(crate) use token::{TokenGate, TokenInner};

mod entry;
mod handle;
mod token;
