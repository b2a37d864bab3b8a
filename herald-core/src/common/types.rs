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

use std::any::Any;
use std::sync::Arc;

use crate::common::InterceptDecision;
use crate::message::AddressKey;
use crate::traits::GlobalObserver;

/// Ordering key for delivery within a stage; lower runs first. Ties are
/// broken by ascending registration handle.
pub type Priority = i32;

/// A registered global observer.
pub type ObserverRef = Arc<dyn GlobalObserver>;

/// Type-erased handler or post-processor callback. The concrete message type
/// is recovered by downcast inside the closure built at registration time.
pub(crate) type ErasedHandler = Arc<dyn Fn(AddressKey, &mut dyn Any) + Send + Sync>;

/// Type-erased interceptor callback.
pub(crate) type ErasedInterceptor =
    Arc<dyn Fn(AddressKey, &mut dyn Any) -> InterceptDecision + Send + Sync>;

/// Immutable snapshot list the dispatch walk iterates; registrations swap in
/// a new version rather than mutating in place.
pub(crate) type SharedList<T> = Arc<Vec<T>>;
