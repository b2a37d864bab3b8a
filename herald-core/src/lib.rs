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

#![forbid(unsafe_code)]

//! Herald Core Library
//!
//! This library provides the routing engine for the Herald message bus:
//! type-indexed dispatch tables, the interceptor/handler/post-processor
//! pipeline, registration tokens, and the diagnostics recorder.

/// The router and its runtime.
pub(crate) mod common;

pub(crate) mod message;
pub(crate) mod subscription;
/// Trait definitions used in the Herald framework.
pub(crate) mod traits;

/// Prelude module for convenient imports.
///
/// This module re-exports the commonly used items from the `common`,
/// `message`, `subscription`, and `traits` modules.
pub mod prelude {
    pub use crate::common::{
        BusRuntime, DiagnosticsConfig, DiagnosticsRecorder, HeraldApp, HeraldConfig,
        InterceptDecision, LimitsConfig, MessageBus, ObserverRef, Priority, RuntimeContext,
    };
    pub use crate::message::{
        AddressKey, BusError, EmitRecord, InstanceId, MessageCategory, TypeSlot, TypeSlotRegistry,
    };
    pub use crate::subscription::{RegistrationHandle, RegistrationToken};
    pub use crate::traits::{BusMessage, GlobalObserver};
}
