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

//! The router and its runtime: bus, dispatch pipeline, diagnostics,
//! configuration, and the context that owns process-wide counters.

pub use bus::MessageBus;
pub use config::{DiagnosticsConfig, HeraldConfig, LimitsConfig, CONFIG};
pub use context::RuntimeContext;
pub use diagnostics::DiagnosticsRecorder;
pub use dispatch::InterceptDecision;
pub use herald::HeraldApp;
pub use runtime::BusRuntime;
pub use types::{ObserverRef, Priority};

pub(crate) use bus::BusInner;
pub(crate) use types::{ErasedHandler, ErasedInterceptor, SharedList};

mod bus;
mod config;
mod context;
mod diagnostics;
mod dispatch;
mod herald;
mod runtime;
mod types;
