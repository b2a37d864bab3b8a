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
#![forbid(missing_docs)]

//! # Herald
//!
//! Herald is an in-process publish/subscribe message router for interactive
//! applications. Components announce facts or commands as immutable typed
//! records and other components subscribe to receive them, without holding
//! direct references to each other: a central, introspectable dispatch
//! engine replaces manual callback wiring.
//!
//! ## Key Concepts
//!
//! - **Messages**: plain `Clone + Debug` data types; the [`prelude::BusMessage`]
//!   blanket impl covers them with no derive or registration step.
//! - **Categories**: untargeted (global), targeted (addressed to one
//!   [`prelude::InstanceId`]), and broadcast (sourced from one).
//! - **Bus ([`prelude::MessageBus`])**: type-indexed dispatch tables and the
//!   registration surface. Emitting is synchronous and allocation-free on
//!   the hot path.
//! - **Pipeline**: interceptors (may mutate or reject), then priority-ordered
//!   handlers (exact addressee before "any"), then post-processors, then
//!   global observers.
//! - **Tokens ([`prelude::RegistrationToken`])**: per-owner aggregates of
//!   subscriptions with an O(1) enable/disable switch and one-shot teardown.
//! - **Diagnostics ([`prelude::DiagnosticsRecorder`])**: optional bounded
//!   capture of emission history and per-handle call counts, toggleable
//!   through configuration without recompilation.
//! - **Runtime ([`prelude::BusRuntime`])**: assembles the context that owns
//!   process-wide counters; [`prelude::HeraldApp`] launches one from
//!   configuration.
//!
//! ## Quick Start
//!
//! ```rust
//! use herald::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! struct Ping;
//!
//! let runtime = HeraldApp::launch();
//! let bus = runtime.bus();
//! bus.register_untargeted::<Ping, _>(0, |_ping| println!("ping!"));
//! bus.emit_untargeted(Ping);
//! ```

/// Prelude module for convenient imports.
///
/// Re-exports the full public surface of `herald-core`.
pub mod prelude {
    pub use herald_core::prelude::*;
}
