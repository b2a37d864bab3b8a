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

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, instrument, trace, warn};

use crate::common::{InterceptDecision, MessageBus, ObserverRef, Priority};
use crate::message::{AddressKey, BusError, InstanceId, MessageCategory};
use crate::subscription::RegistrationHandle;
use crate::traits::BusMessage;

/// Shared liveness flag consulted by every entry a token owns.
///
/// Flipping it is the whole cost of `enable`/`disable`: entries stay in the
/// bus, so re-enabling preserves registration order and priority and runs in
/// O(1) regardless of subscriber count.
#[derive(Clone, Debug)]
pub(crate) struct TokenGate(Arc<AtomicBool>);

impl TokenGate {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Relaxed);
    }
}

/// Per-owner aggregate of subscription handles with one enable/disable
/// switch.
///
/// An owner creates one token during initialization, wires its handlers
/// through it, flips [`enable`](Self::enable)/[`disable`](Self::disable) in
/// lockstep with its own active state, and calls
/// [`remove_all`](Self::remove_all) exactly once at teardown. Skipping
/// teardown leaks the owner's entries in the bus.
///
/// Lifecycle: created (enabled) ⇄ disabled, then removed, which is terminal.
/// After `remove_all`, lifecycle calls are no-ops and registrations are
/// rejected with [`BusError::TokenRemoved`].
///
/// Tokens are cheap to clone; clones share the same handle set and switch.
#[derive(Clone, Debug)]
pub struct RegistrationToken {
    pub(crate) inner: Arc<TokenInner>,
}

#[derive(Debug)]
pub(crate) struct TokenInner {
    owner: InstanceId,
    bus: MessageBus,
    pub(crate) gate: TokenGate,
    removed: AtomicBool,
    handles: Mutex<Vec<RegistrationHandle>>,
}

impl RegistrationToken {
    /// Returns the token for `owner` on `bus`, creating it on first use.
    ///
    /// Equivalent to [`MessageBus::token_for`]; a repeat call for the same
    /// owner returns the existing token rather than erroring, to tolerate
    /// idempotent setup code.
    pub fn create(bus: &MessageBus, owner: InstanceId) -> Self {
        bus.token_for(owner)
    }

    pub(crate) fn fresh(bus: MessageBus, owner: InstanceId) -> Self {
        trace!(owner = %owner, "creating registration token");
        Self {
            inner: Arc::new(TokenInner {
                owner,
                bus,
                gate: TokenGate::new(),
                removed: AtomicBool::new(false),
                handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The owner this token is bound to.
    pub fn owner(&self) -> InstanceId {
        self.inner.owner
    }

    /// True while the token's entries participate in dispatch.
    pub fn is_enabled(&self) -> bool {
        !self.is_removed() && self.inner.gate.is_enabled()
    }

    /// True once `remove_all` has run.
    pub fn is_removed(&self) -> bool {
        self.inner.removed.load(Ordering::Relaxed)
    }

    /// Resumes delivery to every handle this token owns. O(1); no-op after
    /// removal.
    pub fn enable(&self) {
        if self.is_removed() {
            warn!(owner = %self.inner.owner, "enable on removed token ignored");
            return;
        }
        self.inner.gate.set_enabled(true);
        trace!(owner = %self.inner.owner, "token enabled");
    }

    /// Suspends delivery to every handle this token owns without removing
    /// them. O(1); no-op after removal.
    pub fn disable(&self) {
        if self.is_removed() {
            warn!(owner = %self.inner.owner, "disable on removed token ignored");
            return;
        }
        self.inner.gate.set_enabled(false);
        trace!(owner = %self.inner.owner, "token disabled");
    }

    fn guard_live(&self) -> Result<(), BusError> {
        if self.is_removed() {
            warn!(owner = %self.inner.owner, "registration on removed token rejected");
            return Err(BusError::TokenRemoved(self.inner.owner));
        }
        Ok(())
    }

    fn remember(&self, handle: RegistrationHandle) -> RegistrationHandle {
        self.inner
            .handles
            .lock()
            .expect("token handle list lock poisoned")
            .push(handle);
        handle
    }

    /// Registers a handler for every untargeted `M`.
    pub fn register_untargeted<M, F>(
        &self,
        priority: Priority,
        handler: F,
    ) -> Result<RegistrationHandle, BusError>
    where
        M: BusMessage,
        F: Fn(&mut M) + Send + Sync + 'static,
    {
        self.guard_live()?;
        let handle = self.inner.bus.inner.register_handler_gated(
            MessageCategory::Untargeted,
            None,
            priority,
            Some(self.inner.gate.clone()),
            handler,
        );
        Ok(self.remember(handle))
    }

    /// Registers a handler for `M` targeted exactly at `target`.
    pub fn register_targeted<M, F>(
        &self,
        target: InstanceId,
        priority: Priority,
        handler: F,
    ) -> Result<RegistrationHandle, BusError>
    where
        M: BusMessage,
        F: Fn(&mut M) + Send + Sync + 'static,
    {
        self.guard_live()?;
        let handle = self.inner.bus.inner.register_handler_gated(
            MessageCategory::Targeted,
            Some(target),
            priority,
            Some(self.inner.gate.clone()),
            handler,
        );
        Ok(self.remember(handle))
    }

    /// Registers a handler for `M` targeted at anyone; the addressee is
    /// supplied to the callback.
    pub fn register_targeted_any<M, F>(
        &self,
        priority: Priority,
        handler: F,
    ) -> Result<RegistrationHandle, BusError>
    where
        M: BusMessage,
        F: Fn(InstanceId, &mut M) + Send + Sync + 'static,
    {
        self.guard_live()?;
        let handle = self.inner.bus.inner.register_any_handler_gated(
            MessageCategory::Targeted,
            priority,
            Some(self.inner.gate.clone()),
            handler,
        );
        Ok(self.remember(handle))
    }

    /// Registers a handler for `M` broadcast from exactly `source`.
    pub fn register_broadcast<M, F>(
        &self,
        source: InstanceId,
        priority: Priority,
        handler: F,
    ) -> Result<RegistrationHandle, BusError>
    where
        M: BusMessage,
        F: Fn(&mut M) + Send + Sync + 'static,
    {
        self.guard_live()?;
        let handle = self.inner.bus.inner.register_handler_gated(
            MessageCategory::Broadcast,
            Some(source),
            priority,
            Some(self.inner.gate.clone()),
            handler,
        );
        Ok(self.remember(handle))
    }

    /// Registers a handler for `M` broadcast from anyone; the source is
    /// supplied to the callback.
    pub fn register_broadcast_any<M, F>(
        &self,
        priority: Priority,
        handler: F,
    ) -> Result<RegistrationHandle, BusError>
    where
        M: BusMessage,
        F: Fn(InstanceId, &mut M) + Send + Sync + 'static,
    {
        self.guard_live()?;
        let handle = self.inner.bus.inner.register_any_handler_gated(
            MessageCategory::Broadcast,
            priority,
            Some(self.inner.gate.clone()),
            handler,
        );
        Ok(self.remember(handle))
    }

    /// Registers an interceptor for untargeted `M`.
    pub fn intercept_untargeted<M, F>(
        &self,
        priority: Priority,
        interceptor: F,
    ) -> Result<RegistrationHandle, BusError>
    where
        M: BusMessage,
        F: Fn(&mut M) -> InterceptDecision + Send + Sync + 'static,
    {
        self.guard_live()?;
        let handle = self.inner.bus.inner.register_interceptor_gated(
            MessageCategory::Untargeted,
            priority,
            Some(self.inner.gate.clone()),
            move |_key, message: &mut M| interceptor(message),
        );
        Ok(self.remember(handle))
    }

    /// Registers an interceptor for targeted `M`, regardless of addressee.
    pub fn intercept_targeted<M, F>(
        &self,
        priority: Priority,
        interceptor: F,
    ) -> Result<RegistrationHandle, BusError>
    where
        M: BusMessage,
        F: Fn(AddressKey, &mut M) -> InterceptDecision + Send + Sync + 'static,
    {
        self.guard_live()?;
        let handle = self.inner.bus.inner.register_interceptor_gated(
            MessageCategory::Targeted,
            priority,
            Some(self.inner.gate.clone()),
            interceptor,
        );
        Ok(self.remember(handle))
    }

    /// Registers an interceptor for broadcast `M`, regardless of source.
    pub fn intercept_broadcast<M, F>(
        &self,
        priority: Priority,
        interceptor: F,
    ) -> Result<RegistrationHandle, BusError>
    where
        M: BusMessage,
        F: Fn(AddressKey, &mut M) -> InterceptDecision + Send + Sync + 'static,
    {
        self.guard_live()?;
        let handle = self.inner.bus.inner.register_interceptor_gated(
            MessageCategory::Broadcast,
            priority,
            Some(self.inner.gate.clone()),
            interceptor,
        );
        Ok(self.remember(handle))
    }

    /// Registers a post-processor for untargeted `M`.
    pub fn post_process_untargeted<M, F>(
        &self,
        priority: Priority,
        post: F,
    ) -> Result<RegistrationHandle, BusError>
    where
        M: BusMessage,
        F: Fn(&mut M) + Send + Sync + 'static,
    {
        self.guard_live()?;
        let handle = self.inner.bus.inner.register_post_processor_gated(
            MessageCategory::Untargeted,
            priority,
            Some(self.inner.gate.clone()),
            move |_key, message: &mut M| post(message),
        );
        Ok(self.remember(handle))
    }

    /// Registers a post-processor for targeted `M`, regardless of addressee.
    pub fn post_process_targeted<M, F>(
        &self,
        priority: Priority,
        post: F,
    ) -> Result<RegistrationHandle, BusError>
    where
        M: BusMessage,
        F: Fn(AddressKey, &mut M) + Send + Sync + 'static,
    {
        self.guard_live()?;
        let handle = self.inner.bus.inner.register_post_processor_gated(
            MessageCategory::Targeted,
            priority,
            Some(self.inner.gate.clone()),
            post,
        );
        Ok(self.remember(handle))
    }

    /// Registers a post-processor for broadcast `M`, regardless of source.
    pub fn post_process_broadcast<M, F>(
        &self,
        priority: Priority,
        post: F,
    ) -> Result<RegistrationHandle, BusError>
    where
        M: BusMessage,
        F: Fn(AddressKey, &mut M) + Send + Sync + 'static,
    {
        self.guard_live()?;
        let handle = self.inner.bus.inner.register_post_processor_gated(
            MessageCategory::Broadcast,
            priority,
            Some(self.inner.gate.clone()),
            post,
        );
        Ok(self.remember(handle))
    }

    /// Registers a global observer gated by this token.
    pub fn register_observer(
        &self,
        observer: ObserverRef,
    ) -> Result<RegistrationHandle, BusError> {
        self.guard_live()?;
        let handle = self
            .inner
            .bus
            .inner
            .register_observer_gated(Some(self.inner.gate.clone()), observer);
        Ok(self.remember(handle))
    }

    /// Deregisters one handle this token owns and forgets it.
    ///
    /// # Errors
    ///
    /// [`BusError::ForeignHandle`] if the handle was not minted through this
    /// token: passing another owner's handle is a binding mismatch, not a
    /// tolerated no-op.
    #[instrument(skip(self), fields(owner = %self.inner.owner))]
    pub fn remove(&self, handle: RegistrationHandle) -> Result<(), BusError> {
        if self.is_removed() {
            warn!(owner = %self.inner.owner, %handle, "remove on removed token ignored");
            return Ok(());
        }
        let mut handles = self
            .inner
            .handles
            .lock()
            .expect("token handle list lock poisoned");
        match handles.iter().position(|owned| *owned == handle) {
            Some(at) => {
                handles.remove(at);
                drop(handles);
                self.inner.bus.deregister(handle);
                Ok(())
            }
            None => Err(BusError::ForeignHandle {
                handle,
                owner: self.inner.owner,
            }),
        }
    }

    /// Deregisters every handle this token owns and marks the token removed.
    ///
    /// Called exactly once at owner teardown; repeat calls and later
    /// lifecycle calls are no-ops.
    #[instrument(skip(self), fields(owner = %self.inner.owner))]
    pub fn remove_all(&self) {
        if self.inner.removed.swap(true, Ordering::Relaxed) {
            trace!(owner = %self.inner.owner, "remove_all on removed token ignored");
            return;
        }
        let drained: Vec<RegistrationHandle> = {
            let mut handles = self
                .inner
                .handles
                .lock()
                .expect("token handle list lock poisoned");
            std::mem::take(&mut *handles)
        };
        debug!(owner = %self.inner.owner, count = drained.len(), "tearing down token subscriptions");
        for handle in drained {
            self.inner.bus.deregister(handle);
        }
        self.inner.bus.forget_token(self.inner.owner, &self.inner);
    }
}

impl Drop for TokenInner {
    fn drop(&mut self) {
        if !*self.removed.get_mut() {
            let leaked = self.handles.get_mut().map_or(0, |handles| handles.len());
            if leaked > 0 {
                warn!(
                    owner = %self.owner,
                    leaked,
                    "token dropped without remove_all; subscriptions remain registered"
                );
            }
        }
    }
}
