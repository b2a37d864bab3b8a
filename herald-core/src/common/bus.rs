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
use std::hash::Hash;
use std::sync::{Arc, RwLock, Weak};

use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use tracing::{debug, instrument, trace};

use crate::common::{
    DiagnosticsRecorder, ErasedHandler, ErasedInterceptor, InterceptDecision, ObserverRef,
    Priority, RuntimeContext, SharedList,
};
use crate::message::{AddressKey, InstanceId, MessageCategory, TypeSlot, TypeSlotRegistry};
use crate::subscription::{
    push_sorted, without_handle, Entry, InterceptorEntry, Location, ObserverEntry,
    RegistrationHandle, RegistrationToken, SubscriberEntry, TokenGate, TokenInner,
};
use crate::traits::BusMessage;

/// The central router: per-category dispatch tables indexed by type slot,
/// the registration surface, and the handle index used for removal.
///
/// `MessageBus` is a cheap-clone handle; clones share one underlying router.
/// Collaborators that need a bus accept one explicitly. Nothing in the core
/// binds to a single hard-coded instance, and
/// [`HeraldApp::global`](crate::common::HeraldApp::global) exists only as
/// the documented fallback when no bus is supplied.
///
/// Emitting is synchronous and runs the whole delivery pipeline within the
/// caller's stack frame. On the success path with diagnostics capture off,
/// an emit performs no heap allocation: the walk iterates `Arc` snapshots of
/// the subscriber lists, and mutations during a walk swap in new list
/// versions instead of disturbing readers in flight.
#[derive(Clone, Debug)]
pub struct MessageBus {
    pub(crate) inner: Arc<BusInner>,
}

#[derive(Debug)]
pub(crate) struct BusInner {
    pub(crate) context: Arc<RuntimeContext>,
    pub(crate) untargeted: CategoryTable,
    pub(crate) targeted: CategoryTable,
    pub(crate) broadcast: CategoryTable,
    pub(crate) observers: RwLock<SharedList<ObserverEntry>>,
    pub(crate) registrations: DashMap<RegistrationHandle, Location>,
    pub(crate) tokens: DashMap<InstanceId, Weak<TokenInner>>,
}

/// One category's dispatch tables, each keyed by type slot.
#[derive(Debug, Default)]
pub(crate) struct CategoryTable {
    pub(crate) interceptors: DashMap<TypeSlot, SharedList<InterceptorEntry>>,
    /// Exact-key entries; targeted/broadcast only.
    pub(crate) exact: DashMap<(TypeSlot, InstanceId), SharedList<SubscriberEntry>>,
    /// Untargeted handlers and targeted/broadcast "any" handlers.
    pub(crate) any: DashMap<TypeSlot, SharedList<SubscriberEntry>>,
    pub(crate) post: DashMap<TypeSlot, SharedList<SubscriberEntry>>,
}

impl CategoryTable {
    fn with_capacity(slots: usize) -> Self {
        Self {
            interceptors: DashMap::with_capacity(slots),
            exact: DashMap::with_capacity(slots),
            any: DashMap::with_capacity(slots),
            post: DashMap::with_capacity(slots),
        }
    }
}

impl MessageBus {
    pub(crate) fn new(context: Arc<RuntimeContext>, expected_message_types: usize) -> Self {
        let slots = TypeSlotRegistry::high_water().max(expected_message_types);
        Self {
            inner: Arc::new(BusInner {
                context,
                untargeted: CategoryTable::with_capacity(slots),
                targeted: CategoryTable::with_capacity(slots),
                broadcast: CategoryTable::with_capacity(slots),
                observers: RwLock::new(Arc::new(Vec::new())),
                registrations: DashMap::new(),
                tokens: DashMap::new(),
            }),
        }
    }

    /// The diagnostics recorder shared by every bus of this runtime.
    pub fn diagnostics(&self) -> &DiagnosticsRecorder {
        self.inner.context.diagnostics()
    }

    /// Delivers `message` to every untargeted subscriber of its exact type.
    pub fn emit_untargeted<M: BusMessage>(&self, message: M) {
        self.inner.dispatch(AddressKey::None, message);
    }

    /// Delivers `message` to subscribers registered for exactly `target`,
    /// then to "any target" subscribers of the type.
    pub fn emit_targeted<M: BusMessage>(&self, target: InstanceId, message: M) {
        self.inner.dispatch(AddressKey::Target(target), message);
    }

    /// Delivers `message` to subscribers registered for exactly `source`,
    /// then to "any source" subscribers of the type.
    pub fn emit_broadcast<M: BusMessage>(&self, source: InstanceId, message: M) {
        self.inner.dispatch(AddressKey::Source(source), message);
    }

    /// Registers a handler for every untargeted `M`.
    #[instrument(skip(self, handler), fields(message_type = std::any::type_name::<M>()))]
    pub fn register_untargeted<M, F>(&self, priority: Priority, handler: F) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(&mut M) + Send + Sync + 'static,
    {
        self.inner
            .register_handler_gated(MessageCategory::Untargeted, None, priority, None, handler)
    }

    /// Registers a handler for `M` targeted exactly at `target`.
    #[instrument(
        skip(self, handler, target),
        fields(message_type = std::any::type_name::<M>(), addressee = %target)
    )]
    pub fn register_targeted<M, F>(
        &self,
        target: InstanceId,
        priority: Priority,
        handler: F,
    ) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(&mut M) + Send + Sync + 'static,
    {
        self.inner.register_handler_gated(
            MessageCategory::Targeted,
            Some(target),
            priority,
            None,
            handler,
        )
    }

    /// Registers a handler receiving every targeted `M` regardless of
    /// addressee; the addressee is supplied to the callback.
    #[instrument(skip(self, handler), fields(message_type = std::any::type_name::<M>()))]
    pub fn register_targeted_any<M, F>(&self, priority: Priority, handler: F) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(InstanceId, &mut M) + Send + Sync + 'static,
    {
        self.inner
            .register_any_handler_gated(MessageCategory::Targeted, priority, None, handler)
    }

    /// Registers a handler for `M` broadcast from exactly `source`.
    #[instrument(
        skip(self, handler, source),
        fields(message_type = std::any::type_name::<M>(), source = %source)
    )]
    pub fn register_broadcast<M, F>(
        &self,
        source: InstanceId,
        priority: Priority,
        handler: F,
    ) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(&mut M) + Send + Sync + 'static,
    {
        self.inner.register_handler_gated(
            MessageCategory::Broadcast,
            Some(source),
            priority,
            None,
            handler,
        )
    }

    /// Registers a handler receiving every broadcast `M` regardless of
    /// source; the source is supplied to the callback.
    #[instrument(skip(self, handler), fields(message_type = std::any::type_name::<M>()))]
    pub fn register_broadcast_any<M, F>(&self, priority: Priority, handler: F) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(InstanceId, &mut M) + Send + Sync + 'static,
    {
        self.inner
            .register_any_handler_gated(MessageCategory::Broadcast, priority, None, handler)
    }

    /// Registers an interceptor for untargeted `M`. Interceptors run before
    /// handlers and may mutate the working message or reject the emission.
    #[instrument(skip(self, interceptor), fields(message_type = std::any::type_name::<M>()))]
    pub fn intercept_untargeted<M, F>(&self, priority: Priority, interceptor: F) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(&mut M) -> InterceptDecision + Send + Sync + 'static,
    {
        self.inner.register_interceptor_gated(
            MessageCategory::Untargeted,
            priority,
            None,
            move |_key, message: &mut M| interceptor(message),
        )
    }

    /// Registers an interceptor for targeted `M`, seeing every addressee.
    #[instrument(skip(self, interceptor), fields(message_type = std::any::type_name::<M>()))]
    pub fn intercept_targeted<M, F>(&self, priority: Priority, interceptor: F) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(AddressKey, &mut M) -> InterceptDecision + Send + Sync + 'static,
    {
        self.inner
            .register_interceptor_gated(MessageCategory::Targeted, priority, None, interceptor)
    }

    /// Registers an interceptor for broadcast `M`, seeing every source.
    #[instrument(skip(self, interceptor), fields(message_type = std::any::type_name::<M>()))]
    pub fn intercept_broadcast<M, F>(&self, priority: Priority, interceptor: F) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(AddressKey, &mut M) -> InterceptDecision + Send + Sync + 'static,
    {
        self.inner
            .register_interceptor_gated(MessageCategory::Broadcast, priority, None, interceptor)
    }

    /// Registers a post-processor for untargeted `M`. Post-processors run
    /// after all handlers and cannot be skipped by them.
    #[instrument(skip(self, post), fields(message_type = std::any::type_name::<M>()))]
    pub fn post_process_untargeted<M, F>(&self, priority: Priority, post: F) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(&mut M) + Send + Sync + 'static,
    {
        self.inner.register_post_processor_gated(
            MessageCategory::Untargeted,
            priority,
            None,
            move |_key, message: &mut M| post(message),
        )
    }

    /// Registers a post-processor for targeted `M`.
    #[instrument(skip(self, post), fields(message_type = std::any::type_name::<M>()))]
    pub fn post_process_targeted<M, F>(&self, priority: Priority, post: F) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(AddressKey, &mut M) + Send + Sync + 'static,
    {
        self.inner
            .register_post_processor_gated(MessageCategory::Targeted, priority, None, post)
    }

    /// Registers a post-processor for broadcast `M`.
    #[instrument(skip(self, post), fields(message_type = std::any::type_name::<M>()))]
    pub fn post_process_broadcast<M, F>(&self, priority: Priority, post: F) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(AddressKey, &mut M) + Send + Sync + 'static,
    {
        self.inner
            .register_post_processor_gated(MessageCategory::Broadcast, priority, None, post)
    }

    /// Registers an observer receiving every message of every type, after
    /// the rest of the pipeline. Observers run in registration order.
    pub fn register_observer(&self, observer: ObserverRef) -> RegistrationHandle {
        self.inner.register_observer_gated(None, observer)
    }

    /// Removes one subscription. Idempotent: an unknown or already-removed
    /// handle is a no-op, so teardown code can safely run twice.
    pub fn deregister(&self, handle: RegistrationHandle) {
        self.inner.deregister(handle);
    }

    /// Returns the registration token for `owner`, creating it on first use.
    ///
    /// A repeat call while the owner's token lives returns the existing
    /// token (logged, not an error) so idempotent setup code is tolerated.
    pub fn token_for(&self, owner: InstanceId) -> RegistrationToken {
        match self.inner.tokens.entry(owner) {
            MapEntry::Occupied(mut occupied) => {
                if let Some(existing) = occupied.get().upgrade() {
                    debug!(%owner, "token already exists for owner; returning existing token");
                    RegistrationToken { inner: existing }
                } else {
                    let token = RegistrationToken::fresh(self.clone(), owner);
                    occupied.insert(Arc::downgrade(&token.inner));
                    token
                }
            }
            MapEntry::Vacant(vacant) => {
                let token = RegistrationToken::fresh(self.clone(), owner);
                vacant.insert(Arc::downgrade(&token.inner));
                token
            }
        }
    }

    pub(crate) fn forget_token(&self, owner: InstanceId, token: &Arc<TokenInner>) {
        let removed = Arc::as_ptr(token);
        self.inner
            .tokens
            .remove_if(&owner, |_, weak| weak.as_ptr() == removed);
    }

    /// Number of live handler subscriptions for `M` in `category`, across
    /// exact and "any" lists. Read-only; intended for diagnostics displays
    /// and tests.
    pub fn subscriber_count<M: BusMessage>(&self, category: MessageCategory) -> usize {
        let slot = TypeSlotRegistry::slot_for::<M>();
        let table = self.inner.table(category);
        let exact: usize = table
            .exact
            .iter()
            .filter(|entry| entry.key().0 == slot)
            .map(|entry| entry.value().iter().filter(|e| e.is_live()).count())
            .sum();
        let any = table
            .any
            .get(&slot)
            .map_or(0, |list| list.iter().filter(|e| e.is_live()).count());
        exact + any
    }

    /// True if any live handler subscription exists for `M` in `category`.
    pub fn has_subscribers<M: BusMessage>(&self, category: MessageCategory) -> bool {
        self.subscriber_count::<M>(category) > 0
    }
}

impl BusInner {
    pub(crate) fn table(&self, category: MessageCategory) -> &CategoryTable {
        match category {
            MessageCategory::Untargeted => &self.untargeted,
            MessageCategory::Targeted => &self.targeted,
            MessageCategory::Broadcast => &self.broadcast,
        }
    }

    pub(crate) fn register_handler_gated<M, F>(
        &self,
        category: MessageCategory,
        key: Option<InstanceId>,
        priority: Priority,
        gate: Option<TokenGate>,
        handler: F,
    ) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(&mut M) + Send + Sync + 'static,
    {
        let slot = TypeSlotRegistry::slot_for::<M>();
        let callback: ErasedHandler = Arc::new(move |_key, message: &mut dyn Any| {
            if let Some(message) = message.downcast_mut::<M>() {
                handler(message);
            }
        });
        self.insert_subscriber(category, slot, key, priority, gate, callback)
    }

    pub(crate) fn register_any_handler_gated<M, F>(
        &self,
        category: MessageCategory,
        priority: Priority,
        gate: Option<TokenGate>,
        handler: F,
    ) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(InstanceId, &mut M) + Send + Sync + 'static,
    {
        let slot = TypeSlotRegistry::slot_for::<M>();
        let callback: ErasedHandler = Arc::new(move |key: AddressKey, message: &mut dyn Any| {
            if let (Some(instance), Some(message)) = (key.instance(), message.downcast_mut::<M>())
            {
                handler(instance, message);
            }
        });
        self.insert_subscriber(category, slot, None, priority, gate, callback)
    }

    pub(crate) fn register_interceptor_gated<M, F>(
        &self,
        category: MessageCategory,
        priority: Priority,
        gate: Option<TokenGate>,
        interceptor: F,
    ) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(AddressKey, &mut M) -> InterceptDecision + Send + Sync + 'static,
    {
        let slot = TypeSlotRegistry::slot_for::<M>();
        let callback: ErasedInterceptor =
            Arc::new(move |key: AddressKey, message: &mut dyn Any| {
                match message.downcast_mut::<M>() {
                    Some(message) => interceptor(key, message),
                    None => InterceptDecision::Deliver,
                }
            });
        let handle = self.context.mint_handle();
        let entry = InterceptorEntry::new(handle, priority, gate, callback);
        {
            let mut list = self.table(category).interceptors.entry(slot).or_default();
            *list = push_sorted(&list, entry);
        }
        self.registrations
            .insert(handle, Location::Interceptor { category, slot });
        trace!(%handle, %category, %slot, "registered interceptor");
        handle
    }

    pub(crate) fn register_post_processor_gated<M, F>(
        &self,
        category: MessageCategory,
        priority: Priority,
        gate: Option<TokenGate>,
        post: F,
    ) -> RegistrationHandle
    where
        M: BusMessage,
        F: Fn(AddressKey, &mut M) + Send + Sync + 'static,
    {
        let slot = TypeSlotRegistry::slot_for::<M>();
        let callback: ErasedHandler = Arc::new(move |key: AddressKey, message: &mut dyn Any| {
            if let Some(message) = message.downcast_mut::<M>() {
                post(key, message);
            }
        });
        let handle = self.context.mint_handle();
        let entry = SubscriberEntry::new(handle, priority, gate, callback);
        {
            let mut list = self.table(category).post.entry(slot).or_default();
            *list = push_sorted(&list, entry);
        }
        self.registrations
            .insert(handle, Location::PostProcessor { category, slot });
        trace!(%handle, %category, %slot, "registered post-processor");
        handle
    }

    fn insert_subscriber(
        &self,
        category: MessageCategory,
        slot: TypeSlot,
        key: Option<InstanceId>,
        priority: Priority,
        gate: Option<TokenGate>,
        callback: ErasedHandler,
    ) -> RegistrationHandle {
        let handle = self.context.mint_handle();
        let entry = SubscriberEntry::new(handle, priority, gate, callback);
        let table = self.table(category);
        match key {
            Some(instance) => {
                let mut list = table.exact.entry((slot, instance)).or_default();
                *list = push_sorted(&list, entry);
            }
            None => {
                let mut list = table.any.entry(slot).or_default();
                *list = push_sorted(&list, entry);
            }
        }
        self.registrations
            .insert(handle, Location::Handler { category, slot, key });
        trace!(%handle, %category, %slot, "registered handler");
        handle
    }

    pub(crate) fn register_observer_gated(
        &self,
        gate: Option<TokenGate>,
        observer: ObserverRef,
    ) -> RegistrationHandle {
        let handle = self.context.mint_handle();
        let entry = ObserverEntry::new(handle, 0, gate, observer);
        {
            let mut list = self.observers.write().expect("observer list lock poisoned");
            *list = push_sorted(&list, entry);
        }
        self.registrations.insert(handle, Location::Observer);
        trace!(%handle, "registered global observer");
        handle
    }

    pub(crate) fn observers_snapshot(&self) -> SharedList<ObserverEntry> {
        self.observers
            .read()
            .expect("observer list lock poisoned")
            .clone()
    }

    pub(crate) fn deregister(&self, handle: RegistrationHandle) {
        let Some((_, location)) = self.registrations.remove(&handle) else {
            trace!(%handle, "deregister for unknown handle ignored");
            return;
        };
        match location {
            Location::Interceptor { category, slot } => {
                remove_entry(&self.table(category).interceptors, slot, handle);
            }
            Location::Handler { category, slot, key } => match key {
                Some(instance) => {
                    remove_entry(&self.table(category).exact, (slot, instance), handle);
                }
                None => remove_entry(&self.table(category).any, slot, handle),
            },
            Location::PostProcessor { category, slot } => {
                remove_entry(&self.table(category).post, slot, handle);
            }
            Location::Observer => {
                let mut list = self.observers.write().expect("observer list lock poisoned");
                *list = without_handle(&list, handle);
            }
        }
        trace!(%handle, "deregistered");
    }
}

/// Swaps in a list version without `handle`, dropping the map entry once the
/// list is empty so dead addressing keys do not accumulate.
fn remove_entry<K, F>(
    map: &DashMap<K, SharedList<Entry<F>>>,
    key: K,
    handle: RegistrationHandle,
) where
    K: Eq + Hash + Copy,
    F: Clone,
{
    let emptied = match map.get_mut(&key) {
        Some(mut list) => {
            let next = without_handle(&list, handle);
            let emptied = next.is_empty();
            *list = next;
            emptied
        }
        None => false,
    };
    if emptied {
        map.remove_if(&key, |_, list| list.is_empty());
    }
}
