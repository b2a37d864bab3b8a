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
use herald::prelude::*;

use crate::setup::messages::*;
use crate::setup::*;

mod setup;

#[test]
fn disable_suppresses_and_enable_restores_in_order() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch();
    let bus = runtime.bus();
    let log = CallLog::new();

    let owner = runtime.context().mint_instance_id();
    let token = bus.token_for(owner);

    for label in ["one", "two", "three"] {
        let log = log.clone();
        token.register_untargeted(0, move |_: &mut Ping| log.push(label))?;
    }

    token.disable();
    bus.emit_untargeted(Ping);
    assert!(log.take().is_empty());

    token.enable();
    bus.emit_untargeted(Ping);
    assert_eq!(log.take(), vec!["one", "two", "three"]);
    Ok(())
}

#[test]
fn disabled_token_keeps_priority_slot_among_others() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch();
    let bus = runtime.bus();
    let log = CallLog::new();

    let owner = runtime.context().mint_instance_id();
    let token = bus.token_for(owner);

    let log_mid = log.clone();
    token.register_untargeted(1, move |_: &mut Pong| log_mid.push("token"))?;
    let log_low = log.clone();
    bus.register_untargeted(0, move |_: &mut Pong| log_low.push("low"));
    let log_high = log.clone();
    bus.register_untargeted(2, move |_: &mut Pong| log_high.push("high"));

    token.disable();
    bus.emit_untargeted(Pong);
    assert_eq!(log.take(), vec!["low", "high"]);

    // Re-enabling restores the original middle position, not the tail.
    token.enable();
    bus.emit_untargeted(Pong);
    assert_eq!(log.take(), vec!["low", "token", "high"]);
    Ok(())
}

#[test]
fn remove_all_is_terminal() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch();
    let bus = runtime.bus();
    let log = CallLog::new();

    let owner = runtime.context().mint_instance_id();
    let token = bus.token_for(owner);
    let log_handler = log.clone();
    token.register_untargeted(0, move |_: &mut Ping| log_handler.push("handler"))?;

    token.remove_all();
    assert!(token.is_removed());
    bus.emit_untargeted(Ping);
    assert!(log.take().is_empty());

    // Lifecycle calls become no-ops; registration is rejected loudly.
    token.enable();
    token.disable();
    token.remove_all();
    let rejected = token.register_untargeted(0, |_: &mut Ping| {});
    assert_eq!(rejected.unwrap_err(), BusError::TokenRemoved(owner));
    Ok(())
}

#[test]
fn duplicate_token_for_same_owner_returns_existing() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch();
    let bus = runtime.bus();
    let log = CallLog::new();

    let owner = runtime.context().mint_instance_id();
    let token = bus.token_for(owner);
    let again = RegistrationToken::create(&bus, owner);

    // Same aggregate: disabling through one clone silences the other's
    // registrations.
    let log_handler = log.clone();
    again.register_untargeted(0, move |_: &mut Ping| log_handler.push("handler"))?;
    token.disable();
    bus.emit_untargeted(Ping);
    assert!(log.take().is_empty());

    // After teardown the owner can be issued a fresh token.
    token.remove_all();
    let fresh = bus.token_for(owner);
    assert!(!fresh.is_removed());
    Ok(())
}

#[test]
fn remove_forgets_one_handle_only() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch();
    let bus = runtime.bus();
    let log = CallLog::new();

    let owner = runtime.context().mint_instance_id();
    let token = bus.token_for(owner);

    let log_a = log.clone();
    let a = token.register_untargeted(0, move |_: &mut Ping| log_a.push("a"))?;
    let log_b = log.clone();
    token.register_untargeted(1, move |_: &mut Ping| log_b.push("b"))?;

    token.remove(a)?;
    bus.emit_untargeted(Ping);
    assert_eq!(log.take(), vec!["b"]);
    Ok(())
}

#[test]
fn foreign_handle_is_rejected() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch();
    let bus = runtime.bus();

    let owner = runtime.context().mint_instance_id();
    let stranger = runtime.context().mint_instance_id();
    let token = bus.token_for(owner);
    let other = bus.token_for(stranger);

    let foreign = other.register_untargeted(0, |_: &mut Ping| {})?;
    assert_eq!(
        token.remove(foreign),
        Err(BusError::ForeignHandle {
            handle: foreign,
            owner,
        })
    );

    // The mistaken call must not have deregistered the stranger's handle.
    let log = CallLog::new();
    let log_probe = log.clone();
    bus.register_untargeted(1, move |_: &mut Ping| log_probe.push("probe"));
    bus.emit_untargeted(Ping);
    assert_eq!(log.len(), 1);
    other.remove(foreign)?;
    Ok(())
}

#[test]
fn token_gates_interceptors_and_post_processors() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch();
    let bus = runtime.bus();
    let log = CallLog::new();

    let owner = runtime.context().mint_instance_id();
    let token = bus.token_for(owner);

    let log_gate = log.clone();
    token.intercept_untargeted(0, move |_: &mut Damage| {
        log_gate.push("gate");
        InterceptDecision::Reject
    })?;
    let log_post = log.clone();
    token.post_process_untargeted(0, move |_: &mut Damage| log_post.push("post"))?;
    let log_handler = log.clone();
    bus.register_untargeted(0, move |_: &mut Damage| log_handler.push("handler"));

    // Enabled: the token's interceptor rejects everything.
    bus.emit_untargeted(Damage { amount: 1 });
    assert_eq!(log.take(), vec!["gate"]);

    // Disabled: the interceptor and post-processor are skipped, the
    // bus-level handler is not.
    token.disable();
    bus.emit_untargeted(Damage { amount: 1 });
    assert_eq!(log.take(), vec!["handler"]);
    Ok(())
}

#[test]
fn tokens_on_distinct_owners_are_independent() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch();
    let bus = runtime.bus();
    let log = CallLog::new();

    let alice = runtime.context().mint_instance_id();
    let bob = runtime.context().mint_instance_id();
    let token_alice = bus.token_for(alice);
    let token_bob = bus.token_for(bob);

    let log_alice = log.clone();
    token_alice.register_untargeted(0, move |_: &mut Ping| log_alice.push("alice"))?;
    let log_bob = log.clone();
    token_bob.register_untargeted(1, move |_: &mut Ping| log_bob.push("bob"))?;

    token_alice.disable();
    bus.emit_untargeted(Ping);
    assert_eq!(log.take(), vec!["bob"]);

    token_alice.enable();
    token_bob.remove_all();
    bus.emit_untargeted(Ping);
    assert_eq!(log.take(), vec!["alice"]);
    Ok(())
}
