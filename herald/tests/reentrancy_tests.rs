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
use std::sync::{Arc, Mutex};

use herald::prelude::*;

use crate::setup::messages::*;
use crate::setup::*;

mod setup;

type HandleSlot = Arc<Mutex<Option<RegistrationHandle>>>;

#[test]
fn handler_can_deregister_itself_mid_dispatch() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch();
    let bus = runtime.bus();
    let log = CallLog::new();

    let slot: HandleSlot = Arc::default();
    let bus_inside = bus.clone();
    let slot_inside = slot.clone();
    let log_self = log.clone();
    let handle = bus.register_untargeted(0, move |_: &mut Ping| {
        log_self.push("one-shot");
        if let Some(own) = slot_inside.lock().unwrap().take() {
            bus_inside.deregister(own);
        }
    });
    *slot.lock().unwrap() = Some(handle);

    let log_after = log.clone();
    bus.register_untargeted(1, move |_: &mut Ping| log_after.push("steady"));

    bus.emit_untargeted(Ping);
    assert_eq!(log.take(), vec!["one-shot", "steady"]);

    // Second emission reaches one fewer handler.
    bus.emit_untargeted(Ping);
    assert_eq!(log.take(), vec!["steady"]);
    Ok(())
}

#[test]
fn registration_during_dispatch_misses_inflight_message() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch();
    let bus = runtime.bus();
    let log = CallLog::new();

    let bus_inside = bus.clone();
    let log_registrar = log.clone();
    let log_for_newcomer = log.clone();
    bus.register_untargeted(0, move |_: &mut Ping| {
        log_registrar.push("registrar");
        let log_newcomer = log_for_newcomer.clone();
        bus_inside.register_untargeted(1, move |_: &mut Ping| log_newcomer.push("newcomer"));
    });

    // The subscriber added mid-walk must not see the message already in
    // flight.
    bus.emit_untargeted(Ping);
    assert_eq!(log.take(), vec!["registrar"]);

    // It participates from the next emission on.
    bus.emit_untargeted(Ping);
    assert_eq!(log.take(), vec!["registrar", "newcomer"]);
    Ok(())
}

#[test]
fn removal_mid_walk_does_not_skip_snapshot_subscribers() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch();
    let bus = runtime.bus();
    let log = CallLog::new();

    let victim_slot: HandleSlot = Arc::default();
    let bus_inside = bus.clone();
    let victim_inside = victim_slot.clone();
    let log_saboteur = log.clone();
    bus.register_untargeted(0, move |_: &mut Pong| {
        log_saboteur.push("saboteur");
        if let Some(victim) = victim_inside.lock().unwrap().take() {
            bus_inside.deregister(victim);
        }
    });
    let log_victim = log.clone();
    let victim = bus.register_untargeted(1, move |_: &mut Pong| log_victim.push("victim"));
    *victim_slot.lock().unwrap() = Some(victim);

    // The walk operates over the snapshot taken at emit time: the victim was
    // scheduled before the removal happened, so it still fires.
    bus.emit_untargeted(Pong);
    assert_eq!(log.take(), vec!["saboteur", "victim"]);

    bus.emit_untargeted(Pong);
    assert_eq!(log.take(), vec!["saboteur"]);
    Ok(())
}

#[test]
fn nested_emission_completes_within_handler() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch();
    let bus = runtime.bus();
    let log = CallLog::new();

    let bus_inside = bus.clone();
    let log_outer = log.clone();
    bus.register_untargeted(0, move |_: &mut Ping| {
        log_outer.push("ping:start");
        bus_inside.emit_untargeted(Pong);
        log_outer.push("ping:end");
    });
    let log_inner = log.clone();
    bus.register_untargeted(0, move |_: &mut Pong| log_inner.push("pong"));

    bus.emit_untargeted(Ping);
    assert_eq!(log.take(), vec!["ping:start", "pong", "ping:end"]);
    Ok(())
}

#[test]
fn token_teardown_from_inside_handler() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch();
    let bus = runtime.bus();
    let log = CallLog::new();

    let owner = runtime.context().mint_instance_id();
    let token = bus.token_for(owner);

    let token_inside = token.clone();
    let log_first = log.clone();
    token.register_untargeted(0, move |_: &mut Ping| {
        log_first.push("first");
        token_inside.remove_all();
    })?;
    let log_second = log.clone();
    token.register_untargeted(1, move |_: &mut Ping| log_second.push("second"))?;

    // Teardown mid-walk still delivers the snapshot for this emission.
    bus.emit_untargeted(Ping);
    assert_eq!(log.take(), vec!["first", "second"]);

    bus.emit_untargeted(Ping);
    assert!(log.take().is_empty());
    assert!(token.is_removed());
    Ok(())
}
