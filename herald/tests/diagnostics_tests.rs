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

fn capturing_runtime(capacity: usize) -> BusRuntime {
    let mut config = HeraldConfig::default();
    config.diagnostics.capture_enabled = true;
    config.diagnostics.record_capacity = capacity;
    HeraldApp::launch_with_config(&config)
}

#[test]
fn capture_records_category_type_and_key() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = capturing_runtime(16);
    let bus = runtime.bus();

    let who = runtime.context().mint_instance_id();
    bus.emit_untargeted(Ping);
    bus.emit_targeted(who, Heal { amount: 3 });
    bus.emit_broadcast(who, Damage { amount: 4 });

    let records = runtime.diagnostics().records();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].sequence, 0);
    assert_eq!(records[0].category, MessageCategory::Untargeted);
    assert!(records[0].type_name.ends_with("Ping"));
    assert_eq!(records[0].key, AddressKey::None);

    assert_eq!(records[1].category, MessageCategory::Targeted);
    assert_eq!(records[1].key, AddressKey::Target(who));
    assert!(records[1].type_name.ends_with("Heal"));

    assert_eq!(records[2].category, MessageCategory::Broadcast);
    assert_eq!(records[2].key, AddressKey::Source(who));
    Ok(())
}

#[test]
fn capture_off_keeps_nothing() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch_with_config(&HeraldConfig::default());
    let bus = runtime.bus();

    let handle = bus.register_untargeted(0, |_: &mut Ping| {});
    bus.emit_untargeted(Ping);

    let diagnostics = runtime.diagnostics();
    assert!(!diagnostics.is_capturing());
    assert!(diagnostics.records().is_empty());
    assert_eq!(diagnostics.sequence(), 0);
    assert_eq!(diagnostics.call_count(handle), 0);
    Ok(())
}

#[test]
fn ring_buffer_evicts_oldest_records() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = capturing_runtime(2);
    let bus = runtime.bus();

    for _ in 0..5 {
        bus.emit_untargeted(Ping);
    }

    let records = runtime.diagnostics().records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].sequence, 3);
    assert_eq!(records[1].sequence, 4);
    assert_eq!(runtime.diagnostics().sequence(), 5);
    Ok(())
}

#[test]
fn call_counts_follow_invocations() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = capturing_runtime(16);
    let bus = runtime.bus();

    let gate = bus.intercept_untargeted(0, |_: &mut Tick| InterceptDecision::Deliver);
    let handler = bus.register_untargeted(0, |_: &mut Tick| {});
    let post = bus.post_process_untargeted(0, |_: &mut Tick| {});

    let owner = runtime.context().mint_instance_id();
    let token = bus.token_for(owner);
    let silenced = token.register_untargeted(0, |_: &mut Tick| {})?;
    token.disable();

    bus.emit_untargeted(Tick { count: 1 });
    bus.emit_untargeted(Tick { count: 2 });

    let diagnostics = runtime.diagnostics();
    assert_eq!(diagnostics.call_count(gate), 2);
    assert_eq!(diagnostics.call_count(handler), 2);
    assert_eq!(diagnostics.call_count(post), 2);
    // Skipped entries are not invoked, so they are not counted.
    assert_eq!(diagnostics.call_count(silenced), 0);
    Ok(())
}

#[test]
fn rejection_counts_stop_at_the_interceptor() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = capturing_runtime(16);
    let bus = runtime.bus();

    let rejecting = bus.intercept_untargeted(0, |_: &mut Damage| InterceptDecision::Reject);
    let later = bus.intercept_untargeted(1, |_: &mut Damage| InterceptDecision::Deliver);
    let handler = bus.register_untargeted(0, |_: &mut Damage| {});
    let post = bus.post_process_untargeted(0, |_: &mut Damage| {});

    bus.emit_untargeted(Damage { amount: -1 });

    let diagnostics = runtime.diagnostics();
    assert_eq!(diagnostics.call_count(rejecting), 1);
    assert_eq!(diagnostics.call_count(later), 0);
    assert_eq!(diagnostics.call_count(handler), 0);
    assert_eq!(diagnostics.call_count(post), 0);
    // The emission itself was still recorded.
    assert_eq!(diagnostics.records().len(), 1);
    Ok(())
}

#[test]
fn capture_toggle_is_idempotent() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch_with_config(&HeraldConfig::default());
    let bus = runtime.bus();
    let diagnostics = runtime.diagnostics();

    diagnostics.set_capture(true);
    diagnostics.set_capture(true);
    bus.emit_untargeted(Ping);
    assert_eq!(diagnostics.records().len(), 1);

    diagnostics.set_capture(false);
    diagnostics.set_capture(false);
    bus.emit_untargeted(Ping);
    assert_eq!(diagnostics.records().len(), 1);
    Ok(())
}

#[test]
fn reset_restores_counters_but_not_type_slots() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HeraldApp::launch_with_config(&HeraldConfig::default());
    let bus = runtime.bus();

    let slot_before = TypeSlotRegistry::slot_for::<StatusReport>();
    let first = bus.register_untargeted(0, |_: &mut StatusReport| {});
    bus.deregister(first);

    runtime.diagnostics().set_capture(true);
    bus.emit_untargeted(StatusReport::Complete(1));
    assert_eq!(runtime.diagnostics().records().len(), 1);

    runtime.reset();

    // Counters and captured state return to the startup baseline.
    assert!(!runtime.diagnostics().is_capturing());
    assert!(runtime.diagnostics().records().is_empty());
    assert_eq!(runtime.diagnostics().sequence(), 0);
    let reissued = bus.register_untargeted(0, |_: &mut StatusReport| {});
    assert_eq!(reissued.raw(), first.raw());

    // The slot table is exempt: the type keeps its slot.
    assert_eq!(TypeSlotRegistry::slot_for::<StatusReport>(), slot_before);
    Ok(())
}
