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

//! Diagnostics capture walkthrough: emission history and per-handle call
//! counts, toggled at runtime.
//!
//! Run with: `cargo run --example diagnostics`

use herald::prelude::*;

#[derive(Clone, Debug)]
struct Spawned {
    name: &'static str,
}

#[derive(Clone, Debug)]
struct Despawned;

fn main() {
    let mut config = HeraldConfig::default();
    config.diagnostics.capture_enabled = true;
    config.diagnostics.record_capacity = 8;

    let runtime = HeraldApp::launch_with_config(&config);
    let bus = runtime.bus();

    let spawn_handle = bus.register_untargeted(0, |spawned: &mut Spawned| {
        println!("spawned: {}", spawned.name);
    });
    let despawn_handle = bus.register_untargeted(0, |_: &mut Despawned| {});

    let world = runtime.context().mint_instance_id();
    bus.emit_untargeted(Spawned { name: "goblin" });
    bus.emit_untargeted(Spawned { name: "orc" });
    bus.emit_broadcast(world, Spawned { name: "wolf" });
    bus.emit_untargeted(Despawned);

    println!("\ncaptured emissions:");
    for record in runtime.diagnostics().records() {
        println!(
            "  [{}] {} {} ({})",
            record.sequence, record.category, record.type_name, record.key
        );
    }

    println!("\ncall counts:");
    println!(
        "  spawn handler:   {}",
        runtime.diagnostics().call_count(spawn_handle)
    );
    println!(
        "  despawn handler: {}",
        runtime.diagnostics().call_count(despawn_handle)
    );

    // Capture can be switched off at any time; subsequent emissions cost one
    // atomic load.
    runtime.diagnostics().set_capture(false);
    bus.emit_untargeted(Spawned { name: "unrecorded" });
    println!(
        "\nrecords after capture off: {}",
        runtime.diagnostics().records().len()
    );
}
