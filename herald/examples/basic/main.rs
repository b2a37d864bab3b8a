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

//! A small combat-log walkthrough: interceptor clamping, priority-ordered
//! handlers, a post-processor, and token lifecycle.
//!
//! Run with: `cargo run --example basic`

use herald::prelude::*;

#[derive(Clone, Debug)]
struct Damage {
    amount: i32,
}

#[derive(Clone, Debug)]
struct Heal {
    amount: u32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let runtime = HeraldApp::launch();
    let bus = runtime.bus();

    // An interceptor vets every Damage message before handlers see it.
    bus.intercept_untargeted(0, |damage: &mut Damage| {
        if damage.amount <= 0 {
            println!("interceptor: rejecting non-positive damage");
            return InterceptDecision::Reject;
        }
        damage.amount = damage.amount.min(50);
        InterceptDecision::Deliver
    });

    // Lower priority runs first.
    bus.register_untargeted(0, |damage: &mut Damage| {
        println!("armor:   absorbing 5 of {} damage", damage.amount);
        damage.amount -= 5;
    });
    bus.register_untargeted(10, |damage: &mut Damage| {
        println!("health:  taking {} damage", damage.amount);
    });
    bus.post_process_untargeted(0, |damage: &mut Damage| {
        println!("ledger:  final damage entry {}", damage.amount);
    });

    bus.emit_untargeted(Damage { amount: 9_000 });
    bus.emit_untargeted(Damage { amount: 0 });

    // A token scopes an owner's subscriptions and toggles them as a unit.
    let owner = runtime.context().mint_instance_id();
    let token = bus.token_for(owner);
    token
        .register_targeted(owner, 0, move |heal: &mut Heal| {
            println!("owner:   healed for {}", heal.amount);
        })
        .expect("token is live");

    bus.emit_targeted(owner, Heal { amount: 25 });

    token.disable();
    bus.emit_targeted(owner, Heal { amount: 25 }); // silently skipped
    token.enable();
    bus.emit_targeted(owner, Heal { amount: 10 });

    token.remove_all();
}
