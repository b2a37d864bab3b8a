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

//! Message identity: categories, addressing, type slots, and the records the
//! diagnostics recorder captures per emission.

pub use bus_error::BusError;
pub use category::{AddressKey, MessageCategory};
pub use emit_record::EmitRecord;
pub use instance_id::InstanceId;
pub use type_slot::{TypeSlot, TypeSlotRegistry};

mod bus_error;
mod category;
mod emit_record;
mod instance_id;
mod type_slot;
