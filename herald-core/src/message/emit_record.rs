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

use derive_new::new;
use static_assertions::assert_impl_all;

use crate::message::{AddressKey, MessageCategory, TypeSlot};

/// One emission captured by the diagnostics recorder.
///
/// Appended before dispatch begins, so a record exists even when an
/// interceptor later rejects the message or no subscriber matches.
#[derive(Clone, Debug, new)]
pub struct EmitRecord {
    /// Monotonically increasing emission number.
    pub sequence: u64,
    /// Category of the emission.
    pub category: MessageCategory,
    /// Name of the concrete message type.
    pub type_name: &'static str,
    /// The type's dispatch slot.
    pub slot: TypeSlot,
    /// Resolved addressing of the emission.
    pub key: AddressKey,
}

assert_impl_all!(EmitRecord: Send, Sync);
