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

use std::fmt;
use std::num::NonZeroU64;

use crate::message::BusError;

/// A small, copyable, totally-ordered identifier for an addressable owner.
///
/// Two identifiers are equal iff they reference the same underlying owner.
/// The value stays valid for comparison even after the owner is gone;
/// emitting to a destroyed owner simply finds no subscribers.
///
/// Synthetic owners obtain fresh identifiers from
/// [`RuntimeContext::mint_instance_id`](crate::common::RuntimeContext::mint_instance_id).
/// Hosts that already assign non-zero numeric ids to their entities can adopt
/// them with [`InstanceId::from_raw`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct InstanceId(NonZeroU64);

impl InstanceId {
    /// Adopts a host-assigned raw id.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::InvalidInstanceId`] for zero, which is reserved
    /// as the "no owner" sentinel in host integrations.
    pub fn from_raw(raw: u64) -> Result<Self, BusError> {
        NonZeroU64::new(raw)
            .map(Self)
            .ok_or(BusError::InvalidInstanceId)
    }

    pub(crate) fn from_nonzero(raw: NonZeroU64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
