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

use crate::message::InstanceId;

/// The three addressing shapes a message can carry.
///
/// Every message belongs to exactly one category; subscriber tables, the
/// dispatch pipeline, and diagnostics records are all partitioned by it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum MessageCategory {
    /// No addressing; delivered to every subscriber of the exact type.
    Untargeted,
    /// Addressed to one instance; delivered to exact-match and "any target"
    /// subscribers of the type.
    Targeted,
    /// Carries a source instance; delivered to exact-match and "any source"
    /// subscribers of the type.
    Broadcast,
}

impl fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MessageCategory::Untargeted => "untargeted",
            MessageCategory::Targeted => "targeted",
            MessageCategory::Broadcast => "broadcast",
        };
        write!(f, "{label}")
    }
}

/// The resolved addressing of a single emission.
///
/// Carried into interceptors, "any" handlers, post-processors, global
/// observers, and diagnostics records so they can distinguish who a message
/// was for (or from) without a separate lookup.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum AddressKey {
    /// Untargeted emission; no identifier involved.
    None,
    /// Targeted emission addressed to this instance.
    Target(InstanceId),
    /// Broadcast emission sourced from this instance.
    Source(InstanceId),
}

impl AddressKey {
    /// The identifier carried by this key, if any.
    pub fn instance(&self) -> Option<InstanceId> {
        match self {
            AddressKey::None => None,
            AddressKey::Target(id) | AddressKey::Source(id) => Some(*id),
        }
    }

    /// The category this key resolves under.
    pub fn category(&self) -> MessageCategory {
        match self {
            AddressKey::None => MessageCategory::Untargeted,
            AddressKey::Target(_) => MessageCategory::Targeted,
            AddressKey::Source(_) => MessageCategory::Broadcast,
        }
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressKey::None => write!(f, "-"),
            AddressKey::Target(id) => write!(f, "to {id}"),
            AddressKey::Source(id) => write!(f, "from {id}"),
        }
    }
}
