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

use thiserror::Error;

use crate::message::InstanceId;
use crate::subscription::RegistrationHandle;

/// Errors surfaced by the bus and token APIs.
///
/// These cover precondition violations only. Routing-level "nothing to
/// deliver to" conditions are silent successes, and deregistering an unknown
/// handle is a tolerated no-op rather than an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusError {
    /// Zero is reserved as the "no owner" sentinel and cannot address anyone.
    #[error("instance identifier must be non-zero")]
    InvalidInstanceId,

    /// The token has already torn down its subscriptions; new registrations
    /// through it are rejected.
    #[error("registration token for owner {0} has already been removed")]
    TokenRemoved(InstanceId),

    /// The handle was not minted through this token.
    #[error("handle {handle} is not owned by the token for owner {owner}")]
    ForeignHandle {
        /// The handle that was passed in.
        handle: RegistrationHandle,
        /// The owner of the token the call was made on.
        owner: InstanceId,
    },
}
