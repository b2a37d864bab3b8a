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
#![allow(unused)]

#[derive(Clone, Debug)]
pub struct Ping;

#[derive(Clone, Debug)]
pub struct Pong;

#[derive(Clone, Debug, PartialEq)]
pub struct Heal {
    pub amount: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Damage {
    pub amount: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub count: u64,
}

#[derive(Clone, Debug)]
pub enum StatusReport {
    Complete(usize),
}
