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

use std::sync::{Arc, Mutex, Once};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Declare the submodules.
pub mod messages;

// Ensures tracing initialization happens only once across all tests.
static INIT: Once = Once::new();

/// Initializes the global tracing subscriber for tests.
///
/// Uses `std::sync::Once` so that initialization runs only once even when
/// called from every test. Output goes to `logs/bus_tests.txt` to keep test
/// stdout readable.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        // Ensure logs directory exists
        std::fs::create_dir_all("logs").expect("could not create logs dir");

        let file_appender = RollingFileAppender::new(Rotation::NEVER, "logs", "bus_tests.txt");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Leak the guard so the non-blocking writer is not dropped before process exit
        Box::leak(Box::new(guard));

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("herald_core=trace"));

        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(non_blocking)
            .with_ansi(false)
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Shared, clonable call log for asserting delivery order across callbacks.
#[derive(Clone, Default, Debug)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, label: impl Into<String>) {
        self.0.lock().expect("call log poisoned").push(label.into());
    }

    /// Returns the recorded labels and clears the log.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().expect("call log poisoned"))
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.0.lock().expect("call log poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().expect("call log poisoned").len()
    }
}
