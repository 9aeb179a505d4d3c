// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration of the frame update loop.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vizloop_core::{FrameError, FrameResult};

/// Configuration for the frame update loop. Fixed once the loop is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameLoopConfig {
    /// Target duration of one frame in milliseconds.
    /// The loop sleeps for whatever part of this budget the frame did not use.
    pub frame_duration_ms: u64,
    /// Name given to the loop thread.
    pub thread_name: String,
    /// Whether frames that overrun their budget are reported at `trace` level.
    pub log_overruns: bool,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            frame_duration_ms: 33,
            thread_name: "vizloop-frame".to_string(),
            log_overruns: true,
        }
    }
}

impl FrameLoopConfig {
    /// Returns the default configuration with a different frame duration.
    pub fn with_frame_duration(frame_duration_ms: u64) -> Self {
        Self {
            frame_duration_ms,
            ..Self::default()
        }
    }

    /// Parses and validates a configuration written in RON.
    ///
    /// Missing fields take their default value, so `"(frame_duration_ms: 16)"`
    /// is a complete configuration.
    pub fn from_ron_str(source: &str) -> FrameResult<Self> {
        let config: Self =
            ron::from_str(source).map_err(|e| FrameError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can drive a loop.
    pub fn validate(&self) -> FrameResult<()> {
        if self.frame_duration_ms == 0 {
            return Err(FrameError::Config(
                "frame_duration_ms must be greater than zero".to_string(),
            ));
        }
        if self.thread_name.trim().is_empty() {
            return Err(FrameError::Config(
                "thread_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the target frame duration.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_millis(self.frame_duration_ms)
    }

    /// Returns the frame rate the loop paces itself to.
    pub fn target_fps(&self) -> f32 {
        1000.0 / self.frame_duration_ms.max(1) as f32
    }
}
