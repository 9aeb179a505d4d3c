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

//! Defines the error type shared by the frame loop and its collaborators.

use thiserror::Error;

/// A specialized `Result` type for frame loop operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// An error raised while producing a frame or managing the loop that produces them.
///
/// The type is `Clone` so that a failure can be both returned from the loop thread
/// and broadcast to lifecycle listeners.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// An operation required an active graph model but none was set.
    #[error("No graph model is currently active.")]
    NoModel,
    /// The graph failed while being iterated.
    #[error("Graph iteration failed: {0}")]
    Graph(String),
    /// The frame bridge rejected an operation.
    #[error("Frame bridge operation failed: {0}")]
    Bridge(String),
    /// A collaborator panicked on the loop thread.
    #[error("Frame loop thread panicked: {0}")]
    Panicked(String),
    /// The loop thread could not be spawned.
    #[error("Failed to spawn frame loop thread: {0}")]
    Spawn(String),
    /// The loop configuration is invalid.
    #[error("Invalid frame loop configuration: {0}")]
    Config(String),
}

impl FrameError {
    /// Builds a [`FrameError::Panicked`] from the payload of a caught panic.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        FrameError::Panicked(message)
    }
}
