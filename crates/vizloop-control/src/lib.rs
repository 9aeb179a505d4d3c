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

//! # Vizloop Control
//!
//! The frame update loop and the coordinator that starts and stops it.
//!
//! [`FrameUpdateLoop`] owns one background thread that reads the active graph
//! model through a [`SharedModelHandle`], computes the per-frame limits and
//! feeds the render bridge at a bounded rate. [`LifecycleCoordinator`] runs the
//! loop exactly while it is enabled and a workspace with a model is selected.

#![warn(missing_docs)]

pub mod config;
pub mod coordinator;
pub mod frame_loop;
pub mod model_handle;
pub mod stats;

pub use config::FrameLoopConfig;
pub use coordinator::{LifecycleCoordinator, RunState};
pub use frame_loop::{FrameCollaborators, FrameUpdateLoop, LoopEvent, LoopExit};
pub use model_handle::SharedModelHandle;
pub use stats::{FrameCounters, FrameStats};
