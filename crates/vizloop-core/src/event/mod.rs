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

//! Provides the event channel used to report frame loop lifecycle changes.
//!
//! The [`EventBus`] is a generic, thread-safe MPSC channel. It lets the loop
//! thread report to its owner (start, stop, failure) without ever taking the
//! owner's lock, which is what makes joining the loop from a lifecycle
//! transition deadlock-free.

mod bus;

pub use self::bus::EventBus;
