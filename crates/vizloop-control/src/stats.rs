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

//! Frame counters updated by the loop thread and read by anyone.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A point-in-time copy of the loop counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FrameStats {
    /// Frames produced with a model, across every loop instance.
    pub frames_completed: u64,
    /// Frames skipped because no model was set.
    pub frames_skipped: u64,
    /// Frames whose work exceeded the frame budget.
    pub frames_overrun: u64,
    /// Number of loop threads started so far.
    pub loops_started: u64,
    /// Frames that found a different model handle generation than the frame before.
    pub model_changes: u64,
    /// Work time of the most recent frame, in microseconds.
    pub last_work_us: u64,
    /// Sleep time that followed the most recent frame, in microseconds.
    pub last_sleep_us: u64,
}

impl FrameStats {
    /// Returns the work time of the most recent frame.
    pub fn last_work(&self) -> Duration {
        Duration::from_micros(self.last_work_us)
    }

    /// Returns the sleep time that followed the most recent frame.
    pub fn last_sleep(&self) -> Duration {
        Duration::from_micros(self.last_sleep_us)
    }
}

/// Lock-free counters shared between the loop thread and its owner.
#[derive(Debug, Default)]
pub struct FrameCounters {
    frames_completed: AtomicU64,
    frames_skipped: AtomicU64,
    frames_overrun: AtomicU64,
    loops_started: AtomicU64,
    model_changes: AtomicU64,
    last_work_us: AtomicU64,
    last_sleep_us: AtomicU64,
}

impl FrameCounters {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_loop_started(&self) {
        self.loops_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_model_change(&self) {
        self.model_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.frames_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped(&self) {
        self.frames_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_timing(&self, work: Duration, sleep: Option<Duration>) {
        self.last_work_us
            .store(work.as_micros() as u64, Ordering::Relaxed);
        match sleep {
            Some(sleep) => self
                .last_sleep_us
                .store(sleep.as_micros() as u64, Ordering::Relaxed),
            None => {
                self.last_sleep_us.store(0, Ordering::Relaxed);
                self.frames_overrun.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Returns a copy of the current counters.
    pub fn snapshot(&self) -> FrameStats {
        FrameStats {
            frames_completed: self.frames_completed.load(Ordering::Relaxed),
            frames_skipped: self.frames_skipped.load(Ordering::Relaxed),
            frames_overrun: self.frames_overrun.load(Ordering::Relaxed),
            loops_started: self.loops_started.load(Ordering::Relaxed),
            model_changes: self.model_changes.load(Ordering::Relaxed),
            last_work_us: self.last_work_us.load(Ordering::Relaxed),
            last_sleep_us: self.last_sleep_us.load(Ordering::Relaxed),
        }
    }
}
