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

use flume::TrySendError;

/// Manages a generic, thread-safe event channel.
///
/// The bus is generic over the event type `T` so that `vizloop-core` stays
/// decoupled from the lifecycle events defined by higher-level crates.
/// The bus keeps its own receiver alive, so publishing never fails because
/// nobody subscribed yet. A bounded bus drops its oldest event when full, so
/// an undrained bus never holds more than its capacity.
#[derive(Debug, Clone)]
pub struct EventBus<T: Clone + Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Clone + Send + 'static> EventBus<T> {
    /// Creates a new EventBus with an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::trace!("EventBus initialized.");
        Self { sender, receiver }
    }

    /// Creates a new EventBus that keeps at most `capacity` queued events.
    pub fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = flume::bounded(capacity.max(1));
        log::trace!("EventBus initialized with capacity {}.", capacity.max(1));
        Self { sender, receiver }
    }

    /// Sends an event without blocking.
    ///
    /// On a full bus the oldest queued event is dropped to make room.
    pub fn publish(&self, event: T) {
        let mut event = event;
        loop {
            match self.sender.try_send(event) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    if self.receiver.try_recv().is_ok() {
                        log::trace!("EventBus full; oldest event dropped.");
                    }
                    event = rejected;
                }
                Err(TrySendError::Disconnected(_)) => {
                    log::error!("Failed to publish event: channel disconnected.");
                    return;
                }
            }
        }
    }

    /// Returns a receiver for the channel.
    ///
    /// The channel is multi-consumer: each event is delivered to exactly one of
    /// the receivers, not broadcast to all of them.
    pub fn subscribe(&self) -> flume::Receiver<T> {
        self.receiver.clone()
    }

    /// Returns the maximum number of queued events, or `None` if unbounded.
    pub fn capacity(&self) -> Option<usize> {
        self.sender.capacity()
    }

    /// Removes and returns every event currently queued.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of queued events.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if no event is queued.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl<T: Clone + Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
