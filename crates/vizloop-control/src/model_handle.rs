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

//! The lock-guarded reference to the currently selected graph model.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use vizloop_core::GraphModel;

struct Slot {
    model: Option<Arc<dyn GraphModel>>,
    generation: u64,
}

/// A lock-guarded cell holding the active graph model, if any.
///
/// Shared by the lifecycle coordinator (writer) and the frame loop (reader).
/// The lock is held only for the pointer clone or swap: no iteration, I/O or
/// drop of a model ever happens inside the critical section.
pub struct SharedModelHandle {
    slot: Mutex<Slot>,
}

impl SharedModelHandle {
    /// Creates an empty handle.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                model: None,
                generation: 0,
            }),
        }
    }

    // The slot only holds a pointer and a counter, so a panic while the lock
    // was held cannot have left it half-written.
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the held model and bumps the generation.
    pub fn set(&self, model: Option<Arc<dyn GraphModel>>) {
        let previous = {
            let mut slot = self.lock();
            slot.generation += 1;
            std::mem::replace(&mut slot.model, model)
        };
        drop(previous);
    }

    /// Clears the held model.
    pub fn clear(&self) {
        self.set(None);
    }

    /// Returns the current model.
    pub fn get(&self) -> Option<Arc<dyn GraphModel>> {
        self.lock().model.clone()
    }

    /// Returns the current model along with the generation it was set at.
    pub fn get_versioned(&self) -> (Option<Arc<dyn GraphModel>>, u64) {
        let slot = self.lock();
        (slot.model.clone(), slot.generation)
    }

    /// Returns `true` if a model is set.
    pub fn is_set(&self) -> bool {
        self.lock().model.is_some()
    }

    /// Returns the number of times the handle has been written.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }
}

impl Default for SharedModelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (is_set, generation) = {
            let slot = self.lock();
            (slot.model.is_some(), slot.generation)
        };
        f.debug_struct("SharedModelHandle")
            .field("is_set", &is_set)
            .field("generation", &generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use vizloop_core::{FrameResult, Graph};
    use vizloop_data::InMemoryGraphModel;

    #[test]
    fn test_new_handle_is_empty() {
        let handle = SharedModelHandle::new();
        assert!(!handle.is_set());
        assert!(handle.get().is_none());
        assert_eq!(handle.generation(), 0);
    }

    #[test]
    fn test_set_get_clear() {
        let handle = SharedModelHandle::new();
        let model: Arc<dyn GraphModel> = Arc::new(InMemoryGraphModel::new());

        handle.set(Some(model.clone()));
        let current = handle.get().expect("Model should be set");
        assert!(Arc::ptr_eq(&current, &model));
        assert_eq!(handle.generation(), 1);

        handle.clear();
        assert!(handle.get().is_none());
        assert_eq!(handle.generation(), 2);
    }

    #[test]
    fn test_get_versioned_matches_generation() {
        let handle = SharedModelHandle::new();
        handle.set(Some(Arc::new(InMemoryGraphModel::new())));
        let (model, generation) = handle.get_versioned();
        assert!(model.is_some());
        assert_eq!(generation, handle.generation());
    }

    struct DropProbe {
        handle: Arc<SharedModelHandle>,
        observed_unlocked: Arc<AtomicUsize>,
        graph: Arc<dyn Graph>,
    }

    impl GraphModel for DropProbe {
        fn graph(&self) -> Arc<dyn Graph> {
            self.graph.clone()
        }
    }

    impl Drop for DropProbe {
        fn drop(&mut self) {
            // Would deadlock if the previous model were dropped under the lock.
            if self.handle.slot.try_lock().is_ok() {
                self.observed_unlocked.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_previous_model_dropped_outside_lock() {
        let handle = Arc::new(SharedModelHandle::new());
        let observed = Arc::new(AtomicUsize::new(0));
        let graph = InMemoryGraphModel::new().graph();

        handle.set(Some(Arc::new(DropProbe {
            handle: handle.clone(),
            observed_unlocked: observed.clone(),
            graph,
        })));
        handle.clear();

        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_readers_see_whole_values() {
        let handle = Arc::new(SharedModelHandle::new());
        let model: Arc<dyn GraphModel> = Arc::new(InMemoryGraphModel::new());

        let writer = {
            let handle = handle.clone();
            let model = model.clone();
            thread::spawn(move || {
                for i in 0..1000 {
                    if i % 2 == 0 {
                        handle.set(Some(model.clone()));
                    } else {
                        handle.clear();
                    }
                }
            })
        };

        let reader = {
            let handle = handle.clone();
            let model = model.clone();
            thread::spawn(move || -> FrameResult<()> {
                for _ in 0..1000 {
                    if let Some(current) = handle.get() {
                        assert!(Arc::ptr_eq(&current, &model));
                        current.graph().visit_nodes(&mut |_| {})?;
                    }
                }
                Ok(())
            })
        };

        writer.join().expect("Writer thread panicked");
        reader
            .join()
            .expect("Reader thread panicked")
            .expect("Reading the graph should not fail");
        assert_eq!(handle.generation(), 1000);
    }
}
