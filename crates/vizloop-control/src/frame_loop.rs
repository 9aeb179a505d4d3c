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

//! The paced background loop that produces one frame per tick.

use crate::config::FrameLoopConfig;
use crate::model_handle::SharedModelHandle;
use crate::stats::{FrameCounters, FrameStats};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use vizloop_core::{
    EventBus, FrameBridge, FrameController, FrameError, FrameLimits, FrameResult, GraphLimits,
    LimitsAccumulator, ShapeProvider, Stopwatch, StyleSource,
};

/// Lifecycle events kept for receivers that fall behind; older ones are dropped.
pub const LOOP_EVENT_CAPACITY: usize = 64;

/// The collaborators a frame is assembled from, injected at construction.
#[derive(Clone)]
pub struct FrameCollaborators {
    /// Notified around each frame; provides the camera and the centering flag.
    pub controller: Arc<dyn FrameController>,
    /// Receives the frame content.
    pub bridge: Arc<dyn FrameBridge>,
    /// Hands out fresh stylers every frame.
    pub styles: Arc<dyn StyleSource>,
    /// Receives the limits computed every frame.
    pub limits: Arc<GraphLimits>,
    /// The selection drag region.
    pub selection: Arc<dyn ShapeProvider>,
    /// The pointer hover indicator.
    pub pointer: Arc<dyn ShapeProvider>,
}

/// Lifecycle notifications emitted by the loop thread.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    /// A loop thread started.
    Started,
    /// A loop thread was cancelled after producing `frames` frames.
    Stopped {
        /// Frames produced by this loop instance.
        frames: u64,
    },
    /// A loop thread terminated on an error.
    Failed(FrameError),
}

/// How a loop thread ended.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopExit {
    /// The loop was asked to stop.
    Cancelled {
        /// Frames produced by this loop instance.
        frames: u64,
    },
    /// The loop stopped itself after an error.
    Failed(FrameError),
}

/// Result of a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FrameOutcome {
    Produced(FrameLimits),
    Skipped,
}

/// The running thread and the means to cancel it.
struct LoopThread {
    handle: JoinHandle<LoopExit>,
    cancel_tx: Sender<()>,
    cancelled: Arc<AtomicBool>,
}

/// Everything the loop thread owns.
struct FrameWorker {
    frame_duration: Duration,
    log_overruns: bool,
    model: Arc<SharedModelHandle>,
    collaborators: FrameCollaborators,
    counters: Arc<FrameCounters>,
    events: EventBus<LoopEvent>,
}

impl FrameWorker {
    fn emit(&self, event: LoopEvent) {
        self.events.publish(event);
    }

    fn run(self, cancel_rx: Receiver<()>, cancelled: Arc<AtomicBool>) -> LoopExit {
        self.counters.record_loop_started();
        self.emit(LoopEvent::Started);
        log::info!(
            "Frame loop thread started ({} ms per frame).",
            self.frame_duration.as_millis()
        );

        let exit = match panic::catch_unwind(AssertUnwindSafe(|| {
            self.frame_loop(&cancel_rx, &cancelled)
        })) {
            Ok(exit) => exit,
            Err(payload) => LoopExit::Failed(FrameError::from_panic(payload.as_ref())),
        };

        match &exit {
            LoopExit::Cancelled { frames } => {
                log::info!("Frame loop thread stopped after {frames} frames.");
                self.emit(LoopEvent::Stopped { frames: *frames });
            }
            LoopExit::Failed(err) => {
                log::error!("Frame loop thread terminated: {err}");
                self.emit(LoopEvent::Failed(err.clone()));
            }
        }
        exit
    }

    fn frame_loop(&self, cancel_rx: &Receiver<()>, cancelled: &AtomicBool) -> LoopExit {
        let mut frames = 0u64;
        let mut generation = None;

        loop {
            if cancelled.load(Ordering::Acquire) {
                return LoopExit::Cancelled { frames };
            }

            let stopwatch = Stopwatch::new();

            match self.produce_frame(&mut generation) {
                Ok(FrameOutcome::Produced(limits)) => {
                    frames += 1;
                    self.counters.record_completed();
                    log::trace!(
                        "Frame {frames}: {} nodes, {} edges.",
                        limits.node_count,
                        limits.edge_count
                    );
                }
                Ok(FrameOutcome::Skipped) => {
                    self.counters.record_skipped();
                    log::trace!("Frame skipped: no active model.");
                }
                Err(err) => return LoopExit::Failed(err),
            }

            let work = stopwatch.elapsed();
            let remaining = stopwatch.remaining(self.frame_duration);
            self.counters.record_timing(work, remaining);

            match remaining {
                Some(sleep) => match cancel_rx.recv_timeout(sleep) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                        return LoopExit::Cancelled { frames };
                    }
                },
                None => {
                    if self.log_overruns {
                        log::trace!(
                            "Frame overran its budget: {:?} > {:?}.",
                            work,
                            self.frame_duration
                        );
                    }
                }
            }
        }
    }

    /// Produces one frame. Returns `Skipped` when no model is set.
    ///
    /// The controller and bridge calls stay balanced whatever happens to the
    /// frame content: a failed or panicking frame is aborted, never published.
    fn produce_frame(&self, generation: &mut Option<u64>) -> FrameResult<FrameOutcome> {
        let c = &self.collaborators;

        c.controller.begin_update_frame();
        let opened = c.bridge.begin_frame(c.controller.camera());
        let content = opened.and_then(|()| {
            panic::catch_unwind(AssertUnwindSafe(|| self.fill_frame(generation)))
                .unwrap_or_else(|payload| Err(FrameError::from_panic(payload.as_ref())))
        });
        c.controller.end_update_frame();

        match content {
            Ok(outcome) => {
                c.bridge.end_frame()?;
                Ok(outcome)
            }
            Err(err) => {
                c.bridge.abort_frame();
                Err(err)
            }
        }
    }

    /// Fills the open frame from the current model.
    fn fill_frame(&self, generation: &mut Option<u64>) -> FrameResult<FrameOutcome> {
        let c = &self.collaborators;

        c.bridge
            .set_stylers(c.styles.node_styler(), c.styles.edge_styler())?;

        let (model, current) = self.model.get_versioned();
        if *generation != Some(current) {
            log::debug!("Frame loop now reads model generation {current}.");
            self.counters.record_model_change();
            *generation = Some(current);
        }

        // A concurrent deselection may have cleared the model since the loop
        // was started; close the frame empty instead of failing.
        let Some(model) = model else {
            return Ok(FrameOutcome::Skipped);
        };

        let limits = {
            let graph = model.graph();
            let mut accumulator = LimitsAccumulator::new(c.controller.is_centering());
            let mut forward_error = None;

            graph.visit_nodes(&mut |node| {
                accumulator.add_node(node);
                if forward_error.is_none() {
                    forward_error = c.bridge.add_node(node).err();
                }
            })?;
            if let Some(err) = forward_error.take() {
                return Err(err);
            }

            graph.visit_edges(&mut |edge| {
                accumulator.add_edge(edge);
                if forward_error.is_none() {
                    forward_error = c.bridge.add_edge(edge).err();
                }
            })?;
            if let Some(err) = forward_error {
                return Err(err);
            }

            accumulator.finish()
        };
        drop(model);

        c.limits.publish(limits);

        if let Some(shape) = c.selection.current_shape() {
            c.bridge.add_primitive(shape.ui_primitive())?;
        }
        if let Some(shape) = c.pointer.current_shape() {
            c.bridge.add_primitive(shape.ui_primitive())?;
        }

        Ok(FrameOutcome::Produced(limits))
    }
}

/// Owns at most one background thread that produces frames at a bounded rate.
///
/// The loop reads the shared model handle once per frame, aggregates
/// [`FrameLimits`] over the graph, forwards nodes, edges and overlay shapes to
/// the bridge, then sleeps for the rest of the frame budget. The sleep is the
/// only suspension point and is interrupted immediately by [`stop`](Self::stop).
pub struct FrameUpdateLoop {
    config: FrameLoopConfig,
    model: Arc<SharedModelHandle>,
    collaborators: FrameCollaborators,
    counters: Arc<FrameCounters>,
    events: EventBus<LoopEvent>,
    worker: Option<LoopThread>,
    failure: Option<FrameError>,
}

impl FrameUpdateLoop {
    /// Creates a stopped loop. Fails if the configuration is invalid.
    pub fn new(
        config: FrameLoopConfig,
        model: Arc<SharedModelHandle>,
        collaborators: FrameCollaborators,
    ) -> FrameResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            model,
            collaborators,
            counters: Arc::new(FrameCounters::new()),
            events: EventBus::bounded(LOOP_EVENT_CAPACITY),
            worker: None,
            failure: None,
        })
    }

    /// Starts the loop thread.
    ///
    /// Returns `Ok(false)` without doing anything when a loop is already running
    /// or when no model is set.
    pub fn start(&mut self) -> FrameResult<bool> {
        if self.is_running() {
            return Ok(false);
        }
        self.reap();

        if !self.model.is_set() {
            log::debug!("Frame loop not started: no active model.");
            return Ok(false);
        }

        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker = FrameWorker {
            frame_duration: self.config.frame_duration(),
            log_overruns: self.config.log_overruns,
            model: Arc::clone(&self.model),
            collaborators: self.collaborators.clone(),
            counters: Arc::clone(&self.counters),
            events: self.events.clone(),
        };

        let thread_cancelled = Arc::clone(&cancelled);
        let handle = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || worker.run(cancel_rx, thread_cancelled))
            .map_err(|e| FrameError::Spawn(e.to_string()))?;

        self.worker = Some(LoopThread {
            handle,
            cancel_tx,
            cancelled,
        });
        Ok(true)
    }

    /// Stops the loop thread and waits for it to exit.
    ///
    /// Returns `None` when no loop was running. Called from the loop thread
    /// itself, the thread is detached instead of joined.
    pub fn stop(&mut self) -> Option<LoopExit> {
        let worker = self.worker.take()?;
        worker.cancelled.store(true, Ordering::Release);
        // A full channel already holds a pending cancellation.
        let _ = worker.cancel_tx.try_send(());

        if worker.handle.thread().id() == thread::current().id() {
            log::warn!("Frame loop stopped from its own thread; detaching.");
            return None;
        }

        let exit = Self::join(worker.handle);
        if let LoopExit::Failed(err) = &exit {
            self.failure = Some(err.clone());
        }
        Some(exit)
    }

    /// Returns `true` while a loop thread is alive.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Returns the error that terminated the last loop thread, if any, and clears it.
    pub fn take_failure(&mut self) -> Option<FrameError> {
        self.reap();
        self.failure.take()
    }

    /// Returns a copy of the frame counters.
    pub fn stats(&self) -> FrameStats {
        self.counters.snapshot()
    }

    /// Returns the shared frame counters.
    pub fn counters(&self) -> Arc<FrameCounters> {
        Arc::clone(&self.counters)
    }

    /// Returns a receiver for the loop's lifecycle events.
    ///
    /// At most [`LOOP_EVENT_CAPACITY`] events are queued; when nobody drains
    /// them the oldest are dropped.
    pub fn events(&self) -> flume::Receiver<LoopEvent> {
        self.events.subscribe()
    }

    /// Returns the loop configuration.
    pub fn config(&self) -> &FrameLoopConfig {
        &self.config
    }

    /// Joins a thread that already exited on its own and keeps its failure.
    fn reap(&mut self) {
        let finished = self
            .worker
            .as_ref()
            .is_some_and(|worker| worker.handle.is_finished());
        if !finished {
            return;
        }
        if let Some(worker) = self.worker.take() {
            if let LoopExit::Failed(err) = Self::join(worker.handle) {
                self.failure = Some(err);
            }
        }
    }

    fn join(handle: JoinHandle<LoopExit>) -> LoopExit {
        handle
            .join()
            .unwrap_or_else(|payload| LoopExit::Failed(FrameError::from_panic(payload.as_ref())))
    }
}

impl Drop for FrameUpdateLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
