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

//! Ties the frame loop to explicit enablement and workspace selection.

use crate::config::FrameLoopConfig;
use crate::frame_loop::{FrameCollaborators, FrameUpdateLoop, LoopEvent, LoopExit};
use crate::model_handle::SharedModelHandle;
use crate::stats::{FrameCounters, FrameStats};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use vizloop_core::{
    FrameError, FrameResult, GraphModelSource, Workspace, WorkspaceHost, WorkspaceId,
    WorkspaceListener,
};

/// The two flags the loop activity is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunState {
    /// Set by [`LifecycleCoordinator::enable`], cleared by [`LifecycleCoordinator::disable`].
    pub running: bool,
    /// Set while a workspace with a graph model is selected.
    pub workspace_active: bool,
}

impl RunState {
    /// The loop should run exactly when both flags are set.
    pub fn is_active(&self) -> bool {
        self.running && self.workspace_active
    }
}

struct CoordinatorState {
    run: RunState,
    frame_loop: FrameUpdateLoop,
    selected: Option<WorkspaceId>,
    last_failure: Option<FrameError>,
}

/// Starts and stops the frame loop as enablement and workspace selection change.
///
/// Every transition runs on the caller's thread under one lock. The loop
/// thread never takes that lock, so stopping it while holding the lock cannot
/// deadlock.
pub struct LifecycleCoordinator {
    state: Mutex<CoordinatorState>,
    model: Arc<SharedModelHandle>,
    models: Arc<dyn GraphModelSource>,
    counters: Arc<FrameCounters>,
    events: flume::Receiver<LoopEvent>,
}

impl LifecycleCoordinator {
    /// Creates a disabled coordinator and registers it with `host`.
    pub fn new(
        config: FrameLoopConfig,
        collaborators: FrameCollaborators,
        models: Arc<dyn GraphModelSource>,
        host: &dyn WorkspaceHost,
    ) -> FrameResult<Arc<Self>> {
        let model = Arc::new(SharedModelHandle::new());
        let frame_loop = FrameUpdateLoop::new(config, Arc::clone(&model), collaborators)?;
        let counters = frame_loop.counters();
        let events = frame_loop.events();

        let coordinator = Arc::new(Self {
            state: Mutex::new(CoordinatorState {
                run: RunState::default(),
                frame_loop,
                selected: None,
                last_failure: None,
            }),
            model,
            models,
            counters,
            events,
        });
        host.add_workspace_listener(coordinator.clone());
        Ok(coordinator)
    }

    // Transitions only flip flags and start or stop the thread; a panic in the
    // middle leaves a state the next transition corrects.
    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allows the loop to run. Starts it if a workspace is active.
    pub fn enable(&self) -> FrameResult<()> {
        let mut state = self.lock();
        state.run.running = true;
        log::debug!("Frame loop enabled.");
        Self::sync(&mut state)
    }

    /// Stops the loop and keeps it stopped until [`enable`](Self::enable).
    pub fn disable(&self) {
        let mut state = self.lock();
        state.run.running = false;
        log::debug!("Frame loop disabled.");
        Self::stop_loop(&mut state);
    }

    /// Makes the model of `workspace` the active one and starts the loop if enabled.
    ///
    /// Reselecting while the loop runs swaps the model in place. A workspace
    /// without a model leaves the handle empty, stops the loop and returns
    /// [`FrameError::NoModel`].
    pub fn on_workspace_selected(&self, workspace: &Workspace) -> FrameResult<()> {
        // Resolved before locking: the source may call back into the host.
        let model = self.models.model_for(workspace);

        let mut state = self.lock();
        let has_model = model.is_some();
        self.model.set(model);
        state.selected = Some(workspace.id);
        state.run.workspace_active = has_model;

        if has_model {
            log::debug!("Workspace {workspace} selected.");
            Self::sync(&mut state)
        } else {
            Self::stop_loop(&mut state);
            Err(FrameError::NoModel)
        }
    }

    /// Clears the active model and stops the loop.
    pub fn on_workspace_deselected(&self, workspace: &Workspace) {
        let mut state = self.lock();
        log::debug!("Workspace {workspace} deselected.");
        self.deselect(&mut state);
    }

    fn deselect(&self, state: &mut CoordinatorState) {
        self.model.clear();
        state.selected = None;
        state.run.workspace_active = false;
        Self::stop_loop(state);
    }

    fn sync(state: &mut CoordinatorState) -> FrameResult<()> {
        if !state.run.is_active() {
            Self::stop_loop(state);
            return Ok(());
        }
        if state.frame_loop.start()? {
            log::debug!("Frame loop started.");
        }
        if let Some(err) = state.frame_loop.take_failure() {
            state.last_failure = Some(err);
        }
        Ok(())
    }

    fn stop_loop(state: &mut CoordinatorState) {
        match state.frame_loop.stop() {
            Some(LoopExit::Failed(err)) => {
                log::warn!("Frame loop had already failed: {err}");
                state.last_failure = Some(err);
            }
            Some(LoopExit::Cancelled { frames }) => {
                log::debug!("Frame loop stopped after {frames} frames.");
            }
            None => {}
        }
    }

    /// Returns the current flags.
    pub fn run_state(&self) -> RunState {
        self.lock().run
    }

    /// Returns `true` while a loop thread is alive.
    pub fn is_loop_active(&self) -> bool {
        self.lock().frame_loop.is_running()
    }

    /// Returns the id of the selected workspace, if any.
    pub fn selected_workspace(&self) -> Option<WorkspaceId> {
        self.lock().selected
    }

    /// Returns the handle the loop reads the model from.
    pub fn model(&self) -> Arc<SharedModelHandle> {
        Arc::clone(&self.model)
    }

    /// Returns the frame counters, summed over every loop instance.
    pub fn stats(&self) -> FrameStats {
        self.counters.snapshot()
    }

    /// Returns a receiver of loop lifecycle events.
    ///
    /// Receivers share one queue: each event is delivered to one of them.
    /// The queue is bounded; undrained events are dropped oldest first.
    pub fn events(&self) -> flume::Receiver<LoopEvent> {
        self.events.clone()
    }

    /// Returns the most recent error that terminated a loop, if any.
    pub fn last_failure(&self) -> Option<FrameError> {
        let mut state = self.lock();
        if let Some(err) = state.frame_loop.take_failure() {
            state.last_failure = Some(err);
        }
        state.last_failure.clone()
    }
}

impl WorkspaceListener for LifecycleCoordinator {
    fn initialize(&self, workspace: &Workspace) {
        log::trace!("Workspace {workspace} initialized.");
    }

    fn select(&self, workspace: &Workspace) {
        match self.on_workspace_selected(workspace) {
            Ok(()) => {}
            Err(FrameError::NoModel) => {
                log::warn!("Workspace {workspace} selected without a graph model.")
            }
            Err(e) => log::error!("Could not start the frame loop for {workspace}: {e}"),
        }
    }

    fn unselect(&self, workspace: &Workspace) {
        self.on_workspace_deselected(workspace);
    }

    fn close(&self, workspace: &Workspace) {
        let mut state = self.lock();
        if state.selected == Some(workspace.id) {
            log::debug!("Selected workspace {workspace} closed.");
            self.deselect(&mut state);
        }
    }

    fn project_closed(&self) {
        let mut state = self.lock();
        if state.selected.is_some() || state.frame_loop.is_running() {
            log::debug!("Project closed.");
            self.deselect(&mut state);
        }
    }
}
