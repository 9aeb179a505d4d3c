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


//! A minimal workspace host: owns workspaces and dispatches their lifecycle.

use crate::definition::GraphDefinition;
use crate::graph_store::InMemoryGraphModel;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use vizloop_core::{
    FrameResult, GraphModel, GraphModelSource, Workspace, WorkspaceHost, WorkspaceId,
    WorkspaceListener,
};

struct HubState {
    workspaces: BTreeMap<WorkspaceId, (Workspace, Arc<InMemoryGraphModel>)>,
    selected: Option<WorkspaceId>,
    next_id: u64,
}

/// Owns a set of workspaces, each with its own graph model, and notifies
/// listeners as they are created, selected and closed.
///
/// Listeners are called on the thread that triggered the change, after the
/// hub's own lock has been released, so they may call back into the hub.
pub struct WorkspaceHub {
    state: Mutex<HubState>,
    listeners: Mutex<Vec<Arc<dyn WorkspaceListener>>>,
}

impl WorkspaceHub {
    /// Creates a hub with no workspace.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HubState {
                workspaces: BTreeMap::new(),
                selected: None,
                next_id: 1,
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    // State changes are single map or field writes.
    fn state(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, notify: impl Fn(&dyn WorkspaceListener)) {
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in &listeners {
            notify(listener.as_ref());
        }
    }

    /// Creates a workspace with an empty graph.
    pub fn new_workspace(&self, name: &str) -> Workspace {
        self.insert_workspace(name, Arc::new(InMemoryGraphModel::new()))
    }

    /// Creates a workspace whose graph is built from `definition`.
    pub fn new_workspace_from(
        &self,
        name: &str,
        definition: &GraphDefinition,
    ) -> FrameResult<Workspace> {
        let graph = Arc::new(definition.build()?);
        Ok(self.insert_workspace(name, Arc::new(InMemoryGraphModel::from_graph(graph))))
    }

    fn insert_workspace(&self, name: &str, model: Arc<InMemoryGraphModel>) -> Workspace {
        let workspace = {
            let mut state = self.state();
            let workspace = Workspace::new(state.next_id, name);
            state.next_id += 1;
            state
                .workspaces
                .insert(workspace.id, (workspace.clone(), model));
            workspace
        };
        log::debug!("Workspace {workspace} created.");
        self.dispatch(|listener| listener.initialize(&workspace));
        workspace
    }

    /// Selects `workspace`, deselecting the current one first.
    ///
    /// Selecting the already selected workspace notifies listeners again.
    /// Returns `false` if the workspace is unknown.
    pub fn select(&self, workspace: &Workspace) -> bool {
        let previous = {
            let mut state = self.state();
            if !state.workspaces.contains_key(&workspace.id) {
                log::warn!("Cannot select unknown workspace {workspace}.");
                return false;
            }
            let previous = state.selected.replace(workspace.id);
            previous
                .filter(|id| *id != workspace.id)
                .and_then(|id| state.workspaces.get(&id).map(|(ws, _)| ws.clone()))
        };

        if let Some(previous) = previous {
            self.dispatch(|listener| listener.unselect(&previous));
        }
        self.dispatch(|listener| listener.select(workspace));
        true
    }

    /// Deselects the current workspace, if any.
    pub fn unselect(&self) {
        let previous = {
            let mut state = self.state();
            state
                .selected
                .take()
                .and_then(|id| state.workspaces.get(&id).map(|(ws, _)| ws.clone()))
        };
        if let Some(previous) = previous {
            self.dispatch(|listener| listener.unselect(&previous));
        }
    }

    /// Closes `workspace`, deselecting it first if it is selected.
    pub fn close(&self, workspace: &Workspace) {
        let was_selected = {
            let mut state = self.state();
            if state.workspaces.remove(&workspace.id).is_none() {
                return;
            }
            let was_selected = state.selected == Some(workspace.id);
            if was_selected {
                state.selected = None;
            }
            was_selected
        };

        if was_selected {
            self.dispatch(|listener| listener.unselect(workspace));
        }
        log::debug!("Workspace {workspace} closed.");
        self.dispatch(|listener| listener.close(workspace));
    }

    /// Closes every workspace.
    pub fn close_project(&self) {
        let closed: Vec<Workspace> = {
            let mut state = self.state();
            state.selected = None;
            std::mem::take(&mut state.workspaces)
                .into_values()
                .map(|(ws, _)| ws)
                .collect()
        };
        for workspace in &closed {
            self.dispatch(|listener| listener.close(workspace));
        }
        log::debug!("Project closed ({} workspaces).", closed.len());
        self.dispatch(|listener| listener.project_closed());
    }

    /// Returns the selected workspace.
    pub fn selected(&self) -> Option<Workspace> {
        let state = self.state();
        state
            .selected
            .and_then(|id| state.workspaces.get(&id).map(|(ws, _)| ws.clone()))
    }

    /// Returns every open workspace, in creation order.
    pub fn workspaces(&self) -> Vec<Workspace> {
        self.state()
            .workspaces
            .values()
            .map(|(ws, _)| ws.clone())
            .collect()
    }

    /// Returns the concrete model of `workspace`, for editing its graph.
    pub fn graph_model(&self, workspace: &Workspace) -> Option<Arc<InMemoryGraphModel>> {
        self.state()
            .workspaces
            .get(&workspace.id)
            .map(|(_, model)| Arc::clone(model))
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for WorkspaceHub {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceHost for WorkspaceHub {
    fn add_workspace_listener(&self, listener: Arc<dyn WorkspaceListener>) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }
}

impl GraphModelSource for WorkspaceHub {
    fn model_for(&self, workspace: &Workspace) -> Option<Arc<dyn GraphModel>> {
        self.graph_model(workspace)
            .map(|model| model as Arc<dyn GraphModel>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn push(&self, call: String) {
            self.calls.lock().expect("Recorder lock").push(call);
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.calls.lock().expect("Recorder lock"))
        }
    }

    impl WorkspaceListener for Recorder {
        fn initialize(&self, workspace: &Workspace) {
            self.push(format!("initialize {}", workspace.name));
        }
        fn select(&self, workspace: &Workspace) {
            self.push(format!("select {}", workspace.name));
        }
        fn unselect(&self, workspace: &Workspace) {
            self.push(format!("unselect {}", workspace.name));
        }
        fn close(&self, workspace: &Workspace) {
            self.push(format!("close {}", workspace.name));
        }
        fn project_closed(&self) {
            self.push("project_closed".to_string());
        }
    }

    fn hub_with_recorder() -> (WorkspaceHub, Arc<Recorder>) {
        let hub = WorkspaceHub::new();
        let recorder = Arc::new(Recorder::default());
        hub.add_workspace_listener(recorder.clone());
        (hub, recorder)
    }

    #[test]
    fn test_selection_sequence() {
        let (hub, recorder) = hub_with_recorder();
        let a = hub.new_workspace("a");
        let b = hub.new_workspace("b");
        assert!(hub.select(&a));
        assert!(hub.select(&b));
        hub.unselect();
        hub.unselect();

        assert_eq!(
            recorder.take(),
            vec![
                "initialize a",
                "initialize b",
                "select a",
                "unselect a",
                "select b",
                "unselect b",
            ]
        );
        assert_eq!(hub.selected(), None);
    }

    #[test]
    fn test_reselect_notifies_again() {
        let (hub, recorder) = hub_with_recorder();
        let a = hub.new_workspace("a");
        hub.select(&a);
        hub.select(&a);
        assert_eq!(recorder.take(), vec!["initialize a", "select a", "select a"]);
    }

    #[test]
    fn test_closing_selected_workspace_unselects_first() {
        let (hub, recorder) = hub_with_recorder();
        let a = hub.new_workspace("a");
        hub.select(&a);
        recorder.take();

        hub.close(&a);
        assert_eq!(recorder.take(), vec!["unselect a", "close a"]);
        assert!(hub.model_for(&a).is_none());
        assert!(!hub.select(&a));
    }

    #[test]
    fn test_close_project() {
        let (hub, recorder) = hub_with_recorder();
        let a = hub.new_workspace("a");
        hub.new_workspace("b");
        hub.select(&a);
        recorder.take();

        hub.close_project();
        assert_eq!(
            recorder.take(),
            vec!["close a", "close b", "project_closed"]
        );
        assert!(hub.workspaces().is_empty());
    }

    #[test]
    fn test_models_are_per_workspace() {
        let hub = WorkspaceHub::new();
        let definition = GraphDefinition::phyllotaxis(5, 1, 1.0);
        let a = hub
            .new_workspace_from("a", &definition)
            .expect("Definition should build");
        let b = hub.new_workspace("b");

        let model_a = hub.model_for(&a).expect("a has a model");
        let model_b = hub.model_for(&b).expect("b has a model");
        assert_eq!(model_a.graph().node_count(), 5);
        assert_eq!(model_b.graph().node_count(), 0);
    }
}
