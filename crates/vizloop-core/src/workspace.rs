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

//! Contracts with the host application's workspace lifecycle.

use crate::graph::GraphModel;
use std::fmt;
use std::sync::Arc;

/// Identifier of a workspace, unique within a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspaceId(pub u64);

/// A host-managed unit of project state owning at most one graph model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Workspace {
    /// The workspace identifier.
    pub id: WorkspaceId,
    /// A human-readable name.
    pub name: String,
}

impl Workspace {
    /// Creates a workspace descriptor.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: WorkspaceId(id),
            name: name.into(),
        }
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id.0)
    }
}

/// Receives workspace lifecycle notifications from the host.
///
/// Notifications are delivered on the host's dispatch thread.
pub trait WorkspaceListener: Send + Sync {
    /// A workspace was created and initialized.
    fn initialize(&self, _workspace: &Workspace) {}

    /// A workspace became the selected one.
    fn select(&self, workspace: &Workspace);

    /// The selected workspace was deselected.
    fn unselect(&self, workspace: &Workspace);

    /// A workspace was closed.
    fn close(&self, _workspace: &Workspace) {}

    /// The host closed its project; no workspace remains.
    fn project_closed(&self) {}
}

/// The host's workspace event source.
pub trait WorkspaceHost {
    /// Registers a listener for the life of the host.
    fn add_workspace_listener(&self, listener: Arc<dyn WorkspaceListener>);
}

/// Resolves the graph model owned by a workspace.
pub trait GraphModelSource: Send + Sync {
    /// Returns the model of `workspace`, or `None` if it has none.
    fn model_for(&self, workspace: &Workspace) -> Option<Arc<dyn GraphModel>>;
}
