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


//! Visualization settings and the basic stylers derived from them.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use vizloop_core::{
    Edge, EdgeStyle, EdgeStyler, FrameError, FrameResult, Node, NodeStyle, NodeStyler, Rgba,
    StyleSource,
};

/// User-facing appearance settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizSettings {
    /// Multiplier applied to every node size.
    pub node_scale: f32,
    /// When set, every node is drawn in this color instead of its own.
    pub node_uni_color: Option<Rgba>,
    /// Whether node labels are drawn.
    pub show_labels: bool,
    /// Nodes smaller than this (after scaling) never show a label.
    pub label_min_size: f32,
    /// Color of every edge.
    pub edge_color: Rgba,
    /// Multiplier applied to the edge thickness.
    pub edge_scale: f32,
    /// When set, the thickness is proportional to the absolute edge weight.
    pub edge_weighted: bool,
}

impl Default for VizSettings {
    fn default() -> Self {
        Self {
            node_scale: 1.0,
            node_uni_color: None,
            show_labels: false,
            label_min_size: 0.0,
            edge_color: Rgba::GRAY.with_alpha(0.6),
            edge_scale: 1.0,
            edge_weighted: true,
        }
    }
}

impl VizSettings {
    /// Parses settings written in RON. Missing fields keep their default.
    pub fn from_ron_str(source: &str) -> FrameResult<Self> {
        ron::from_str(source).map_err(|e| FrameError::Config(e.to_string()))
    }
}

/// Styles nodes from a frozen copy of the settings.
#[derive(Debug, Clone)]
pub struct BasicNodeStyler {
    settings: VizSettings,
}

impl BasicNodeStyler {
    /// Creates a styler from `settings`.
    pub fn new(settings: VizSettings) -> Self {
        Self { settings }
    }
}

impl NodeStyler for BasicNodeStyler {
    fn style(&self, node: &Node) -> NodeStyle {
        let size = node.size * self.settings.node_scale;
        NodeStyle {
            color: self.settings.node_uni_color.unwrap_or(node.color),
            size,
            show_label: self.settings.show_labels && size >= self.settings.label_min_size,
        }
    }
}

/// Styles edges from a frozen copy of the settings.
#[derive(Debug, Clone)]
pub struct BasicEdgeStyler {
    settings: VizSettings,
}

impl BasicEdgeStyler {
    /// Creates a styler from `settings`.
    pub fn new(settings: VizSettings) -> Self {
        Self { settings }
    }
}

impl EdgeStyler for BasicEdgeStyler {
    fn style(&self, edge: &Edge) -> EdgeStyle {
        let base = if self.settings.edge_weighted {
            edge.weight.abs()
        } else {
            1.0
        };
        EdgeStyle {
            color: self.settings.edge_color,
            thickness: base * self.settings.edge_scale,
        }
    }
}

/// The live visualization settings.
///
/// Every call to [`StyleSource::node_styler`] or [`StyleSource::edge_styler`]
/// freezes the settings current at that moment, so a change made from the UI
/// thread shows up in the next frame and never in the middle of one.
#[derive(Debug, Default)]
pub struct VizModel {
    settings: RwLock<VizSettings>,
}

impl VizModel {
    /// Creates a model with the given settings.
    pub fn new(settings: VizSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// Returns a copy of the current settings.
    pub fn settings(&self) -> VizSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Edits the settings in place.
    pub fn update(&self, edit: impl FnOnce(&mut VizSettings)) {
        edit(&mut *self.settings.write().unwrap_or_else(PoisonError::into_inner));
    }
}

impl StyleSource for VizModel {
    fn node_styler(&self) -> Arc<dyn NodeStyler> {
        Arc::new(BasicNodeStyler::new(self.settings()))
    }

    fn edge_styler(&self) -> Arc<dyn EdgeStyler> {
        Arc::new(BasicEdgeStyler::new(self.settings()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizloop_core::{NodeId, Vec3};

    #[test]
    fn test_default_node_style_keeps_node_color() {
        let model = VizModel::default();
        let mut node = Node::new(1, Vec3::ZERO, 2.0);
        node.color = Rgba::WHITE;

        let style = model.node_styler().style(&node);
        assert_eq!(style.color, Rgba::WHITE);
        assert_eq!(style.size, 2.0);
        assert!(!style.show_label);
    }

    #[test]
    fn test_styler_is_frozen_at_fetch() {
        let model = VizModel::default();
        let before = model.node_styler();
        model.update(|s| {
            s.node_scale = 3.0;
            s.node_uni_color = Some(Rgba::BLACK);
        });
        let after = model.node_styler();

        let node = Node::new(1, Vec3::ZERO, 2.0);
        assert_eq!(before.style(&node).size, 2.0);
        assert_eq!(after.style(&node).size, 6.0);
        assert_eq!(after.style(&node).color, Rgba::BLACK);
    }

    #[test]
    fn test_labels_respect_min_size() {
        let model = VizModel::new(VizSettings {
            show_labels: true,
            label_min_size: 2.0,
            ..VizSettings::default()
        });
        let styler = model.node_styler();
        assert!(!styler.style(&Node::new(1, Vec3::ZERO, 1.0)).show_label);
        assert!(styler.style(&Node::new(2, Vec3::ZERO, 2.0)).show_label);
    }

    #[test]
    fn test_edge_thickness() {
        let edge = Edge::new(1, NodeId(1), NodeId(2), -4.0);
        let weighted = BasicEdgeStyler::new(VizSettings {
            edge_scale: 0.5,
            ..VizSettings::default()
        });
        assert_eq!(weighted.style(&edge).thickness, 2.0);

        let flat = BasicEdgeStyler::new(VizSettings {
            edge_weighted: false,
            ..VizSettings::default()
        });
        assert_eq!(flat.style(&edge).thickness, 1.0);
    }

    #[test]
    fn test_settings_from_ron() {
        let settings = VizSettings::from_ron_str("(show_labels: true, node_scale: 2.0)")
            .expect("Settings should parse");
        assert!(settings.show_labels);
        assert_eq!(settings.node_scale, 2.0);
        assert!(settings.edge_weighted);
    }
}
