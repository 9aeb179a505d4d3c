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


use std::sync::Arc;
use std::time::Duration;
use vizloop_control::{FrameCollaborators, FrameLoopConfig, FrameUpdateLoop, SharedModelHandle};
use vizloop_core::{Edge, GraphLimits, GraphModel, Node, NodeId, NoShape, Shape, Vec3, WeightRange};
use vizloop_data::{
    DoubleBufferBridge, FrameSnapshot, InMemoryGraphModel, ShapeSlot, StaticController, VizModel,
};

struct Scene {
    model: Arc<InMemoryGraphModel>,
    controller: Arc<StaticController>,
    limits: Arc<GraphLimits>,
    bridge: Arc<DoubleBufferBridge>,
    pointer: Arc<ShapeSlot>,
    frame_loop: FrameUpdateLoop,
}

impl Scene {
    fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let model = Arc::new(InMemoryGraphModel::new());
        let controller = Arc::new(StaticController::default());
        let limits = Arc::new(GraphLimits::new());
        let bridge = Arc::new(DoubleBufferBridge::new());
        let pointer = Arc::new(ShapeSlot::new());

        let handle = Arc::new(SharedModelHandle::new());
        handle.set(Some(model.clone() as Arc<dyn GraphModel>));
        let frame_loop = FrameUpdateLoop::new(
            FrameLoopConfig::with_frame_duration(5),
            handle,
            FrameCollaborators {
                controller: controller.clone(),
                bridge: bridge.clone(),
                styles: Arc::new(VizModel::default()),
                limits: limits.clone(),
                selection: Arc::new(NoShape),
                pointer: pointer.clone(),
            },
        )
        .expect("Config should be valid");

        Self {
            model,
            controller,
            limits,
            bridge,
            pointer,
            frame_loop,
        }
    }

    /// Runs the loop until two frames were published and returns the last one.
    fn run_two_frames(&mut self) -> Arc<FrameSnapshot> {
        assert_eq!(self.frame_loop.start(), Ok(true));
        let frame = self
            .bridge
            .wait_for_sequence(2, Duration::from_secs(5))
            .expect("Frames should be produced");
        self.frame_loop.stop();
        frame
    }
}

fn add_sample_nodes(model: &InMemoryGraphModel) {
    let graph = model.store();
    graph.add_node(Node::new(1, Vec3::new(0.0, 0.0, 0.0), 1.0));
    graph.add_node(Node::new(2, Vec3::new(4.0, 2.0, -1.0), 2.5));
    graph.add_node(Node::new(3, Vec3::new(-3.0, 5.0, 0.0), 1.5));
}

#[test]
fn test_centering_tracks_bounds_on_every_axis() {
    let mut scene = Scene::new();
    add_sample_nodes(&scene.model);
    scene.controller.set_centering(true);

    let frame = scene.run_two_frames();
    let limits = scene.limits.snapshot();
    let bounds = limits.bounds.expect("Bounds should be tracked while centering");

    assert_eq!((bounds.min.x, bounds.max.x), (-3.0, 4.0));
    assert_eq!((bounds.min.y, bounds.max.y), (0.0, 5.0));
    assert_eq!((bounds.min.z, bounds.max.z), (-1.0, 0.0));
    assert_eq!(limits.max_node_size, Some(2.5));
    assert_eq!(limits.node_count, 3);
    assert_eq!(frame.nodes.len(), 3);
}

#[test]
fn test_bounds_are_unset_without_centering() {
    let mut scene = Scene::new();
    add_sample_nodes(&scene.model);

    scene.run_two_frames();
    let limits = scene.limits.snapshot();
    assert_eq!(limits.bounds, None);
    assert_eq!(limits.max_node_size, Some(2.5));
}

#[test]
fn test_empty_graph_publishes_unset_limits() {
    let mut scene = Scene::new();
    scene.controller.set_centering(true);

    let frame = scene.run_two_frames();
    let limits = scene.limits.snapshot();

    assert!(scene.limits.publications() >= 2);
    assert!(limits.is_empty());
    assert_eq!(limits.bounds, None);
    assert_eq!(limits.max_node_size, None);
    assert_eq!(limits.edge_weights, None);
    assert!(frame.is_empty());
}

#[test]
fn test_edge_weight_range() {
    let mut scene = Scene::new();
    add_sample_nodes(&scene.model);
    let graph = scene.model.store();
    for (id, source, target, weight) in [(1, 1, 2, 0.5), (2, 2, 3, 4.0), (3, 3, 1, -2.0)] {
        graph
            .add_edge(Edge::new(id, NodeId(source), NodeId(target), weight))
            .expect("Endpoints exist");
    }

    let frame = scene.run_two_frames();
    let limits = scene.limits.snapshot();
    assert_eq!(
        limits.edge_weights,
        Some(WeightRange {
            min: -2.0,
            max: 4.0
        })
    );
    assert_eq!(limits.edge_count, 3);
    assert_eq!(frame.edges.len(), 3);
}

#[test]
fn test_limits_are_recomputed_from_scratch() {
    let mut scene = Scene::new();
    add_sample_nodes(&scene.model);
    scene.controller.set_centering(true);
    scene.run_two_frames();

    // Shrinking the graph must shrink the limits: no monotonic accumulation.
    scene.model.store().remove_node(NodeId(2));
    scene.model.store().remove_node(NodeId(3));
    let published = scene.bridge.frames_published();
    assert_eq!(scene.frame_loop.start(), Ok(true));
    scene
        .bridge
        .wait_for_sequence(published + 1, Duration::from_secs(5))
        .expect("A frame should be produced");
    scene.frame_loop.stop();

    let limits = scene.limits.snapshot();
    let bounds = limits.bounds.expect("Bounds should be tracked while centering");
    assert_eq!(bounds.min, Vec3::ZERO);
    assert_eq!(bounds.max, Vec3::ZERO);
    assert_eq!(limits.max_node_size, Some(1.0));
}

#[test]
fn test_pointer_shape_is_drawn() {
    let mut scene = Scene::new();
    scene.pointer.set(Shape::Circle {
        center: (64.0, 48.0),
        radius: 12.0,
    });

    let frame = scene.run_two_frames();
    assert_eq!(frame.primitives.len(), 1);
    assert_eq!(
        frame.primitives[0],
        Shape::Circle {
            center: (64.0, 48.0),
            radius: 12.0,
        }
        .ui_primitive()
    );
}
