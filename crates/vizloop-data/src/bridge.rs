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

//! A double-buffered frame hand-off between the frame loop and a renderer.
//!
//! The producer fills a back buffer between `begin_frame` and `end_frame`.
//! `end_frame` freezes it into an immutable [`FrameSnapshot`] that replaces the
//! front buffer. The renderer only ever sees complete frames.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use vizloop_core::{
    Camera, Edge, EdgeId, EdgeStyle, EdgeStyler, FrameBridge, FrameError, FrameResult, Node,
    NodeId, NodeStyle, NodeStyler, Rgba, UiPrimitive, Vec3,
};

/// Number of frame timings kept by default.
const DEFAULT_HISTORY: usize = 64;

/// The per-node data uploaded to the renderer, laid out for a vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeInstance {
    /// The node position.
    pub position: [f32; 3],
    /// The styled node size.
    pub size: f32,
    /// The styled node color.
    pub color: [f32; 4],
}

/// A styled edge with its endpoints resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeDrawable {
    /// The edge identifier.
    pub id: EdgeId,
    /// The source position.
    pub from: Vec3,
    /// The target position.
    pub to: Vec3,
    /// The styled stroke color.
    pub color: Rgba,
    /// The styled stroke thickness.
    pub thickness: f32,
}

/// Start and end of one published frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    /// The frame sequence number.
    pub sequence: u64,
    /// When `begin_frame` was called.
    pub started_at: Instant,
    /// When `end_frame` was called.
    pub finished_at: Instant,
}

/// A complete, immutable frame.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    /// Sequence number, starting at 1.
    pub sequence: u64,
    /// The camera the frame was produced with.
    pub camera: Camera,
    /// Node identifiers, parallel to `nodes`.
    pub node_ids: Vec<NodeId>,
    /// Node instances, ready for upload.
    pub nodes: Vec<NodeInstance>,
    /// Nodes whose label should be drawn.
    pub labels: Vec<NodeId>,
    /// Edges, ready for drawing.
    pub edges: Vec<EdgeDrawable>,
    /// Overlay primitives, in submission order.
    pub primitives: Vec<UiPrimitive>,
    /// Begin and end instants of the frame.
    pub timing: FrameTiming,
}

impl FrameSnapshot {
    /// Returns the node instances as raw bytes.
    pub fn node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    /// Returns `true` if the frame holds no node, edge or primitive.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.primitives.is_empty()
    }
}

struct FrameBuilder {
    camera: Camera,
    started_at: Instant,
    node_styler: Option<Arc<dyn NodeStyler>>,
    edge_styler: Option<Arc<dyn EdgeStyler>>,
    positions: HashMap<NodeId, Vec3>,
    node_ids: Vec<NodeId>,
    nodes: Vec<NodeInstance>,
    labels: Vec<NodeId>,
    edges: Vec<EdgeDrawable>,
    primitives: Vec<UiPrimitive>,
}

impl FrameBuilder {
    fn new(camera: Camera) -> Self {
        Self {
            camera,
            started_at: Instant::now(),
            node_styler: None,
            edge_styler: None,
            positions: HashMap::new(),
            node_ids: Vec::new(),
            nodes: Vec::new(),
            labels: Vec::new(),
            edges: Vec::new(),
            primitives: Vec::new(),
        }
    }

    fn add_node(&mut self, node: &Node) {
        let style = match &self.node_styler {
            Some(styler) => styler.style(node),
            None => NodeStyle {
                color: node.color,
                size: node.size,
                show_label: false,
            },
        };
        let c = style.color;
        self.positions.insert(node.id, node.position);
        self.node_ids.push(node.id);
        self.nodes.push(NodeInstance {
            position: [node.position.x, node.position.y, node.position.z],
            size: style.size,
            color: [c.r, c.g, c.b, c.a],
        });
        if style.show_label {
            self.labels.push(node.id);
        }
    }

    fn add_edge(&mut self, edge: &Edge) {
        let (Some(&from), Some(&to)) = (
            self.positions.get(&edge.source),
            self.positions.get(&edge.target),
        ) else {
            // The graph changed between the node and edge passes.
            log::trace!("Edge {} skipped: endpoint not in frame.", edge.id.0);
            return;
        };
        let style = match &self.edge_styler {
            Some(styler) => styler.style(edge),
            None => EdgeStyle {
                color: Rgba::GRAY,
                thickness: edge.weight.abs().max(f32::EPSILON),
            },
        };
        self.edges.push(EdgeDrawable {
            id: edge.id,
            from,
            to,
            color: style.color,
            thickness: style.thickness,
        });
    }

    fn finish(self, sequence: u64) -> FrameSnapshot {
        FrameSnapshot {
            sequence,
            camera: self.camera,
            node_ids: self.node_ids,
            nodes: self.nodes,
            labels: self.labels,
            edges: self.edges,
            primitives: self.primitives,
            timing: FrameTiming {
                sequence,
                started_at: self.started_at,
                finished_at: Instant::now(),
            },
        }
    }
}

struct FrontBuffer {
    latest: Option<Arc<FrameSnapshot>>,
    history: VecDeque<FrameTiming>,
}

/// A [`FrameBridge`] that publishes whole frames to a consumer.
pub struct DoubleBufferBridge {
    back: Mutex<Option<FrameBuilder>>,
    front: Mutex<FrontBuffer>,
    published: Condvar,
    history_capacity: usize,
}

impl DoubleBufferBridge {
    /// Creates a bridge that remembers the timing of the last 64 frames.
    pub fn new() -> Self {
        Self::with_history(DEFAULT_HISTORY)
    }

    /// Creates a bridge that remembers the timing of the last `capacity` frames.
    pub fn with_history(capacity: usize) -> Self {
        Self {
            back: Mutex::new(None),
            front: Mutex::new(FrontBuffer {
                latest: None,
                history: VecDeque::with_capacity(capacity),
            }),
            published: Condvar::new(),
            history_capacity: capacity,
        }
    }

    // Both buffers are replaced wholesale, so a poisoned lock still guards a
    // coherent value.
    fn back(&self) -> MutexGuard<'_, Option<FrameBuilder>> {
        self.back.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn front(&self) -> MutexGuard<'_, FrontBuffer> {
        self.front.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_open_frame(
        &self,
        operation: &str,
        f: impl FnOnce(&mut FrameBuilder),
    ) -> FrameResult<()> {
        match self.back().as_mut() {
            Some(builder) => {
                f(builder);
                Ok(())
            }
            None => Err(FrameError::Bridge(format!(
                "{operation} called outside of a frame"
            ))),
        }
    }

    /// Returns the most recently completed frame.
    pub fn latest(&self) -> Option<Arc<FrameSnapshot>> {
        self.front().latest.clone()
    }

    /// Returns the number of frames completed so far.
    pub fn frames_published(&self) -> u64 {
        self.front()
            .latest
            .as_ref()
            .map_or(0, |frame| frame.sequence)
    }

    /// Returns the timing of the most recent frames, oldest first.
    pub fn timings(&self) -> Vec<FrameTiming> {
        self.front().history.iter().copied().collect()
    }

    /// Returns `true` between `begin_frame` and `end_frame`.
    pub fn is_frame_open(&self) -> bool {
        self.back().is_some()
    }

    /// Blocks until a frame with a sequence number of at least `sequence` is
    /// published, or `timeout` elapses.
    pub fn wait_for_sequence(
        &self,
        sequence: u64,
        timeout: Duration,
    ) -> Option<Arc<FrameSnapshot>> {
        let deadline = Instant::now() + timeout;
        let mut front = self.front();
        loop {
            if let Some(frame) = front.latest.as_ref().filter(|f| f.sequence >= sequence) {
                return Some(Arc::clone(frame));
            }
            let remaining = deadline.checked_duration_since(Instant::now())?;
            front = self
                .published
                .wait_timeout(front, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

impl Default for DoubleBufferBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBridge for DoubleBufferBridge {
    fn begin_frame(&self, camera: Camera) -> FrameResult<()> {
        let mut back = self.back();
        if back.is_some() {
            log::warn!("Frame begun while another was open; discarding the partial frame.");
        }
        *back = Some(FrameBuilder::new(camera));
        Ok(())
    }

    fn set_stylers(
        &self,
        node_styler: Arc<dyn NodeStyler>,
        edge_styler: Arc<dyn EdgeStyler>,
    ) -> FrameResult<()> {
        self.with_open_frame("set_stylers", |builder| {
            builder.node_styler = Some(node_styler);
            builder.edge_styler = Some(edge_styler);
        })
    }

    fn add_node(&self, node: &Node) -> FrameResult<()> {
        self.with_open_frame("add_node", |builder| builder.add_node(node))
    }

    fn add_edge(&self, edge: &Edge) -> FrameResult<()> {
        self.with_open_frame("add_edge", |builder| builder.add_edge(edge))
    }

    fn add_primitive(&self, primitive: UiPrimitive) -> FrameResult<()> {
        self.with_open_frame("add_primitive", |builder| {
            builder.primitives.push(primitive)
        })
    }

    fn end_frame(&self) -> FrameResult<()> {
        let builder = self
            .back()
            .take()
            .ok_or_else(|| FrameError::Bridge("end_frame called outside of a frame".to_string()))?;

        {
            let mut front = self.front();
            let sequence = front.latest.as_ref().map_or(1, |frame| frame.sequence + 1);
            let snapshot = builder.finish(sequence);
            if self.history_capacity > 0 {
                if front.history.len() == self.history_capacity {
                    front.history.pop_front();
                }
                front.history.push_back(snapshot.timing);
            }
            front.latest = Some(Arc::new(snapshot));
        }
        self.published.notify_all();
        Ok(())
    }

    fn abort_frame(&self) {
        if self.back().take().is_some() {
            log::debug!("Partial frame discarded.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizloop_core::Shape;

    struct LabelEverything;

    impl NodeStyler for LabelEverything {
        fn style(&self, node: &Node) -> NodeStyle {
            NodeStyle {
                color: Rgba::WHITE,
                size: node.size * 2.0,
                show_label: true,
            }
        }
    }

    struct ThinEdges;

    impl EdgeStyler for ThinEdges {
        fn style(&self, _edge: &Edge) -> EdgeStyle {
            EdgeStyle {
                color: Rgba::BLACK,
                thickness: 0.5,
            }
        }
    }

    #[test]
    fn test_calls_outside_frame_fail() {
        let bridge = DoubleBufferBridge::new();
        let node = Node::new(1, Vec3::ZERO, 1.0);
        assert!(matches!(bridge.add_node(&node), Err(FrameError::Bridge(_))));
        assert!(matches!(bridge.end_frame(), Err(FrameError::Bridge(_))));
        assert!(bridge.latest().is_none());
    }

    #[test]
    fn test_frame_is_published_only_at_end() {
        let bridge = DoubleBufferBridge::new();
        bridge.begin_frame(Camera::default()).expect("Frame should open");
        bridge
            .add_node(&Node::new(1, Vec3::new(1.0, 2.0, 3.0), 1.5))
            .expect("Node should be added");
        assert!(bridge.is_frame_open());
        assert!(bridge.latest().is_none());

        bridge.end_frame().expect("Frame should close");
        let frame = bridge.latest().expect("Frame should be published");
        assert_eq!(frame.sequence, 1);
        assert_eq!(frame.node_ids, vec![NodeId(1)]);
        assert_eq!(frame.nodes[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(frame.nodes[0].size, 1.5);
        assert_eq!(frame.node_bytes().len(), std::mem::size_of::<NodeInstance>());
        assert!(!bridge.is_frame_open());
    }

    #[test]
    fn test_aborted_frame_is_never_published() {
        let bridge = DoubleBufferBridge::new();
        bridge.abort_frame();

        bridge.begin_frame(Camera::default()).expect("Frame should open");
        bridge
            .add_node(&Node::new(1, Vec3::ZERO, 1.0))
            .expect("Node should be added");
        bridge.abort_frame();

        assert!(!bridge.is_frame_open());
        assert!(bridge.latest().is_none());
        assert!(matches!(bridge.end_frame(), Err(FrameError::Bridge(_))));

        bridge.begin_frame(Camera::default()).expect("Frame should open");
        bridge.end_frame().expect("Frame should close");
        let frame = bridge.latest().expect("Frame should be published");
        assert_eq!(frame.sequence, 1);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_stylers_apply_to_frame() {
        let bridge = DoubleBufferBridge::new();
        bridge.begin_frame(Camera::default()).expect("Frame should open");
        bridge
            .set_stylers(Arc::new(LabelEverything), Arc::new(ThinEdges))
            .expect("Stylers should be set");
        bridge
            .add_node(&Node::new(1, Vec3::ZERO, 1.0))
            .expect("Node should be added");
        bridge
            .add_node(&Node::new(2, Vec3::ONE, 1.0))
            .expect("Node should be added");
        bridge
            .add_edge(&Edge::new(1, NodeId(1), NodeId(2), 3.0))
            .expect("Edge should be added");
        bridge.end_frame().expect("Frame should close");

        let frame = bridge.latest().expect("Frame should be published");
        assert_eq!(frame.nodes[0].size, 2.0);
        assert_eq!(frame.nodes[0].color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(frame.labels, vec![NodeId(1), NodeId(2)]);
        assert_eq!(frame.edges[0].thickness, 0.5);
        assert_eq!(frame.edges[0].to, Vec3::ONE);
    }

    #[test]
    fn test_edge_with_unknown_endpoint_is_skipped() {
        let bridge = DoubleBufferBridge::new();
        bridge.begin_frame(Camera::default()).expect("Frame should open");
        bridge
            .add_node(&Node::new(1, Vec3::ZERO, 1.0))
            .expect("Node should be added");
        bridge
            .add_edge(&Edge::new(1, NodeId(1), NodeId(9), 1.0))
            .expect("Edge call should succeed");
        bridge.end_frame().expect("Frame should close");
        assert!(bridge.latest().expect("Frame").edges.is_empty());
    }

    #[test]
    fn test_sequence_and_history() {
        let bridge = DoubleBufferBridge::with_history(2);
        for _ in 0..3 {
            bridge.begin_frame(Camera::default()).expect("Frame should open");
            bridge
                .add_primitive(
                    Shape::Circle {
                        center: (1.0, 1.0),
                        radius: 4.0,
                    }
                    .ui_primitive(),
                )
                .expect("Primitive should be added");
            bridge.end_frame().expect("Frame should close");
        }
        assert_eq!(bridge.frames_published(), 3);
        let timings = bridge.timings();
        assert_eq!(
            timings.iter().map(|t| t.sequence).collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert!(timings[0].started_at <= timings[1].started_at);
    }

    #[test]
    fn test_wait_for_sequence_times_out() {
        let bridge = DoubleBufferBridge::new();
        assert!(bridge
            .wait_for_sequence(1, Duration::from_millis(20))
            .is_none());
    }

    #[test]
    fn test_wait_for_sequence_wakes_on_publish() {
        let bridge = Arc::new(DoubleBufferBridge::new());
        let producer = {
            let bridge = bridge.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(10));
                bridge.begin_frame(Camera::default()).expect("Frame should open");
                bridge.end_frame().expect("Frame should close");
            })
        };
        let frame = bridge.wait_for_sequence(1, Duration::from_secs(2));
        producer.join().expect("Producer panicked");
        assert_eq!(frame.map(|f| f.sequence), Some(1));
    }
}
