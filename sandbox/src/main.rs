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


// Vizloop Sandbox
// Drives the frame loop through a scripted workspace session and reports what
// the renderer side would have received.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use vizloop_control::{FrameCollaborators, FrameLoopConfig, LifecycleCoordinator, LoopEvent};
use vizloop_core::{Camera, GraphLimits, NodeId, Shape, Vec3};
use vizloop_data::{
    DoubleBufferBridge, GraphDefinition, ShapeSlot, StaticController, VizModel, VizSettings,
    WorkspaceHub,
};

const FRAME_LOOP_CONFIG: &str = include_str!("../assets/frame_loop.ron");
const VIZ_SETTINGS: &str = include_str!("../assets/viz.ron");
const STAR_GRAPH: &str = include_str!("../assets/star.ron");

/// The renderer-side objects the sandbox inspects between steps.
struct Viewer {
    bridge: Arc<DoubleBufferBridge>,
    limits: Arc<GraphLimits>,
    controller: Arc<StaticController>,
    styles: Arc<VizModel>,
    selection: Arc<ShapeSlot>,
    pointer: Arc<ShapeSlot>,
}

impl Viewer {
    fn new(settings: VizSettings) -> Self {
        Self {
            bridge: Arc::new(DoubleBufferBridge::new()),
            limits: Arc::new(GraphLimits::new()),
            controller: Arc::new(StaticController::new(Camera::looking_at(
                Vec3::new(0.0, 0.0, 800.0),
                Vec3::ZERO,
            ))),
            styles: Arc::new(VizModel::new(settings)),
            selection: Arc::new(ShapeSlot::new()),
            pointer: Arc::new(ShapeSlot::new()),
        }
    }

    fn collaborators(&self) -> FrameCollaborators {
        FrameCollaborators {
            controller: self.controller.clone(),
            bridge: self.bridge.clone(),
            styles: self.styles.clone(),
            limits: self.limits.clone(),
            selection: self.selection.clone(),
            pointer: self.pointer.clone(),
        }
    }

    fn report(&self, step: &str) {
        let limits = self.limits.snapshot();
        match self.bridge.latest() {
            Some(frame) => log::info!(
                "[{step}] frame #{}: {} nodes ({} bytes), {} edges, {} labels, {} overlays",
                frame.sequence,
                frame.nodes.len(),
                frame.node_bytes().len(),
                frame.edges.len(),
                frame.labels.len(),
                frame.primitives.len()
            ),
            None => log::info!("[{step}] no frame published yet"),
        }
        log::info!(
            "[{step}] limits: bounds={:?} max_node_size={:?} edge_weights={:?}",
            limits.bounds,
            limits.max_node_size,
            limits.edge_weights
        );
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config =
        FrameLoopConfig::from_ron_str(FRAME_LOOP_CONFIG).context("Invalid frame loop config")?;
    let settings = VizSettings::from_ron_str(VIZ_SETTINGS).context("Invalid viz settings")?;
    log::info!(
        "Frame loop: {} ms per frame (~{:.0} fps).",
        config.frame_duration_ms,
        config.target_fps()
    );

    let spiral = match std::env::args().nth(1) {
        Some(path) => {
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("Could not read graph file {path}"))?;
            GraphDefinition::from_ron_str(&source)
                .with_context(|| format!("Could not parse graph file {path}"))?
        }
        None => GraphDefinition::phyllotaxis(2_000, 3, 6.0),
    };
    let star = GraphDefinition::from_ron_str(STAR_GRAPH).context("Invalid star graph")?;

    let hub = Arc::new(WorkspaceHub::new());
    let viewer = Viewer::new(settings);
    let coordinator =
        LifecycleCoordinator::new(config, viewer.collaborators(), hub.clone(), hub.as_ref())?;
    let events = coordinator.events();

    let spiral_ws = hub.new_workspace_from("Spiral", &spiral)?;
    let star_ws = hub.new_workspace_from("Star", &star)?;

    // 1. Enabled with nothing selected: the loop stays idle.
    coordinator.enable()?;
    thread::sleep(Duration::from_millis(100));
    log::info!("Loop active before selection: {}", coordinator.is_loop_active());

    // 2. Select the spiral with centering on.
    viewer.controller.set_centering(true);
    hub.select(&spiral_ws);
    thread::sleep(Duration::from_millis(300));
    viewer.report("spiral");

    // 3. Interact while the loop runs: drag a selection, hover, edit the graph and the style.
    viewer.selection.set(Shape::Rectangle {
        from: (400.0, 300.0),
        to: (200.0, 120.0),
    });
    viewer.pointer.set(Shape::Circle {
        center: (320.0, 200.0),
        radius: 8.0,
    });
    if let Some(model) = hub.graph_model(&spiral_ws) {
        let graph = model.store();
        graph.set_position(NodeId(0), Vec3::new(0.0, 0.0, 250.0));
        graph.set_size(NodeId(1), 12.0);
    }
    viewer.styles.update(|s| s.node_scale = 2.0);
    thread::sleep(Duration::from_millis(200));
    viewer.report("interaction");
    viewer.selection.clear();

    // 4. Switch workspace.
    hub.select(&star_ws);
    thread::sleep(Duration::from_millis(200));
    viewer.report("star");

    // 5. Pause and resume.
    coordinator.disable();
    let paused_at = viewer.bridge.frames_published();
    thread::sleep(Duration::from_millis(100));
    log::info!(
        "Frames published while disabled: {}",
        viewer.bridge.frames_published() - paused_at
    );
    coordinator.enable()?;
    thread::sleep(Duration::from_millis(100));

    // 6. Tear down through the host.
    hub.close_project();
    log::info!("Loop active after project close: {}", coordinator.is_loop_active());

    let stats = coordinator.stats();
    log::info!(
        "Stats: {} frames completed, {} skipped, {} overrun, {} loops started, last work {:?}",
        stats.frames_completed,
        stats.frames_skipped,
        stats.frames_overrun,
        stats.loops_started,
        stats.last_work()
    );

    for event in events.try_iter() {
        match event {
            LoopEvent::Started => log::debug!("Event: loop started"),
            LoopEvent::Stopped { frames } => log::debug!("Event: loop stopped after {frames} frames"),
            LoopEvent::Failed(err) => log::error!("Event: loop failed: {err}"),
        }
    }
    if let Some(err) = coordinator.last_failure() {
        anyhow::bail!("Frame loop failed during the session: {err}");
    }

    Ok(())
}
