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
use std::thread;
use std::time::{Duration, Instant};
use vizloop_control::{FrameCollaborators, FrameLoopConfig, FrameUpdateLoop, SharedModelHandle};
use vizloop_core::{Camera, FrameController, GraphLimits, GraphModel, NoShape};
use vizloop_data::{DoubleBufferBridge, GraphDefinition, InMemoryGraphModel, StaticController, VizModel};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn start_loop(
    frame_duration_ms: u64,
    controller: Arc<dyn FrameController>,
) -> (FrameUpdateLoop, Arc<DoubleBufferBridge>) {
    init_logger();
    let graph = GraphDefinition::phyllotaxis(200, 2, 3.0)
        .build()
        .expect("Generated graph should build");
    let model: Arc<dyn GraphModel> = Arc::new(InMemoryGraphModel::from_graph(Arc::new(graph)));
    let handle = Arc::new(SharedModelHandle::new());
    handle.set(Some(model));

    let bridge = Arc::new(DoubleBufferBridge::new());
    let collaborators = FrameCollaborators {
        controller,
        bridge: bridge.clone(),
        styles: Arc::new(VizModel::default()),
        limits: Arc::new(GraphLimits::new()),
        selection: Arc::new(NoShape),
        pointer: Arc::new(NoShape),
    };
    let mut frame_loop = FrameUpdateLoop::new(
        FrameLoopConfig::with_frame_duration(frame_duration_ms),
        handle,
        collaborators,
    )
    .expect("Config should be valid");
    assert_eq!(frame_loop.start(), Ok(true));
    (frame_loop, bridge)
}

#[test]
fn test_frames_are_spaced_by_the_frame_duration() {
    let frame_duration = Duration::from_millis(20);
    let (mut frame_loop, bridge) = start_loop(20, Arc::new(StaticController::default()));

    bridge
        .wait_for_sequence(6, Duration::from_secs(5))
        .expect("Six frames should be produced");
    frame_loop.stop();

    let timings = bridge.timings();
    assert!(timings.len() >= 6);
    // The frame stopwatch starts just before `begin_frame`; allow for that jitter.
    let tolerance = Duration::from_millis(2);
    for pair in timings.windows(2) {
        let spacing = pair[1].started_at - pair[0].started_at;
        assert!(
            spacing + tolerance >= frame_duration,
            "Frames {} and {} started only {:?} apart",
            pair[0].sequence,
            pair[1].sequence,
            spacing
        );
    }
}

/// A controller whose update work takes longer than the frame budget.
struct SlowController {
    inner: StaticController,
    work: Duration,
}

impl FrameController for SlowController {
    fn begin_update_frame(&self) {
        self.inner.begin_update_frame();
        thread::sleep(self.work);
    }

    fn end_update_frame(&self) {
        self.inner.end_update_frame();
    }

    fn camera(&self) -> Camera {
        self.inner.camera()
    }

    fn is_centering(&self) -> bool {
        self.inner.is_centering()
    }
}

#[test]
fn test_overrunning_frames_do_not_sleep() {
    let controller = Arc::new(SlowController {
        inner: StaticController::default(),
        work: Duration::from_millis(15),
    });
    let (mut frame_loop, bridge) = start_loop(5, controller);

    bridge
        .wait_for_sequence(4, Duration::from_secs(5))
        .expect("Four frames should be produced");
    frame_loop.stop();

    let stats = frame_loop.stats();
    assert!(stats.frames_completed >= 4);
    assert_eq!(stats.frames_overrun, stats.frames_completed);
    assert_eq!(stats.last_sleep(), Duration::ZERO);
    assert!(stats.last_work() >= Duration::from_millis(15));
}

#[test]
fn test_stop_interrupts_a_long_sleep() {
    let (mut frame_loop, bridge) = start_loop(2_000, Arc::new(StaticController::default()));
    bridge
        .wait_for_sequence(1, Duration::from_secs(5))
        .expect("A frame should be produced");

    let requested = Instant::now();
    let exit = frame_loop.stop();
    let waited = requested.elapsed();

    assert!(exit.is_some());
    assert!(!frame_loop.is_running());
    assert!(
        waited < Duration::from_millis(500),
        "stop() took {waited:?} with a 2s frame budget"
    );
    // No frame starts once the loop has been cancelled.
    assert_eq!(bridge.frames_published(), frame_loop.stats().frames_completed);
}

#[test]
fn test_dropping_the_loop_stops_the_thread() {
    let controller = Arc::new(StaticController::default());
    let (frame_loop, bridge) = start_loop(5, controller.clone());
    bridge
        .wait_for_sequence(2, Duration::from_secs(5))
        .expect("Frames should be produced");

    drop(frame_loop);
    let begun = controller.updates_begun();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(controller.updates_begun(), begun);
    assert_eq!(controller.updates_begun(), controller.updates_ended());
}
