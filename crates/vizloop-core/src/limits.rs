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

//! Aggregate graph statistics computed once per frame.
//!
//! Limits are recomputed from scratch every frame by a [`LimitsAccumulator`] and
//! published to the shared [`GraphLimits`] object, which other subsystems read
//! (e.g. the camera auto-centering or size-based scaling).
//!
//! Every aggregate is an `Option`: a value is `None` ("unset") when there was
//! nothing to aggregate. No sentinel extremes are ever published.

use crate::graph::{Edge, Node};
use crate::math::Vec3;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// An axis-aligned bounding box over node positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds3 {
    /// The per-axis minimum.
    pub min: Vec3,
    /// The per-axis maximum.
    pub max: Vec3,
}

impl Bounds3 {
    /// Creates a degenerate box containing a single point.
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Grows the box to contain `point`.
    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Returns the center of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the size of the box along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }
}

/// The range of edge weights in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRange {
    /// The smallest weight.
    pub min: f32,
    /// The largest weight.
    pub max: f32,
}

/// The aggregate statistics of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameLimits {
    /// Node position bounds. `Some` only when centering was enabled and at least
    /// one node with a finite position was visited.
    pub bounds: Option<Bounds3>,
    /// The largest node size. `Some` iff at least one node was visited.
    pub max_node_size: Option<f32>,
    /// The edge weight range. `Some` iff at least one edge was visited.
    pub edge_weights: Option<WeightRange>,
    /// The number of nodes visited.
    pub node_count: usize,
    /// The number of edges visited.
    pub edge_count: usize,
}

impl FrameLimits {
    /// Returns `true` when nothing was aggregated.
    pub fn is_empty(&self) -> bool {
        self.node_count == 0 && self.edge_count == 0
    }
}

/// Accumulates [`FrameLimits`] over a single pass through the graph.
///
/// The accumulator is a plain stack value; it holds no reference to the graph.
#[derive(Debug, Clone)]
pub struct LimitsAccumulator {
    centering: bool,
    limits: FrameLimits,
}

impl LimitsAccumulator {
    /// Starts a new accumulation. Spatial bounds are only tracked when `centering` is set.
    pub fn new(centering: bool) -> Self {
        Self {
            centering,
            limits: FrameLimits::default(),
        }
    }

    /// Folds a node into the limits.
    pub fn add_node(&mut self, node: &Node) {
        self.limits.node_count += 1;
        self.limits.max_node_size = Some(match self.limits.max_node_size {
            Some(max) => max.max(node.size),
            None => node.size,
        });

        // Non-finite positions come from layouts that have not converged yet.
        if self.centering && node.position.is_finite() {
            match self.limits.bounds.as_mut() {
                Some(bounds) => bounds.include(node.position),
                None => self.limits.bounds = Some(Bounds3::from_point(node.position)),
            }
        }
    }

    /// Folds an edge into the limits.
    pub fn add_edge(&mut self, edge: &Edge) {
        self.limits.edge_count += 1;
        self.limits.edge_weights = Some(match self.limits.edge_weights {
            Some(range) => WeightRange {
                min: range.min.min(edge.weight),
                max: range.max.max(edge.weight),
            },
            None => WeightRange {
                min: edge.weight,
                max: edge.weight,
            },
        });
    }

    /// Returns the accumulated limits.
    pub fn finish(self) -> FrameLimits {
        self.limits
    }
}

/// The shared limits object, overwritten every frame.
#[derive(Debug, Default)]
pub struct GraphLimits {
    current: RwLock<FrameLimits>,
    publications: AtomicU64,
}

impl GraphLimits {
    /// Creates a limits object with every aggregate unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the published limits.
    pub fn publish(&self, limits: FrameLimits) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = limits;
        self.publications.fetch_add(1, Ordering::Release);
    }

    /// Returns a copy of the last published limits.
    pub fn snapshot(&self) -> FrameLimits {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns how many times limits have been published.
    pub fn publications(&self) -> u64 {
        self.publications.load(Ordering::Acquire)
    }
}
