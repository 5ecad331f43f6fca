// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Port placement.
//!
//! A [`PortLayout`] answers "where is this port right now" in canvas space. The renderer keeps a
//! [`MeasuredPortLayout`] in sync with what it actually drew; when a port has not been drawn yet
//! the analytic estimate from the node's stored position is used instead.

use std::collections::HashMap;

use super::viewport::Viewport;
use super::{Point, Rect};
use crate::model::{Node, NodeId, PortSide};

/// Nominal node body size in canvas units.
pub const NODE_WIDTH: f64 = 160.0;
pub const NODE_HEIGHT: f64 = 64.0;
/// Vertical distance between neighbouring ports on the same side.
pub const PORT_SPACING: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortKey {
    pub node_id: NodeId,
    pub side: PortSide,
    pub index: usize,
}

impl PortKey {
    pub fn new(node_id: NodeId, side: PortSide, index: usize) -> Self {
        Self {
            node_id,
            side,
            index,
        }
    }
}

pub trait PortLayout {
    /// Live canvas-space center of a port, or `None` when it has not been laid out.
    fn port_center(&self, node_id: &NodeId, side: PortSide, index: usize) -> Option<Point>;
}

/// A layout that never knows live positions; every lookup falls back to the analytic estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticPortLayout;

impl PortLayout for AnalyticPortLayout {
    fn port_center(&self, _node_id: &NodeId, _side: PortSide, _index: usize) -> Option<Point> {
        None
    }
}

/// Port centers recorded by the renderer for the most recent frame.
#[derive(Debug, Clone, Default)]
pub struct MeasuredPortLayout {
    centers: HashMap<PortKey, Point>,
}

impl MeasuredPortLayout {
    pub fn clear(&mut self) {
        self.centers.clear();
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn record(&mut self, key: PortKey, center: Point) {
        self.centers.insert(key, center);
    }

    /// Records a port drawn at `screen` (screen units), converting it into canvas space.
    pub fn record_screen(&mut self, key: PortKey, screen: Point, viewport: &Viewport) {
        self.record(key, viewport.screen_to_canvas(screen));
    }

    /// Replaces all entries with `other`'s.
    pub fn replace_with(&mut self, other: MeasuredPortLayout) {
        self.centers = other.centers;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PortKey, &Point)> {
        self.centers.iter()
    }
}

impl PortLayout for MeasuredPortLayout {
    fn port_center(&self, node_id: &NodeId, side: PortSide, index: usize) -> Option<Point> {
        self.centers
            .get(&PortKey::new(node_id.clone(), side, index))
            .copied()
    }
}

/// Node body rectangle for a node whose top-left is `origin`.
pub fn node_rect(origin: Point) -> Rect {
    Rect::new(origin.x, origin.y, NODE_WIDTH, NODE_HEIGHT)
}

/// Analytic port center for `node` drawn with its top-left at `origin`.
///
/// Inputs sit on the left edge and outputs on the right edge; ports are staggered around the
/// vertical middle by `(index - (count - 1) / 2) * PORT_SPACING`.
pub fn analytic_port_center(node: &Node, origin: Point, side: PortSide, index: usize) -> Point {
    let count = node.port_count(side).max(1) as f64;
    let stagger = (index as f64 - (count - 1.0) / 2.0) * PORT_SPACING;
    let x = match side {
        PortSide::Input => origin.x,
        PortSide::Output => origin.x + NODE_WIDTH,
    };
    Point::new(x, origin.y + NODE_HEIGHT / 2.0 + stagger)
}

/// Live port center from `layout`, falling back to the analytic estimate.
pub fn resolve_port_center(
    layout: &dyn PortLayout,
    node: &Node,
    origin: Point,
    side: PortSide,
    index: usize,
) -> Point {
    layout
        .port_center(node.id(), side, index)
        .unwrap_or_else(|| analytic_port_center(node, origin, side, index))
}
