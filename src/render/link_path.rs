// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Link geometry in canvas space.

use crate::geometry::{
    node_rect, rect_edge_point, resolve_port_center, segment_distance_squared, CubicBezier, Point,
    PortLayout,
};
use crate::model::{Flow, Link, Node, NodeId, PortSide};

/// Samples taken along a curved link for rasterizing and hit-testing.
pub const LINK_SAMPLES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkRoute {
    /// Port-to-port curve.
    Curve(CubicBezier),
    /// Border-to-border segment between two infrastructure nodes.
    Straight { from: Point, to: Point },
}

impl LinkRoute {
    pub fn from(&self) -> Point {
        match self {
            Self::Curve(curve) => curve.from,
            Self::Straight { from, .. } => *from,
        }
    }

    pub fn to(&self) -> Point {
        match self {
            Self::Curve(curve) => curve.to,
            Self::Straight { to, .. } => *to,
        }
    }

    pub fn polyline(&self) -> Vec<Point> {
        match self {
            Self::Curve(curve) => curve.sample(LINK_SAMPLES),
            Self::Straight { from, to } => vec![*from, *to],
        }
    }

    /// Squared distance from `point` to the sampled route.
    pub fn distance_squared(&self, point: Point) -> f64 {
        self.polyline()
            .windows(2)
            .map(|pair| segment_distance_squared(point, pair[0], pair[1]))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Top-left of `node`, honouring an in-progress drag of that node.
pub fn node_origin(node: &Node, moved: Option<(&NodeId, Point)>) -> Point {
    match moved {
        Some((node_id, origin)) if node_id == node.id() => origin,
        _ => Point::new(node.x(), node.y()),
    }
}

/// Route for `link`, or `None` when either endpoint node is missing from `flow`.
///
/// Links between two infrastructure nodes run straight between the node borders; every other
/// link is a curve between the addressed output and input ports.
pub fn route_link(
    flow: &Flow,
    link: &Link,
    layout: &dyn PortLayout,
    moved: Option<(&NodeId, Point)>,
) -> Option<LinkRoute> {
    let source = flow.node(link.source().node_id())?;
    let target = flow.node(link.target().node_id())?;
    let source_origin = node_origin(source, moved);
    let target_origin = node_origin(target, moved);

    if source.kind().is_infrastructure() && target.kind().is_infrastructure() {
        let source_rect = node_rect(source_origin);
        let target_rect = node_rect(target_origin);
        return Some(LinkRoute::Straight {
            from: rect_edge_point(source_rect, target_rect.center()),
            to: rect_edge_point(target_rect, source_rect.center()),
        });
    }

    let from = resolve_port_center(
        layout,
        source,
        source_origin,
        PortSide::Output,
        link.source().port(),
    );
    let to = resolve_port_center(
        layout,
        target,
        target_origin,
        PortSide::Input,
        link.target().port(),
    );
    Some(LinkRoute::Curve(CubicBezier::link(from, to)))
}
