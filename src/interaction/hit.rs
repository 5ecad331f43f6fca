// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::geometry::{node_rect, resolve_port_center, Point, PortKey, PortLayout};
use crate::model::{Flow, LinkId, NodeId, PortSide};
use crate::render::route_link;

/// What lies under a canvas point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Port(PortKey),
    Node(NodeId),
    Link(LinkId),
    Empty,
}

/// Resolves `point` (canvas units) against `flow`.
///
/// Port markers win over node bodies, node bodies over links. Among overlapping nodes the one
/// drawn last (topmost) wins. `tolerance` is the half-extent of a port marker's hit box; links
/// are hit within the larger of its two axes.
pub fn hit_test(flow: &Flow, point: Point, layout: &dyn PortLayout, tolerance: Point) -> Hit {
    if let Some(key) = hit_port(flow, point, layout, tolerance) {
        return Hit::Port(key);
    }

    if let Some(node) = flow
        .nodes()
        .iter()
        .rev()
        .find(|node| node_rect(Point::new(node.x(), node.y())).contains(point))
    {
        return Hit::Node(node.id().clone());
    }

    let reach = tolerance.x.max(tolerance.y);
    let reach_squared = reach * reach;
    let nearest = flow
        .links()
        .iter()
        .filter_map(|link| {
            let route = route_link(flow, link, layout, None)?;
            Some((route.distance_squared(point), link))
        })
        .filter(|(distance, _)| *distance <= reach_squared)
        .min_by(|a, b| a.0.total_cmp(&b.0));
    if let Some((_, link)) = nearest {
        return Hit::Link(link.id().clone());
    }

    Hit::Empty
}

fn hit_port(flow: &Flow, point: Point, layout: &dyn PortLayout, tolerance: Point) -> Option<PortKey> {
    for node in flow.nodes().iter().rev() {
        let origin = Point::new(node.x(), node.y());
        for side in [PortSide::Output, PortSide::Input] {
            for index in 0..node.port_count(side) {
                let center = resolve_port_center(layout, node, origin, side, index);
                if (center.x - point.x).abs() <= tolerance.x
                    && (center.y - point.y).abs() <= tolerance.y
                {
                    return Some(PortKey::new(node.id().clone(), side, index));
                }
            }
        }
    }
    None
}
