// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canvas-space geometry.
//!
//! All coordinates here are canvas units (zoom-independent) unless a function says otherwise.
//! Screen conversion lives in [`viewport`]; port placement lives in [`layout`].

pub mod layout;
pub mod viewport;

pub use layout::{
    analytic_port_center, node_rect, resolve_port_center, AnalyticPortLayout, MeasuredPortLayout,
    PortKey, PortLayout, NODE_HEIGHT, NODE_WIDTH, PORT_SPACING,
};
pub use viewport::{local_cell, Viewport, CELL_HEIGHT, CELL_WIDTH, LOCAL_CELL_LIMIT};

/// Minimum horizontal control-point offset for link curves.
pub const MIN_CURVE_HANDLE: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance_squared(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Axis-aligned rectangle; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// Where the ray from `rect`'s center toward `toward` crosses the rectangle border.
///
/// The exit edge is chosen by comparing `|dx|·height` against `|dy|·width`: larger means the ray
/// leaves through a vertical (left/right) edge. A target equal to the center yields the center.
pub fn rect_edge_point(rect: Rect, toward: Point) -> Point {
    let center = rect.center();
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;
    if dx == 0.0 && dy == 0.0 {
        return center;
    }

    let abs_dx = dx.abs();
    let abs_dy = dy.abs();
    let scale = if abs_dx * rect.height > abs_dy * rect.width {
        rect.width / 2.0 / abs_dx
    } else {
        rect.height / 2.0 / abs_dy
    };

    Point::new(center.x + dx * scale, center.y + dy * scale)
}

/// A cubic bezier segment from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub from: Point,
    pub c1: Point,
    pub c2: Point,
    pub to: Point,
}

impl CubicBezier {
    /// Link curve leaving `from` to the right and entering `to` from the left.
    ///
    /// Both handles are horizontal with length `max(|Δx|·0.5, MIN_CURVE_HANDLE)`.
    pub fn link(from: Point, to: Point) -> Self {
        let handle = ((to.x - from.x).abs() * 0.5).max(MIN_CURVE_HANDLE);
        Self {
            from,
            c1: Point::new(from.x + handle, from.y),
            c2: Point::new(to.x - handle, to.y),
            to,
        }
    }

    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let uu = u * u;
        let tt = t * t;
        let a = uu * u;
        let b = 3.0 * uu * t;
        let c = 3.0 * u * tt;
        let d = tt * t;
        Point::new(
            a * self.from.x + b * self.c1.x + c * self.c2.x + d * self.to.x,
            a * self.from.y + b * self.c1.y + c * self.c2.y + d * self.to.y,
        )
    }

    /// `segments + 1` evenly spaced points in parameter space, endpoints included.
    pub fn sample(&self, segments: usize) -> Vec<Point> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point_at(i as f64 / segments as f64))
            .collect()
    }
}

/// Squared distance from `point` to the segment `a..b`.
pub fn segment_distance_squared(point: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        return point.distance_squared(a);
    }
    let t = (((point.x - a.x) * abx + (point.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    point.distance_squared(Point::new(a.x + abx * t, a.y + aby * t))
}

/// Part of the segment `a..b` inside `rect` (edges included), or `None` when it misses.
///
/// Non-finite input is treated as a miss.
pub fn clip_segment(a: Point, b: Point, rect: Rect) -> Option<(Point, Point)> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    if ![a.x, a.y, dx, dy].iter().all(|value| value.is_finite()) {
        return None;
    }
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dx, a.x - rect.x),
        (dx, rect.right() - a.x),
        (-dy, a.y - rect.y),
        (dy, rect.bottom() - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((
        Point::new(a.x + dx * t0, a.y + dy * t0),
        Point::new(a.x + dx * t1, a.y + dy * t1),
    ))
}
