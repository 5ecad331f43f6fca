// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scene rasterization.
//!
//! Draw order is links, node bodies, the connection preview, then port markers, so markers stay
//! visible and node bodies hide links passing underneath them.

use std::collections::{HashMap, HashSet};

use crate::geometry::{
    analytic_port_center, clip_segment, local_cell, MeasuredPortLayout, Point, PortKey, Rect,
    Viewport, NODE_HEIGHT, NODE_WIDTH,
};
use crate::model::{Flow, Node, NodeId, NodeStatus, PortSide, MAX_HEALTH};

use super::link_path::{node_origin, route_link, LinkRoute};
use super::{push_cell_span, CharGrid, GridError, HighlightIndex, LineSpan, SceneObject};

const INPUT_MARKER: char = '○';
const OUTPUT_MARKER: char = '●';
const HOVER_MARKER: char = '◉';
const PREVIEW_CHAR: char = '·';
const HEALTH_FILLED: char = '█';
const HEALTH_EMPTY: char = '░';
/// Cells kept around the grid when clipping link segments, so arrowheads just outside still land.
const RASTER_MARGIN: f64 = 4.0;

/// In-progress connection drawn on top of the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkPreview {
    pub route: LinkRoute,
    /// `Some(valid)` while an input port is hovered.
    pub valid: Option<bool>,
}

/// Transient gesture state the renderer draws over the committed flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneOverlay {
    /// Node being dragged and its live top-left.
    pub moved_node: Option<(NodeId, Point)>,
    pub preview: Option<LinkPreview>,
    pub hover_port: Option<PortKey>,
}

#[derive(Debug, Clone)]
pub struct SceneRender {
    pub grid: CharGrid,
    pub highlights: HighlightIndex,
    /// Canvas-space centers of every port marker that landed inside the grid.
    pub ports: MeasuredPortLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeBox {
    c0: i64,
    r0: i64,
    c1: i64,
    r1: i64,
}

impl NodeBox {
    fn interior_width(&self) -> usize {
        usize::try_from(self.c1 - self.c0 - 1).unwrap_or(0)
    }

    /// Body plus the marker columns on either side.
    fn contains_with_markers(&self, col: i64, row: i64) -> bool {
        (self.c0.saturating_sub(1)..=self.c1.saturating_add(1)).contains(&col)
            && (self.r0..=self.r1).contains(&row)
    }
}

/// Renders `flow` into a `width` x `height` grid as seen through `viewport`.
pub fn render_scene(
    flow: &Flow,
    viewport: &Viewport,
    width: usize,
    height: usize,
    overlay: &SceneOverlay,
) -> Result<SceneRender, GridError> {
    let mut grid = CharGrid::new(width, height)?;
    let mut highlights = HighlightIndex::new();
    let mut ports = MeasuredPortLayout::default();
    let moved = overlay
        .moved_node
        .as_ref()
        .map(|(node_id, origin)| (node_id, *origin));

    let boxes: HashMap<&NodeId, NodeBox> = flow
        .nodes()
        .iter()
        .map(|node| (node.id(), node_box(viewport, node_origin(node, moved))))
        .collect();

    let window = Rect::new(
        -RASTER_MARGIN,
        -RASTER_MARGIN,
        width as f64 + 2.0 * RASTER_MARGIN,
        height as f64 + 2.0 * RASTER_MARGIN,
    );

    let markers = place_port_markers(flow, viewport, &boxes, moved);
    for (key, (col, row)) in &markers {
        if let (Ok(col), Ok(row)) = (usize::try_from(*col), usize::try_from(*row)) {
            if grid.in_bounds(col, row) {
                ports.record_screen(key.clone(), viewport.local_cell_center(col, row), viewport);
            }
        }
    }

    for link in flow.links() {
        let Some(route) = route_link(flow, link, &ports, moved) else {
            continue;
        };
        let Some(target_box) = boxes.get(link.target().node_id()) else {
            continue;
        };
        let mut cells = raster_route(&route, viewport, window);
        place_arrow(&mut cells, target_box);

        let mut spans = Vec::new();
        for (col, row, ch) in cells {
            if let Some((x, y)) = grid.set_clipped(col, row, ch) {
                push_cell_span(&mut spans, y, x);
            }
        }
        if !spans.is_empty() {
            highlights.insert(SceneObject::Link(link.id().clone()), spans);
        }
    }

    for node in flow.nodes() {
        if let Some(node_box) = boxes.get(node.id()) {
            draw_node(&mut grid, &mut highlights, node, *node_box);
        }
    }

    if let Some(preview) = &overlay.preview {
        let mut spans = Vec::new();
        for (col, row, _) in raster_route(&preview.route, viewport, window) {
            if let Some((x, y)) = grid.set_clipped(col, row, PREVIEW_CHAR) {
                push_cell_span(&mut spans, y, x);
            }
        }
        if !spans.is_empty() {
            highlights.insert(SceneObject::Preview, spans);
        }
    }

    for (key, (col, row)) in markers {
        let marker = if overlay.hover_port.as_ref() == Some(&key) {
            HOVER_MARKER
        } else {
            match key.side {
                PortSide::Input => INPUT_MARKER,
                PortSide::Output => OUTPUT_MARKER,
            }
        };
        if let Some((x, y)) = grid.set_clipped(col, row, marker) {
            highlights.insert(SceneObject::Port(key), vec![(y, x, x)]);
        }
    }

    Ok(SceneRender {
        grid,
        highlights,
        ports,
    })
}

fn node_box(viewport: &Viewport, origin: Point) -> NodeBox {
    let (c0, r0) = viewport.canvas_to_local_cell(origin);
    let (c_end, r_end) = viewport.canvas_to_local_cell(origin.offset(NODE_WIDTH, NODE_HEIGHT));
    NodeBox {
        c0,
        r0,
        c1: c_end.saturating_sub(1).max(c0.saturating_add(2)),
        r1: r_end.saturating_sub(1).max(r0.saturating_add(1)),
    }
}

/// Marker cell for every port: inputs left of the body, outputs right of it.
///
/// Rows follow the analytic stagger, clamped to the body; ports that would share a cell are
/// pushed down to the next free row.
fn place_port_markers(
    flow: &Flow,
    viewport: &Viewport,
    boxes: &HashMap<&NodeId, NodeBox>,
    moved: Option<(&NodeId, Point)>,
) -> Vec<(PortKey, (i64, i64))> {
    let mut markers = Vec::new();
    for node in flow.nodes() {
        let Some(node_box) = boxes.get(node.id()) else {
            continue;
        };
        let origin = node_origin(node, moved);
        for side in [PortSide::Input, PortSide::Output] {
            let col = match side {
                PortSide::Input => node_box.c0.saturating_sub(1),
                PortSide::Output => node_box.c1.saturating_add(1),
            };
            let mut used = HashSet::new();
            for index in 0..node.port_count(side) {
                let center = analytic_port_center(node, origin, side, index);
                let (_, row) = viewport.canvas_to_local_cell(center);
                let mut row = row.clamp(node_box.r0, node_box.r1);
                while !used.insert(row) {
                    row += 1;
                }
                markers.push((PortKey::new(node.id().clone(), side, index), (col, row)));
            }
        }
    }
    markers
}

fn draw_node(grid: &mut CharGrid, highlights: &mut HighlightIndex, node: &Node, b: NodeBox) {
    if b.r1 - b.r0 >= 2 {
        grid.fill_rect_clipped(b.c0 + 1, b.r0 + 1, b.c1 - 1, b.r1 - 1, ' ');
    }
    grid.draw_box_clipped(b.c0, b.r0, b.c1, b.r1);

    let interior = b.interior_width();
    let title_room = interior.saturating_sub(2);
    if title_room >= 3 {
        let title = fit(node.name(), title_room - 2);
        grid.write_str_clipped(b.c0 + 2, b.r0, &format!(" {title} "));
    }

    if b.r0 + 1 < b.r1 {
        let line = format!("{} {}", status_glyph(node.status()), node.kind());
        grid.write_str_clipped(b.c0 + 1, b.r0 + 1, &fit(&line, interior));
    }

    if b.r0 + 2 < b.r1 {
        let row = b.r0 + 2;
        let label = format!("{:>3}%", node.health());
        let bar_len = interior.saturating_sub(label.chars().count() + 1);
        let filled = filled_cells(node.health(), bar_len);
        let bar: String = std::iter::repeat(HEALTH_FILLED)
            .take(filled)
            .chain(std::iter::repeat(HEALTH_EMPTY).take(bar_len - filled))
            .collect();
        let line = if bar_len > 0 {
            format!("{bar} {label}")
        } else {
            label
        };
        grid.write_str_clipped(b.c0 + 1, row, &fit(&line, interior));

        let mut bar_spans = Vec::new();
        for offset in 0..filled {
            if let Some((x, y)) = grid.clip(b.c0 + 1 + offset as i64, row) {
                push_cell_span(&mut bar_spans, y, x);
            }
        }
        if !bar_spans.is_empty() {
            highlights.insert(SceneObject::HealthBar(node.id().clone()), bar_spans);
        }
    }

    let spans = box_spans(grid, b);
    if !spans.is_empty() {
        highlights.insert(SceneObject::Node(node.id().clone()), spans);
    }
}

fn box_spans(grid: &CharGrid, b: NodeBox) -> Vec<LineSpan> {
    let max_x = grid.width() as i64 - 1;
    let max_y = grid.height() as i64 - 1;
    let (x0, x1) = (b.c0.max(0), b.c1.min(max_x));
    if x0 > x1 {
        return Vec::new();
    }
    (b.r0.max(0)..=b.r1.min(max_y))
        .map(|row| (row as usize, x0 as usize, x1 as usize))
        .collect()
}

fn filled_cells(health: u8, bar_len: usize) -> usize {
    let ratio = f64::from(health) / f64::from(MAX_HEALTH);
    ((ratio * bar_len as f64).round() as usize).min(bar_len)
}

/// `text` cut to at most `room` characters, ending in `…` when shortened.
fn fit(text: &str, room: usize) -> String {
    if text.chars().nth(room).is_none() {
        return text.to_owned();
    }
    match room {
        0 => String::new(),
        _ => text.chars().take(room - 1).chain(['…']).collect(),
    }
}

pub(crate) fn status_glyph(status: NodeStatus) -> char {
    match status {
        NodeStatus::Healthy => '✔',
        NodeStatus::Warning => '▲',
        NodeStatus::Critical => '✖',
        NodeStatus::Unknown => '?',
    }
}

/// Cells visited by `route`, each with the line glyph for the step that reached it.
///
/// Segments are clipped to `window` (panel-local cells) first, so only cells near the grid are
/// walked however far apart the endpoints are.
fn raster_route(route: &LinkRoute, viewport: &Viewport, window: Rect) -> Vec<(i64, i64, char)> {
    let points: Vec<Point> = route
        .polyline()
        .into_iter()
        .map(|point| viewport.canvas_to_local(point))
        .collect();
    let mut cells: Vec<(i64, i64, char)> = Vec::new();
    for pair in points.windows(2) {
        let Some((a, b)) = clip_segment(pair[0], pair[1], window) else {
            continue;
        };
        let (start, end) = (local_cell(a), local_cell(b));
        if cells.last().map(|&(x, y, _)| (x, y)) != Some(start) {
            cells.push((start.0, start.1, step_glyph(end.0 - start.0, end.1 - start.1)));
        }
        walk_cells(start, end, &mut cells);
    }
    if cells.len() > 1 {
        cells[0].2 = cells[1].2;
    }
    cells
}

fn walk_cells(from: (i64, i64), to: (i64, i64), out: &mut Vec<(i64, i64, char)>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = (to.0 - x).signum();
    let sy = (to.1 - y).signum();
    let mut err = dx + dy;
    while (x, y) != to {
        let (px, py) = (x, y);
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        out.push((x, y, step_glyph(x - px, y - py)));
    }
}

fn step_glyph(dx: i64, dy: i64) -> char {
    match (dx.signum(), dy.signum()) {
        (_, 0) => '─',
        (0, _) => '│',
        (a, b) if a == b => '╲',
        _ => '╱',
    }
}

/// Replaces the last cell outside the target node (and its marker columns) with an arrowhead.
fn place_arrow(cells: &mut [(i64, i64, char)], target: &NodeBox) {
    let Some(at) = cells
        .iter()
        .rposition(|&(col, row, _)| !target.contains_with_markers(col, row))
    else {
        return;
    };
    let (col, row, _) = cells[at];
    let (dx, dy) = match cells.get(at + 1) {
        Some(&(next_col, next_row, _)) => (next_col - col, next_row - row),
        None => (1, 0),
    };
    cells[at].2 = if dx.abs() >= dy.abs() {
        if dx >= 0 {
            '▸'
        } else {
            '◂'
        }
    } else if dy > 0 {
        '▾'
    } else {
        '▴'
    };
}
