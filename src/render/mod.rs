// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rendering for flows.
//!
//! The scene renderer rasterizes a flow into a character grid plus a highlight index the TUI uses
//! for cell-accurate styling, and reports where it drew every port marker so link geometry can
//! follow what is actually on screen.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::geometry::PortKey;
use crate::model::{LinkId, NodeId};

pub mod link_path;
pub mod scene;

pub use link_path::{route_link, LinkRoute, LINK_SAMPLES};
pub use scene::{render_scene, LinkPreview, SceneOverlay, SceneRender};

/// A contiguous span of cells within a single grid row.
///
/// Coordinates are `(y, x0, x1)` in cell indices, inclusive.
pub type LineSpan = (usize, usize, usize);

/// Something in a rendered scene that can be styled or picked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SceneObject {
    Link(LinkId),
    Node(NodeId),
    HealthBar(NodeId),
    Port(PortKey),
    Preview,
}

/// Mapping from scene objects to the spans they occupy.
pub type HighlightIndex = BTreeMap<SceneObject, Vec<LineSpan>>;

pub(crate) fn push_cell_span(spans: &mut Vec<LineSpan>, y: usize, x: usize) {
    if let Some(last) = spans.last_mut() {
        if last.0 == y && last.2 + 1 == x {
            last.2 = x;
            return;
        }
        if last.0 == y && (last.1..=last.2).contains(&x) {
            return;
        }
    }
    spans.push((y, x, x));
}

/// Edge bits of a box-drawing cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoxEdges(u8);

impl BoxEdges {
    const NONE: Self = Self(0);
    const LEFT: Self = Self(0b0001);
    const RIGHT: Self = Self(0b0010);
    const UP: Self = Self(0b0100);
    const DOWN: Self = Self(0b1000);

    fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn contains(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Light box-drawing glyphs keyed by their edge bits (left, right, up, down).
const BOX_GLYPHS: [(char, u8); 11] = [
    ('─', 0b0011),
    ('│', 0b1100),
    ('┌', 0b1010),
    ('┐', 0b1001),
    ('└', 0b0110),
    ('┘', 0b0101),
    ('├', 0b1110),
    ('┤', 0b1101),
    ('┬', 0b1011),
    ('┴', 0b0111),
    ('┼', 0b1111),
];

fn box_edges_from_char(ch: char) -> Option<BoxEdges> {
    BOX_GLYPHS
        .iter()
        .find(|(glyph, _)| *glyph == ch)
        .map(|(_, bits)| BoxEdges(*bits))
}

fn box_char_from_edges(edges: BoxEdges) -> char {
    match edges.0 {
        0 => ' ',
        0b0001 | 0b0010 => '─',
        0b0100 | 0b1000 => '│',
        bits => BOX_GLYPHS
            .iter()
            .find(|(_, glyph_bits)| *glyph_bits == bits)
            .map_or('┼', |(glyph, _)| *glyph),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid area overflow: {width}*{height}")]
    AreaOverflow { width: usize, height: usize },
    #[error("out of bounds: ({x},{y}) for {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// A fixed-size character grid backing one frame of the canvas panel.
///
/// Collision behavior is deterministic:
/// - non-box characters overwrite (last writer wins)
/// - Unicode box-drawing characters merge into junctions instead of overwriting, so a link
///   entering a node border renders as a tee
///
/// The `*_clipped` drawing helpers take signed coordinates and silently drop cells outside the
/// grid; scene content routinely extends past the visible panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharGrid {
    width: usize,
    height: usize,
    cells: Vec<char>,
    box_edges: Vec<BoxEdges>,
}

impl CharGrid {
    /// Creates a new grid filled with spaces.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        let len = width
            .checked_mul(height)
            .ok_or(GridError::AreaOverflow { width, height })?;

        Ok(Self {
            width,
            height,
            cells: vec![' '; len],
            box_edges: vec![BoxEdges::NONE; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Grid cell for signed coordinates, if visible.
    pub fn clip(&self, x: i64, y: i64) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.in_bounds(x, y).then_some((x, y))
    }

    /// Returns the rendered character at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Result<char, GridError> {
        let idx = self.index_of(x, y)?;
        Ok(self.render_at(x, y, idx))
    }

    /// Sets the character at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, ch: char) -> Result<(), GridError> {
        let idx = self.index_of(x, y)?;
        self.put(idx, ch);
        Ok(())
    }

    /// Sets the character at signed `(x, y)`; returns the cell when it was visible.
    pub fn set_clipped(&mut self, x: i64, y: i64, ch: char) -> Option<(usize, usize)> {
        let (x, y) = self.clip(x, y)?;
        let idx = (y * self.width) + x;
        self.put(idx, ch);
        Some((x, y))
    }

    fn put(&mut self, idx: usize, ch: char) {
        if let Some(edges) = box_edges_from_char(ch) {
            self.box_edges[idx] = self.box_edges[idx].union(edges);
        } else {
            self.cells[idx] = ch;
            self.box_edges[idx] = BoxEdges::NONE;
        }
    }

    /// Writes `text` left-to-right starting at signed `(x, y)`, dropping invisible characters.
    pub fn write_str_clipped(&mut self, x: i64, y: i64, text: &str) {
        for (offset, ch) in text.chars().enumerate() {
            let col = x.saturating_add(offset as i64);
            if col >= self.width as i64 {
                break;
            }
            self.set_clipped(col, y, ch);
        }
    }

    /// Overwrites the inclusive rectangle with `ch`, dropping box edges underneath.
    pub fn fill_rect_clipped(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, ch: char) {
        let (min_x, max_x) = (x0.min(x1).max(0), x0.max(x1).min(self.width as i64 - 1));
        let (min_y, max_y) = (y0.min(y1).max(0), y0.max(y1).min(self.height as i64 - 1));
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                self.set_clipped(x, y, ch);
            }
        }
    }

    /// Draws a single-line box with corners at `(x0, y0)` and `(x1, y1)`, clipped to the grid.
    pub fn draw_box_clipped(&mut self, x0: i64, y0: i64, x1: i64, y1: i64) {
        let (min_x, max_x) = (x0.min(x1), x0.max(x1));
        let (min_y, max_y) = (y0.min(y1), y0.max(y1));

        if min_x == max_x || min_y == max_y {
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    let ch = if min_y == max_y {
                        '─'
                    } else {
                        '│'
                    };
                    self.set_clipped(x, y, ch);
                }
            }
            return;
        }

        for x in (min_x + 1)..max_x {
            self.set_clipped(x, min_y, '─');
            self.set_clipped(x, max_y, '─');
        }
        for y in (min_y + 1)..max_y {
            self.set_clipped(min_x, y, '│');
            self.set_clipped(max_x, y, '│');
        }
        self.set_clipped(min_x, min_y, '┌');
        self.set_clipped(max_x, min_y, '┐');
        self.set_clipped(min_x, max_y, '└');
        self.set_clipped(max_x, max_y, '┘');
    }

    /// Rendered rows, one `String` per grid row.
    pub fn lines(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.render_at(x, y, (y * self.width) + x))
                    .collect()
            })
            .collect()
    }

    /// Rendered rows joined by newlines, without trailing spaces or trailing blank rows.
    pub fn trimmed_text(&self) -> String {
        let mut lines: Vec<String> = self
            .lines()
            .into_iter()
            .map(|line| line.trim_end().to_owned())
            .collect();
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        lines.join("\n")
    }

    fn index_of(&self, x: usize, y: usize) -> Result<usize, GridError> {
        if !self.in_bounds(x, y) {
            return Err(GridError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        Ok((y * self.width) + x)
    }

    fn render_at(&self, x: usize, y: usize, idx: usize) -> char {
        let edges = self.box_edges[idx];
        if edges.is_empty() {
            return self.cells[idx];
        }

        let connected = self.connected_box_edges(x, y, edges);
        let edges_for_render = if connected.is_empty() {
            edges
        } else {
            connected
        };
        box_char_from_edges(edges_for_render)
    }

    fn connected_box_edges(&self, x: usize, y: usize, edges: BoxEdges) -> BoxEdges {
        let mut connected = BoxEdges::NONE;

        if edges.contains(BoxEdges::LEFT) && x > 0 {
            let left_idx = (y * self.width) + (x - 1);
            if self.box_edges[left_idx].contains(BoxEdges::RIGHT) {
                connected = connected.union(BoxEdges::LEFT);
            }
        }

        if edges.contains(BoxEdges::RIGHT) && (x + 1) < self.width {
            let right_idx = (y * self.width) + (x + 1);
            if self.box_edges[right_idx].contains(BoxEdges::LEFT) {
                connected = connected.union(BoxEdges::RIGHT);
            }
        }

        if edges.contains(BoxEdges::UP) && y > 0 {
            let up_idx = ((y - 1) * self.width) + x;
            if self.box_edges[up_idx].contains(BoxEdges::DOWN) {
                connected = connected.union(BoxEdges::UP);
            }
        }

        if edges.contains(BoxEdges::DOWN) && (y + 1) < self.height {
            let down_idx = ((y + 1) * self.width) + x;
            if self.box_edges[down_idx].contains(BoxEdges::UP) {
                connected = connected.union(BoxEdges::DOWN);
            }
        }

        connected
    }
}
