// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::Point;

/// Screen units covered by one terminal cell.
pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;

/// Bound on panel-local cell coordinates, far outside any terminal.
pub const LOCAL_CELL_LIMIT: i64 = 1 << 20;

/// Maps between screen units and canvas units for one canvas panel.
///
/// `origin` is the panel's top-left in screen units, `scroll` the canvas point shown at that
/// origin. `screen = (canvas - scroll) * zoom + origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    origin: Point,
    zoom: f64,
    scroll: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Point::default(), 1.0)
    }
}

impl Viewport {
    pub fn new(origin: Point, zoom: f64) -> Self {
        Self {
            origin,
            zoom,
            scroll: Point::default(),
        }
    }

    /// Viewport for a panel whose top-left terminal cell is `(col, row)`.
    pub fn for_panel(col: u16, row: u16, zoom: f64) -> Self {
        Self::new(
            Point::new(f64::from(col) * CELL_WIDTH, f64::from(row) * CELL_HEIGHT),
            zoom,
        )
    }

    pub fn with_scroll(mut self, scroll: Point) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn scroll(&self) -> Point {
        self.scroll
    }

    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.origin.x) / self.zoom + self.scroll.x,
            (screen.y - self.origin.y) / self.zoom + self.scroll.y,
        )
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point::new(
            (canvas.x - self.scroll.x) * self.zoom + self.origin.x,
            (canvas.y - self.scroll.y) * self.zoom + self.origin.y,
        )
    }

    /// Center of absolute terminal cell `(col, row)` in screen units.
    pub fn cell_center(col: u16, row: u16) -> Point {
        Point::new(
            (f64::from(col) + 0.5) * CELL_WIDTH,
            (f64::from(row) + 0.5) * CELL_HEIGHT,
        )
    }

    /// Center of panel-local cell `(col, row)` in screen units.
    pub fn local_cell_center(&self, col: usize, row: usize) -> Point {
        Point::new(
            self.origin.x + (col as f64 + 0.5) * CELL_WIDTH,
            self.origin.y + (row as f64 + 0.5) * CELL_HEIGHT,
        )
    }

    /// Panel-local position of `canvas` in fractional cells.
    pub fn canvas_to_local(&self, canvas: Point) -> Point {
        let screen = self.canvas_to_screen(canvas);
        Point::new(
            (screen.x - self.origin.x) / CELL_WIDTH,
            (screen.y - self.origin.y) / CELL_HEIGHT,
        )
    }

    /// Panel-local cell containing canvas point `canvas`; may be negative or past the panel.
    ///
    /// Both coordinates are clamped to `±LOCAL_CELL_LIMIT`.
    pub fn canvas_to_local_cell(&self, canvas: Point) -> (i64, i64) {
        local_cell(self.canvas_to_local(canvas))
    }

    /// Canvas-space extent of one cell, halved, plus a small margin; used for port hit-testing.
    pub fn hit_tolerance(&self) -> Point {
        Point::new(
            CELL_WIDTH / self.zoom / 2.0 + 2.0,
            CELL_HEIGHT / self.zoom / 2.0 + 2.0,
        )
    }
}

/// Cell containing a fractional panel-local position, clamped to `±LOCAL_CELL_LIMIT`.
pub fn local_cell(local: Point) -> (i64, i64) {
    let limit = LOCAL_CELL_LIMIT as f64;
    let clamp = |value: f64| {
        if value.is_nan() {
            0
        } else {
            value.floor().clamp(-limit, limit) as i64
        }
    };
    (clamp(local.x), clamp(local.y))
}
