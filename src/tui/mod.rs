// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! Interactive shell (ratatui + crossterm): flow tabs, a mouse-driven canvas, the node palette,
//! an inspector and a footer with key hints, prompts and toasts.

use std::{
    error::Error,
    io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::config::Config;
use crate::geometry::{MeasuredPortLayout, Point, Viewport, CELL_HEIGHT, CELL_WIDTH};
use crate::interaction::{CanvasController, Gesture, GestureOutcome};
use crate::model::{port_label, FlowId, NodeId, NodeKind, PortSide, MAX_HEALTH};
use crate::ops::{Editor, NodePatch};
use crate::render::{
    render_scene, scene::status_glyph, LineSpan, SceneObject, SceneOverlay, SceneRender,
};
use crate::store::{read_import, write_export};

mod theme;

use theme::TuiTheme;

const TOAST_TTL: Duration = Duration::from_secs(3);
const SCROLL_STEP_CELLS: f64 = 4.0;
const HEALTH_STEP: u8 = 10;
const SIDEBAR_WIDTH: u16 = 30;
const PALETTE_HEIGHT: u16 = 12;

/// Runs the interactive terminal UI until the user quits.
pub fn run(config: &Config, editor: Editor) -> Result<(), Box<dyn Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(editor, config.export_dir().to_path_buf(), TuiTheme::from_env());
    tracing::info!(export_dir = %config.export_dir().display(), "tui started");

    while !app.should_quit {
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
        app.expire_toast(Instant::now());
    }

    tracing::info!(unsaved = app.editor.has_changes(), "tui stopped");
    Ok(())
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let areas = ScreenAreas::split(frame.size());

    frame.render_widget(
        Paragraph::new(flow_tabs_line(&app.editor, &app.theme)),
        areas.tabs,
    );

    let canvas_block = Block::default()
        .borders(Borders::ALL)
        .title(canvas_title(&app.editor, app.controller.gesture()))
        .border_style(app.theme.panel_border_style(!app.controller.is_idle()));
    let canvas_inner = canvas_block.inner(areas.canvas);
    frame.render_widget(canvas_block, areas.canvas);
    app.canvas_area = canvas_inner;
    let canvas = app.canvas_text(canvas_inner.width, canvas_inner.height);
    frame.render_widget(Paragraph::new(canvas), canvas_inner);

    let palette_block = Block::default()
        .borders(Borders::ALL)
        .title(" Palette ")
        .border_style(app.theme.panel_border_style(matches!(
            app.controller.gesture(),
            Gesture::Placing(_)
        )));
    let palette_inner = palette_block.inner(areas.palette);
    frame.render_widget(palette_block, areas.palette);
    let height = usize::from(palette_inner.height);
    app.palette_area = palette_inner;
    app.palette_offset = palette_offset(app.palette_index, height);
    frame.render_widget(
        List::new(palette_items(
            app.palette_index,
            app.palette_offset,
            height,
            &app.theme,
        )),
        palette_inner,
    );

    let inspector = Paragraph::new(inspector_lines(&app.editor, &app.theme))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Inspector ")
                .border_style(app.theme.panel_border_style(false)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(inspector, areas.inspector);

    frame.render_widget(Paragraph::new(app.footer_line()), areas.footer);
}

struct Toast {
    message: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PromptKind {
    RenameFlow(FlowId),
    RenameNode(NodeId),
    ImportPath,
}

impl PromptKind {
    fn label(&self) -> &'static str {
        match self {
            Self::RenameFlow(_) => "Flow name",
            Self::RenameNode(_) => "Node name",
            Self::ImportPath => "Import file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Prompt {
    kind: PromptKind,
    input: String,
}

struct App {
    editor: Editor,
    controller: CanvasController,
    ports: MeasuredPortLayout,
    theme: TuiTheme,
    export_dir: PathBuf,
    scroll: Point,
    palette_index: usize,
    palette_offset: usize,
    canvas_area: Rect,
    palette_area: Rect,
    prompt: Option<Prompt>,
    toast: Option<Toast>,
    should_quit: bool,
}

impl App {
    fn new(editor: Editor, export_dir: PathBuf, theme: TuiTheme) -> Self {
        Self {
            editor,
            controller: CanvasController::new(),
            ports: MeasuredPortLayout::default(),
            theme,
            export_dir,
            scroll: Point::default(),
            palette_index: 0,
            palette_offset: 0,
            canvas_area: Rect::default(),
            palette_area: Rect::default(),
            prompt: None,
            toast: None,
            should_quit: false,
        }
    }

    fn viewport(&self) -> Viewport {
        Viewport::for_panel(
            self.canvas_area.x,
            self.canvas_area.y,
            self.editor.zoom().factor(),
        )
        .with_scroll(self.scroll)
    }

    fn palette_kind(&self) -> NodeKind {
        NodeKind::ALL[self.palette_index % NodeKind::ALL.len()]
    }

    /// Renders the active flow into styled text and refreshes the measured port layout.
    fn canvas_text(&mut self, width: u16, height: u16) -> Text<'static> {
        if width == 0 || height == 0 {
            return Text::default();
        }
        let viewport = self.viewport();
        let overlay = self.controller.overlay();
        let scene = match render_scene(
            self.editor.active_flow(),
            &viewport,
            usize::from(width),
            usize::from(height),
            &overlay,
        ) {
            Ok(scene) => scene,
            Err(err) => {
                tracing::warn!(%err, "canvas render failed");
                return Text::from(Line::styled(
                    format!("render error: {err}"),
                    self.theme.error_style(),
                ));
            }
        };

        let text = self.styled_scene(&scene, &overlay);
        self.ports.replace_with(scene.ports);
        text
    }

    fn styled_scene(&self, scene: &SceneRender, overlay: &SceneOverlay) -> Text<'static> {
        let flow = self.editor.active_flow();
        let preview_valid = overlay.preview.as_ref().and_then(|preview| preview.valid);
        let rows: Vec<Vec<char>> = scene
            .grid
            .lines()
            .into_iter()
            .map(|line| line.chars().collect())
            .collect();
        let mut styles: Vec<Vec<Style>> = rows
            .iter()
            .map(|row| vec![Style::default(); row.len()])
            .collect();

        let mut layers: Vec<(u8, Style, &[LineSpan])> = Vec::new();
        for (object, spans) in &scene.highlights {
            let layer = match object {
                SceneObject::Link(link_id) => flow
                    .link(link_id)
                    .map(|link| (0, self.theme.link_style(link.status()))),
                SceneObject::Node(node_id) => flow
                    .node(node_id)
                    .map(|node| (1, self.theme.node_style(node.status()))),
                SceneObject::HealthBar(node_id) => flow
                    .node(node_id)
                    .map(|node| (2, self.theme.health_style(node.health()))),
                SceneObject::Port(key) if overlay.hover_port.as_ref() == Some(key) => {
                    Some((3, self.theme.preview_style(preview_valid)))
                }
                SceneObject::Port(key) => Some((3, self.theme.port_style(key.side))),
                SceneObject::Preview => Some((4, self.theme.preview_style(preview_valid))),
            };
            if let Some((rank, style)) = layer {
                layers.push((rank, style, spans.as_slice()));
            }
        }
        layers.sort_by_key(|(rank, _, _)| *rank);
        for (_, style, spans) in layers {
            apply_style(&mut styles, spans, style);
        }

        let selected = self
            .editor
            .selected_node_id()
            .map(|node_id| SceneObject::Node(node_id.clone()))
            .or_else(|| {
                self.editor
                    .selected_link_id()
                    .map(|link_id| SceneObject::Link(link_id.clone()))
            });
        if let Some(spans) = selected.and_then(|object| scene.highlights.get(&object)) {
            apply_style(&mut styles, spans, self.theme.selection_style());
        }

        Text::from(
            rows.iter()
                .zip(&styles)
                .map(|(row, row_styles)| styled_row(row, row_styles))
                .collect::<Vec<_>>(),
        )
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.handle_key_code(key.code) {
            self.should_quit = true;
        }
    }

    /// Returns `true` when the app should quit.
    fn handle_key_code(&mut self, code: KeyCode) -> bool {
        if self.prompt.is_some() {
            self.handle_prompt_key(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => self.switch_flow(1),
            KeyCode::BackTab => self.switch_flow(-1),
            KeyCode::Char('n') => self.add_flow(),
            KeyCode::Char('x') => self.delete_active_flow(),
            KeyCode::Char('r') => {
                let flow = self.editor.active_flow();
                self.open_prompt(PromptKind::RenameFlow(flow.id().clone()), flow.name().to_owned());
            }
            KeyCode::Char('N') => match self.editor.selected_node() {
                Some(node) => {
                    let kind = PromptKind::RenameNode(node.id().clone());
                    let name = node.name().to_owned();
                    self.open_prompt(kind, name);
                }
                None => self.set_toast("Select a node to rename"),
            },
            KeyCode::Char('[') => self.step_palette(-1),
            KeyCode::Char(']') => self.step_palette(1),
            KeyCode::Char('a') => {
                let kind = self.palette_kind();
                let node_id = self.editor.add_node(kind);
                self.set_toast(format!("Added {kind} node {node_id}"));
            }
            KeyCode::Delete | KeyCode::Char('d') => self.delete_selection(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let zoom = self.editor.zoom_in();
                self.set_toast(format!("Zoom {zoom}"));
            }
            KeyCode::Char('-') => {
                let zoom = self.editor.zoom_out();
                self.set_toast(format!("Zoom {zoom}"));
            }
            KeyCode::Char('s') => {
                self.editor.save();
                self.set_toast("Saved");
            }
            KeyCode::Char('e') => self.export_active_flow(),
            KeyCode::Char('i') => self.open_prompt(PromptKind::ImportPath, String::new()),
            KeyCode::Char('c') => {
                self.controller.cancel(&mut self.editor);
                if self.editor.clear_all_nodes() {
                    self.set_toast("Cleared all nodes");
                } else {
                    self.set_toast("Nothing to clear");
                }
            }
            KeyCode::Char('R') => {
                self.controller.cancel(&mut self.editor);
                self.editor.reset_canvas();
                self.scroll = Point::default();
                self.set_toast("Canvas reset");
            }
            KeyCode::Char('u') => self.cycle_selected_status(),
            KeyCode::Char('<') => self.nudge_selected_health(false),
            KeyCode::Char('>') => self.nudge_selected_health(true),
            KeyCode::Esc => self.editor.clear_selections(),
            KeyCode::Left => self.scroll_by(-SCROLL_STEP_CELLS, 0.0),
            KeyCode::Right => self.scroll_by(SCROLL_STEP_CELLS, 0.0),
            KeyCode::Up => self.scroll_by(0.0, -SCROLL_STEP_CELLS / 2.0),
            KeyCode::Down => self.scroll_by(0.0, SCROLL_STEP_CELLS / 2.0),
            KeyCode::Home => self.scroll = Point::default(),
            _ => {}
        }

        false
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.prompt.is_some() {
            return;
        }
        let screen = Viewport::cell_center(mouse.column, mouse.row);
        let viewport = self.viewport();
        let over_canvas = rect_contains(self.canvas_area, mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if over_canvas {
                    let outcome = self.controller.pointer_down(
                        &mut self.editor,
                        screen,
                        &viewport,
                        &self.ports,
                    );
                    self.report(outcome);
                } else if let Some(index) = self.palette_index_at(mouse.column, mouse.row) {
                    self.palette_index = index;
                    let kind = self.palette_kind();
                    if self.controller.begin_placing(kind) {
                        self.set_toast(format!("Release over the canvas to place {kind}"));
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                self.controller
                    .pointer_move(&self.editor, screen, &viewport, &self.ports);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let outcome = self.controller.pointer_up(
                    &mut self.editor,
                    over_canvas.then_some(screen),
                    &viewport,
                    &self.ports,
                );
                self.report(outcome);
            }
            MouseEventKind::ScrollUp if over_canvas => {
                self.scroll_by(0.0, -SCROLL_STEP_CELLS / 2.0);
            }
            MouseEventKind::ScrollDown if over_canvas => {
                self.scroll_by(0.0, SCROLL_STEP_CELLS / 2.0);
            }
            _ => {}
        }
    }

    fn report(&mut self, outcome: GestureOutcome) {
        match outcome {
            GestureOutcome::LinkCreated(link_id) => {
                let message = match self.editor.active_flow().link(&link_id) {
                    Some(link) => format!("Linked {} → {}", link.source(), link.target()),
                    None => format!("Linked {link_id}"),
                };
                self.set_toast(message);
            }
            GestureOutcome::ConnectDiscarded => self.set_toast("Connection discarded"),
            GestureOutcome::NodePlaced(node_id) => self.set_toast(format!("Placed {node_id}")),
            GestureOutcome::PlacementDiscarded => self.set_toast("Placement discarded"),
            GestureOutcome::Ignored
            | GestureOutcome::SelectionCleared
            | GestureOutcome::NodeSelected(_)
            | GestureOutcome::LinkSelected(_)
            | GestureOutcome::ConnectStarted(_)
            | GestureOutcome::NodeMoved(_) => {}
        }
    }

    fn palette_index_at(&self, col: u16, row: u16) -> Option<usize> {
        if !rect_contains(self.palette_area, col, row) {
            return None;
        }
        let index = self.palette_offset + usize::from(row - self.palette_area.y);
        (index < NodeKind::ALL.len()).then_some(index)
    }

    fn step_palette(&mut self, delta: isize) {
        let len = NodeKind::ALL.len() as isize;
        self.palette_index = (self.palette_index as isize + delta).rem_euclid(len) as usize;
    }

    fn scroll_by(&mut self, cols: f64, rows: f64) {
        let zoom = self.editor.zoom().factor();
        self.scroll = Point::new(
            (self.scroll.x + cols * CELL_WIDTH / zoom).max(0.0),
            (self.scroll.y + rows * CELL_HEIGHT / zoom).max(0.0),
        );
    }

    fn switch_flow(&mut self, delta: isize) {
        let flows = self.editor.flows();
        let len = flows.len() as isize;
        let index = (self.editor.active_flow_index() as isize + delta).rem_euclid(len) as usize;
        let flow_id = flows[index].id().clone();
        self.controller.cancel(&mut self.editor);
        if self.editor.select_flow(&flow_id) {
            self.scroll = Point::default();
        }
    }

    fn add_flow(&mut self) {
        self.controller.cancel(&mut self.editor);
        self.editor.add_flow();
        self.scroll = Point::default();
        let name = self.editor.active_flow().name().to_owned();
        self.set_toast(format!("Created {name}"));
    }

    fn delete_active_flow(&mut self) {
        let flow_id = self.editor.active_flow_id().clone();
        self.controller.cancel(&mut self.editor);
        if self.editor.delete_flow(&flow_id) {
            self.scroll = Point::default();
            self.set_toast(format!("Deleted flow {flow_id}"));
        } else {
            self.set_toast("The last flow cannot be deleted");
        }
    }

    fn delete_selection(&mut self) {
        if let Some(node_id) = self.editor.selected_node_id().cloned() {
            if self.editor.delete_node(&node_id) {
                self.set_toast(format!("Deleted node {node_id}"));
            }
        } else if let Some(link_id) = self.editor.selected_link_id().cloned() {
            if self.editor.delete_link(&link_id) {
                self.set_toast(format!("Deleted link {link_id}"));
            }
        } else {
            self.set_toast("Nothing selected");
        }
    }

    fn cycle_selected_status(&mut self) {
        let Some(node) = self.editor.selected_node() else {
            self.set_toast("Select a node first");
            return;
        };
        let node_id = node.id().clone();
        let status = node.status().cycled();
        self.editor.update_node(
            &node_id,
            NodePatch {
                status: Some(status),
                ..NodePatch::default()
            },
        );
        self.set_toast(format!("Status {}", status.as_str()));
    }

    fn nudge_selected_health(&mut self, up: bool) {
        let Some(node) = self.editor.selected_node() else {
            self.set_toast("Select a node first");
            return;
        };
        let node_id = node.id().clone();
        let health = if up {
            node.health().saturating_add(HEALTH_STEP).min(MAX_HEALTH)
        } else {
            node.health().saturating_sub(HEALTH_STEP)
        };
        self.editor.update_node(
            &node_id,
            NodePatch {
                health: Some(health),
                ..NodePatch::default()
            },
        );
        self.set_toast(format!("Health {health}%"));
    }

    fn export_active_flow(&mut self) {
        let document = self.editor.export_active_flow();
        match write_export(&self.export_dir, &document) {
            Ok(path) => self.set_toast(format!(
                "Exported {} nodes to {}",
                document.nodes.len(),
                path.display()
            )),
            Err(err) => {
                tracing::warn!(%err, "export failed");
                self.set_toast(format!("Export failed: {err}"));
            }
        }
    }

    fn import_from(&mut self, path: &Path) {
        let result = read_import(path).and_then(|batch| self.editor.import_batch(batch));
        match result {
            Ok(summary) => self.set_toast(format!(
                "Imported {} nodes and {} links",
                summary.nodes, summary.links
            )),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "import failed");
                self.set_toast(format!("Import failed: {err}"));
            }
        }
    }

    fn open_prompt(&mut self, kind: PromptKind, input: String) {
        self.prompt = Some(Prompt { kind, input });
    }

    fn handle_prompt_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.commit_prompt(prompt);
                }
            }
            KeyCode::Backspace => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.input.pop();
                }
            }
            KeyCode::Char(ch) => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.input.push(ch);
                }
            }
            _ => {}
        }
    }

    fn commit_prompt(&mut self, prompt: Prompt) {
        let input = prompt.input.trim();
        if input.is_empty() {
            self.set_toast(format!("{} must not be empty", prompt.kind.label()));
            return;
        }
        match prompt.kind {
            PromptKind::RenameFlow(flow_id) => {
                if self.editor.rename_flow(&flow_id, input) {
                    self.set_toast(format!("Renamed flow to {input}"));
                }
            }
            PromptKind::RenameNode(node_id) => {
                let patch = NodePatch {
                    name: Some(input.to_owned()),
                    ..NodePatch::default()
                };
                if self.editor.update_node(&node_id, patch) {
                    self.set_toast(format!("Renamed node to {input}"));
                }
            }
            PromptKind::ImportPath => self.import_from(Path::new(input)),
        }
    }

    fn footer_line(&self) -> Line<'static> {
        if let Some(prompt) = &self.prompt {
            return Line::from(vec![
                Span::styled(format!("{}: ", prompt.kind.label()), self.theme.key_style()),
                Span::raw(format!("{}█", prompt.input)),
            ]);
        }
        if let Some(toast) = &self.toast {
            return Line::from(toast.message.clone());
        }
        footer_help_line(&self.editor, &self.theme)
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    fn expire_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|toast| toast.expires_at <= now) {
            self.toast = None;
        }
    }
}

fn apply_style(styles: &mut [Vec<Style>], spans: &[LineSpan], style: Style) {
    for (y, x0, x1) in spans {
        let Some(row) = styles.get_mut(*y) else {
            continue;
        };
        for cell in row.iter_mut().take(x1 + 1).skip(*x0) {
            *cell = cell.patch(style);
        }
    }
}

fn styled_row(row: &[char], styles: &[Style]) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style = Style::default();
    for (ch, style) in row.iter().zip(styles) {
        if *style != run_style && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = *style;
        run.push(*ch);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style));
    }
    Line::from(spans)
}

include!("chrome.rs");

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
}

#[cfg(test)]
mod tests;
