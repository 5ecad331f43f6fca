// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{backend::TestBackend, buffer::Buffer, style::Modifier, Terminal};
use rstest::{fixture, rstest};

use super::theme::TuiTheme;
use super::{draw, palette_offset, rect_contains, App, PromptKind, ScreenAreas};
use crate::model::sample::pipeline_flow;
use crate::model::{NodeId, NodeKind, NodeStatus};
use crate::ops::{Editor, Zoom};
use crate::store::EXPORT_FILE_NAME;
use ratatui::layout::Rect;

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "flowdeck-{prefix}-{}-{nanos}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("create temp dir");
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

fn app_in(dir: &TempDir) -> App {
    App::new(
        Editor::from_flow(pipeline_flow(), Some(11)),
        dir.path.clone(),
        TuiTheme::monochrome(),
    )
}

fn toast(app: &App) -> &str {
    app.toast.as_ref().map(|toast| toast.message.as_str()).unwrap_or("")
}

fn press(app: &mut App, codes: &[KeyCode]) {
    for code in codes {
        assert!(!app.handle_key_code(*code), "{code:?} quit the app");
    }
}

fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        app.handle_key_code(KeyCode::Char(ch));
    }
}

fn mouse(app: &mut App, kind: MouseEventKind, column: u16, row: u16) {
    app.handle_mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    });
}

fn render(app: &mut App) -> Buffer {
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
    terminal.draw(|frame| draw(frame, app)).expect("draw");
    terminal.backend().buffer().clone()
}

fn row_text(buffer: &Buffer, row: u16) -> String {
    (0..buffer.area.width)
        .map(|col| buffer.get(col, row).symbol().to_owned())
        .collect()
}

#[fixture]
fn tmp() -> TempDir {
    TempDir::new("tui")
}

#[test]
fn screen_is_split_into_tabs_canvas_sidebar_and_footer() {
    let areas = ScreenAreas::split(Rect::new(0, 0, 120, 40));
    assert_eq!(areas.tabs, Rect::new(0, 0, 120, 1));
    assert_eq!(areas.canvas, Rect::new(0, 1, 90, 38));
    assert_eq!(areas.palette, Rect::new(90, 1, 30, 12));
    assert_eq!(areas.inspector, Rect::new(90, 13, 30, 26));
    assert_eq!(areas.footer, Rect::new(0, 39, 120, 1));
}

#[test]
fn rect_contains_is_half_open() {
    let area = Rect::new(2, 3, 4, 5);
    assert!(rect_contains(area, 2, 3));
    assert!(rect_contains(area, 5, 7));
    assert!(!rect_contains(area, 6, 7));
    assert!(!rect_contains(area, 5, 8));
    assert!(!rect_contains(Rect::default(), 0, 0));
}

#[test]
fn palette_scrolls_to_keep_selection_visible() {
    assert_eq!(palette_offset(3, 10), 0);
    assert_eq!(palette_offset(9, 10), 0);
    assert_eq!(palette_offset(12, 10), 3);
    assert_eq!(palette_offset(5, 0), 0);
}

#[rstest]
fn q_quits(tmp: TempDir) {
    let mut app = app_in(&tmp);
    assert!(app.handle_key_code(KeyCode::Char('q')));
}

#[rstest]
fn palette_keys_choose_the_kind_that_a_adds(tmp: TempDir) {
    let mut app = app_in(&tmp);
    press(&mut app, &[KeyCode::Char(']'), KeyCode::Char('a')]);

    let node = app.editor.selected_node().expect("new node selected");
    assert_eq!(node.kind(), NodeKind::Database);
    assert_eq!(node.name(), "New database");
    assert!(app.editor.has_changes());

    press(&mut app, &[KeyCode::Char('['), KeyCode::Char('[')]);
    assert_eq!(app.palette_kind(), *NodeKind::ALL.last().expect("kinds"));
}

#[rstest]
fn flows_can_be_added_switched_and_deleted(tmp: TempDir) {
    let mut app = app_in(&tmp);

    press(&mut app, &[KeyCode::Char('x')]);
    assert_eq!(app.editor.flows().len(), 1);
    assert_eq!(toast(&app), "The last flow cannot be deleted");

    press(&mut app, &[KeyCode::Char('n')]);
    assert_eq!(app.editor.flows().len(), 2);
    assert_eq!(app.editor.active_flow().name(), "Flow 2");

    press(&mut app, &[KeyCode::Tab]);
    assert_eq!(app.editor.active_flow_index(), 0);
    press(&mut app, &[KeyCode::BackTab]);
    assert_eq!(app.editor.active_flow_index(), 1);

    press(&mut app, &[KeyCode::Char('x')]);
    assert_eq!(app.editor.flows().len(), 1);
    assert_eq!(app.editor.active_flow().name(), "Flow 1");
}

#[rstest]
fn rename_prompt_edits_and_commits(tmp: TempDir) {
    let mut app = app_in(&tmp);
    press(&mut app, &[KeyCode::Char('r')]);
    let prompt = app.prompt.as_ref().expect("prompt");
    assert!(matches!(prompt.kind, PromptKind::RenameFlow(_)));
    assert_eq!(prompt.input, "Flow 1");

    press(&mut app, &[KeyCode::Backspace; 6]);
    type_text(&mut app, "Ingest q");
    press(&mut app, &[KeyCode::Enter]);

    assert!(app.prompt.is_none());
    assert_eq!(app.editor.active_flow().name(), "Ingest q");
}

#[rstest]
fn escape_abandons_prompt(tmp: TempDir) {
    let mut app = app_in(&tmp);
    app.editor.select_node(Some(&nid("n_http")));
    press(&mut app, &[KeyCode::Char('N')]);
    type_text(&mut app, "zzz");
    press(&mut app, &[KeyCode::Esc]);

    assert!(app.prompt.is_none());
    assert_eq!(app.editor.selected_node().expect("node").name(), "Upload");
}

#[rstest]
fn rename_node_requires_a_selection(tmp: TempDir) {
    let mut app = app_in(&tmp);
    press(&mut app, &[KeyCode::Char('N')]);
    assert!(app.prompt.is_none());
    assert_eq!(toast(&app), "Select a node to rename");

    app.editor.select_node(Some(&nid("n_http")));
    press(&mut app, &[KeyCode::Char('N')]);
    press(&mut app, &[KeyCode::Backspace; 6]);
    type_text(&mut app, "Push");
    press(&mut app, &[KeyCode::Enter]);
    assert_eq!(app.editor.selected_node().expect("node").name(), "Push");
}

#[rstest]
fn zoom_keys_clamp(tmp: TempDir) {
    let mut app = app_in(&tmp);
    press(&mut app, &[KeyCode::Char('+'); 15]);
    assert_eq!(app.editor.zoom(), Zoom::MAX);
    assert_eq!(toast(&app), "Zoom 200%");

    press(&mut app, &[KeyCode::Char('-'); 20]);
    assert_eq!(app.editor.zoom(), Zoom::MIN);
}

#[rstest]
fn delete_removes_selected_node_and_its_links(tmp: TempDir) {
    let mut app = app_in(&tmp);
    app.editor.select_node(Some(&nid("n_switch")));
    press(&mut app, &[KeyCode::Char('d')]);

    let flow = app.editor.active_flow();
    assert!(flow.node(&nid("n_switch")).is_none());
    assert_eq!(flow.links().len(), 1);
    assert!(app.editor.selected_node_id().is_none());

    press(&mut app, &[KeyCode::Delete]);
    assert_eq!(toast(&app), "Nothing selected");
}

#[rstest]
fn status_and_health_keys_patch_selected_node(tmp: TempDir) {
    let mut app = app_in(&tmp);
    app.editor.select_node(Some(&nid("n_inject")));

    press(&mut app, &[KeyCode::Char('u')]);
    assert_eq!(
        app.editor.selected_node().expect("node").status(),
        NodeStatus::Warning
    );

    press(&mut app, &[KeyCode::Char('>')]);
    assert_eq!(app.editor.selected_node().expect("node").health(), 100);
    press(&mut app, &[KeyCode::Char('<'), KeyCode::Char('<')]);
    assert_eq!(app.editor.selected_node().expect("node").health(), 80);
}

#[rstest]
fn export_key_writes_document(tmp: TempDir) {
    let mut app = app_in(&tmp);
    press(&mut app, &[KeyCode::Char('e')]);

    let written = fs::read_to_string(tmp.path.join(EXPORT_FILE_NAME)).expect("export file");
    let doc: serde_json::Value = serde_json::from_str(&written).expect("json");
    assert_eq!(doc["nodes"].as_array().expect("nodes").len(), 6);
    assert_eq!(doc["links"].as_array().expect("links").len(), 4);
    assert!(toast(&app).starts_with("Exported 6 nodes"));
}

#[rstest]
fn import_prompt_applies_file_or_reports_failure(tmp: TempDir) {
    let mut app = app_in(&tmp);
    let path = tmp.path.join("extra.json");
    fs::write(&path, r#"[{"id":"extra","type":"mqtt","x":10,"y":20}]"#).expect("write");

    press(&mut app, &[KeyCode::Char('i')]);
    type_text(&mut app, path.to_str().expect("utf-8 path"));
    press(&mut app, &[KeyCode::Enter]);
    assert_eq!(toast(&app), "Imported 1 nodes and 0 links");
    assert_eq!(app.editor.active_flow().nodes().len(), 7);

    press(&mut app, &[KeyCode::Char('i')]);
    type_text(&mut app, path.to_str().expect("utf-8 path"));
    press(&mut app, &[KeyCode::Enter]);
    assert!(toast(&app).starts_with("Import failed"), "{}", toast(&app));
    assert_eq!(app.editor.active_flow().nodes().len(), 7);
}

#[rstest]
fn clear_and_reset_keys(tmp: TempDir) {
    let mut app = app_in(&tmp);
    press(&mut app, &[KeyCode::Char('c')]);
    assert!(app.editor.active_flow().nodes().is_empty());
    assert!(app.editor.active_flow().links().is_empty());

    press(&mut app, &[KeyCode::Char('c')]);
    assert_eq!(toast(&app), "Nothing to clear");

    press(&mut app, &[KeyCode::Char('+'), KeyCode::Right, KeyCode::Char('R')]);
    assert_eq!(app.editor.zoom(), Zoom::DEFAULT);
    assert!(!app.editor.has_changes());
    assert_eq!(app.scroll, crate::geometry::Point::default());
}

#[rstest]
fn toast_expires(tmp: TempDir) {
    let mut app = app_in(&tmp);
    app.set_toast("hello");
    app.expire_toast(Instant::now());
    assert_eq!(toast(&app), "hello");
    app.expire_toast(Instant::now() + Duration::from_secs(10));
    assert!(app.toast.is_none());
}

#[rstest]
fn canvas_draws_nodes_and_measures_ports(tmp: TempDir) {
    let mut app = app_in(&tmp);
    let buffer = render(&mut app);

    assert_eq!(app.canvas_area, Rect::new(1, 2, 88, 36));
    assert!(row_text(&buffer, 0).contains(" Flow 1 "));
    assert!(row_text(&buffer, 1).contains("Flow 1 · 6 nodes · 4 links"));
    assert!(row_text(&buffer, 5).contains(" Tick "));
    assert!(row_text(&buffer, 39).contains("quit"));
    assert!(!app.ports.is_empty());
}

#[rstest]
fn selected_node_is_drawn_reversed(tmp: TempDir) {
    let mut app = app_in(&tmp);
    app.editor.select_node(Some(&nid("n_inject")));
    let buffer = render(&mut app);

    assert!(buffer.get(6, 5).modifier.contains(Modifier::REVERSED));
    assert!(!buffer.get(40, 30).modifier.contains(Modifier::REVERSED));
    assert!(row_text(&buffer, 14).contains("Tick") || row_text(&buffer, 15).contains("Tick"));
}

#[rstest]
fn mouse_drag_moves_node_once_on_release(tmp: TempDir) {
    let mut app = app_in(&tmp);
    render(&mut app);

    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 10, 6);
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 12, 7);
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 15, 9);
    let node = app.editor.active_flow().node(&nid("n_inject")).expect("node");
    assert_eq!((node.x(), node.y()), (40.0, 48.0));

    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 15, 9);
    let node = app.editor.active_flow().node(&nid("n_inject")).expect("node");
    assert_eq!((node.x(), node.y()), (80.0, 96.0));
    assert_eq!(app.editor.selected_node_id(), Some(&nid("n_inject")));

    let buffer = render(&mut app);
    assert!(row_text(&buffer, 39).contains("● unsaved"));
}

#[rstest]
fn mouse_connects_output_to_input_through_measured_ports(tmp: TempDir) {
    let mut app = app_in(&tmp);
    render(&mut app);
    let before = app.editor.active_flow().links().len();

    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 26, 7);
    assert!(app.editor.drag_port().is_some());
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 65, 12);
    render(&mut app);
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 65, 12);

    assert_eq!(app.editor.active_flow().links().len(), before + 1);
    assert_eq!(toast(&app), "Linked n_inject:0 → n_debug:0");
}

#[rstest]
fn palette_drag_places_node_on_canvas(tmp: TempDir) {
    let mut app = app_in(&tmp);
    render(&mut app);

    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 92, 3);
    assert_eq!(app.palette_kind(), NodeKind::Database);
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 50, 30);

    let node = app.editor.selected_node().expect("placed node");
    assert_eq!(node.kind(), NodeKind::Database);
    assert_eq!((node.x(), node.y()), (396.0, 456.0));
    assert_eq!(app.editor.active_flow().nodes().len(), 7);
}

#[rstest]
fn palette_drop_outside_canvas_is_discarded(tmp: TempDir) {
    let mut app = app_in(&tmp);
    render(&mut app);

    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 92, 2);
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 100, 20);

    assert_eq!(app.editor.active_flow().nodes().len(), 6);
    assert_eq!(toast(&app), "Placement discarded");
}

#[rstest]
fn mouse_is_ignored_while_prompting(tmp: TempDir) {
    let mut app = app_in(&tmp);
    render(&mut app);
    press(&mut app, &[KeyCode::Char('i')]);

    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 10, 6);
    assert!(app.editor.selected_node_id().is_none());
    assert!(app.controller.is_idle());
}
