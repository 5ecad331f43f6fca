// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canvas gestures.
//!
//! A [`CanvasController`] turns pointer events into editor operations. At most one gesture is
//! live at a time: node drag, port connection or palette placement. Intermediate drag positions
//! stay in the controller and reach the editor once, on release.

use crate::geometry::{resolve_port_center, CubicBezier, Point, PortKey, PortLayout, Viewport};
use crate::model::{LinkId, NodeId, NodeKind, PortSide};
use crate::ops::Editor;
use crate::render::{LinkPreview, LinkRoute, SceneOverlay};

pub mod hit;

pub use hit::{hit_test, Hit};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeDrag {
    node_id: NodeId,
    grab_offset: Point,
    start: Point,
    current: Point,
}

impl NodeDrag {
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn start(&self) -> Point {
        self.start
    }

    /// Uncommitted top-left of the dragged node.
    pub fn current(&self) -> Point {
        self.current
    }

    pub fn moved(&self) -> bool {
        self.current != self.start
    }

    fn follow(&mut self, canvas: Point) {
        self.current = Point::new(
            (canvas.x - self.grab_offset.x).max(0.0),
            (canvas.y - self.grab_offset.y).max(0.0),
        );
    }
}

/// Input port currently under the pointer during a connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectHover {
    pub key: PortKey,
    pub center: Point,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectDrag {
    source: PortKey,
    from: Point,
    pointer: Point,
    hover: Option<ConnectHover>,
}

impl ConnectDrag {
    pub fn source(&self) -> &PortKey {
        &self.source
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    pub fn hover(&self) -> Option<&ConnectHover> {
        self.hover.as_ref()
    }

    /// Preview path: to the hovered input port when there is one, otherwise to the pointer.
    pub fn preview(&self) -> LinkPreview {
        let (to, valid) = match &self.hover {
            Some(hover) => (hover.center, Some(hover.valid)),
            None => (self.pointer, None),
        };
        LinkPreview {
            route: LinkRoute::Curve(CubicBezier::link(self.from, to)),
            valid,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    DraggingNode(NodeDrag),
    Connecting(ConnectDrag),
    Placing(NodeKind),
}

/// Effect of a pointer event on the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    Ignored,
    SelectionCleared,
    NodeSelected(NodeId),
    LinkSelected(LinkId),
    ConnectStarted(PortKey),
    NodeMoved(NodeId),
    LinkCreated(LinkId),
    ConnectDiscarded,
    NodePlaced(NodeId),
    PlacementDiscarded,
}

#[derive(Debug, Clone, Default)]
pub struct CanvasController {
    gesture: Gesture,
}

impl CanvasController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    /// Starts carrying a palette entry. Ignored while another gesture is live.
    pub fn begin_placing(&mut self, kind: NodeKind) -> bool {
        if !self.is_idle() {
            return false;
        }
        tracing::debug!(kind = %kind, "placement started");
        self.gesture = Gesture::Placing(kind);
        true
    }

    pub fn pointer_down(
        &mut self,
        editor: &mut Editor,
        screen: Point,
        viewport: &Viewport,
        layout: &dyn PortLayout,
    ) -> GestureOutcome {
        if !self.is_idle() {
            return GestureOutcome::Ignored;
        }
        let canvas = viewport.screen_to_canvas(screen);
        let hit = hit_test(editor.active_flow(), canvas, layout, viewport.hit_tolerance());

        match hit {
            Hit::Port(key) => {
                if !editor.begin_port_connect(&key.node_id, key.index, key.side) {
                    return GestureOutcome::Ignored;
                }
                let Some(from) = port_center(editor, &key, layout) else {
                    editor.cancel_port_connect();
                    return GestureOutcome::Ignored;
                };
                self.gesture = Gesture::Connecting(ConnectDrag {
                    source: key.clone(),
                    from,
                    pointer: canvas,
                    hover: None,
                });
                GestureOutcome::ConnectStarted(key)
            }
            Hit::Node(node_id) => {
                let Some(node) = editor.active_flow().node(&node_id) else {
                    return GestureOutcome::Ignored;
                };
                let start = Point::new(node.x(), node.y());
                editor.select_node(Some(&node_id));
                self.gesture = Gesture::DraggingNode(NodeDrag {
                    node_id: node_id.clone(),
                    grab_offset: Point::new(canvas.x - start.x, canvas.y - start.y),
                    start,
                    current: start,
                });
                GestureOutcome::NodeSelected(node_id)
            }
            Hit::Link(link_id) => {
                // Node selection draws over link selection, so a link click drops it.
                editor.select_node(None);
                editor.select_link(Some(&link_id));
                GestureOutcome::LinkSelected(link_id)
            }
            Hit::Empty => {
                editor.clear_selections();
                GestureOutcome::SelectionCleared
            }
        }
    }

    pub fn pointer_move(
        &mut self,
        editor: &Editor,
        screen: Point,
        viewport: &Viewport,
        layout: &dyn PortLayout,
    ) {
        let canvas = viewport.screen_to_canvas(screen);
        match &mut self.gesture {
            Gesture::DraggingNode(drag) => drag.follow(canvas),
            Gesture::Connecting(connect) => {
                connect.pointer = canvas;
                connect.hover = match hit_test(
                    editor.active_flow(),
                    canvas,
                    layout,
                    viewport.hit_tolerance(),
                ) {
                    Hit::Port(key) if key.side == PortSide::Input => {
                        port_center(editor, &key, layout).map(|center| ConnectHover {
                            valid: editor.check_connection(&key.node_id, key.index).is_ok(),
                            key,
                            center,
                        })
                    }
                    _ => None,
                };
            }
            Gesture::Idle | Gesture::Placing(_) => {}
        }
    }

    /// Ends the live gesture. `screen` is `None` when the pointer was released outside the
    /// canvas panel.
    pub fn pointer_up(
        &mut self,
        editor: &mut Editor,
        screen: Option<Point>,
        viewport: &Viewport,
        layout: &dyn PortLayout,
    ) -> GestureOutcome {
        let canvas = screen.map(|screen| viewport.screen_to_canvas(screen));
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => GestureOutcome::Ignored,
            Gesture::DraggingNode(mut drag) => {
                if let Some(canvas) = canvas {
                    drag.follow(canvas);
                }
                if !drag.moved() {
                    return GestureOutcome::NodeSelected(drag.node_id);
                }
                if editor.drag_node(&drag.node_id, drag.current.x, drag.current.y) {
                    GestureOutcome::NodeMoved(drag.node_id)
                } else {
                    GestureOutcome::Ignored
                }
            }
            Gesture::Connecting(_) => {
                let target = canvas.map(|canvas| {
                    hit_test(editor.active_flow(), canvas, layout, viewport.hit_tolerance())
                });
                match target {
                    Some(Hit::Port(key)) if key.side == PortSide::Input => {
                        match editor.end_port_connect(&key.node_id, key.index, key.side) {
                            Some(link_id) => GestureOutcome::LinkCreated(link_id),
                            None => GestureOutcome::ConnectDiscarded,
                        }
                    }
                    _ => {
                        editor.cancel_port_connect();
                        GestureOutcome::ConnectDiscarded
                    }
                }
            }
            Gesture::Placing(kind) => match canvas {
                Some(canvas) => {
                    let node_id = editor.add_node_at(kind, canvas.x.max(0.0), canvas.y.max(0.0));
                    GestureOutcome::NodePlaced(node_id)
                }
                None => {
                    tracing::debug!(kind = %kind, "placement discarded");
                    GestureOutcome::PlacementDiscarded
                }
            },
        }
    }

    /// Drops the live gesture without touching the graph.
    pub fn cancel(&mut self, editor: &mut Editor) {
        if let Gesture::Connecting(_) = std::mem::take(&mut self.gesture) {
            editor.cancel_port_connect();
        }
    }

    /// Transient drawing state for the renderer.
    pub fn overlay(&self) -> SceneOverlay {
        match &self.gesture {
            Gesture::DraggingNode(drag) => SceneOverlay {
                moved_node: Some((drag.node_id.clone(), drag.current)),
                ..SceneOverlay::default()
            },
            Gesture::Connecting(connect) => SceneOverlay {
                preview: Some(connect.preview()),
                hover_port: connect.hover.as_ref().map(|hover| hover.key.clone()),
                ..SceneOverlay::default()
            },
            Gesture::Idle | Gesture::Placing(_) => SceneOverlay::default(),
        }
    }
}

fn port_center(editor: &Editor, key: &PortKey, layout: &dyn PortLayout) -> Option<Point> {
    let node = editor.active_flow().node(&key.node_id)?;
    Some(resolve_port_center(
        layout,
        node,
        Point::new(node.x(), node.y()),
        key.side,
        key.index,
    ))
}
