// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation engine for flows.
//!
//! [`Editor`] is the only writer of graph state. Every user intent (add, drag, connect, import,
//! zoom, ...) is a method here; the interaction and TUI layers hold transient gesture state only
//! and commit through these methods.

mod id_gen;

use std::collections::HashSet;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{
    Flow, FlowId, Link, LinkId, Node, NodeId, NodeKind, NodeProperties, NodeStatus, PortRef,
    PortSide, PortSpec, MAX_HEALTH,
};
use crate::store::{self, ExportDocument, ImportBatch, ImportError};

pub use id_gen::{base36_suffix, generate_id};

/// Canvas offset and spread used when a node is added without an explicit position.
const RANDOM_PLACEMENT_ORIGIN: f64 = 100.0;
const RANDOM_PLACEMENT_SPREAD: f64 = 200.0;

/// Zoom factor stored as tenths so that stepping never accumulates float drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Zoom(u8);

impl Zoom {
    pub const MIN: Zoom = Zoom(5);
    pub const MAX: Zoom = Zoom(20);
    pub const DEFAULT: Zoom = Zoom(10);

    pub fn from_tenths(tenths: u8) -> Self {
        Self(tenths.clamp(Self::MIN.0, Self::MAX.0))
    }

    pub fn tenths(self) -> u8 {
        self.0
    }

    pub fn factor(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    pub fn stepped_in(self) -> Self {
        Self::from_tenths(self.0.saturating_add(1))
    }

    pub fn stepped_out(self) -> Self {
        Self::from_tenths(self.0.saturating_sub(1))
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", u32::from(self.0) * 10)
    }
}

/// An output port the user started dragging a connection from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPort {
    pub node_id: NodeId,
    pub port: usize,
}

impl DragPort {
    pub fn port_ref(&self) -> PortRef {
        PortRef::new(self.node_id.clone(), self.port)
    }
}

/// Partial node update. `None` fields are left untouched; `properties` is merged key by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub name: Option<String>,
    pub kind: Option<NodeKind>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub health: Option<u8>,
    pub status: Option<NodeStatus>,
    pub properties: Option<NodeProperties>,
    pub input: Option<Option<PortSpec>>,
    pub output: Option<Option<PortSpec>>,
}

impl NodePatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Why a pending connection cannot be committed onto a given input port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectRejection {
    NoPendingConnection,
    SelfLoop,
    UnknownNode { node_id: NodeId },
    PortOutOfRange { node_id: NodeId, side: PortSide, port: usize, count: usize },
    DuplicateLink { link_id: LinkId },
}

impl fmt::Display for ConnectRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPendingConnection => f.write_str("no connection in progress"),
            Self::SelfLoop => f.write_str("a node cannot connect to itself"),
            Self::UnknownNode { node_id } => write!(f, "unknown node: {node_id}"),
            Self::PortOutOfRange {
                node_id,
                side,
                port,
                count,
            } => write!(
                f,
                "{side} port {port} out of range for {node_id} (has {count})"
            ),
            Self::DuplicateLink { link_id } => write!(f, "already connected by {link_id}"),
        }
    }
}

impl std::error::Error for ConnectRejection {}

/// Counts reported back after an import was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub nodes: usize,
    pub links: usize,
}

/// The editing engine: flows, the active flow, selection, pending port drag, zoom and the
/// unsaved-changes flag.
#[derive(Debug)]
pub struct Editor {
    flows: Vec<Flow>,
    active: usize,
    selected_node_id: Option<NodeId>,
    selected_link_id: Option<LinkId>,
    drag_port: Option<DragPort>,
    zoom: Zoom,
    has_changes: bool,
    rng: StdRng,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Creates an editor holding one empty flow (`flow_1`, "Flow 1").
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Same as [`Editor::new`], with deterministic ids, health values and placement.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Creates an editor whose only flow is `flow`.
    pub fn from_flow(flow: Flow, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::from_parts(vec![flow], rng)
    }

    fn with_rng(rng: StdRng) -> Self {
        Self::from_parts(vec![initial_flow()], rng)
    }

    fn from_parts(flows: Vec<Flow>, rng: StdRng) -> Self {
        Self {
            flows,
            active: 0,
            selected_node_id: None,
            selected_link_id: None,
            drag_port: None,
            zoom: Zoom::DEFAULT,
            has_changes: false,
            rng,
        }
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn flow(&self, flow_id: &FlowId) -> Option<&Flow> {
        self.flows.iter().find(|flow| flow.id() == flow_id)
    }

    pub fn active_flow(&self) -> &Flow {
        &self.flows[self.active]
    }

    pub fn active_flow_id(&self) -> &FlowId {
        self.active_flow().id()
    }

    pub fn active_flow_index(&self) -> usize {
        self.active
    }

    pub fn selected_node_id(&self) -> Option<&NodeId> {
        self.selected_node_id.as_ref()
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selected_node_id
            .as_ref()
            .and_then(|node_id| self.active_flow().node(node_id))
    }

    pub fn selected_link_id(&self) -> Option<&LinkId> {
        self.selected_link_id.as_ref()
    }

    pub fn drag_port(&self) -> Option<&DragPort> {
        self.drag_port.as_ref()
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    fn active_flow_mut(&mut self) -> &mut Flow {
        &mut self.flows[self.active]
    }

    fn clear_selection(&mut self) {
        self.selected_node_id = None;
        self.selected_link_id = None;
    }

    fn mark_dirty(&mut self) {
        self.has_changes = true;
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        let taken = |candidate: &str| {
            self.flows.iter().any(|flow| {
                flow.id().as_str() == candidate
                    || flow.nodes().iter().any(|n| n.id().as_str() == candidate)
                    || flow.links().iter().any(|l| l.id().as_str() == candidate)
            })
        };
        loop {
            let candidate = generate_id(prefix, &mut self.rng);
            if !taken(&candidate) {
                return candidate;
            }
            tracing::debug!(candidate = %candidate, "generated id collided; drawing again");
        }
    }

    fn random_health(&mut self) -> u8 {
        self.rng.random_range(0..MAX_HEALTH)
    }

    // ---- flows -------------------------------------------------------------------------------

    /// Appends a new empty flow named "Flow {n+1}" and makes it active.
    pub fn add_flow(&mut self) -> FlowId {
        let flow_id = self.fresh_flow_id();
        let name = format!("Flow {}", self.flows.len() + 1);
        tracing::info!(flow_id = %flow_id, name = %name, "flow added");
        self.flows.push(Flow::new(flow_id.clone(), name));
        self.active = self.flows.len() - 1;
        self.clear_selection();
        self.drag_port = None;
        self.mark_dirty();
        flow_id
    }

    /// Switches the active flow. Unknown ids are ignored.
    pub fn select_flow(&mut self, flow_id: &FlowId) -> bool {
        let Some(index) = self.flows.iter().position(|flow| flow.id() == flow_id) else {
            return false;
        };
        if index != self.active {
            self.active = index;
            self.clear_selection();
            self.drag_port = None;
            tracing::debug!(flow_id = %flow_id, "active flow changed");
        }
        true
    }

    pub fn rename_flow(&mut self, flow_id: &FlowId, name: impl Into<String>) -> bool {
        let name = name.into();
        let Some(flow) = self.flows.iter_mut().find(|flow| flow.id() == flow_id) else {
            return false;
        };
        flow.set_name(name);
        self.mark_dirty();
        true
    }

    /// Removes a flow and clears the selection. The last remaining flow cannot be removed; when
    /// the active flow goes the first remaining flow becomes active.
    pub fn delete_flow(&mut self, flow_id: &FlowId) -> bool {
        if self.flows.len() <= 1 {
            tracing::debug!(flow_id = %flow_id, "refusing to delete the last flow");
            return false;
        }
        let Some(index) = self.flows.iter().position(|flow| flow.id() == flow_id) else {
            return false;
        };
        self.flows.remove(index);
        if index == self.active {
            self.active = 0;
            self.drag_port = None;
        } else if index < self.active {
            self.active -= 1;
        }
        self.clear_selection();
        self.mark_dirty();
        tracing::info!(flow_id = %flow_id, "flow deleted");
        true
    }

    // ---- nodes -------------------------------------------------------------------------------

    /// Adds a node of `kind` at a random position with random health and selects it.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let x = RANDOM_PLACEMENT_ORIGIN + self.rng.random_range(0.0..RANDOM_PLACEMENT_SPREAD);
        let y = RANDOM_PLACEMENT_ORIGIN + self.rng.random_range(0.0..RANDOM_PLACEMENT_SPREAD);
        let name = format!("New {kind}");
        self.insert_node(kind, name, x, y)
    }

    /// Adds a node of `kind` at a canvas position (palette drop).
    pub fn add_node_at(&mut self, kind: NodeKind, x: f64, y: f64) -> NodeId {
        self.insert_node(kind, kind.capitalized(), x, y)
    }

    fn insert_node(&mut self, kind: NodeKind, name: String, x: f64, y: f64) -> NodeId {
        let node_id = self.fresh_node_id();
        let health = self.random_health();
        let node = Node::new(node_id.clone(), kind, name, x, y, health);
        tracing::info!(node_id = %node_id, kind = %kind, x, y, "node added");
        self.active_flow_mut().nodes_mut().push(node);
        self.selected_node_id = Some(node_id.clone());
        self.mark_dirty();
        node_id
    }

    fn fresh_node_id(&mut self) -> NodeId {
        loop {
            if let Ok(node_id) = NodeId::new(self.fresh_id("node")) {
                return node_id;
            }
        }
    }

    fn fresh_flow_id(&mut self) -> FlowId {
        loop {
            if let Ok(flow_id) = FlowId::new(self.fresh_id("flow")) {
                return flow_id;
            }
        }
    }

    fn fresh_link_id(&mut self) -> LinkId {
        loop {
            if let Ok(link_id) = LinkId::new(self.fresh_id("link")) {
                return link_id;
            }
        }
    }

    /// Moves a node to a new canvas position. Unknown ids are ignored.
    pub fn drag_node(&mut self, node_id: &NodeId, x: f64, y: f64) -> bool {
        let Some(node) = self.active_flow_mut().node_mut(node_id) else {
            return false;
        };
        node.set_position(x, y);
        tracing::debug!(node_id = %node_id, x, y, "node moved");
        self.mark_dirty();
        true
    }

    /// Applies a partial update to a node of the active flow. Unknown ids are ignored.
    pub fn update_node(&mut self, node_id: &NodeId, patch: NodePatch) -> bool {
        let Some(node) = self.active_flow_mut().node_mut(node_id) else {
            return false;
        };
        let NodePatch {
            name,
            kind,
            x,
            y,
            health,
            status,
            properties,
            input,
            output,
        } = patch;
        if let Some(name) = name {
            node.set_name(name);
        }
        if let Some(kind) = kind {
            node.set_kind(kind);
        }
        if x.is_some() || y.is_some() {
            let (x, y) = (x.unwrap_or(node.x()), y.unwrap_or(node.y()));
            node.set_position(x, y);
        }
        if let Some(health) = health {
            node.set_health(health);
        }
        if let Some(status) = status {
            node.set_status(status);
        }
        if let Some(properties) = properties {
            node.properties_mut().extend(properties);
        }
        if let Some(input) = input {
            node.set_input(input);
        }
        if let Some(output) = output {
            node.set_output(output);
        }
        tracing::debug!(node_id = %node_id, "node updated");
        self.mark_dirty();
        true
    }

    /// Removes a node and every link that touches it.
    pub fn delete_node(&mut self, node_id: &NodeId) -> bool {
        let flow = self.active_flow_mut();
        let before = flow.nodes().len();
        flow.nodes_mut().retain(|node| node.id() != node_id);
        if flow.nodes().len() == before {
            return false;
        }
        let links_before = flow.links().len();
        flow.links_mut().retain(|link| !link.touches(node_id));
        let removed_links = links_before - flow.links().len();

        if self.selected_node_id.as_ref() == Some(node_id) {
            self.selected_node_id = None;
        }
        if let Some(link_id) = self.selected_link_id.clone() {
            if !self.active_flow().contains_link(&link_id) {
                self.selected_link_id = None;
            }
        }
        if self.drag_port.as_ref().is_some_and(|drag| &drag.node_id == node_id) {
            self.drag_port = None;
        }
        tracing::info!(node_id = %node_id, removed_links, "node deleted");
        self.mark_dirty();
        true
    }

    // ---- selection ---------------------------------------------------------------------------

    /// Selects a node, or clears the node selection with `None`. The link selection is untouched.
    pub fn select_node(&mut self, node_id: Option<&NodeId>) -> bool {
        match node_id {
            None => {
                self.selected_node_id = None;
                true
            }
            Some(node_id) if self.active_flow().contains_node(node_id) => {
                self.selected_node_id = Some(node_id.clone());
                true
            }
            Some(_) => false,
        }
    }

    /// Selects a link, or clears the link selection with `None`. The node selection is untouched.
    pub fn select_link(&mut self, link_id: Option<&LinkId>) -> bool {
        match link_id {
            None => {
                self.selected_link_id = None;
                true
            }
            Some(link_id) if self.active_flow().contains_link(link_id) => {
                self.selected_link_id = Some(link_id.clone());
                true
            }
            Some(_) => false,
        }
    }

    pub fn clear_selections(&mut self) {
        self.clear_selection();
    }

    // ---- links -------------------------------------------------------------------------------

    pub fn delete_link(&mut self, link_id: &LinkId) -> bool {
        let flow = self.active_flow_mut();
        let before = flow.links().len();
        flow.links_mut().retain(|link| link.id() != link_id);
        if flow.links().len() == before {
            return false;
        }
        if self.selected_link_id.as_ref() == Some(link_id) {
            self.selected_link_id = None;
        }
        tracing::info!(link_id = %link_id, "link deleted");
        self.mark_dirty();
        true
    }

    /// Starts a connection from an output port. Input ports cannot start a connection.
    pub fn begin_port_connect(&mut self, node_id: &NodeId, port: usize, side: PortSide) -> bool {
        if side != PortSide::Output {
            return false;
        }
        tracing::debug!(node_id = %node_id, port, "port drag started");
        self.drag_port = Some(DragPort {
            node_id: node_id.clone(),
            port,
        });
        true
    }

    /// Abandons a pending connection without creating a link.
    pub fn cancel_port_connect(&mut self) {
        if self.drag_port.take().is_some() {
            tracing::debug!("port drag cancelled");
        }
    }

    /// Checks whether the pending connection may end on `target_node`'s input `target_port`.
    pub fn check_connection(
        &self,
        target_node: &NodeId,
        target_port: usize,
    ) -> Result<(), ConnectRejection> {
        let Some(drag) = &self.drag_port else {
            return Err(ConnectRejection::NoPendingConnection);
        };
        if &drag.node_id == target_node {
            return Err(ConnectRejection::SelfLoop);
        }
        let flow = self.active_flow();
        let source = flow
            .node(&drag.node_id)
            .ok_or_else(|| ConnectRejection::UnknownNode {
                node_id: drag.node_id.clone(),
            })?;
        let target = flow
            .node(target_node)
            .ok_or_else(|| ConnectRejection::UnknownNode {
                node_id: target_node.clone(),
            })?;
        check_port(source, PortSide::Output, drag.port)?;
        check_port(target, PortSide::Input, target_port)?;

        let source_ref = drag.port_ref();
        let target_ref = PortRef::new(target_node.clone(), target_port);
        if let Some(existing) = flow
            .links()
            .iter()
            .find(|link| link.connects(&source_ref, &target_ref))
        {
            return Err(ConnectRejection::DuplicateLink {
                link_id: existing.id().clone(),
            });
        }
        Ok(())
    }

    /// Finishes a pending connection on an input port.
    ///
    /// Releasing on an output port, or with nothing pending, does nothing. Otherwise the pending
    /// drag is consumed whether or not a link is created.
    pub fn end_port_connect(
        &mut self,
        node_id: &NodeId,
        port: usize,
        side: PortSide,
    ) -> Option<LinkId> {
        if side != PortSide::Input {
            return None;
        }
        let drag = self.drag_port.clone()?;
        if let Err(rejection) = self.check_connection(node_id, port) {
            tracing::debug!(%rejection, "connection rejected");
            self.drag_port = None;
            return None;
        }
        self.drag_port = None;

        let link_id = self.fresh_link_id();
        let link = Link::new(
            link_id.clone(),
            drag.port_ref(),
            PortRef::new(node_id.clone(), port),
        );
        tracing::info!(
            link_id = %link_id,
            source = %link.source(),
            target = %link.target(),
            "link created"
        );
        self.active_flow_mut().links_mut().push(link);
        self.mark_dirty();
        Some(link_id)
    }

    // ---- persistence -------------------------------------------------------------------------

    /// Acknowledges the current state as saved.
    pub fn save(&mut self) {
        tracing::info!(flow_id = %self.active_flow_id(), "saved");
        self.has_changes = false;
    }

    /// Snapshot of the active flow's nodes and links for export.
    pub fn export_active_flow(&self) -> ExportDocument {
        ExportDocument::from_flow(self.active_flow())
    }

    /// Parses `text` and appends its nodes and links to the active flow.
    pub fn import_json(&mut self, text: &str) -> Result<ImportSummary, ImportError> {
        let batch = store::parse_import(text)?;
        self.import_batch(batch)
    }

    /// Appends an already parsed batch to the active flow.
    ///
    /// Nothing is applied when any id collides with the flow or repeats inside the batch.
    pub fn import_batch(&mut self, batch: ImportBatch) -> Result<ImportSummary, ImportError> {
        let flow = self.active_flow();
        let mut node_ids: HashSet<&str> = flow.nodes().iter().map(|n| n.id().as_str()).collect();
        for imported in &batch.nodes {
            if !node_ids.insert(imported.node.id().as_str()) {
                return Err(ImportError::DuplicateNode {
                    id: imported.node.id().to_string(),
                });
            }
        }
        let mut link_ids: HashSet<&str> = flow.links().iter().map(|l| l.id().as_str()).collect();
        for link in &batch.links {
            if !link_ids.insert(link.id().as_str()) {
                return Err(ImportError::DuplicateLink {
                    id: link.id().to_string(),
                });
            }
        }

        let ImportBatch { nodes, links } = batch;
        let summary = ImportSummary {
            nodes: nodes.len(),
            links: links.len(),
        };
        let mut prepared = Vec::with_capacity(nodes.len());
        for imported in nodes {
            let mut node = imported.node;
            if !imported.health_given {
                node.set_health(self.random_health());
            }
            prepared.push(node);
        }

        let flow = self.active_flow_mut();
        flow.nodes_mut().extend(prepared);
        flow.links_mut().extend(links);
        self.clear_selection();
        self.mark_dirty();
        tracing::info!(nodes = summary.nodes, links = summary.links, "import applied");
        Ok(summary)
    }

    // ---- canvas ------------------------------------------------------------------------------

    pub fn zoom_in(&mut self) -> Zoom {
        self.zoom = self.zoom.stepped_in();
        self.zoom
    }

    pub fn zoom_out(&mut self) -> Zoom {
        self.zoom = self.zoom.stepped_out();
        self.zoom
    }

    /// Empties the active flow, resets zoom and marks the state as saved.
    pub fn reset_canvas(&mut self) {
        let flow = self.active_flow_mut();
        flow.nodes_mut().clear();
        flow.links_mut().clear();
        self.clear_selection();
        self.drag_port = None;
        self.zoom = Zoom::DEFAULT;
        self.has_changes = false;
        tracing::info!(flow_id = %self.active_flow_id(), "canvas reset");
    }

    /// Removes every node (and so every link) from the active flow. An empty flow is left as is.
    pub fn clear_all_nodes(&mut self) -> bool {
        if self.active_flow().nodes().is_empty() {
            return false;
        }
        let flow = self.active_flow_mut();
        flow.nodes_mut().clear();
        flow.links_mut().clear();
        self.clear_selection();
        self.drag_port = None;
        self.mark_dirty();
        tracing::info!(flow_id = %self.active_flow_id(), "all nodes cleared");
        true
    }
}

fn check_port(node: &Node, side: PortSide, port: usize) -> Result<(), ConnectRejection> {
    let count = node.port_count(side);
    if port < count {
        Ok(())
    } else {
        Err(ConnectRejection::PortOutOfRange {
            node_id: node.id().clone(),
            side,
            port,
            count,
        })
    }
}

fn initial_flow() -> Flow {
    match FlowId::new("flow_1") {
        Ok(flow_id) => Flow::new(flow_id, "Flow 1"),
        Err(_) => unreachable!("static flow id is valid"),
    }
}

#[cfg(test)]
mod tests;
