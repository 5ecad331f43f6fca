// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::ids::NodeId;
use super::port::{port_count, PortSide, PortSpec};

pub const MAX_HEALTH: u8 = 100;

/// Free-form node configuration, keyed by property name.
pub type NodeProperties = BTreeMap<String, Value>;

/// The closed set of component kinds a node can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Server,
    Database,
    Network,
    Service,
    Api,
    Storage,
    Inject,
    Debug,
    Function,
    Change,
    Switch,
    Template,
    Mqtt,
    Http,
    File,
    Rbe,
    Serial,
    Json,
    Split,
    Delay,
    Link,
}

impl NodeKind {
    pub const ALL: [NodeKind; 21] = [
        Self::Server,
        Self::Database,
        Self::Network,
        Self::Service,
        Self::Api,
        Self::Storage,
        Self::Inject,
        Self::Debug,
        Self::Function,
        Self::Change,
        Self::Switch,
        Self::Template,
        Self::Mqtt,
        Self::Http,
        Self::File,
        Self::Rbe,
        Self::Serial,
        Self::Json,
        Self::Split,
        Self::Delay,
        Self::Link,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Database => "database",
            Self::Network => "network",
            Self::Service => "service",
            Self::Api => "api",
            Self::Storage => "storage",
            Self::Inject => "inject",
            Self::Debug => "debug",
            Self::Function => "function",
            Self::Change => "change",
            Self::Switch => "switch",
            Self::Template => "template",
            Self::Mqtt => "mqtt",
            Self::Http => "http",
            Self::File => "file",
            Self::Rbe => "rbe",
            Self::Serial => "serial",
            Self::Json => "json",
            Self::Split => "split",
            Self::Delay => "delay",
            Self::Link => "link",
        }
    }

    /// The type name with its first letter upper-cased (`"server"` -> `"Server"`).
    pub fn capitalized(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn is_infrastructure(self) -> bool {
        matches!(
            self,
            Self::Server | Self::Database | Self::Network | Self::Service | Self::Api | Self::Storage
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeKindError {
    value: String,
}

impl ParseNodeKindError {
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ParseNodeKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown node type '{}'", self.value)
    }
}

impl std::error::Error for ParseNodeKindError {}

impl FromStr for NodeKind {
    type Err = ParseNodeKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseNodeKindError {
                value: s.to_owned(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeStatus {
    #[default]
    Healthy,
    Warning,
    Critical,
    Unknown,
}

impl NodeStatus {
    pub const ALL: [NodeStatus; 4] = [Self::Healthy, Self::Warning, Self::Critical, Self::Unknown];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        }
    }

    /// The next status in display order, wrapping around.
    pub fn cycled(self) -> Self {
        match self {
            Self::Healthy => Self::Warning,
            Self::Warning => Self::Critical,
            Self::Critical => Self::Unknown,
            Self::Unknown => Self::Healthy,
        }
    }
}

impl FromStr for NodeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown node status '{s}'"))
    }
}

/// A placed component on a flow canvas.
///
/// `x`/`y` are the top-left corner in canvas space. Health is always present and always within
/// `0..=MAX_HEALTH`; every setter clamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    name: String,
    x: f64,
    y: f64,
    health: u8,
    status: NodeStatus,
    properties: NodeProperties,
    input: Option<PortSpec>,
    output: Option<PortSpec>,
}

impl Node {
    pub fn new(
        id: NodeId,
        kind: NodeKind,
        name: impl Into<String>,
        x: f64,
        y: f64,
        health: u8,
    ) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            x,
            y,
            health: health.min(MAX_HEALTH),
            status: NodeStatus::Healthy,
            properties: NodeProperties::new(),
            input: None,
            output: None,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn health(&self) -> u8 {
        self.health
    }

    pub fn set_health(&mut self, health: u8) {
        self.health = health.min(MAX_HEALTH);
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn set_status(&mut self, status: NodeStatus) {
        self.status = status;
    }

    pub fn properties(&self) -> &NodeProperties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut NodeProperties {
        &mut self.properties
    }

    pub fn input(&self) -> Option<&PortSpec> {
        self.input.as_ref()
    }

    pub fn set_input(&mut self, input: Option<PortSpec>) {
        self.input = input;
    }

    pub fn output(&self) -> Option<&PortSpec> {
        self.output.as_ref()
    }

    pub fn set_output(&mut self, output: Option<PortSpec>) {
        self.output = output;
    }

    pub fn port_spec(&self, side: PortSide) -> Option<&PortSpec> {
        match side {
            PortSide::Input => self.input(),
            PortSide::Output => self.output(),
        }
    }

    pub fn port_count(&self, side: PortSide) -> usize {
        port_count(self.port_spec(side))
    }
}
