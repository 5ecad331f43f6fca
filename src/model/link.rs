// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::ids::{IdError, LinkId, NodeId};

/// Composite port reference used as a link endpoint.
///
/// Canonical format: `<node_id>:<port_index>`. Node ids cannot contain `:`, so the index is
/// always the segment after the last colon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortRef {
    node_id: NodeId,
    port: usize,
}

impl PortRef {
    pub fn new(node_id: NodeId, port: usize) -> Self {
        Self { node_id, port }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn port(&self) -> usize {
        self.port
    }

    pub fn parse(input: &str) -> Result<Self, PortRefError> {
        let (node_id_str, port_str) = input.rsplit_once(':').ok_or(PortRefError::MissingPort)?;
        if port_str.is_empty() {
            return Err(PortRefError::MissingPort);
        }
        let port = port_str
            .parse::<usize>()
            .map_err(|_| PortRefError::InvalidPort { value: port_str.to_owned() })?;
        let node_id = NodeId::new(node_id_str.to_owned()).map_err(PortRefError::InvalidNodeId)?;
        Ok(Self { node_id, port })
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node_id, self.port)
    }
}

impl FromStr for PortRef {
    type Err = PortRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortRefError {
    #[error("port reference must have the form '<node_id>:<port_index>'")]
    MissingPort,
    #[error("invalid port index '{value}'")]
    InvalidPort { value: String },
    #[error("invalid node id: {0}")]
    InvalidNodeId(IdError),
}

/// Classification tag; only affects display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinkKind {
    #[default]
    Network,
    Dependency,
    DataFlow,
}

impl LinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Dependency => "dependency",
            Self::DataFlow => "data_flow",
        }
    }
}

impl FromStr for LinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "network" => Ok(Self::Network),
            "dependency" => Ok(Self::Dependency),
            "data_flow" => Ok(Self::DataFlow),
            other => Err(format!("unknown link type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinkStatus {
    #[default]
    Active,
    Inactive,
    Error,
}

impl LinkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Error => "error",
        }
    }
}

impl FromStr for LinkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown link status '{other}'")),
        }
    }
}

/// A directed connection from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    id: LinkId,
    source: PortRef,
    target: PortRef,
    kind: LinkKind,
    status: LinkStatus,
}

impl Link {
    pub fn new(id: LinkId, source: PortRef, target: PortRef) -> Self {
        Self {
            id,
            source,
            target,
            kind: LinkKind::Network,
            status: LinkStatus::Active,
        }
    }

    pub fn new_with(
        id: LinkId,
        source: PortRef,
        target: PortRef,
        kind: LinkKind,
        status: LinkStatus,
    ) -> Self {
        Self {
            id,
            source,
            target,
            kind,
            status,
        }
    }

    pub fn id(&self) -> &LinkId {
        &self.id
    }

    pub fn source(&self) -> &PortRef {
        &self.source
    }

    pub fn target(&self) -> &PortRef {
        &self.target
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    pub fn status(&self) -> LinkStatus {
        self.status
    }

    pub fn set_status(&mut self, status: LinkStatus) {
        self.status = status;
    }

    /// Whether either endpoint references `node_id`.
    pub fn touches(&self, node_id: &NodeId) -> bool {
        self.source.node_id() == node_id || self.target.node_id() == node_id
    }

    /// Whether this link connects exactly the same two ports.
    pub fn connects(&self, source: &PortRef, target: &PortRef) -> bool {
        &self.source == source && &self.target == target
    }
}
