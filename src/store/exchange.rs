// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{
    Flow, Link, LinkId, LinkKind, LinkStatus, Node, NodeId, NodeKind, NodeProperties, NodeStatus,
    PortRef, PortSpec, MAX_HEALTH,
};

pub const EXPORT_FILE_NAME: &str = "graph_export.json";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("import is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected an array of nodes or an object with a `nodes` array")]
    Shape,
    #[error("invalid node at index {index}: {reason}")]
    InvalidNode { index: usize, reason: String },
    #[error("invalid link at index {index}: {reason}")]
    InvalidLink { index: usize, reason: String },
    #[error("node id `{id}` already exists")]
    DuplicateNode { id: String },
    #[error("link id `{id}` already exists")]
    DuplicateLink { id: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A validated node from an import document.
///
/// `health_given` is false when the record had no numeric health; the engine assigns one.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedNode {
    pub node: Node,
    pub health_given: bool,
}

/// Validated contents of an import document, not yet applied to any flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportBatch {
    pub nodes: Vec<ImportedNode>,
    pub links: Vec<Link>,
}

/// Parses and validates an import document.
///
/// Validation is all-or-nothing: the first bad record fails the whole document.
pub fn parse_import(text: &str) -> Result<ImportBatch, ImportError> {
    let document: Value = serde_json::from_str(text)?;
    let (nodes, links) = match document {
        Value::Array(nodes) => (nodes, Vec::new()),
        Value::Object(mut map) => {
            let nodes = match map.remove("nodes") {
                Some(Value::Array(nodes)) => nodes,
                _ => return Err(ImportError::Shape),
            };
            let links = match map.remove("links") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(links)) => links,
                Some(_) => return Err(ImportError::Shape),
            };
            (nodes, links)
        }
        _ => return Err(ImportError::Shape),
    };

    let nodes = nodes
        .iter()
        .enumerate()
        .map(|(index, record)| {
            parse_node(record).map_err(|reason| ImportError::InvalidNode { index, reason })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let links = links
        .iter()
        .enumerate()
        .map(|(index, record)| {
            parse_link(record).map_err(|reason| ImportError::InvalidLink { index, reason })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ImportBatch { nodes, links })
}

/// Reads and validates an import document from disk.
pub fn read_import(path: &Path) -> Result<ImportBatch, ImportError> {
    let text = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_import(&text)
}

fn parse_node(record: &Value) -> Result<ImportedNode, String> {
    let fields = record
        .as_object()
        .ok_or_else(|| "expected an object".to_owned())?;

    let id = required_str(fields, "id")?;
    let id = NodeId::new(id).map_err(|err| format!("invalid id `{id}`: {err}"))?;
    let kind = required_str(fields, "type")?;
    let kind: NodeKind = kind.parse().map_err(|err| format!("{err}"))?;
    let x = required_number(fields, "x")?;
    let y = required_number(fields, "y")?;

    let name = match fields.get("name") {
        None | Some(Value::Null) => kind.capitalized(),
        Some(Value::String(name)) => name.clone(),
        Some(_) => return Err("`name` must be a string".to_owned()),
    };

    let health = fields
        .get("health")
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
        .map(|value| value.round().clamp(0.0, f64::from(MAX_HEALTH)) as u8);

    let status = match fields.get("status") {
        None | Some(Value::Null) => NodeStatus::Unknown,
        Some(Value::String(status)) => status
            .parse()
            .map_err(|_| format!("unknown status `{status}`"))?,
        Some(_) => return Err("`status` must be a string".to_owned()),
    };

    let mut node = Node::new(id, kind, name, x, y, health.unwrap_or(0));
    node.set_status(status);

    match fields.get("properties") {
        None | Some(Value::Null) => {}
        Some(Value::Object(properties)) => {
            node.properties_mut()
                .extend(properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Some(_) => return Err("`properties` must be an object".to_owned()),
    }
    node.set_input(port_spec(fields, "input")?);
    node.set_output(port_spec(fields, "output")?);

    Ok(ImportedNode {
        node,
        health_given: health.is_some(),
    })
}

fn parse_link(record: &Value) -> Result<Link, String> {
    let fields = record
        .as_object()
        .ok_or_else(|| "expected an object".to_owned())?;

    let id = required_str(fields, "id")?;
    let id = LinkId::new(id).map_err(|err| format!("invalid id `{id}`: {err}"))?;
    let source = required_str(fields, "source")?;
    let source = PortRef::parse(source).map_err(|err| format!("invalid source `{source}`: {err}"))?;
    let target = required_str(fields, "target")?;
    let target = PortRef::parse(target).map_err(|err| format!("invalid target `{target}`: {err}"))?;

    let kind = match fields.get("type") {
        None | Some(Value::Null) => LinkKind::default(),
        Some(Value::String(kind)) => kind
            .parse()
            .map_err(|_| format!("unknown link type `{kind}`"))?,
        Some(_) => return Err("`type` must be a string".to_owned()),
    };
    let status = match fields.get("status") {
        None | Some(Value::Null) => LinkStatus::default(),
        Some(Value::String(status)) => status
            .parse()
            .map_err(|_| format!("unknown link status `{status}`"))?,
        Some(_) => return Err("`status` must be a string".to_owned()),
    };

    Ok(Link::new_with(id, source, target, kind, status))
}

fn required_str<'a>(fields: &'a Map<String, Value>, key: &str) -> Result<&'a str, String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing string field `{key}`"))
}

fn required_number(fields: &Map<String, Value>, key: &str) -> Result<f64, String> {
    fields
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| format!("missing numeric field `{key}`"))
}

fn port_spec(fields: &Map<String, Value>, key: &str) -> Result<Option<PortSpec>, String> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value::<PortSpecRecord>(value.clone())
            .map(|record| Some(record.into()))
            .map_err(|_| format!("`{key}` must be a boolean or a list of labels")),
    }
}

/// Port declaration as written to and read from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortSpecRecord {
    Flag(bool),
    Labels(Vec<String>),
}

impl From<PortSpecRecord> for PortSpec {
    fn from(record: PortSpecRecord) -> Self {
        match record {
            PortSpecRecord::Flag(flag) => PortSpec::Flag(flag),
            PortSpecRecord::Labels(labels) => PortSpec::Labels(labels),
        }
    }
}

impl From<&PortSpec> for PortSpecRecord {
    fn from(spec: &PortSpec) -> Self {
        match spec {
            PortSpec::Flag(flag) => PortSpecRecord::Flag(*flag),
            PortSpec::Labels(labels) => PortSpecRecord::Labels(labels.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub health: u8,
    pub status: String,
    #[serde(default)]
    pub properties: NodeProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PortSpecRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PortSpecRecord>,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id().to_string(),
            kind: node.kind().as_str().to_owned(),
            name: node.name().to_owned(),
            x: node.x(),
            y: node.y(),
            health: node.health(),
            status: node.status().as_str().to_owned(),
            properties: node.properties().clone(),
            input: node.input().map(PortSpecRecord::from),
            output: node.output().map(PortSpecRecord::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
}

impl From<&Link> for LinkRecord {
    fn from(link: &Link) -> Self {
        Self {
            id: link.id().to_string(),
            source: link.source().to_string(),
            target: link.target().to_string(),
            kind: link.kind().as_str().to_owned(),
            status: link.status().as_str().to_owned(),
        }
    }
}

/// Serializable snapshot of one flow's nodes and links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

impl ExportDocument {
    pub fn from_flow(flow: &Flow) -> Self {
        Self {
            nodes: flow.nodes().iter().map(NodeRecord::from).collect(),
            links: flow.links().iter().map(LinkRecord::from).collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Writes `document` to `dir/graph_export.json`, replacing any previous export.
///
/// The file is written next to its destination first and then renamed into place.
pub fn write_export(dir: &Path, document: &ExportDocument) -> Result<PathBuf, ExportError> {
    let mut contents = document.to_json_pretty()?;
    contents.push('\n');

    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(EXPORT_FILE_NAME);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = dir.join(format!(".flowdeck.tmp.{EXPORT_FILE_NAME}.{nanos}"));

    let write_tmp = || -> io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    };
    if let Err(source) = write_tmp() {
        let _ = fs::remove_file(&tmp_path);
        return Err(ExportError::Io {
            path: tmp_path,
            source,
        });
    }
    if let Err(source) = rename_overwrite(&tmp_path, &path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(ExportError::Io { path, source });
    }

    tracing::info!(
        path = %path.display(),
        nodes = document.nodes.len(),
        links = document.links.len(),
        "export written"
    );
    Ok(path)
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}
