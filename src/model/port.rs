// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

/// Which side of a node a port sits on. Outputs start connections, inputs receive them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PortSide {
    Input,
    Output,
}

impl PortSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }

    fn default_label(self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Output => "Output",
        }
    }
}

impl fmt::Display for PortSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePortSideError {
    value: String,
}

impl fmt::Display for ParsePortSideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown port side '{}'", self.value)
    }
}

impl std::error::Error for ParsePortSideError {}

impl FromStr for PortSide {
    type Err = ParsePortSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(Self::Input),
            "output" => Ok(Self::Output),
            other => Err(ParsePortSideError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Port declaration for one side of a node.
///
/// An absent spec and a boolean spec both mean a single port; a label list declares one port
/// per label, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSpec {
    Flag(bool),
    Labels(Vec<String>),
}

/// Number of addressable ports declared by `spec`.
pub fn port_count(spec: Option<&PortSpec>) -> usize {
    match spec {
        Some(PortSpec::Labels(labels)) => labels.len(),
        Some(PortSpec::Flag(_)) | None => 1,
    }
}

/// Display label for port `index`, falling back to the side name for implicit ports.
pub fn port_label(spec: Option<&PortSpec>, side: PortSide, index: usize) -> Option<String> {
    if index >= port_count(spec) {
        return None;
    }
    match spec {
        Some(PortSpec::Labels(labels)) => labels.get(index).cloned(),
        Some(PortSpec::Flag(_)) | None => Some(side.default_label().to_owned()),
    }
}
