// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Flows contain nodes and links; links address node ports through composite references.

pub mod flow;
pub mod ids;
pub mod link;
pub mod node;
pub mod port;
pub mod sample;

pub use flow::Flow;
pub use ids::{FlowId, Id, IdError, LinkId, NodeId};
pub use link::{Link, LinkKind, LinkStatus, PortRef, PortRefError};
pub use node::{Node, NodeKind, NodeProperties, NodeStatus, ParseNodeKindError, MAX_HEALTH};
pub use port::{port_count, port_label, ParsePortSideError, PortSide, PortSpec};
