// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use flowdeck::model::{
    Flow, FlowId, Link, LinkId, LinkKind, LinkStatus, Node, NodeId, NodeKind, PortRef, PortSpec,
};

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    Medium,
    LargeDense,
}

impl Case {
    pub fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::LargeDense => "large_dense",
        }
    }

    /// Grid columns, grid rows, and links fanned out from each node.
    fn shape(self) -> (usize, usize, usize) {
        match self {
            Self::Small => (4, 3, 1),
            Self::Medium => (10, 8, 2),
            Self::LargeDense => (24, 16, 3),
        }
    }
}

/// Nodes on a regular grid; each links to the next nodes in its row.
///
/// Every third node declares two labelled outputs so multi-port routing is exercised.
pub fn flow(case: Case) -> Flow {
    let (cols, rows, fan_out) = case.shape();
    let mut flow = Flow::new(FlowId::new("bench_flow").expect("flow id"), case.id());

    for row in 0..rows {
        for col in 0..cols {
            let index = row * cols + col;
            let kind = NodeKind::ALL[index % NodeKind::ALL.len()];
            let mut node = Node::new(
                node_id(index),
                kind,
                format!("{kind} {index}"),
                (col * 220) as f64,
                (row * 120) as f64,
                (index * 37 % 101) as u8,
            );
            if index % 3 == 0 {
                node.set_output(Some(PortSpec::Labels(vec![
                    "ok".to_owned(),
                    "err".to_owned(),
                ])));
            }
            flow.nodes_mut().push(node);
        }
    }

    let mut link_index = 0;
    for row in 0..rows {
        for col in 0..cols {
            let source = row * cols + col;
            for step in 1..=fan_out {
                let target_col = col + step;
                if target_col >= cols {
                    break;
                }
                let target = row * cols + target_col;
                let port = if source % 3 == 0 { step % 2 } else { 0 };
                let status = match link_index % 3 {
                    0 => LinkStatus::Active,
                    1 => LinkStatus::Inactive,
                    _ => LinkStatus::Error,
                };
                flow.links_mut().push(Link::new_with(
                    LinkId::new(format!("bench_link_{link_index:06}")).expect("link id"),
                    PortRef::new(node_id(source), port),
                    PortRef::new(node_id(target), 0),
                    LinkKind::Network,
                    status,
                ));
                link_index += 1;
            }
        }
    }

    flow
}

pub fn node_id(index: usize) -> NodeId {
    NodeId::new(format!("bench_node_{index:06}")).expect("node id")
}
