// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::flow::Flow;
use super::ids::{FlowId, LinkId, NodeId};
use super::link::{Link, LinkKind, LinkStatus, PortRef};
use super::node::{Node, NodeKind, NodeStatus};
use super::port::PortSpec;

fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

fn lid(value: &str) -> LinkId {
    LinkId::new(value).expect("link id")
}

/// Sample flow used by `--demo`, tests and benches.
///
/// A small ingest pipeline: inject -> switch -> (http | debug), plus an infra pair.
pub fn pipeline_flow() -> Flow {
    let mut flow = Flow::new(FlowId::new("flow_1").expect("flow id"), "Flow 1");

    let inject = Node::new(nid("n_inject"), NodeKind::Inject, "Tick", 40.0, 48.0, 96);
    let mut switch = Node::new(nid("n_switch"), NodeKind::Switch, "Route", 280.0, 48.0, 88);
    switch.set_output(Some(PortSpec::Labels(vec!["ok".to_owned(), "err".to_owned()])));
    let http = Node::new(nid("n_http"), NodeKind::Http, "Upload", 520.0, 0.0, 71);
    let mut debug = Node::new(nid("n_debug"), NodeKind::Debug, "Trace", 520.0, 128.0, 55);
    debug.set_status(NodeStatus::Warning);

    let mut server = Node::new(nid("n_server"), NodeKind::Server, "Edge", 40.0, 272.0, 82);
    server.properties_mut().insert("host".to_owned(), "10.0.0.4".into());
    let mut database = Node::new(nid("n_db"), NodeKind::Database, "Orders", 400.0, 320.0, 34);
    database.set_status(NodeStatus::Critical);

    flow.nodes_mut().extend([inject, switch, http, debug, server, database]);

    flow.links_mut().extend([
        Link::new(lid("l_inject_switch"), pr("n_inject", 0), pr("n_switch", 0)),
        Link::new(lid("l_switch_http"), pr("n_switch", 0), pr("n_http", 0)),
        Link::new_with(
            lid("l_switch_debug"),
            pr("n_switch", 1),
            pr("n_debug", 0),
            LinkKind::DataFlow,
            LinkStatus::Error,
        ),
        Link::new_with(
            lid("l_server_db"),
            pr("n_server", 0),
            pr("n_db", 0),
            LinkKind::Dependency,
            LinkStatus::Inactive,
        ),
    ]);

    flow
}

fn pr(node: &str, port: usize) -> PortRef {
    PortRef::new(nid(node), port)
}
