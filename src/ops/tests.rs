// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};

use crate::model::sample::pipeline_flow;
use crate::model::{LinkId, NodeId, NodeKind, NodeStatus, PortSide, PortSpec};
use crate::store::ImportError;

use super::{ConnectRejection, Editor, NodePatch, Zoom};

fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

fn lid(value: &str) -> LinkId {
    LinkId::new(value).expect("link id")
}

fn assert_health_invariant(editor: &Editor) {
    for flow in editor.flows() {
        for node in flow.nodes() {
            assert!(node.health() <= 100, "{} has health {}", node.id(), node.health());
        }
    }
}

#[fixture]
fn editor() -> Editor {
    Editor::with_seed(7)
}

#[fixture]
fn pipeline() -> Editor {
    Editor::from_flow(pipeline_flow(), Some(7))
}

#[rstest]
fn new_editor_has_one_clean_flow(editor: Editor) {
    assert_eq!(editor.flows().len(), 1);
    assert_eq!(editor.active_flow_id().as_str(), "flow_1");
    assert_eq!(editor.active_flow().name(), "Flow 1");
    assert!(editor.active_flow().nodes().is_empty());
    assert!(!editor.has_changes());
    assert_eq!(editor.zoom(), Zoom::DEFAULT);
}

#[rstest]
fn add_flow_appends_numbered_flow_and_activates_it(mut editor: Editor) {
    let second = editor.add_flow();
    let third = editor.add_flow();

    assert_eq!(editor.flows().len(), 3);
    assert_eq!(editor.active_flow_id(), &third);
    assert_eq!(editor.flow(&second).expect("second").name(), "Flow 2");
    assert_eq!(editor.active_flow().name(), "Flow 3");
    assert!(second.as_str().starts_with("flow_"));
    assert_ne!(second, third);
    assert!(editor.has_changes());
}

#[rstest]
fn delete_last_flow_is_rejected(mut editor: Editor) {
    let only = editor.active_flow_id().clone();
    assert!(!editor.delete_flow(&only));
    assert_eq!(editor.flows().len(), 1);
    assert!(!editor.has_changes());
}

#[rstest]
fn deleting_active_flow_falls_back_to_first(mut editor: Editor) {
    let first = editor.active_flow_id().clone();
    let second = editor.add_flow();
    let node_id = editor.add_node(NodeKind::Api);
    editor.select_node(Some(&node_id));

    assert!(editor.delete_flow(&second));
    assert_eq!(editor.active_flow_id(), &first);
    assert_eq!(editor.selected_node_id(), None);
    assert!(editor.flow(&second).is_none());
}

#[rstest]
fn deleting_inactive_flow_keeps_active(mut editor: Editor) {
    let first = editor.active_flow_id().clone();
    let second = editor.add_flow();
    let node_id = editor.add_node(NodeKind::Api);
    editor.select_node(Some(&node_id));

    assert!(editor.delete_flow(&first));
    assert_eq!(editor.active_flow_id(), &second);
    assert_eq!(editor.active_flow_index(), 0);
    assert_eq!(editor.selected_node_id(), None);
}

#[rstest]
fn select_flow_ignores_unknown_ids(mut editor: Editor) {
    let first = editor.active_flow_id().clone();
    editor.add_flow();
    assert!(editor.select_flow(&first));
    assert_eq!(editor.active_flow_id(), &first);
    let unknown = crate::model::FlowId::new("nope").expect("flow id");
    assert!(!editor.select_flow(&unknown));
    assert_eq!(editor.active_flow_id(), &first);
}

#[rstest]
fn rename_flow_marks_dirty(mut editor: Editor) {
    let flow_id = editor.active_flow_id().clone();
    assert!(editor.rename_flow(&flow_id, "Ingest"));
    assert_eq!(editor.active_flow().name(), "Ingest");
    assert!(editor.has_changes());
}

#[rstest]
fn add_node_places_randomly_with_valid_health(mut editor: Editor) {
    for kind in NodeKind::ALL {
        let node_id = editor.add_node(kind);
        let node = editor.active_flow().node(&node_id).expect("node");
        assert_eq!(node.kind(), kind);
        assert_eq!(node.name(), format!("New {kind}"));
        assert!((100.0..300.0).contains(&node.x()));
        assert!((100.0..300.0).contains(&node.y()));
        assert_eq!(node.status(), NodeStatus::Healthy);
        assert!(node.properties().is_empty());
    }
    assert_health_invariant(&editor);
    assert!(editor.has_changes());
}

#[rstest]
fn add_node_at_uses_given_position_and_capitalized_name(mut editor: Editor) {
    let node_id = editor.add_node_at(NodeKind::Database, 12.0, 34.0);
    let node = editor.active_flow().node(&node_id).expect("node");
    assert_eq!((node.x(), node.y()), (12.0, 34.0));
    assert_eq!(node.name(), "Database");
    assert_eq!(editor.selected_node_id(), Some(&node_id));
}

#[test]
fn seeded_editors_generate_matching_suffixes() {
    let mut a = Editor::with_seed(99);
    let mut b = Editor::with_seed(99);
    let a_id = a.add_node(NodeKind::Server);
    let b_id = b.add_node(NodeKind::Server);
    let suffix = |id: &NodeId| id.as_str().rsplit('_').next().map(str::to_owned);
    assert_eq!(suffix(&a_id), suffix(&b_id));

    let a_node = a.active_flow().node(&a_id).expect("node");
    let b_node = b.active_flow().node(&b_id).expect("node");
    assert_eq!(a_node.health(), b_node.health());
    assert_eq!((a_node.x(), a_node.y()), (b_node.x(), b_node.y()));
}

#[rstest]
fn drag_node_moves_and_ignores_unknown(mut pipeline: Editor) {
    assert!(pipeline.drag_node(&nid("n_http"), 1.0, 2.0));
    let node = pipeline.active_flow().node(&nid("n_http")).expect("node");
    assert_eq!((node.x(), node.y()), (1.0, 2.0));
    assert!(pipeline.has_changes());

    assert!(!pipeline.drag_node(&nid("ghost"), 1.0, 2.0));
}

#[rstest]
fn update_node_applies_only_given_fields_and_merges_properties(mut pipeline: Editor) {
    let server = nid("n_server");
    let mut properties = crate::model::NodeProperties::new();
    properties.insert("port".to_owned(), serde_json::json!(8080));

    assert!(pipeline.update_node(
        &server,
        NodePatch {
            name: Some("Gateway".to_owned()),
            health: Some(250),
            properties: Some(properties),
            output: Some(Some(PortSpec::Labels(vec!["a".into(), "b".into()]))),
            ..NodePatch::default()
        },
    ));

    let node = pipeline.active_flow().node(&server).expect("node");
    assert_eq!(node.name(), "Gateway");
    assert_eq!(node.health(), 100);
    assert_eq!(node.kind(), NodeKind::Server);
    assert_eq!((node.x(), node.y()), (40.0, 272.0));
    assert_eq!(node.properties()["host"], serde_json::json!("10.0.0.4"));
    assert_eq!(node.properties()["port"], serde_json::json!(8080));
    assert_eq!(node.port_count(PortSide::Output), 2);

    assert!(pipeline.update_node(
        &server,
        NodePatch {
            x: Some(5.0),
            ..NodePatch::default()
        },
    ));
    let node = pipeline.active_flow().node(&server).expect("node");
    assert_eq!((node.x(), node.y()), (5.0, 272.0));

    assert!(!pipeline.update_node(&nid("ghost"), NodePatch::default()));
}

#[rstest]
fn delete_node_cascades_links_and_clears_selection(mut pipeline: Editor) {
    let switch = nid("n_switch");
    pipeline.select_link(Some(&lid("l_switch_http")));
    assert!(pipeline.delete_node(&switch));

    let flow = pipeline.active_flow();
    assert!(flow.node(&switch).is_none());
    assert!(flow.links().iter().all(|link| !link.touches(&switch)));
    assert_eq!(flow.links().len(), 1);
    assert_eq!(pipeline.selected_link_id(), None);

    assert!(!pipeline.delete_node(&switch));
}

#[rstest]
fn node_and_link_selection_are_independent(mut pipeline: Editor) {
    assert!(pipeline.select_link(Some(&lid("l_switch_http"))));
    assert!(pipeline.select_node(Some(&nid("n_http"))));
    assert_eq!(pipeline.selected_node().map(|n| n.name()), Some("Upload"));
    assert_eq!(pipeline.selected_link_id(), Some(&lid("l_switch_http")));

    assert!(pipeline.select_link(Some(&lid("l_server_db"))));
    assert_eq!(pipeline.selected_node_id(), Some(&nid("n_http")));

    let added = pipeline.add_node(NodeKind::Api);
    assert_eq!(pipeline.selected_node_id(), Some(&added));
    assert_eq!(pipeline.selected_link_id(), Some(&lid("l_server_db")));

    assert!(pipeline.select_link(None));
    assert_eq!(pipeline.selected_node_id(), Some(&added));
    assert!(pipeline.select_node(Some(&nid("n_http"))));

    assert!(!pipeline.select_node(Some(&nid("ghost"))));
    assert_eq!(pipeline.selected_node_id(), Some(&nid("n_http")));

    assert!(pipeline.select_node(None));
    assert_eq!(pipeline.selected_node_id(), None);
}

#[rstest]
fn delete_link_removes_only_that_link(mut pipeline: Editor) {
    let before = pipeline.active_flow().links().len();
    assert!(pipeline.delete_link(&lid("l_server_db")));
    assert_eq!(pipeline.active_flow().links().len(), before - 1);
    assert!(!pipeline.delete_link(&lid("l_server_db")));
}

#[rstest]
fn connect_from_output_to_input_creates_one_link(mut pipeline: Editor) {
    let http = nid("n_http");
    let db = nid("n_db");
    assert!(pipeline.begin_port_connect(&http, 0, PortSide::Output));
    assert!(pipeline.check_connection(&db, 0).is_ok());

    let link_id = pipeline
        .end_port_connect(&db, 0, PortSide::Input)
        .expect("link created");
    assert!(pipeline.drag_port().is_none());

    let link = pipeline.active_flow().link(&link_id).expect("link");
    assert_eq!(link.source().to_string(), "n_http:0");
    assert_eq!(link.target().to_string(), "n_db:0");
    assert!(link_id.as_str().starts_with("link_"));
}

#[rstest]
fn input_ports_cannot_start_a_connection(mut pipeline: Editor) {
    assert!(!pipeline.begin_port_connect(&nid("n_http"), 0, PortSide::Input));
    assert!(pipeline.drag_port().is_none());
}

#[rstest]
fn releasing_on_an_output_port_keeps_the_pending_drag(mut pipeline: Editor) {
    pipeline.begin_port_connect(&nid("n_http"), 0, PortSide::Output);
    assert_eq!(
        pipeline.end_port_connect(&nid("n_db"), 0, PortSide::Output),
        None
    );
    assert!(pipeline.drag_port().is_some());
}

#[rstest]
fn end_without_pending_drag_is_noop(mut pipeline: Editor) {
    let before = pipeline.active_flow().links().len();
    assert_eq!(pipeline.end_port_connect(&nid("n_db"), 0, PortSide::Input), None);
    assert_eq!(pipeline.active_flow().links().len(), before);
    assert!(!pipeline.has_changes());
}

#[rstest]
#[case::self_loop("n_http", 0, "n_http", 0)]
#[case::duplicate("n_inject", 0, "n_switch", 0)]
#[case::source_port_out_of_range("n_switch", 2, "n_db", 0)]
#[case::target_port_out_of_range("n_http", 0, "n_db", 1)]
#[case::unknown_target("n_http", 0, "ghost", 0)]
#[case::unknown_source("ghost", 0, "n_db", 0)]
fn invalid_connections_are_discarded(
    mut pipeline: Editor,
    #[case] source: &str,
    #[case] source_port: usize,
    #[case] target: &str,
    #[case] target_port: usize,
) {
    let before = pipeline.active_flow().links().to_vec();
    pipeline.begin_port_connect(&nid(source), source_port, PortSide::Output);
    assert!(pipeline.check_connection(&nid(target), target_port).is_err());
    assert_eq!(
        pipeline.end_port_connect(&nid(target), target_port, PortSide::Input),
        None
    );
    assert_eq!(pipeline.active_flow().links(), before.as_slice());
    assert!(pipeline.drag_port().is_none());
    assert!(!pipeline.has_changes());
}

#[rstest]
fn check_connection_names_the_reason(mut pipeline: Editor) {
    assert_eq!(
        pipeline.check_connection(&nid("n_db"), 0),
        Err(ConnectRejection::NoPendingConnection)
    );

    pipeline.begin_port_connect(&nid("n_inject"), 0, PortSide::Output);
    assert_eq!(
        pipeline.check_connection(&nid("n_switch"), 0),
        Err(ConnectRejection::DuplicateLink {
            link_id: lid("l_inject_switch")
        })
    );
    assert_eq!(
        pipeline.check_connection(&nid("n_inject"), 0),
        Err(ConnectRejection::SelfLoop)
    );
    assert!(matches!(
        pipeline.check_connection(&nid("n_db"), 3),
        Err(ConnectRejection::PortOutOfRange {
            side: PortSide::Input,
            port: 3,
            count: 1,
            ..
        })
    ));
}

#[rstest]
fn labelled_switch_output_connects_from_second_port(mut pipeline: Editor) {
    pipeline.begin_port_connect(&nid("n_switch"), 1, PortSide::Output);
    let link_id = pipeline
        .end_port_connect(&nid("n_db"), 0, PortSide::Input)
        .expect("link");
    let link = pipeline.active_flow().link(&link_id).expect("link");
    assert_eq!(link.source().port(), 1);
}

#[rstest]
fn cancel_port_connect_clears_drag(mut pipeline: Editor) {
    pipeline.begin_port_connect(&nid("n_http"), 0, PortSide::Output);
    pipeline.cancel_port_connect();
    assert!(pipeline.drag_port().is_none());
}

#[rstest]
fn deleting_drag_source_cancels_pending_connection(mut pipeline: Editor) {
    pipeline.begin_port_connect(&nid("n_http"), 0, PortSide::Output);
    pipeline.delete_node(&nid("n_http"));
    assert!(pipeline.drag_port().is_none());
}

#[rstest]
fn zoom_steps_are_clamped(mut editor: Editor) {
    for _ in 0..20 {
        editor.zoom_in();
    }
    assert_eq!(editor.zoom(), Zoom::MAX);
    assert_eq!(editor.zoom().factor(), 2.0);

    for _ in 0..30 {
        editor.zoom_out();
    }
    assert_eq!(editor.zoom(), Zoom::MIN);
    assert_eq!(editor.zoom().factor(), 0.5);
    assert_eq!(editor.zoom().to_string(), "50%");
}

#[rstest]
fn zoom_round_trip_returns_to_start(mut editor: Editor) {
    editor.zoom_in();
    editor.zoom_in();
    editor.zoom_out();
    editor.zoom_out();
    assert_eq!(editor.zoom(), Zoom::DEFAULT);
}

#[rstest]
fn save_clears_dirty_flag(mut editor: Editor) {
    editor.add_node(NodeKind::Api);
    assert!(editor.has_changes());
    editor.save();
    assert!(!editor.has_changes());
}

#[rstest]
fn reset_canvas_empties_flow_and_restores_defaults(mut pipeline: Editor) {
    pipeline.zoom_in();
    pipeline.select_node(Some(&nid("n_http")));
    pipeline.drag_node(&nid("n_http"), 0.0, 0.0);

    pipeline.reset_canvas();

    assert!(pipeline.active_flow().nodes().is_empty());
    assert!(pipeline.active_flow().links().is_empty());
    assert_eq!(pipeline.selected_node_id(), None);
    assert_eq!(pipeline.zoom(), Zoom::DEFAULT);
    assert!(!pipeline.has_changes());
}

#[rstest]
fn clear_all_nodes_only_acts_on_non_empty_flow(mut pipeline: Editor, mut editor: Editor) {
    assert!(!editor.clear_all_nodes());
    assert!(!editor.has_changes());

    assert!(pipeline.clear_all_nodes());
    assert!(pipeline.active_flow().nodes().is_empty());
    assert!(pipeline.active_flow().links().is_empty());
    assert!(pipeline.has_changes());
}

#[rstest]
fn import_appends_and_assigns_missing_health(mut editor: Editor) {
    editor.select_node(None);
    let summary = editor
        .import_json(
            r#"{
  "nodes": [
    { "id": "a", "type": "server", "x": 0, "y": 0 },
    { "id": "b", "type": "database", "x": 10, "y": 10, "health": 42 }
  ],
  "links": [{ "id": "l", "source": "a:0", "target": "b:0" }]
}"#,
        )
        .expect("import");

    assert_eq!(summary.nodes, 2);
    assert_eq!(summary.links, 1);
    assert!(editor.has_changes());
    assert_eq!(editor.active_flow().node(&nid("b")).expect("b").health(), 42);
    assert_health_invariant(&editor);
}

#[rstest]
fn import_is_all_or_nothing_on_duplicate_ids(mut pipeline: Editor) {
    let before = pipeline.active_flow().clone();

    let err = pipeline
        .import_json(r#"[{ "id": "fresh", "type": "api", "x": 0, "y": 0 },
                         { "id": "n_http", "type": "api", "x": 0, "y": 0 }]"#)
        .expect_err("duplicate");
    assert!(matches!(err, ImportError::DuplicateNode { ref id } if id == "n_http"));

    let err = pipeline
        .import_json(r#"[{ "id": "x", "type": "api", "x": 0, "y": 0 },
                         { "id": "x", "type": "api", "x": 0, "y": 0 }]"#)
        .expect_err("duplicate in batch");
    assert!(matches!(err, ImportError::DuplicateNode { .. }));

    let err = pipeline
        .import_json(r#"{ "nodes": [], "links": [{ "id": "l_server_db", "source": "a:0", "target": "b:0" }] }"#)
        .expect_err("duplicate link");
    assert!(matches!(err, ImportError::DuplicateLink { .. }));

    assert_eq!(pipeline.active_flow(), &before);
    assert!(!pipeline.has_changes());
}

#[rstest]
fn export_then_import_into_fresh_flow_round_trips(mut pipeline: Editor) {
    let json = pipeline
        .export_active_flow()
        .to_json_pretty()
        .expect("json");
    let original = pipeline.active_flow().clone();

    pipeline.add_flow();
    pipeline.import_json(&json).expect("import");

    let imported = pipeline.active_flow();
    assert_eq!(imported.nodes(), original.nodes());
    assert_eq!(imported.links(), original.links());
}

#[rstest]
fn operations_on_one_flow_leave_others_untouched(mut pipeline: Editor) {
    let first = pipeline.active_flow().clone();
    pipeline.add_flow();
    pipeline.add_node(NodeKind::Api);
    pipeline.clear_all_nodes();
    assert_eq!(pipeline.flows()[0], first);
}
