//! Integration tests for chain-viewer.
//!
//! These tests drive the full pipeline, from parsing an export document to
//! projecting and encoding views, over JSON fixtures and synthetic mappings.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use chain_viewer::analytics::compute_stats;
use chain_viewer::api::ViewerSession;
use chain_viewer::export::{
    export_to_string, project, ExportFormat, Projection, ProjectionOptions, ViewKind,
    NO_TIMESTAMP,
};
use chain_viewer::model::ConversationDocument;
use chain_viewer::overlay::{FnHooks, Overlay, OverlayHooks, OverlayStore, StoreHooks};
use chain_viewer::parser::{parse_document, DocumentParser};
use chain_viewer::reconstruction::{ordered_messages, tree_outline, TraversalMode};
use chain_viewer::search::SearchFilter;
use chain_viewer::ViewerError;
use rstest::rstest;

mod generators;

/// Get the path to a fixture file.
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Parse a fixture file into a document.
fn parse_fixture(name: &str) -> ConversationDocument {
    DocumentParser::new()
        .parse_file(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", name, e))
}

fn ordered_ids(doc: &ConversationDocument) -> Vec<&str> {
    ordered_messages(&doc.mapping)
        .iter()
        .map(|m| m.node_id)
        .collect()
}

fn sorted(mut ids: Vec<&str>) -> Vec<&str> {
    ids.sort_unstable();
    ids
}

mod parsing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_bare_export() {
        let doc = parse_fixture("branching.json");

        assert_eq!(doc.display_title(), "Rust ownership");
        assert_eq!(doc.export_date, None);
        assert_eq!(doc.mapping.len(), 7);
        assert_eq!(doc.mapping.message_nodes().count(), 5);
        assert_eq!(doc.mapping.root_id(), Some("root"));
    }

    #[test]
    fn test_parse_envelope_export() {
        let mut parser = DocumentParser::new();
        let doc = parser.parse_file(fixture_path("envelope.json")).unwrap();

        assert!(parser.stats().envelope);
        assert_eq!(doc.display_title(), "Saved chat");
        assert_eq!(doc.export_date.as_deref(), Some("2024-05-01T12:00:00.000Z"));

        // Non-text parts are kept, but only the first part is ever shown
        let message = doc.mapping.message("m2").unwrap();
        assert_eq!(message.content.parts.len(), 2);
        assert_eq!(message.first_part(), Some("General Kenobi"));
        assert_eq!(message.create_time, Some(1_714_564_805.5));
    }

    #[test]
    fn test_parse_records_dangling_children() {
        let mut parser = DocumentParser::new();
        parser.parse_file(fixture_path("branching.json")).unwrap();

        assert_eq!(parser.stats().nodes, 7);
        assert_eq!(parser.stats().message_nodes, 5);
        assert_eq!(parser.stats().dangling_children, 1);
    }

    #[test]
    fn test_missing_mapping_is_rejected() {
        let result = DocumentParser::new().parse_file(fixture_path("missing_mapping.json"));
        assert!(matches!(result, Err(ViewerError::InvalidDocument { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = DocumentParser::new().parse_file(fixture_path("does_not_exist.json"));
        assert!(matches!(result, Err(ViewerError::FileNotFound { .. })));
    }

    #[rstest]
    #[case::not_json("this is not json")]
    #[case::truncated(r#"{"mapping": {"a": "#)]
    fn test_invalid_json(#[case] input: &str) {
        let err = parse_document(input).unwrap_err();
        assert!(matches!(err, ViewerError::ParseError { .. }), "{err:?}");
        assert!(err.is_input_error());
    }

    #[rstest]
    #[case::array_root("[]")]
    #[case::null_mapping(r#"{"mapping": null}"#)]
    #[case::array_mapping(r#"{"mapping": []}"#)]
    #[case::string_mapping(r#"{"mapping": "nodes"}"#)]
    #[case::empty_envelope(r#"{"conversation": {}}"#)]
    fn test_invalid_shape(#[case] input: &str) {
        let err = parse_document(input).unwrap_err();
        assert!(matches!(err, ViewerError::InvalidDocument { .. }), "{err:?}");
    }

    #[test]
    fn test_wrongly_typed_fields_are_tolerated() {
        let mut parser = DocumentParser::new();
        let doc = parser.parse_file(fixture_path("lenient.json")).unwrap();

        assert_eq!(doc.mapping.len(), 5);
        assert_eq!(parser.stats().malformed_nodes, 1);
        assert_eq!(parser.stats().dangling_children, 0);
        assert_eq!(doc.mapping.get("root").unwrap().children, vec!["u1", "7"]);
        assert_eq!(doc.mapping.message("7").unwrap().role(), "unknown");
        assert_eq!(doc.mapping.message("plain").unwrap().first_part(), None);
        assert_eq!(doc.mapping.get("plain").unwrap().parent_id(), Some("7"));
    }

    #[test]
    fn test_empty_mapping_is_valid() {
        let doc = parse_document(r#"{"mapping": {}}"#).unwrap();
        assert!(doc.mapping.is_empty());
        assert_eq!(doc.display_title(), "Conversation Details");
    }
}

mod traversal {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ordered_by_create_time() {
        let doc = parse_fixture("branching.json");

        // a3 has no timestamp and sorts first
        assert_eq!(ordered_ids(&doc), vec!["a3", "u1", "a1", "a2", "u2"]);
    }

    #[test]
    fn test_ordered_without_root() {
        let doc = parse_fixture("no_root.json");

        assert!(TraversalMode::detect(&doc.mapping).is_degenerate());
        assert_eq!(ordered_ids(&doc), vec!["y", "x"]);
    }

    #[test]
    fn test_outline_hoists_structural_nodes() {
        let doc = parse_fixture("branching.json");
        let outline = tree_outline(&doc.mapping, &SearchFilter::all());

        assert_eq!(outline.root_id, Some("root"));
        let top: Vec<_> = outline.top_level().map(|e| (e.node_id, e.depth)).collect();
        assert_eq!(top, vec![("u1", 1)]);

        let children: Vec<_> = outline.children_of("u1").map(|c| c.node_id).collect();
        assert_eq!(children, vec!["a1", "a2"]);

        let u2 = outline.children_of("a1").next().unwrap();
        assert_eq!((u2.node_id, u2.depth), ("u2", 3));
        let below_u2: Vec<_> = outline.children_of("u2").map(|c| c.node_id).collect();
        assert_eq!(below_u2, vec!["a3"]);
        assert_eq!(outline.len(), 5);
    }

    #[test]
    fn test_non_finite_timestamp_sorts_as_missing() {
        let doc = parse_fixture("lenient.json");

        // "7" carries create_time "NaN" and sorts with the untimed messages
        assert_eq!(ordered_ids(&doc), vec!["7", "u1", "plain"]);
        let outline = tree_outline(&doc.mapping, &SearchFilter::all());
        assert_eq!(outline.node_ids(), vec!["u1", "7", "plain"]);
    }

    #[test]
    fn test_outline_flat_without_root() {
        let doc = parse_fixture("no_root.json");
        let outline = tree_outline(&doc.mapping, &SearchFilter::all());

        assert!(outline.is_degenerate());
        assert_eq!(outline.node_ids(), vec!["x", "y"]);
        assert!(outline.entries.iter().all(|e| e.depth == 0));
    }

    #[test]
    fn test_chain_keeps_every_message() {
        let mapping = generators::chain(40);
        let ordered = ordered_messages(&mapping);

        assert_eq!(ordered.len(), 40);
        assert_eq!(ordered[0].node_id, "m0");
        assert_eq!(ordered[39].node_id, "m39");
    }

    #[test]
    fn test_deep_chain_tree_projection() {
        let mapping = generators::chain(50_000);
        let projection = project(
            ViewKind::Tree,
            &mapping,
            &SearchFilter::all(),
            &Overlay::new(),
            &ProjectionOptions::default(),
        );
        let Projection::Tree { items } = &projection else {
            panic!("expected tree projection");
        };

        assert_eq!(items.len(), 50_000);
        let last = items.last().unwrap();
        assert_eq!(last.depth, 50_000);
        assert_eq!(last.parent.as_deref(), Some("m49998"));

        let json = export_to_string(&projection, ExportFormat::Json).unwrap();
        assert!(json.starts_with(r#"{"view":"tree","items":["#));
        assert_eq!(compute_stats(&mapping, &Overlay::new()).max_depth, 50_001);
    }

    #[test]
    fn test_bushy_tree_sorted() {
        let mapping = generators::bushy(3, 3);
        let ordered = ordered_messages(&mapping);

        assert_eq!(ordered.len(), 3 + 9 + 27);
        assert!(ordered
            .windows(2)
            .all(|w| w[0].message.sort_key() <= w[1].message.sort_key()));
    }
}

mod stats {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_branching_stats() {
        let doc = parse_fixture("branching.json");
        let stats = compute_stats(&doc.mapping, &Overlay::new());

        assert_eq!(stats.message_count, 5);
        // u1 forks once and u2 forks once, the dangling child included
        assert_eq!(stats.branch_count, 2);
        assert_eq!(stats.favorite_count, 0);
        assert_eq!(stats.node_count, 7);
        assert_eq!(stats.roles.user, 2);
        assert_eq!(stats.roles.assistant, 3);
        assert_eq!(stats.reasoning_messages, 1);
        assert_eq!(stats.max_depth, 5);
        assert!(!stats.degenerate);
        assert_eq!(stats.duration().map(|d| d.num_seconds()), Some(30));
    }

    #[test]
    fn test_favorites_counted_from_overlay() {
        let doc = parse_fixture("branching.json");
        let overlay = Overlay::new().with_favorites(["u1", "a2"]);

        assert_eq!(compute_stats(&doc.mapping, &overlay).favorite_count, 2);
    }

    #[test]
    fn test_degenerate_stats() {
        let doc = parse_fixture("no_root.json");
        let stats = compute_stats(&doc.mapping, &Overlay::new());

        assert!(stats.degenerate);
        assert_eq!(stats.message_count, 2);
        assert_eq!(stats.branch_count, 0);
        assert_eq!(stats.max_depth, 0);
    }

    #[test]
    fn test_stats_ignore_search() {
        let mut session = ViewerSession::open(fixture_path("branching.json")).unwrap();
        let before = session.stats();
        session.set_search("nothing matches this");

        assert_eq!(session.stats(), before);
    }
}

mod search {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case::empty("", vec!["a3", "u1", "a1", "a2", "u2"])]
    #[case::case_insensitive("RUST", vec!["u1", "a2"])]
    #[case::substring("owner", vec!["u1", "a1", "a2"])]
    #[case::raw_markup("thinking", vec!["a1"])]
    #[case::no_match("zzz", vec![])]
    fn test_list_membership(#[case] term: &str, #[case] expected: Vec<&str>) {
        let doc = parse_fixture("branching.json");
        let projection = project(
            ViewKind::List,
            &doc.mapping,
            &SearchFilter::new(term),
            &Overlay::new(),
            &ProjectionOptions::default(),
        );

        assert_eq!(projection.node_ids(), expected);
    }

    #[rstest]
    fn test_views_agree_on_membership(
        #[values("", "rust", "owner", "borrow", "?", "zzz")] term: &str,
        #[values("branching.json", "no_root.json", "envelope.json", "lenient.json")] fixture: &str,
    ) {
        let doc = parse_fixture(fixture);
        let filter = SearchFilter::new(term);
        let options = ProjectionOptions::default();
        let overlay = Overlay::new();

        let projections: Vec<Projection> = ViewKind::ALL
            .iter()
            .map(|view| project(*view, &doc.mapping, &filter, &overlay, &options))
            .collect();
        let ids: Vec<Vec<&str>> = projections
            .iter()
            .map(|projection| sorted(projection.node_ids()))
            .collect();

        for other in &ids[1..] {
            assert_eq!(&ids[0], other, "term {term:?} in {fixture}");
        }
    }

    #[test]
    fn test_tree_hoists_past_non_matching_nodes() {
        let doc = parse_fixture("branching.json");
        let outline = tree_outline(&doc.mapping, &SearchFilter::new("rust"));

        assert_eq!(outline.node_ids(), vec!["u1", "a2"]);
        assert_eq!(outline.top_level().count(), 1);
        let children: Vec<_> = outline.children_of("u1").map(|c| c.node_id).collect();
        assert_eq!(children, vec!["a2"]);
    }
}

mod projections {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project_all(view: ViewKind) -> Projection {
        let doc = parse_fixture("branching.json");
        let overlay = Overlay::new().with_favorites(["u1"]);
        project(
            view,
            &doc.mapping,
            &SearchFilter::all(),
            &overlay,
            &ProjectionOptions::default(),
        )
    }

    #[test]
    fn test_table_cells() {
        let Projection::Table { rows } = project_all(ViewKind::Table) else {
            panic!("expected table projection");
        };

        let a1 = rows.iter().find(|r| r.node_id == "a1").unwrap();
        assert_eq!(a1.display, "Each value has a single owner.");
        assert_eq!(
            a1.copy_text,
            "<thinking>Explain moves first.</thinking><answer>Each value has a single owner.</answer>"
        );
        assert_eq!(a1.timestamp, "2023-11-14 22:13:30 UTC");

        let a3 = &rows[0];
        assert_eq!(a3.node_id, "a3");
        assert_eq!(a3.timestamp, NO_TIMESTAMP);

        assert!(rows.iter().find(|r| r.node_id == "u1").unwrap().favorite);
        assert_eq!(rows.iter().filter(|r| r.favorite).count(), 1);
    }

    #[test]
    fn test_list_avatars() {
        let Projection::List { rows } = project_all(ViewKind::List) else {
            panic!("expected list projection");
        };

        let avatars: String = rows.iter().map(|r| r.avatar).collect();
        assert_eq!(avatars, "AUAAU");
        assert!(rows.iter().all(|r| !r.content.contains("<thinking>")));
    }

    #[test]
    fn test_graph_nodes_and_edges() {
        let Projection::Graph(graph) = project_all(ViewKind::Graph) else {
            panic!("expected graph projection");
        };

        let labels: Vec<_> = graph.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "U", "A", "A", "U"]);

        let edges: Vec<_> = graph
            .edges
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect();
        // u1's parent is structural, so u1 has no incoming edge
        assert_eq!(
            edges,
            vec![("u2", "a3"), ("u1", "a1"), ("u1", "a2"), ("a1", "u2")]
        );

        let u1 = graph.nodes.iter().find(|n| n.id == "u1").unwrap();
        assert_eq!(u1.color, "#e0e7ff");
        assert!(u1.favorite);
        let a2 = graph.nodes.iter().find(|n| n.id == "a2").unwrap();
        assert_eq!(a2.color, "#f0fdf4");
    }

    #[test]
    fn test_graph_edges_require_both_ends() {
        let doc = parse_fixture("branching.json");
        let projection = project(
            ViewKind::Graph,
            &doc.mapping,
            &SearchFilter::new("owner"),
            &Overlay::new(),
            &ProjectionOptions::default(),
        );
        let Projection::Graph(graph) = projection else {
            panic!("expected graph projection");
        };

        let edges: Vec<_> = graph
            .edges
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect();
        assert_eq!(edges, vec![("u1", "a1"), ("u1", "a2")]);
    }

    #[test]
    fn test_text_table_rendering() {
        let output = export_to_string(&project_all(ViewKind::Table), ExportFormat::Text).unwrap();

        let expected = [
            "NODE  AUTHOR     TIMESTAMP                FLAGS  CONTENT",
            "a3    assistant  No timestamp                    Borrowing lends access without moving.",
            "u1    user       2023-11-14 22:13:20 UTC  ★      How does ownership work in Rust?",
            "a1    assistant  2023-11-14 22:13:30 UTC         Each value has a single owner.",
            "a2    assistant  2023-11-14 22:13:40 UTC         Ownership is Rust's memory model.",
            "u2    user       2023-11-14 22:13:50 UTC         And borrowing?",
        ];
        assert_eq!(output.lines().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_text_tree_rendering() {
        let output = export_to_string(&project_all(ViewKind::Tree), ExportFormat::Text).unwrap();

        let expected = [
            "  - [user] How does ownership work in Rust? ★",
            "    - [assistant] Each value has a single owner.",
            "      - [user] And borrowing?",
            "        - [assistant] Borrowing lends access without moving.",
            "    - [assistant] Ownership is Rust's memory model.",
        ];
        assert_eq!(output.lines().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_reasoning_is_carried_separately() {
        let Projection::List { rows } = project_all(ViewKind::List) else {
            panic!("expected list projection");
        };
        let a1 = rows.iter().find(|r| r.node_id == "a1").unwrap();
        assert_eq!(a1.content, "Each value has a single owner.");
        assert_eq!(a1.thinking.as_deref(), Some("Explain moves first."));
        assert_eq!(rows.iter().filter(|r| r.thinking.is_some()).count(), 1);

        let Projection::Tree { items } = project_all(ViewKind::Tree) else {
            panic!("expected tree projection");
        };
        let a1 = items.iter().find(|i| i.node_id == "a1").unwrap();
        assert_eq!(a1.thinking.as_deref(), Some("Explain moves first."));

        let json = export_to_string(&project_all(ViewKind::List), ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rows"][2]["thinking"], "Explain moves first.");
        assert!(value["rows"][1].get("thinking").is_none());
    }

    #[test]
    fn test_csv_export() {
        let output = export_to_string(&project_all(ViewKind::Table), ExportFormat::Csv).unwrap();
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines[0], "node_id,author,timestamp,content,favorite,deleted");
        assert_eq!(
            lines[2],
            "u1,user,2023-11-14 22:13:20 UTC,How does ownership work in Rust?,true,false"
        );
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_csv_rejects_other_views() {
        let result = export_to_string(&project_all(ViewKind::Graph), ExportFormat::Csv);
        assert!(matches!(result, Err(ViewerError::Unsupported { .. })));
    }

    #[test]
    fn test_dot_export() {
        let output = export_to_string(&project_all(ViewKind::Graph), ExportFormat::Dot).unwrap();

        assert!(output.starts_with("digraph "));
        assert!(output.contains("rankdir=TB;"));
        assert!(output.contains("\"u1\" -> \"a1\";"));
        assert!(output.contains("peripheries=2"));
        assert!(output.trim_end().ends_with('}'));
    }

    #[test]
    fn test_json_export_is_tagged() {
        let output =
            export_to_string(&project_all(ViewKind::Graph), ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["view"], "graph");
        assert_eq!(value["nodes"].as_array().unwrap().len(), 5);
        assert_eq!(value["layout"]["physics"], false);
    }
}

mod session {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hooks_receive_intent() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let fav_events = Rc::clone(&events);
        let del_events = Rc::clone(&events);
        let hooks = FnHooks::new()
            .on_favorite(move |id, favorite| {
                fav_events.borrow_mut().push(format!("favorite {id} {favorite}"));
            })
            .on_delete(move |id| del_events.borrow_mut().push(format!("delete {id}")));

        let mut session = ViewerSession::open(fixture_path("branching.json"))
            .unwrap()
            .with_hooks(hooks);

        assert!(session.toggle_favorite("a2").unwrap());
        assert!(!session.toggle_favorite("a2").unwrap());
        session.delete("u2").unwrap();

        assert_eq!(
            *events.borrow(),
            vec!["favorite a2 true", "favorite a2 false", "delete u2"]
        );
    }

    #[test]
    fn test_unknown_node_is_rejected() {
        let mut session = ViewerSession::open(fixture_path("branching.json")).unwrap();

        assert!(matches!(
            session.toggle_favorite("nope"),
            Err(ViewerError::NodeNotFound { .. })
        ));
        assert!(matches!(
            session.delete("nope"),
            Err(ViewerError::NodeNotFound { .. })
        ));
        assert!(session.overlay().is_empty());
    }

    #[test]
    fn test_deleted_nodes_stay_visible() {
        let mut session = ViewerSession::open(fixture_path("branching.json")).unwrap();
        session.delete("a1").unwrap();

        for view in ViewKind::ALL {
            let projection = session.project(view);
            assert!(projection.node_ids().contains(&"a1"), "{view}");
        }

        session.select_view(ViewKind::List);
        let Projection::List { rows } = session.render() else {
            panic!("expected list projection");
        };
        assert!(rows.iter().find(|r| r.node_id == "a1").unwrap().deleted);
    }

    #[test]
    fn test_favorite_updates_stats() {
        let mut session = ViewerSession::open(fixture_path("branching.json")).unwrap();
        session.toggle_favorite("u1").unwrap();
        session.toggle_favorite("a3").unwrap();

        assert_eq!(session.stats().favorite_count, 2);
    }

    #[test]
    fn test_load_replaces_conversation() {
        let mut session = ViewerSession::open(fixture_path("branching.json"))
            .unwrap()
            .with_view(ViewKind::Table);
        session.set_search("general");
        session.toggle_favorite("u1").unwrap();

        session.load(parse_fixture("envelope.json"), Overlay::new());

        assert_eq!(session.search(), "general");
        assert_eq!(session.view(), ViewKind::Table);
        assert!(session.overlay().is_empty());
        assert_eq!(session.render().node_ids(), vec!["m2"]);
    }
}

mod overlay_store {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_store_hooks_persist_session_intent() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("overlays.json");

        let mut session = ViewerSession::open(fixture_path("branching.json"))
            .unwrap()
            .with_hooks(StoreHooks::new(&store_path, "branching"));
        session.toggle_favorite("u1").unwrap();
        session.delete("a3").unwrap();
        drop(session);

        let overlay = OverlayStore::load_from(&store_path)
            .unwrap()
            .overlay("branching");
        assert!(overlay.is_favorite("u1"));
        assert!(overlay.is_deleted("a3"));

        // A fresh session picks the markers back up
        let session = ViewerSession::open(fixture_path("branching.json"))
            .unwrap()
            .with_overlay(overlay);
        assert_eq!(session.stats().favorite_count, 1);
    }

    #[test]
    fn test_store_keeps_conversations_apart() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("overlays.json");

        StoreHooks::new(&store_path, "one").on_toggle_favorite("x", true);
        StoreHooks::new(&store_path, "two").on_delete("x");

        let store = OverlayStore::load_from(&store_path).unwrap();
        assert!(store.overlay("one").is_favorite("x"));
        assert!(!store.overlay("one").is_deleted("x"));
        assert!(store.overlay("two").is_deleted("x"));
        assert!(store.overlay("three").is_empty());
    }
}
