//! End-to-end transpiler tests: concrete graphs in, Go text or errors out.

use axon_core::{build_index, resolve_scopes, schedule, transpile, ErrorKind, TranspileError};
use axon_graph::{load_graph, save_graph, DataEdge, ExecEdge, Graph, Node, NodeType, Port};
use std::path::{Path, PathBuf};

// ──────────────────────────────────────────────
// Graph builders
// ──────────────────────────────────────────────

fn node(id: &str, node_type: NodeType) -> Node {
    Node::new(id, id, node_type)
}

fn constant(id: &str, value: &str) -> Node {
    let mut n = node(id, NodeType::Constant);
    n.outputs.push(Port::new("out", ""));
    n.config.insert("value".to_string(), value.to_string());
    n
}

fn operator(id: &str, op: &str) -> Node {
    let mut n = node(id, NodeType::Operator);
    n.inputs = vec![Port::new("a", "int"), Port::new("b", "int")];
    n.outputs.push(Port::new("out", "int"));
    n.config.insert("op".to_string(), op.to_string());
    n
}

fn call(id: &str, reference: &str, inputs: &[&str], outputs: &[&str]) -> Node {
    let mut n = node(id, NodeType::Function);
    n.impl_reference = reference.to_string();
    n.inputs = inputs.iter().map(|p| Port::new(*p, "")).collect();
    n.outputs = outputs.iter().map(|p| Port::new(*p, "")).collect();
    n
}

fn graph(nodes: Vec<Node>, data: &[(&str, &str, &str, &str)], exec: &[(&str, &str)]) -> Graph {
    let mut g = Graph::new("test", "test");
    g.nodes = nodes;
    g.data_edges = data
        .iter()
        .map(|(a, ap, b, bp)| DataEdge::new(*a, *ap, *b, *bp))
        .collect();
    g.exec_edges = exec.iter().map(|(a, b)| ExecEdge::new(*a, *b)).collect();
    g
}

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

fn fixtures(subdir: &str) -> Vec<PathBuf> {
    let dir = workspace_root().join("conformance").join(subdir);
    let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", dir.display(), e))
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "ax"))
        .collect();
    paths.sort();
    paths
}

// ──────────────────────────────────────────────
// Concrete scenarios
// ──────────────────────────────────────────────

#[test]
fn test_constant_into_external_call() {
    let g = graph(
        vec![
            node("start", NodeType::Start),
            constant("five", "5"),
            call("print", "pkg.Print", &["v"], &[]),
            node("end", NodeType::End),
        ],
        &[("five", "out", "print", "v")],
        &[("start", "five"), ("five", "print"), ("print", "end")],
    );
    assert_eq!(
        transpile(&g).unwrap(),
        "package main\n\nimport \"pkg\"\n\nfunc main() {\n\tfive := 5\n\tpkg.Print(five)\n}\n"
    );
}

#[test]
fn test_chained_operators_keep_order() {
    let g = graph(
        vec![
            node("start", NodeType::Start),
            constant("a", "1"),
            constant("b", "2"),
            constant("two", "2"),
            operator("c", "+"),
            operator("d", "*"),
            call("show", "fmt.Println", &["v"], &[]),
            node("end", NodeType::End),
        ],
        &[
            ("a", "out", "c", "a"),
            ("b", "out", "c", "b"),
            ("c", "out", "d", "a"),
            ("two", "out", "d", "b"),
            ("d", "out", "show", "v"),
        ],
        &[("start", "c"), ("c", "d"), ("d", "show"), ("show", "end")],
    );
    let out = transpile(&g).unwrap();
    let first = out.find("\tc := a + b\n").expect("sum statement");
    let second = out.find("\td := c * two\n").expect("product statement");
    assert!(first < second);
    assert!(out.contains("const a = 1\n"));
}

#[test]
fn test_function_definition_returns_parameter() {
    let mut def = node("identity", NodeType::FuncDef);
    def.outputs.push(Port::new("x", "int"));
    let mut ret = node("ret", NodeType::Return);
    ret.inputs.push(Port::new("value", "int"));
    let g = graph(
        vec![def, ret],
        &[("identity", "x", "ret", "value")],
        &[("identity", "ret")],
    );
    assert_eq!(
        transpile(&g).unwrap(),
        "package main\n\nfunc identity(x int) int {\n\treturn x\n}\n"
    );
}

#[test]
fn test_graph_without_start_is_library() {
    let def = node("noop", NodeType::FuncDef);
    let g = graph(vec![def, node("ret", NodeType::Return)], &[], &[("noop", "ret")]);
    let out = transpile(&g).unwrap();
    assert!(out.contains("func noop() {\n\treturn\n}\n"));
    assert!(!out.contains("func main()"));
}

#[test]
fn test_local_function_called_from_main() {
    let mut def = node("twice", NodeType::FuncDef);
    def.outputs.push(Port::new("n", "int"));
    let mut ret = node("ret", NodeType::Return);
    ret.inputs.push(Port::new("value", "int"));
    let g = graph(
        vec![
            def,
            operator("sum", "+"),
            ret,
            node("start", NodeType::Start),
            constant("seed", "21"),
            call("result", "twice", &["n"], &["out"]),
            call("show", "fmt.Println", &["v"], &[]),
            node("end", NodeType::End),
        ],
        &[
            ("twice", "n", "sum", "a"),
            ("twice", "n", "sum", "b"),
            ("sum", "out", "ret", "value"),
            ("seed", "out", "result", "n"),
            ("result", "out", "show", "v"),
        ],
        &[
            ("twice", "sum"),
            ("sum", "ret"),
            ("start", "seed"),
            ("seed", "result"),
            ("result", "show"),
            ("show", "end"),
        ],
    );
    let expected = "package main\n\nimport \"fmt\"\n\n\
        func twice(n int) int {\n\tsum := n + n\n\treturn sum\n}\n\n\
        func main() {\n\tseed := 21\n\tresult := twice(seed)\n\tfmt.Println(result)\n}\n";
    assert_eq!(transpile(&g).unwrap(), expected);
}

/// START -> one OPERATOR over constants `x` and `y` -> fmt.Println -> END.
fn single_operator(op: &str) -> Graph {
    let mut both = operator("both", op);
    both.inputs = vec![Port::new("a", "bool"), Port::new("b", "bool")];
    both.outputs = vec![Port::new("out", "bool")];
    graph(
        vec![
            node("start", NodeType::Start),
            constant("x", "true"),
            constant("y", "false"),
            both,
            call("print", "fmt.Println", &["v"], &[]),
            node("end", NodeType::End),
        ],
        &[
            ("x", "out", "both", "a"),
            ("y", "out", "both", "b"),
            ("both", "out", "print", "v"),
        ],
        &[("start", "both"), ("both", "print"), ("print", "end")],
    )
}

#[test]
fn test_ampersand_operators_are_binary() {
    for op in ["&&", "&", "&^"] {
        let out = transpile(&single_operator(op)).unwrap();
        assert!(out.contains(&format!("\tboth := x {} y\n", op)), "{}", out);
    }
    let out = transpile(&single_operator("||")).unwrap();
    assert!(out.contains("\tboth := x || y\n"));
}

#[test]
fn test_duplicate_labels_in_one_flow_rejected() {
    let mut g = single_operator("||");
    let mut again = operator("both2", "||");
    again.label = "both".to_string();
    g.nodes.insert(4, again);
    g.data_edges = vec![
        DataEdge::new("x", "out", "both", "a"),
        DataEdge::new("y", "out", "both", "b"),
        DataEdge::new("x", "out", "both2", "a"),
        DataEdge::new("both", "out", "both2", "b"),
        DataEdge::new("both2", "out", "print", "v"),
    ];
    g.exec_edges = vec![
        ExecEdge::new("start", "both"),
        ExecEdge::new("both", "both2"),
        ExecEdge::new("both2", "print"),
        ExecEdge::new("print", "end"),
    ];
    let err = transpile(&g).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PortBinding);
    assert_eq!(err.node_id(), Some("both2"));
    assert!(matches!(err, TranspileError::NameCollision { ref other, .. } if other.id == "both"));
}

#[test]
fn test_global_and_function_names_are_shared() {
    let mut g = graph(
        vec![
            constant("limit_value", "10"),
            node("limit", NodeType::FuncDef),
            node("ret", NodeType::Return),
        ],
        &[],
        &[("limit", "ret")],
    );
    g.nodes[0].label = "limit".to_string();
    let err = transpile(&g).unwrap_err();
    assert!(matches!(
        err,
        TranspileError::NameCollision { ref node, ref other, .. } if node.id == "limit" && other.id == "limit_value"
    ));
}

#[test]
fn test_unread_operator_result_rejected() {
    let mut g = single_operator("+");
    g.data_edges.retain(|e| e.from_node_id != "both");
    g.nodes[4].inputs.clear();
    let err = transpile(&g).unwrap_err();
    assert!(matches!(err, TranspileError::UnusedOutput { ref node, .. } if node.id == "both"));

    g.nodes.push(node("drop", NodeType::Ignore));
    g.data_edges.push(DataEdge::new("both", "out", "drop", "in"));
    let out = transpile(&g).unwrap();
    assert!(out.contains("\t_ = x + y\n\tfmt.Println()\n"), "{}", out);
}

#[test]
fn test_struct_field_cannot_swallow_a_result() {
    let mut shape = node("shape", NodeType::StructDef);
    shape.inputs.push(Port::new("At", "time.Time"));
    let g = graph(
        vec![
            shape,
            node("start", NodeType::Start),
            call("now", "time.Now", &[], &["t"]),
            node("end", NodeType::End),
        ],
        &[("now", "t", "shape", "At")],
        &[("start", "now"), ("now", "end")],
    );
    let err = transpile(&g).unwrap_err();
    assert!(matches!(err, TranspileError::InputNotRead { kind: NodeType::StructDef, .. }));
}

// ──────────────────────────────────────────────
// Testable properties
// ──────────────────────────────────────────────

#[test]
fn test_determinism() {
    for path in fixtures("positive") {
        let g = load_graph(&path).unwrap();
        let first = transpile(&g).unwrap();
        let second = transpile(&g.clone()).unwrap();
        assert_eq!(first, second, "{}", path.display());
    }
}

#[test]
fn test_producers_scheduled_before_consumers() {
    for path in fixtures("positive") {
        let g = load_graph(&path).unwrap();
        let index = build_index(&g).unwrap();
        let scopes = resolve_scopes(&index).unwrap();
        let flows = scopes.flows.values().flatten();
        for flow in flows {
            let order = schedule(flow, &index).unwrap();
            let position = |id: &str| order.iter().position(|n| n.id == id);
            for edge in &g.data_edges {
                if let (Some(from), Some(to)) =
                    (position(&edge.from_node_id), position(&edge.to_node_id))
                {
                    assert!(from < to, "{}: {:?}", path.display(), edge);
                }
            }
        }
    }
}

#[test]
fn test_termination_enforcement() {
    let dangling = graph(
        vec![
            node("start", NodeType::Start),
            call("print", "fmt.Println", &[], &[]),
        ],
        &[],
        &[("start", "print")],
    );
    let err = transpile(&dangling).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::GraphStructure);
    assert!(matches!(err, TranspileError::DanglingPath { .. }));

    let terminated = graph(
        vec![
            node("start", NodeType::Start),
            call("print", "fmt.Println", &[], &[]),
            node("end", NodeType::End),
        ],
        &[],
        &[("start", "print"), ("print", "end")],
    );
    assert!(transpile(&terminated).is_ok());
}

#[test]
fn test_cycle_rejection() {
    let g = graph(
        vec![
            node("start", NodeType::Start),
            call("a", "fmt.Println", &[], &[]),
            call("b", "fmt.Println", &[], &[]),
        ],
        &[],
        &[("start", "a"), ("a", "b"), ("b", "a")],
    );
    let err = transpile(&g).unwrap_err();
    assert!(matches!(err, TranspileError::MissingTerminator { .. }));
    assert!(err.to_string().contains("cycle"));
}

#[test]
fn test_unused_output_and_explicit_ignore() {
    let nodes = vec![
        node("start", NodeType::Start),
        call("now", "time.Now", &[], &["t"]),
        node("end", NodeType::End),
    ];
    let exec = [("start", "now"), ("now", "end")];

    let unused = graph(nodes.clone(), &[], &exec);
    let err = transpile(&unused).unwrap_err();
    assert!(matches!(err, TranspileError::UnusedOutput { ref port, .. } if port == "t"));
    assert_eq!(err.node_id(), Some("now"));

    let mut ignored_nodes = nodes;
    ignored_nodes.push(node("drop", NodeType::Ignore));
    let ignored = graph(ignored_nodes, &[("now", "t", "drop", "in")], &exec);
    let out = transpile(&ignored).unwrap();
    assert!(out.contains("\t_ = time.Now()\n"), "{}", out);
}

#[test]
fn test_global_classification() {
    let mut shape = node("shape", NodeType::StructDef);
    shape.inputs.push(Port::new("Sides", "int"));
    let accepted = graph(
        vec![
            constant("limit", "10"),
            shape,
            node("start", NodeType::Start),
            node("end", NodeType::End),
        ],
        &[],
        &[("start", "end")],
    );
    let out = transpile(&accepted).unwrap();
    assert!(out.contains("type shape struct {\n\tSides int\n}\n"));
    assert!(out.contains("const limit = 10\n"));
    assert!(out.find("type shape").unwrap() < out.find("const limit").unwrap());

    let rejected = graph(
        vec![
            operator("stray", "+"),
            node("start", NodeType::Start),
            node("end", NodeType::End),
        ],
        &[],
        &[("start", "end")],
    );
    let err = transpile(&rejected).unwrap_err();
    assert!(matches!(err, TranspileError::InvalidGlobal { kind: NodeType::Operator, .. }));
}

#[test]
fn test_declared_imports_always_rendered() {
    let mut g = graph(
        vec![node("start", NodeType::Start), node("end", NodeType::End)],
        &[],
        &[("start", "end")],
    );
    g.imports = vec!["os".to_string(), "fmt".to_string()];
    assert_eq!(
        transpile(&g).unwrap(),
        "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n\nfunc main() {\n}\n"
    );
}

// ──────────────────────────────────────────────
// Codec boundary
// ──────────────────────────────────────────────

#[test]
fn test_save_load_round_trip_transpiles_identically() {
    let dir = tempfile::tempdir().expect("temp dir");
    for path in fixtures("positive") {
        let original = load_graph(&path).unwrap();
        let copy_path = dir.path().join(path.file_name().unwrap());
        save_graph(&original, &copy_path).unwrap();
        let reloaded = load_graph(&copy_path).unwrap();
        assert_eq!(reloaded, original);
        assert_eq!(transpile(&reloaded).unwrap(), transpile(&original).unwrap());
    }
}

#[test]
fn test_positive_fixtures_match_expected_go() {
    for path in fixtures("positive") {
        let expected = std::fs::read_to_string(path.with_extension("expected.go")).unwrap();
        let g = load_graph(&path).unwrap();
        assert_eq!(transpile(&g).unwrap(), expected, "{}", path.display());
    }
}
