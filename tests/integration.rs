//! Integration tests for treeviz


use harness::{TestTree, child_names, run_json, run_treeviz};
use treeviz::output::decode_drawio;
use treeviz::{
    FilterConfig, LayoutStrategy, NodeKind, OutputFormat, ScanConfig, TreeScanner, Viewport,
    layout, render,
};

#[test]
fn test_project_scan_excludes_vcs_directory() {
    let tree = TestTree::new();
    tree.add_sized_file("src/main.ext", 100);
    tree.add_sized_file("README.md", 50);
    tree.add_sized_file(".git/HEAD", 23);

    let config = ScanConfig {
        filter: FilterConfig::permissive().with_excluded([".git"]),
        ..Default::default()
    };
    let root = TreeScanner::new(config).scan(tree.path()).unwrap();

    assert_eq!(root.file_count, 2);
    assert_eq!(root.dir_count, 1);
    assert_eq!(root.size, 150);
    let names: Vec<&str> = root.children().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["src", "README.md"]);

    let src = &root.children()[0];
    assert_eq!(src.kind, NodeKind::Directory);
    assert_eq!((src.file_count, src.dir_count, src.size), (1, 0, 100));
    assert!(root.walk().all(|n| n.name != ".git"));
}

#[test]
fn test_pipeline_renders_every_format() {
    let tree = TestTree::sample_project();
    let root = TreeScanner::new(ScanConfig::default())
        .scan(tree.path())
        .unwrap();

    for strategy in LayoutStrategy::ALL {
        let geometry = layout(&root, strategy, Viewport::default()).unwrap();
        assert_eq!(geometry.len(), root.node_count());
        for format in OutputFormat::ALL {
            render(&root, &geometry, format)
                .unwrap_or_else(|e| panic!("{strategy}/{format} failed: {e}"));
        }
    }
}

#[test]
fn test_drawio_roundtrip_of_scanned_tree() {
    let tree = TestTree::sample_project();
    let root = TreeScanner::new(ScanConfig::default())
        .scan(tree.path())
        .unwrap();
    let geometry = layout(&root, LayoutStrategy::Tree, Viewport::default()).unwrap();
    let artifact = render(&root, &geometry, OutputFormat::Drawio).unwrap();

    let decoded = decode_drawio(artifact.as_text().unwrap()).unwrap();
    assert_eq!(decoded.node_count(), root.node_count());
    let names: Vec<&str> = decoded.nodes.iter().map(|n| n.label.as_str()).collect();
    let expected: Vec<&str> = root.walk().map(|n| n.name.as_str()).collect();
    assert_eq!(names, expected);
    assert_eq!(decoded.id_edges(), geometry.edges);
}

#[test]
fn test_cli_default_is_interactive_svg() {
    let tree = TestTree::sample_project();
    let (stdout, stderr, success) = run_treeviz(tree.path(), &[]);
    assert!(success, "treeviz should succeed: {}", stderr);
    assert!(stdout.starts_with("<svg"), "should be SVG: {}", stdout);
    assert!(stdout.contains("<script"), "interactive SVG carries its script");
    assert!(stdout.contains("main.rs"));
    assert!(
        !stdout.contains("data-path=\"target\""),
        "default exclusions apply"
    );
}

#[test]
fn test_cli_static_svg_has_no_script() {
    let tree = TestTree::sample_project();
    let (stdout, _stderr, success) = run_treeviz(tree.path(), &["-f", "static-svg"]);
    assert!(success);
    assert!(stdout.contains("data-node-id"));
    assert!(!stdout.contains("<script"));
}

#[test]
fn test_cli_json_matches_scan() {
    let tree = TestTree::sample_project();
    let value = run_json(tree.path(), &["--layout", "treemap"]);
    assert_eq!(value["metadata"]["strategy"], "treemap");
    assert_eq!(value["metadata"]["nodeCount"], 9);

    let root = &value["tree"];
    assert_eq!(child_names(root), vec!["docs", "src", "README.md"]);
    assert_eq!(root["size"], 100 + 300 + 40 + 60 + 50);
    assert_eq!(root["fileCount"], 5);
}

#[test]
fn test_cli_all_includes_hidden_and_excluded() {
    let tree = TestTree::sample_project();
    let value = run_json(tree.path(), &["-a"]);
    let names = child_names(&value["tree"]);
    assert!(names.contains(&".git".to_string()), "{:?}", names);
    assert!(names.contains(&"target".to_string()), "{:?}", names);
}

#[test]
fn test_cli_ignore_pattern() {
    let tree = TestTree::sample_project();
    let value = run_json(tree.path(), &["-I", "*.md"]);
    let root = &value["tree"];
    assert_eq!(child_names(root), vec!["docs", "src"]);
    assert_eq!(child_names(&root["children"][0]), Vec::<String>::new());
}

#[test]
fn test_cli_mermaid_output() {
    let tree = TestTree::sample_project();
    let (stdout, _stderr, success) = run_treeviz(tree.path(), &["-f", "mermaid"]);
    assert!(success);
    assert!(stdout.starts_with("graph LR\n"));
    assert!(stdout.contains("main_rs(\"main.rs\"):::file"));
    assert!(stdout.contains("classDef directory fill:#e3f2fd,stroke:#1565c0,stroke-width:2px"));
}

#[test]
fn test_cli_dot_output() {
    let tree = TestTree::sample_project();
    let (stdout, _stderr, success) = run_treeviz(tree.path(), &["-f", "dot", "--layout", "radial"]);
    assert!(success);
    assert!(stdout.starts_with("digraph"));
    assert_eq!(stdout.matches(" -> ").count(), 8);
}

#[test]
fn test_cli_drawio_roundtrip() {
    let tree = TestTree::sample_project();
    let (stdout, _stderr, success) = run_treeviz(tree.path(), &["-f", "drawio"]);
    assert!(success);
    let decoded = decode_drawio(stdout.trim()).unwrap();
    assert_eq!(decoded.node_count(), 9);
    assert_eq!(decoded.edges.len(), 8);
    let root = decoded.root().unwrap();
    assert_eq!(decoded.children_of(&root.cell).len(), 3);
}

#[test]
fn test_cli_drawio_url() {
    let tree = TestTree::sample_project();
    let (stdout, _stderr, success) = run_treeviz(tree.path(), &["-f", "drawio", "--url"]);
    assert!(success);
    assert!(stdout.starts_with("https://app.diagrams.net/"));
    assert!(stdout.contains("#R"));
}

#[test]
fn test_cli_live_dom_patches() {
    let tree = TestTree::sample_project();
    let (stdout, _stderr, success) =
        run_treeviz(tree.path(), &["-f", "dom", "--collapse-depth", "1"]);
    assert!(success);
    let patches: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let creates = patches.iter().filter(|p| p["op"] == "create").count();
    let hidden = patches
        .iter()
        .filter(|p| p["op"] == "set_visibility" && p["visible"] == false)
        .count();
    assert_eq!(creates, 9);
    // src/util, src/*.rs, src/util/helpers.rs and docs/guide.md
    assert_eq!(hidden, 5);
}

#[test]
fn test_cli_collapsed_svg_hides_subtree() {
    let tree = TestTree::sample_project();
    let (stdout, _stderr, success) =
        run_treeviz(tree.path(), &["-f", "static-svg", "--collapse-depth", "1"]);
    assert!(success);
    assert!(stdout.contains("data-collapsed=\"true\""));
    assert!(stdout.contains("style=\"display:none\""));
}

#[test]
fn test_cli_output_file() {
    let tree = TestTree::sample_project();
    let out = tree.path().join("out.svg");
    let out_arg = out.to_string_lossy().to_string();
    let (stdout, _stderr, success) = run_treeviz(tree.path(), &["src", "-o", &out_arg]);
    assert!(success);
    assert!(stdout.is_empty());
    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains("lib.rs"));
    assert!(!written.contains("README.md"));
}

#[test]
fn test_cli_settings_file() {
    let tree = TestTree::sample_project();
    tree.add_file(
        "treeviz.toml",
        "[layout]\nstrategy = \"sunburst\"\n\n[render]\nformat = \"json\"\n",
    );
    let (stdout, stderr, success) = run_treeviz(tree.path(), &[]);
    assert!(success, "{}", stderr);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["metadata"]["strategy"], "sunburst");

    // Command-line flags win over the file
    let value = run_json(tree.path(), &["--layout", "galaxy"]);
    assert_eq!(value["metadata"]["strategy"], "galaxy");
}

#[test]
fn test_cli_stats() {
    let tree = TestTree::sample_project();
    let out = tree.path().join("out.svg");
    let out_arg = out.to_string_lossy().to_string();
    let (_stdout, stderr, success) = run_treeviz(tree.path(), &["--stats-json", "-o", &out_arg]);
    assert!(success);
    let stats: serde_json::Value = serde_json::from_str(&stderr).unwrap();
    assert_eq!(stats["files"], 5);
    assert_eq!(stats["directories"], 3);
    assert_eq!(stats["largest_files"][0]["size"], 300);
}

#[test]
fn test_cli_rejects_unknown_layout() {
    use assert_cmd::Command;
    use predicates::prelude::*;

    let tree = TestTree::sample_project();
    Command::cargo_bin("treeviz")
        .unwrap()
        .current_dir(tree.path())
        .args(["--layout", "hexagon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown layout"));
}

#[test]
fn test_cli_mermaid_with_sizes() {
    use assert_cmd::Command;
    use predicates::prelude::*;

    let tree = TestTree::sample_project();
    Command::cargo_bin("treeviz")
        .unwrap()
        .current_dir(tree.path())
        .args(["-f", "mermaid", "-s"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("graph LR"))
        .stdout(predicate::str::contains("lib.rs"));
}
