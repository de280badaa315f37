use std::fs;

use enhancer_chain::graph::{ntriples, plan_to_graph};
use enhancer_chain::{ChainError, ChainsFile, ExecutionNode, ExecutionPlan, Properties};
use enhancer_cli::{render_plan, ChainHost, OutputFormat};
use pretty_assertions::assert_eq;

const CONFIG: &str = r#"
data_dir: plans
chains:
  - name: default
    chain_list:
      - metaxa
      - langId;dependsOn=metaxa
      - ner;dependsOn=langId;optional
  - name: remote
    graph_resource: remote.nt
    chain_list:
      - ignored
  - name: broken
    chain_list:
      - a;dependsOn=b
"#;

fn remote_plan(engines: &[&str]) -> String {
    let plan = ExecutionPlan::from_nodes(
        "remote",
        Properties::new(),
        engines.iter().map(|name| ExecutionNode::new(*name)),
    )
    .unwrap();
    ntriples::write(&plan_to_graph(&plan))
}

fn workspace() -> (tempfile::TempDir, ChainsFile) {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("plans")).unwrap();
    let config = dir.path().join("chains.yaml");
    fs::write(&config, CONFIG).unwrap();
    let file = ChainsFile::load(&config).unwrap();
    (dir, file)
}

#[test]
fn test_validate_reports_every_chain() {
    let (dir, file) = workspace();
    fs::write(dir.path().join("plans/remote.nt"), remote_plan(&["tika"])).unwrap();

    let host = ChainHost::start(&file, None).unwrap();
    let summaries: Vec<String> = host.reports().iter().map(|report| report.summary()).collect();

    assert_eq!(summaries.len(), 3);
    assert!(summaries[0].starts_with("FAIL  broken"));
    assert_eq!(summaries[1], "ok    default <list> [metaxa] -> [langId] -> [ner]");
    assert_eq!(summaries[2], "ok    remote <remote.nt (application/n-triples)> [tika]");
}

#[test]
fn test_sync_invalidates_resource_chains() {
    let (dir, file) = workspace();
    let resource = dir.path().join("plans/remote.nt");
    let host = ChainHost::start(&file, None).unwrap();

    let remote = || host.reports().into_iter().find(|report| report.name == "remote").unwrap();
    assert!(matches!(remote().outcome, Err(ChainError::ResourceUnavailable { .. })));

    fs::write(&resource, remote_plan(&["tika", "langId"])).unwrap();
    assert_eq!(host.sync().unwrap().published, vec!["remote.nt"]);
    assert_eq!(remote().outcome.unwrap().node_count(), 2);

    fs::remove_file(&resource).unwrap();
    assert_eq!(host.sync().unwrap().withdrawn, vec!["remote.nt"]);
    assert!(matches!(remote().outcome, Err(ChainError::ResourceUnavailable { .. })));
}

#[test]
fn test_show_renders_the_plan() {
    let (_dir, file) = workspace();
    let host = ChainHost::start(&file, None).unwrap();

    let plan = host.plan("default").unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&render_plan(&plan, OutputFormat::Json).unwrap()).unwrap();
    assert_eq!(json["nodes"]["langId"]["dependsOn"][0], "metaxa");

    let nt = render_plan(&plan, OutputFormat::Ntriples).unwrap();
    assert!(nt.contains("\"ner\""));
}
