//! Saving and recalling configurations through the file store

mod helpers;

use gha_generator::{FileConfigStore, Preset, WorkflowConfig, WorkflowRegistry};
use gha_generator::generator::PresetContext;
use gha_generator::services::ProjectMetadata;
use helpers::*;
use std::sync::Arc;

fn registry(dir: &std::path::Path) -> WorkflowRegistry {
    WorkflowRegistry::new(Arc::new(FileConfigStore::new(dir)))
}

#[tokio::test]
async fn test_recalled_config_regenerates_same_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(dir.path());

    let versions = vec!["8.2".to_string(), "8.3".to_string()];
    let metadata = ProjectMetadata::default();
    let config = Preset::Testing.workflow_config(
        "Tests",
        &["main".to_string()],
        &PresetContext::new(&versions, &metadata),
    );
    registry.save_config("tests", &config).await.unwrap();

    let recalled = registry.recall_config("tests").await.unwrap().unwrap();
    assert_eq!(recalled, config);

    let original = generator().generate(&config).unwrap();
    let regenerated = generator().generate(&recalled).unwrap();
    assert_eq!(regenerated.to_yaml().unwrap(), original.to_yaml().unwrap());
}

#[tokio::test]
async fn test_saved_workflow_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(dir.path());
    let workflow = generate("name: CI\non: push\njobs:\n  test:\n    steps:\n      - run: make\n");

    registry.save("ci", &workflow).await.unwrap();
    let recalled = registry.recall("ci").await.unwrap().unwrap();
    assert_eq!(recalled.to_document(), workflow.to_document());

    let json = registry.show("ci").await.unwrap().unwrap();
    assert!(json.contains("\"runs-on\": \"ubuntu-latest\""));
}

#[tokio::test]
async fn test_entries_survive_a_new_registry() {
    let dir = tempfile::tempdir().unwrap();
    registry(dir.path())
        .save_config("nightly", &WorkflowConfig::from_yaml("name: Nightly\n").unwrap())
        .await
        .unwrap();

    let reopened = registry(dir.path());
    assert_eq!(reopened.list().await.unwrap(), ["nightly"]);
    assert!(reopened.delete("nightly").await.unwrap());
    assert!(reopened.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_path_like_names_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(dir.path());
    let config = WorkflowConfig::default();

    assert!(registry.save_config("../outside", &config).await.is_err());
    assert!(registry.save_config("nested/name", &config).await.is_err());
}
