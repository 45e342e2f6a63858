//! Test utility functions for gha-generator

#![allow(dead_code)]

use gha_generator::{TemplateEngine, Workflow, WorkflowGenerator, WorkflowValidator};
use std::path::Path;

pub fn generator() -> WorkflowGenerator<TemplateEngine> {
    WorkflowGenerator::new(TemplateEngine::new("resources/templates"))
}

/// Generate a workflow from configuration YAML, panicking on failure
pub fn generate(yaml: &str) -> Workflow {
    generator()
        .generate_from_yaml(yaml)
        .unwrap_or_else(|e| panic!("generation failed: {}\n{}", e, yaml))
}

/// JSON and YAML both reparse into an equal workflow
pub fn assert_round_trips(workflow: &Workflow) {
    let json = workflow.to_json().unwrap();
    let from_json = Workflow::from_json(&json).unwrap_or_else(|e| panic!("{}\n{}", e, json));
    assert_eq!(from_json.to_document(), workflow.to_document());

    let yaml = workflow.to_yaml().unwrap();
    let from_yaml = Workflow::from_yaml(&yaml).unwrap_or_else(|e| panic!("{}\n{}", e, yaml));
    assert_eq!(from_yaml.to_document(), workflow.to_document());
}

/// The serialized document as JSON, for structural comparisons
pub fn document_json(workflow: &Workflow) -> serde_json::Value {
    serde_json::to_value(workflow.to_document()).expect("document converts to JSON")
}

/// Top-level keys of the serialized document, in order
pub fn top_level_keys(workflow: &Workflow) -> Vec<String> {
    workflow
        .to_document()
        .keys()
        .filter_map(|k| k.as_str().map(String::from))
        .collect()
}

/// Keys of a job in the serialized document, in order
pub fn job_keys(workflow: &Workflow, job_id: &str) -> Vec<String> {
    let doc = workflow.to_document();
    let job = doc
        .get("jobs")
        .and_then(|jobs| jobs.get(job_id))
        .and_then(|job| job.as_mapping())
        .unwrap_or_else(|| panic!("job '{}' not in document", job_id));
    job.keys()
        .filter_map(|k| k.as_str().map(String::from))
        .collect()
}

/// Assert that a workflow validates, printing the collected problems if not
pub fn assert_valid(workflow: &Workflow) -> WorkflowValidator {
    let mut validator = WorkflowValidator::new();
    assert!(
        validator.validate(workflow),
        "expected a valid workflow, errors: {:?}",
        validator.errors()
    );
    validator
}

/// Lay out a PHP project with the given manifest and extra files
pub fn write_project(root: &Path, composer_json: &str, files: &[(&str, &str)]) {
    std::fs::write(root.join("composer.json"), composer_json).unwrap();
    for (path, content) in files {
        let path = root.join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
}
