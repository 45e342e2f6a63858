//! End-to-end scenarios: project analysis, presets, templates and audits

mod helpers;

use gha_generator::generator::PresetContext;
use gha_generator::services::ProjectAnalyzer;
use gha_generator::{AuditReport, MatrixGenerator, Preset, SecretDetector, TemplateEngine, WorkflowGenerator};
use helpers::*;
use serde_json::json;

const LARAVEL_MANIFEST: &str = r#"{
    "require": {
        "php": "^8.1",
        "laravel/framework": "^11.0",
        "doctrine/dbal": "^3.0",
        "predis/predis": "^2.0"
    },
    "require-dev": {
        "phpunit/phpunit": "^10.0",
        "phpstan/phpstan": "^1.10"
    }
}"#;

#[test]
fn test_laravel_project_testing_preset() {
    let dir = tempfile::tempdir().unwrap();
    write_project(
        dir.path(),
        LARAVEL_MANIFEST,
        &[("database/migrations/2024_01_01_000000_create_jobs_table.php", "<?php\n")],
    );

    let metadata = ProjectAnalyzer::new(dir.path()).unwrap().analyze();
    assert_eq!(metadata.php_versions, ["8.1", "8.2"]);
    assert_eq!(metadata.databases, ["mysql", "sqlite"]);
    assert!(metadata.has_redis);
    assert!(metadata.has_queues);
    assert_eq!(metadata.test_framework.as_deref(), Some("phpunit"));
    assert_eq!(metadata.code_quality_tools, ["phpstan"]);
    assert_eq!(metadata.laravel_version.as_deref(), Some("^11.0"));

    let ctx = PresetContext::new(&metadata.php_versions, &metadata);
    let config = Preset::Testing.workflow_config("Tests", &["main".to_string()], &ctx);
    let workflow = generator().generate(&config).unwrap();
    assert_valid(&workflow);

    let doc = document_json(&workflow);
    assert_eq!(
        doc["jobs"]["test"]["strategy"],
        json!({
            "fail-fast": false,
            "matrix": {"php-version": ["8.1", "8.2"], "database": ["mysql", "sqlite"]}
        })
    );
    assert_eq!(
        doc["on"],
        json!({"push": {"branches": ["main"]}, "pull_request": {"branches": ["main"]}})
    );
    assert_eq!(workflow.filename(), "tests.yml");
}

#[test]
fn test_database_falls_back_to_env_file() {
    let dir = tempfile::tempdir().unwrap();
    write_project(
        dir.path(),
        r#"{"require": {"php": "~8.2"}}"#,
        &[(".env.example", "APP_NAME=Laravel\nDB_CONNECTION=pgsql\n")],
    );

    let metadata = ProjectAnalyzer::new(dir.path()).unwrap().analyze();
    assert_eq!(metadata.php_versions, ["8.2"]);
    assert_eq!(metadata.databases, ["postgres"]);
}

#[test]
fn test_project_without_manifest_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = ProjectAnalyzer::new(dir.path()).unwrap();
    assert!(!analyzer.composer().has_manifest());
    assert_eq!(analyzer.analyze().php_versions, ["8.2", "8.3"]);
}

#[test]
fn test_malformed_manifest_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "{ not json", &[]);
    assert!(ProjectAnalyzer::new(dir.path()).is_err());
}

#[test]
fn test_matrix_from_manifest() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), LARAVEL_MANIFEST, &[]);
    let analyzer = ProjectAnalyzer::new(dir.path()).unwrap();

    let matrix = MatrixGenerator::new().generate_from_manifest(analyzer.composer());
    assert_eq!(
        serde_json::to_value(&matrix).unwrap(),
        json!({"php-version": ["8.1", "8.2"], "database": ["mysql", "sqlite"]})
    );
}

#[test]
fn test_audit_report_workflows() {
    let report = AuditReport::from_json(
        r#"{
            "project": "shop",
            "findings": [
                {"severity": "critical", "category": "security"},
                {"severity": "low", "category": "performance"},
                {"severity": "medium", "category": "quality"}
            ]
        }"#,
    )
    .unwrap();

    let workflows: Vec<_> = report
        .workflow_configs()
        .iter()
        .map(|config| generator().generate(config).unwrap())
        .collect();
    let files: Vec<String> = workflows.iter().map(|w| w.filename()).collect();
    assert_eq!(files, ["security-scan.yml", "performance-tests.yml", "code-quality.yml"]);
    for workflow in &workflows {
        assert_valid(workflow);
    }
}

#[test]
fn test_audit_without_findings_generates_nothing() {
    let report = AuditReport::from_json(r#"{"findings": [{"severity": "low", "category": "style"}]}"#).unwrap();
    assert!(report.workflow_configs().is_empty());
}

#[test]
fn test_template_to_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let category = dir.path().join("laravel");
    std::fs::create_dir_all(&category).unwrap();
    std::fs::write(
        category.join("tests.template"),
        r#"name: {{ name }}
on:
  push:
    branches: [{{ branches }}]
jobs:
  test:
    runs-on: {{ runner }}
    steps:
      - uses: actions/checkout@v4
      - uses: shivammathur/setup-php@v2
        with:
          php-version: ${{ matrix.php-version }}
          extensions: {{ phpExtensions "8.2" }}
"#,
    )
    .unwrap();

    let engine = TemplateEngine::new(dir.path());
    let names: Vec<String> = engine
        .list()
        .unwrap()
        .iter()
        .map(|t| format!("{}/{}", t.category, t.name))
        .collect();
    assert_eq!(names, ["laravel/tests"]);

    let generator = WorkflowGenerator::new(engine);
    let data = json!({"name": "Tests", "branches": ["main", "develop"], "runner": "ubuntu-22.04"});
    let workflow = generator
        .generate_from_template(&generator.renderer().path("laravel/tests"), &data)
        .unwrap();

    let doc = document_json(&workflow);
    assert_eq!(doc["on"]["push"]["branches"], json!(["main", "develop"]));
    assert_eq!(doc["jobs"]["test"]["runs-on"], "ubuntu-22.04");
    assert_eq!(
        doc["jobs"]["test"]["steps"][1]["with"],
        json!({
            "php-version": "${{ matrix.php-version }}",
            "extensions": "pdo,json,bcmath,mbstring,xml,curl,enum"
        })
    );
}

#[test]
fn test_secrets_of_a_deploy_workflow() {
    let workflow = generate(
        r#"
name: Deploy
on: push
jobs:
  deploy:
    environment: production
    steps:
      - uses: actions/checkout@v4
      - name: Deploy
        run: ./deploy.sh
        env:
          SSH_KEY: ${{ secrets.SSH_PRIVATE_KEY }}
          HOST: ${{ secrets.DEPLOY_HOST }}
      - name: Notify
        uses: slackapi/slack-github-action@v1
        with:
          webhook: ${{ secrets.SLACK_WEBHOOK }}
          host: ${{ secrets.DEPLOY_HOST }}
"#,
    );

    let detector = SecretDetector::new();
    let secrets = detector.detect(&workflow);
    assert_eq!(secrets, ["SSH_PRIVATE_KEY", "DEPLOY_HOST", "SLACK_WEBHOOK"]);

    let guide = detector.instructions(&secrets);
    assert!(guide.starts_with("# Configure these secrets in GitHub Settings"));
    assert!(guide.contains("### SLACK_WEBHOOK"));
}
