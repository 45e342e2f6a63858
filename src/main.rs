use anyhow::{Context, Result};
use gha_generator::cli::commands::{
    ConfigsCommand, GenerateCommand, GenerateFromAuditCommand, ListTemplatesCommand,
    ValidateCommand,
};
use gha_generator::cli::output::*;
use gha_generator::cli::prompt::Prompt;
use gha_generator::cli::{Cli, Command};
use gha_generator::core::config::WorkflowConfig;
use gha_generator::generator::PresetContext;
use gha_generator::services::publisher::write_file;
use gha_generator::services::ProjectAnalyzer;
use gha_generator::{
    AuditReport, FileConfigStore, SecretDetector, Settings, TemplateEngine, Workflow,
    WorkflowGenerator, WorkflowPublisher, WorkflowRegistry, WorkflowValidator,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match &cli.command {
        Command::Generate(cmd) => generate(cmd, &settings).await?,
        Command::Validate(cmd) => validate_workflow(cmd, &settings)?,
        Command::ListTemplates(cmd) => list_templates(cmd, &settings)?,
        Command::GenerateFromAudit(cmd) => generate_from_audit(cmd, &settings)?,
        Command::Configs(cmd) => manage_configs(cmd, &settings).await?,
    }

    Ok(())
}

fn registry(settings: &Settings) -> WorkflowRegistry {
    let store = match &settings.configs_path {
        Some(dir) => FileConfigStore::new(dir),
        None => FileConfigStore::with_default_path(),
    };
    debug!("Saved configurations under {}", store.dir().display());
    WorkflowRegistry::new(Arc::new(store))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Print validation results; returns whether generation may go on
fn report_validation(validator: &WorkflowValidator, strict: bool) -> bool {
    let output = format_validation(validator.errors(), validator.warnings());
    if !output.is_empty() {
        println!("{}", output);
    }
    validator.errors().is_empty() && !(strict && !validator.warnings().is_empty())
}

async fn generate(cmd: &GenerateCommand, settings: &Settings) -> Result<()> {
    println!("{} Welcome to the GitHub Actions workflow generator!", ROCKET);

    let prompt = Prompt::new(!cmd.no_interaction);
    let analyzer = ProjectAnalyzer::new(&cmd.root).context("Failed to analyze project")?;
    let metadata = analyzer.analyze();
    let generator = WorkflowGenerator::new(TemplateEngine::new(settings.templates_dir(&cmd.root)));
    let registry = registry(settings);

    let mut config = if let Some(saved) = &cmd.saved {
        registry
            .recall_config(saved)
            .await?
            .with_context(|| format!("No saved configuration named '{}'", saved))?
    } else if let Some(template) = &cmd.template {
        let engine = generator.renderer();
        if !engine.exists(template) {
            println!("{} Template not found: {}", CROSS, style(template).bold());
            std::process::exit(1);
        }
        let branches = if cmd.branches.is_empty() {
            vec!["main".to_string()]
        } else {
            cmd.branches.clone()
        };
        let data = serde_json::json!({
            "name": cmd.name.as_deref().unwrap_or(template.as_str()),
            "branches": branches,
            "php_versions": matrix_versions(cmd, &metadata.php_versions, settings),
            "extensions": settings.defaults.extensions,
            "runner": settings.defaults.runner,
            "project": metadata,
        });
        let yaml = engine
            .render_template(template, &data)
            .with_context(|| format!("Failed to render template '{}'", template))?;
        WorkflowConfig::from_yaml(&yaml).context("Rendered template is not a valid configuration")?
    } else {
        let preset = match cmd.preset {
            Some(preset) => preset,
            None => prompt.choose_preset()?,
        };
        let name = match &cmd.name {
            Some(name) => name.clone(),
            None => prompt.ask("Workflow name", preset.key())?,
        };
        let branches = if !cmd.branches.is_empty() {
            cmd.branches.clone()
        } else if prompt.is_interactive() {
            split_list(&prompt.ask("Which branches to trigger on?", "main,develop")?)
        } else {
            vec!["main".to_string()]
        };
        let php_versions = matrix_versions(cmd, &metadata.php_versions, settings);
        let ctx = PresetContext {
            php_versions: &php_versions,
            extensions: &settings.defaults.extensions,
            runner: &settings.defaults.runner,
            metadata: &metadata,
        };
        preset.workflow_config(&name, &branches, &ctx)
    };
    if let Some(name) = &cmd.name {
        config.name = Some(name.clone());
    }

    if cmd.debug {
        println!("{} Configuration:", INFO);
        println!("{}", config.to_json()?);
    }

    let workflow = generator.generate(&config).context("Failed to generate workflow")?;

    if settings.validation.enabled {
        let mut validator = WorkflowValidator::new();
        validator.validate(&workflow);
        let strict = settings.validation.strict;
        if !report_validation(&validator, strict) {
            std::process::exit(1);
        }
    }

    let publisher = WorkflowPublisher::new(&cmd.root, settings.clone());
    let path = publisher.output_path(&workflow);

    if cmd.backup {
        if let Some(backup) = publisher.backup(&path)? {
            println!("{} Backup created: {}", INFO, style(backup.display()).dim());
        }
    }

    if cmd.diff && path.exists() {
        if publisher.differs(&workflow)? {
            println!("{} Files differ", INFO);
        } else {
            println!("{} Files are identical", INFO);
        }
        if !prompt.confirm("Apply changes?", true)? {
            return Ok(());
        }
    }

    let workflow = if cmd.merge && path.exists() {
        let mut existing = Workflow::load(&path)
            .with_context(|| format!("Failed to read existing workflow {}", path.display()))?;
        existing.merge(workflow);
        existing
    } else {
        workflow
    };

    let path = publisher.publish(&workflow).context("Failed to publish workflow")?;
    println!(
        "{} Generated workflow: {}",
        CHECK,
        style(path.display()).bold()
    );

    if settings.secrets.auto_detect {
        let detector = SecretDetector::new();
        let secrets = detector.detect(&workflow);
        if !secrets.is_empty() {
            println!("\n{}", format_secrets(&secrets));
            if settings.secrets.generate_instructions {
                println!("\n{}", detector.instructions(&secrets));
            }
        }
    }

    let save_as = match &cmd.save {
        Some(name) => Some(name.clone()),
        None if prompt.confirm("Store configuration for later regeneration?", false)? => {
            let slug = workflow.filename().trim_end_matches(".yml").to_string();
            Some(prompt.ask("Configuration name", &slug)?)
        }
        None => None,
    };
    if let Some(name) = save_as {
        registry.save_config(&name, &config).await?;
        println!("{} Configuration saved as {}", CHECK, style(name).cyan());
    }

    Ok(())
}

fn matrix_versions(cmd: &GenerateCommand, detected: &[String], settings: &Settings) -> Vec<String> {
    if !cmd.php_versions.is_empty() {
        cmd.php_versions.clone()
    } else if !detected.is_empty() {
        detected.to_vec()
    } else {
        settings.defaults.php_versions.clone()
    }
}

fn validate_workflow(cmd: &ValidateCommand, settings: &Settings) -> Result<()> {
    let file = cmd
        .file
        .clone()
        .unwrap_or_else(|| settings.workflows_path.join("test.yml"));
    if !file.exists() {
        println!("{} File not found: {}", CROSS, style(file.display()).bold());
        std::process::exit(1);
    }

    println!("{} Validating: {}", INFO, style(file.display()).bold());
    let yaml = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut validator = WorkflowValidator::new();
    validator.validate_yaml(&yaml);
    if !report_validation(&validator, cmd.strict || settings.validation.strict) {
        std::process::exit(1);
    }

    println!("{} Workflow is valid!", CHECK);
    Ok(())
}

fn list_templates(cmd: &ListTemplatesCommand, settings: &Settings) -> Result<()> {
    let engine = TemplateEngine::new(settings.templates_dir(&cmd.root));
    if !engine.templates_path().is_dir() {
        println!(
            "{} Templates directory not found: {}",
            CROSS,
            style(engine.templates_path().display()).bold()
        );
        std::process::exit(1);
    }

    let templates = engine.list()?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    if templates.is_empty() {
        println!("{} No templates found", INFO);
        return Ok(());
    }
    println!("{} Available Templates:\n", INFO);
    println!("{}", format_templates(&templates));
    Ok(())
}

fn generate_from_audit(cmd: &GenerateFromAuditCommand, settings: &Settings) -> Result<()> {
    if !cmd.file.exists() {
        println!("{} Audit file not found: {}", CROSS, style(cmd.file.display()).bold());
        std::process::exit(1);
    }

    println!("{} Reading audit report: {}", INFO, style(cmd.file.display()).bold());
    let report = AuditReport::from_file(&cmd.file).context("Invalid audit file format")?;
    let configs = report.workflow_configs();
    if configs.is_empty() {
        println!("{} No findings call for a workflow", INFO);
        return Ok(());
    }

    let output_dir = cmd.output.as_deref().unwrap_or(settings.workflows_path.as_path());
    let generator = WorkflowGenerator::new(TemplateEngine::new(&settings.templates_path));
    for config in &configs {
        let workflow = generator.generate(config)?;
        let path = output_dir.join(workflow.filename());
        write_audit_workflow(&path, &workflow)?;
        println!("{} Generated: {}", CHECK, style(path.display()).bold());
    }

    println!("{} Workflows generated from audit!", ROCKET);
    Ok(())
}

fn write_audit_workflow(path: &Path, workflow: &Workflow) -> Result<()> {
    write_file(path, &workflow.to_yaml()?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

async fn manage_configs(cmd: &ConfigsCommand, settings: &Settings) -> Result<()> {
    let registry = registry(settings);

    match cmd {
        ConfigsCommand::List => {
            let names = registry.list().await?;
            if names.is_empty() {
                println!("{} No saved configurations", INFO);
            } else {
                println!("{} Saved configurations:", INFO);
                println!("{}", format_items(&names));
            }
        }
        ConfigsCommand::Show { name } => match registry.show(name).await? {
            Some(json) => println!("{}", json),
            None => {
                println!("{} No saved configuration named {}", WARN, style(name).bold());
                std::process::exit(1);
            }
        },
        ConfigsCommand::Delete { name } => {
            if registry.delete(name).await? {
                println!("{} Deleted {}", CHECK, style(name).cyan());
            } else {
                println!("{} No saved configuration named {}", WARN, style(name).bold());
            }
        }
    }

    Ok(())
}
