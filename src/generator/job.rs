use crate::builder::{JobBuilder, ServiceBuilder};
use crate::core::config::{JobConfig, ServiceConfig, StrategyConfig};
use crate::core::document::Fields;
use crate::core::error::{Result, WorkflowError};
use crate::core::Job;
use crate::generator::StepGenerator;
use serde_yaml::{Mapping, Value};

/// Id used when a job is generated outside a workflow without one
pub const DEFAULT_JOB_ID: &str = "job";

/// Maps a job configuration onto a [`Job`]
#[derive(Debug, Default, Clone, Copy)]
pub struct JobGenerator {
    steps: StepGenerator,
}

impl JobGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a standalone job; its id comes from `id` or defaults to "job"
    pub fn generate(&self, config: &JobConfig) -> Result<Job> {
        let id = config.id.as_deref().unwrap_or(DEFAULT_JOB_ID);
        Ok(self.configure(JobBuilder::new(id), config)?.build())
    }

    /// Apply every key present in `config` to `builder`
    pub fn configure(&self, mut builder: JobBuilder, config: &JobConfig) -> Result<JobBuilder> {
        let path = format!("jobs.{}", builder.id());

        if let Some(name) = &config.name {
            builder = builder.name(name);
        }
        if let Some(runner) = &config.runs_on {
            builder = builder.runs_on(runner);
        }
        if let Some(environment) = &config.environment {
            builder = builder.environment(environment);
        }
        if let Some(minutes) = config.timeout_minutes {
            builder = builder.timeout(minutes);
        }
        if let Some(continue_on_error) = config.continue_on_error {
            builder = builder.continue_on_error(continue_on_error);
        }
        if let Some(concurrency) = &config.concurrency {
            builder = builder.concurrency(
                &concurrency.group,
                concurrency.cancel_in_progress.unwrap_or(true),
            );
        }
        if let Some(permissions) = &config.permissions {
            builder = builder.permissions(permissions.clone());
        }
        if let Some(strategy) = &config.strategy {
            builder = self.strategy(builder, strategy, &format!("{}.strategy", path))?;
        }
        if let Some(needs) = &config.needs {
            builder = builder.needs(needs.clone().into_vec());
        }
        if let Some(condition) = &config.condition {
            builder = builder.condition(condition);
        }
        if let Some(defaults) = &config.defaults {
            builder = builder.defaults(defaults.clone());
        }
        if let Some(services) = &config.services {
            for (name, service) in services {
                let service_path = format!("{}.services.{}", path, name);
                let service = service_builder(name, service, &service_path)?;
                builder = builder.service(name, |_| service);
            }
        }
        if let Some(steps) = &config.steps {
            for step in steps {
                builder = builder.add_step(self.steps.generate(step));
            }
        }
        if let Some(env) = &config.env {
            builder = builder.env(env);
        }
        Ok(builder)
    }

    /// Drive the strategy builder; `exclude` and `include` become combination lists
    fn strategy(&self, builder: JobBuilder, config: &StrategyConfig, path: &str) -> Result<JobBuilder> {
        let mut strategy = builder.strategy();
        if let Some(fail_fast) = config.fail_fast {
            strategy = strategy.fail_fast(fail_fast);
        }
        if let Some(matrix) = &config.matrix {
            for (key, values) in matrix {
                match key.as_str() {
                    Some("exclude") => {
                        for combination in combinations(values, &format!("{}.matrix.exclude", path))? {
                            strategy = strategy.exclude(combination);
                        }
                    }
                    Some("include") => {
                        for combination in combinations(values, &format!("{}.matrix.include", path))? {
                            strategy = strategy.include(combination);
                        }
                    }
                    Some(dimension) => strategy = strategy.matrix(dimension, values.clone()),
                    None => {
                        return Err(WorkflowError::invalid_field(
                            format!("{}.matrix", path),
                            "dimension names must be strings",
                        ))
                    }
                }
            }
        }
        if let Some(max) = config.max_parallel {
            strategy = strategy.max_parallel(max);
        }
        Ok(strategy.end())
    }
}

fn combinations(values: &Value, path: &str) -> Result<Vec<Mapping>> {
    let invalid = || WorkflowError::invalid_field(path, "must be a list of mappings");
    match values {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| item.as_mapping().cloned().ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

fn service_builder(name: &str, config: &ServiceConfig, path: &str) -> Result<ServiceBuilder> {
    let mut service = ServiceBuilder::new(name);
    if let Some(image) = &config.image {
        service = service.image(image);
    }
    if let Some(env) = &config.env {
        for (key, value) in env {
            let key = key
                .as_str()
                .ok_or_else(|| WorkflowError::invalid_field(format!("{}.env", path), "keys must be strings"))?;
            service = service.env(key, value.clone());
        }
    }
    for port in config.ports.iter().flatten() {
        service = service.port(port.clone());
    }
    if let Some(options) = &config.options {
        service = service.options(options);
    }
    for volume in config.volumes.iter().flatten() {
        service = service.volume(volume);
    }
    if let Some(credentials) = &config.credentials {
        let fields = Fields::new(credentials, format!("{}.credentials", path));
        let username = fields
            .string("username")?
            .ok_or_else(|| WorkflowError::invalid_field(fields.path_of("username"), "is required"))?;
        let password = fields
            .string("password")?
            .ok_or_else(|| WorkflowError::invalid_field(fields.path_of("password"), "is required"))?;
        service = service.credentials(username, password);
    }
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(yaml: &str) -> Result<Job> {
        let config: JobConfig = serde_yaml::from_str(yaml).unwrap();
        JobGenerator::new().generate(&config)
    }

    #[test]
    fn test_defaults_for_empty_config() {
        let job = job("{}").unwrap();
        assert_eq!(job.id(), "job");
        assert_eq!(job.runs_on, "ubuntu-latest");
        assert!(job.strategy.is_empty());
    }

    #[test]
    fn test_matrix_exclude_and_include_survive() {
        let job = job(
            r#"
id: tests
strategy:
  matrix:
    php-version: ["8.2", "8.3"]
    os: [ubuntu-latest]
    exclude:
      - php-version: "8.2"
    include:
      - php-version: "8.4"
        experimental: true
  max-parallel: 2
"#,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&job.strategy).unwrap(),
            json!({
                "fail-fast": true,
                "matrix": {
                    "php-version": ["8.2", "8.3"],
                    "os": ["ubuntu-latest"],
                    "exclude": [{"php-version": "8.2"}],
                    "include": [{"php-version": "8.4", "experimental": true}]
                },
                "max-parallel": 2
            })
        );
    }

    #[test]
    fn test_bad_exclude_shape() {
        let err = job("strategy:\n  matrix:\n    exclude: nope\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'jobs.job.strategy.matrix.exclude' must be a list of mappings"
        );
    }

    #[test]
    fn test_services_and_needs() {
        let job = job(
            r#"
id: test
needs: lint
services:
  postgres:
    image: postgres:16
    env:
      POSTGRES_PASSWORD: postgres
    ports: ["5432:5432"]
    credentials:
      username: bot
      password: ${{ secrets.REGISTRY_TOKEN }}
"#,
        )
        .unwrap();

        assert_eq!(job.needs, vec!["lint"]);
        let expected: Mapping = serde_yaml::from_str(
            r#"
postgres:
  image: postgres:16
  env:
    POSTGRES_PASSWORD: postgres
  ports: ["5432:5432"]
  credentials:
    username: bot
    password: ${{ secrets.REGISTRY_TOKEN }}
"#,
        )
        .unwrap();
        assert_eq!(job.services, expected);
    }

    #[test]
    fn test_selective_presence() {
        let job = job("runs-on: macos-latest\nsteps:\n  - run: make\n").unwrap();
        let keys: Vec<_> = job
            .to_document()
            .keys()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect();
        assert_eq!(keys, vec!["runs-on", "steps"]);
    }
}
