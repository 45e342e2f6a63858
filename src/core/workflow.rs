//! Workflow domain model

use crate::core::document::{merge_into, put, put_mapping, put_str, scalar_to_string, Document, Fields};
use crate::core::error::{Result, WorkflowError};
use crate::core::job::{Concurrency, Job};
use crate::core::step::Step;
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Name used when a configuration does not provide one
pub const DEFAULT_WORKFLOW_NAME: &str = "workflow";

/// Cron used when a schedule is requested without one
pub const DEFAULT_CRON: &str = "0 0 * * *";

/// The top-level workflow document
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    name: String,
    pub description: Option<String>,
    on: Mapping,
    /// Single cron expression, folded into `on.schedule` when serialized
    pub schedule: Option<String>,
    pub concurrency: Option<Concurrency>,
    env: Mapping,
    pub permissions: Mapping,
    jobs: Vec<Job>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            on: Mapping::new(),
            schedule: None,
            concurrency: None,
            env: Mapping::new(),
            permissions: Mapping::new(),
            jobs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Register a trigger event; `branches` is only recorded when non-empty
    ///
    /// `schedule` is not a branch event: it sets [`DEFAULT_CRON`] unless a
    /// cron is already present.
    pub fn on(&mut self, event: &str, branches: &[String]) {
        if event == "schedule" {
            self.schedule.get_or_insert_with(|| DEFAULT_CRON.to_string());
            return;
        }
        let key = Value::String(event.to_string());
        if !matches!(self.on.get(&key), Some(Value::Mapping(_))) {
            self.on.insert(key.clone(), Value::Mapping(Mapping::new()));
        }
        if !branches.is_empty() {
            if let Some(Value::Mapping(config)) = self.on.get_mut(&key) {
                config.insert(Value::String("branches".to_string()), branches.to_vec().into());
            }
        }
    }

    /// Trigger events, excluding the separately stored schedule
    pub fn triggers(&self) -> &Mapping {
        &self.on
    }

    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.env.insert(Value::String(key.into()), value.into());
    }

    pub fn env(&self) -> &Mapping {
        &self.env
    }

    /// Add a job; a job with the same id is replaced in place
    pub fn add_job(&mut self, job: Job) {
        match self.jobs.iter_mut().find(|existing| existing.id() == job.id()) {
            Some(existing) => *existing = job,
            None => self.jobs.push(job),
        }
    }

    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id() == id)
    }

    /// Jobs in insertion order
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Every step of every job, in order
    pub fn all_steps(&self) -> impl Iterator<Item = &Step> {
        self.jobs.iter().flat_map(|job| job.steps().iter())
    }

    /// `<slug>.yml` where the slug lower-cases the name and replaces spaces with hyphens
    pub fn filename(&self) -> String {
        format!("{}.yml", self.name.to_lowercase().replace(' ', "-"))
    }

    /// Overlay `other` onto this workflow
    ///
    /// Scalars set in `other` replace ours, trigger events/env/permissions
    /// merge key by key, jobs with the same id are replaced in place and new
    /// jobs are appended.
    pub fn merge(&mut self, other: Workflow) {
        self.name = other.name;
        if other.description.is_some() {
            self.description = other.description;
        }
        merge_into(&mut self.on, &other.on);
        if other.schedule.is_some() {
            self.schedule = other.schedule;
        }
        if other.concurrency.is_some() {
            self.concurrency = other.concurrency;
        }
        merge_into(&mut self.env, &other.env);
        merge_into(&mut self.permissions, &other.permissions);
        for job in other.jobs {
            self.add_job(job);
        }
    }

    /// Serialize into canonical field order
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        put(&mut doc, "name", self.name.as_str());
        put_str(&mut doc, "description", self.description.as_deref());

        let mut on = self.on.clone();
        if let Some(cron) = self.schedule.as_deref().filter(|c| !c.is_empty()) {
            let mut entry = Mapping::new();
            put(&mut entry, "cron", cron);
            put(&mut on, "schedule", vec![Value::Mapping(entry)]);
        }
        put_mapping(&mut doc, "on", &on);

        if let Some(concurrency) = &self.concurrency {
            put(&mut doc, "concurrency", concurrency.to_document());
        }
        put_mapping(&mut doc, "env", &self.env);
        put_mapping(&mut doc, "permissions", &self.permissions);

        let mut jobs = Mapping::new();
        for job in &self.jobs {
            put(&mut jobs, job.id(), job.to_document());
        }
        put(&mut doc, "jobs", jobs);
        doc
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.to_document())
            .map_err(|e| WorkflowError::Serialize(e.to_string()))
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Rebuild a workflow from its serialized form
    ///
    /// Trigger events keep only their `branches`; a schedule keeps only its
    /// first cron entry.
    pub fn from_document(doc: &Mapping) -> Result<Self> {
        let fields = Fields::new(doc, "");
        let name = fields
            .string("name")?
            .unwrap_or_else(|| DEFAULT_WORKFLOW_NAME.to_string());
        let mut workflow = Workflow::new(name);
        workflow.description = fields.string("description")?;

        if let Some(on) = fields.mapping("on")? {
            for (event, config) in on {
                let event = scalar_to_string(event)
                    .ok_or_else(|| WorkflowError::invalid_field("on", "event names must be strings"))?;
                if event == "schedule" {
                    workflow.schedule = first_cron(config)?;
                } else {
                    let branches = match config {
                        Value::Mapping(config) => {
                            Fields::new(config, format!("on.{}", event)).strings("branches")?
                        }
                        _ => None,
                    };
                    workflow.on(&event, &branches.unwrap_or_default());
                }
            }
        }

        if let Some(concurrency) = fields.mapping("concurrency")? {
            workflow.concurrency = Some(Concurrency::from_document(concurrency, "concurrency")?);
        }
        if let Some(env) = fields.mapping("env")? {
            merge_into(&mut workflow.env, env);
        }
        if let Some(permissions) = fields.mapping("permissions")? {
            workflow.permissions = permissions.clone();
        }
        if let Some(jobs) = fields.mapping("jobs")? {
            for (id, job) in jobs {
                let id = scalar_to_string(id)
                    .ok_or_else(|| WorkflowError::invalid_field("jobs", "job ids must be strings"))?;
                let job_doc = match job {
                    Value::Mapping(job_doc) => job_doc.clone(),
                    Value::Null => Mapping::new(),
                    _ => return Err(WorkflowError::invalid_field(format!("jobs.{}", id), "must be a mapping")),
                };
                workflow.add_job(Job::from_document(&id, &job_doc)?);
            }
        }
        Ok(workflow)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Mapping(doc) => Self::from_document(doc),
            _ => Err(WorkflowError::Parse("workflow document must be a mapping".to_string())),
        }
    }

    /// Read and parse an existing workflow file
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| WorkflowError::resource(path, e))?;
        Self::from_yaml(&content)
    }
}

/// `schedule: [{cron: ...}, ...]` keeps the first entry only
fn first_cron(config: &Value) -> Result<Option<String>> {
    let first = match config {
        Value::Sequence(entries) => entries.first(),
        Value::Null => None,
        _ => return Err(WorkflowError::invalid_field("on.schedule", "must be a sequence")),
    };
    match first {
        Some(Value::Mapping(entry)) => Fields::new(entry, "on.schedule[0]").string("cron"),
        Some(_) => Err(WorkflowError::invalid_field("on.schedule[0]", "must be a mapping")),
        None => Ok(None),
    }
}
