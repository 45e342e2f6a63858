//! Writing workflows to disk, backups and git auto-commit

use crate::core::error::{Result, WorkflowError};
use crate::core::{Settings, Workflow};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Timestamp suffix of backup files
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Publishes workflows under a project root
#[derive(Debug, Clone)]
pub struct WorkflowPublisher {
    root: PathBuf,
    settings: Settings,
}

impl WorkflowPublisher {
    /// `root` is the project directory the configured paths are relative to
    pub fn new(root: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            root: root.into(),
            settings,
        }
    }

    pub fn workflows_dir(&self) -> PathBuf {
        self.root.join(&self.settings.workflows_path)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join(&self.settings.backups_path)
    }

    /// `<workflows_path>/<slug>.yml`
    pub fn output_path(&self, workflow: &Workflow) -> PathBuf {
        self.workflows_dir().join(workflow.filename())
    }

    /// Whether the file on disk differs from the rendered workflow; a missing file differs
    pub fn differs(&self, workflow: &Workflow) -> Result<bool> {
        let path = self.output_path(workflow);
        if !path.exists() {
            return Ok(true);
        }
        let current = std::fs::read_to_string(&path).map_err(|e| WorkflowError::resource(&path, e))?;
        Ok(current != workflow.to_yaml()?)
    }

    /// Write the workflow, then commit it when `git.auto_commit` is set
    pub fn publish(&self, workflow: &Workflow) -> Result<PathBuf> {
        let path = self.output_path(workflow);
        write_file(&path, &workflow.to_yaml()?)?;
        info!("Published workflow '{}' to {}", workflow.name(), path.display());

        if self.settings.git.auto_commit {
            let git = GitCommitter::new(&self.root);
            git.commit(
                &path,
                &self.settings.commit_message(workflow.name()),
                self.settings.git.auto_push,
            )?;
        }
        Ok(path)
    }

    /// Copy `path` into the backups directory; nothing happens when it does not exist
    pub fn backup(&self, path: &Path) -> Result<Option<PathBuf>> {
        if !path.exists() {
            return Ok(None);
        }
        let dir = self.backups_dir();
        std::fs::create_dir_all(&dir).map_err(|e| WorkflowError::resource(&dir, e))?;

        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workflow.yml".to_string());
        let stamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT);
        let target = dir.join(format!("{}.{}", basename, stamp));

        std::fs::copy(path, &target).map_err(|e| WorkflowError::resource(path, e))?;
        info!("Backup created: {}", target.display());
        Ok(Some(target))
    }
}

/// Write `content`, creating parent directories as needed
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| WorkflowError::resource(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| WorkflowError::resource(path, e))
}

/// Runs git in a working tree
#[derive(Debug, Clone)]
pub struct GitCommitter {
    workspace: PathBuf,
}

impl GitCommitter {
    pub fn new(workspace: &Path) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
        }
    }

    /// `git add <path>`, `git commit -m <message>`, then `git push` when asked
    pub fn commit(&self, path: &Path, message: &str, push: bool) -> Result<()> {
        let path = path.to_string_lossy();
        self.run(&["add", path.as_ref()])?;
        self.run(&["commit", "-m", message])?;
        info!("Committed {}", path);
        if push {
            self.run(&["push"])?;
            info!("Pushed workflow commit");
        }
        Ok(())
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workspace)
            .output()
            .map_err(|e| WorkflowError::Git(format!("failed to execute git {}: {}", args[0], e)))?;

        if !output.status.success() {
            return Err(WorkflowError::Git(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
