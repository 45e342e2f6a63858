//! Detection of repository secrets referenced by a workflow

use crate::core::Workflow;
use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;
use tracing::warn;

fn secret_regex() -> &'static Regex {
    static SECRET: OnceLock<Regex> = OnceLock::new();
    SECRET.get_or_init(|| Regex::new(r"\$\{\{\s*secrets\.(\w+)\s*\}\}").expect("valid regex"))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SecretDetector;

impl SecretDetector {
    pub fn new() -> Self {
        Self
    }

    /// Names of `${{ secrets.NAME }}` references across every step, first occurrence first
    pub fn detect(&self, workflow: &Workflow) -> Vec<String> {
        let mut secrets: Vec<String> = Vec::new();
        for step in workflow.all_steps() {
            let text = match step.to_yaml() {
                Ok(text) => text,
                Err(err) => {
                    warn!("Skipping step during secret scan: {}", err);
                    continue;
                }
            };
            for caps in secret_regex().captures_iter(&text) {
                let name = &caps[1];
                if !secrets.iter().any(|s| s == name) {
                    secrets.push(name.to_string());
                }
            }
        }
        secrets
    }

    /// Markdown guide for configuring the given secrets
    pub fn instructions(&self, secrets: &[String]) -> String {
        let mut out = String::from("# Configure these secrets in GitHub Settings\n\n");
        out.push_str("## Instructions\n\n");
        out.push_str("1. Go to https://github.com/[owner]/[repo]/settings/secrets/actions\n");
        out.push_str("2. Add the following secrets:\n\n");
        for secret in secrets {
            let _ = writeln!(out, "### {}", secret);
            let _ = writeln!(out, "- Description: Add description for {}", secret);
            let _ = writeln!(out, "- Value: [Your value here]\n");
        }
        out
    }
}
