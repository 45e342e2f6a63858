//! CLI output formatting

use crate::services::TemplateInfo;
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static KEY: Emoji<'_, '_> = Emoji("🔑 ", "* ");

/// `  - item` lines
pub fn format_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("  - {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validation errors in red, then warnings in yellow
pub fn format_validation(errors: &[String], warnings: &[String]) -> String {
    let mut lines = Vec::new();
    if !errors.is_empty() {
        lines.push(format!("{} Validation failed:", CROSS));
        lines.extend(errors.iter().map(|e| format!("  - {}", style(e).red())));
    }
    if !warnings.is_empty() {
        lines.push(format!("{} Warnings:", WARN));
        lines.extend(warnings.iter().map(|w| format!("  - {}", style(w).yellow())));
    }
    lines.join("\n")
}

/// Templates grouped under their category
pub fn format_templates(templates: &[TemplateInfo]) -> String {
    let mut lines = Vec::new();
    let mut category: Option<&str> = None;
    for template in templates {
        if category != Some(template.category.as_str()) {
            if category.is_some() {
                lines.push(String::new());
            }
            lines.push(format!("{}:", style(&template.category).yellow()));
            category = Some(template.category.as_str());
        }
        lines.push(format!("  - {}", template.name));
    }
    lines.join("\n")
}

/// Secret names found in a workflow
pub fn format_secrets(secrets: &[String]) -> String {
    let mut lines = vec![format!("{} Secrets referenced by this workflow:", KEY)];
    lines.extend(secrets.iter().map(|s| format!("  - {}", style(s).cyan())));
    lines.join("\n")
}
