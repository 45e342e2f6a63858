//! Workflow template rendering
//!
//! Templates live at `<templates_path>/<category>/<name>.template` and use
//! `{{ path.to.value }}` placeholders resolved against JSON data, plus
//! `{{ helper arg ... }}` calls. GitHub expressions (`${{ ... }}`) are left
//! untouched so they reach the rendered workflow verbatim.

use crate::core::error::{Result, WorkflowError};
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// File extension of template files
pub const TEMPLATE_EXTENSION: &str = "template";

/// Extensions every PHP job installs
const BASE_PHP_EXTENSIONS: &[&str] = &["pdo", "json", "bcmath", "mbstring", "xml", "curl"];

type Helper = Box<dyn Fn(&[Value]) -> Result<String> + Send + Sync>;

/// Renders a template file into workflow text
pub trait TemplateRenderer {
    fn render_file(&self, path: &Path, data: &Value) -> Result<String>;
}

/// A template discovered on disk
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TemplateInfo {
    pub category: String,
    pub name: String,
    pub path: PathBuf,
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"(\$?)\{\{\s*(.*?)\s*\}\}").expect("valid regex"))
}

pub struct TemplateEngine {
    templates_path: PathBuf,
    helpers: HashMap<String, Helper>,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut helpers: Vec<_> = self.helpers.keys().collect();
        helpers.sort();
        f.debug_struct("TemplateEngine")
            .field("templates_path", &self.templates_path)
            .field("helpers", &helpers)
            .finish()
    }
}

impl TemplateEngine {
    /// Engine with the built-in `phpExtensions` and `ifEquals` helpers
    pub fn new(templates_path: impl Into<PathBuf>) -> Self {
        let mut engine = Self {
            templates_path: templates_path.into(),
            helpers: HashMap::new(),
        };
        engine.register_helper("phpExtensions", |args| {
            let version = args.first().map(render_value).unwrap_or_default();
            Ok(php_extensions(&version).join(","))
        });
        engine.register_helper("ifEquals", |args| match args {
            [left, right] => Ok((left == right).to_string()),
            _ => Err(WorkflowError::Template(
                "ifEquals expects two arguments".to_string(),
            )),
        });
        engine
    }

    pub fn register_helper<F>(&mut self, name: impl Into<String>, helper: F)
    where
        F: Fn(&[Value]) -> Result<String> + Send + Sync + 'static,
    {
        self.helpers.insert(name.into(), Box::new(helper));
    }

    pub fn templates_path(&self) -> &Path {
        &self.templates_path
    }

    /// Path of a template given as `<category>/<name>`
    pub fn path(&self, name: &str) -> PathBuf {
        self.templates_path
            .join(format!("{}.{}", name, TEMPLATE_EXTENSION))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    /// Render template text against `data`
    pub fn render(&self, template: &str, data: &Value) -> Result<String> {
        let mut failure = None;
        let rendered = placeholder_regex().replace_all(template, |caps: &Captures| {
            if !caps[1].is_empty() || failure.is_some() {
                return caps[0].to_string();
            }
            match self.expand(&caps[2], data) {
                Ok(text) => text,
                Err(err) => {
                    failure = Some(err);
                    String::new()
                }
            }
        });
        match failure {
            Some(err) => Err(err),
            None => Ok(rendered.into_owned()),
        }
    }

    /// Render a template by name (`<category>/<name>`)
    pub fn render_template(&self, name: &str, data: &Value) -> Result<String> {
        self.render_file(&self.path(name), data)
    }

    /// Every template under the templates directory, sorted by category then name
    pub fn list(&self) -> Result<Vec<TemplateInfo>> {
        let root = &self.templates_path;
        let entries = std::fs::read_dir(root).map_err(|e| WorkflowError::resource(root, e))?;

        let mut templates = Vec::new();
        for entry in entries {
            let category_path = entry.map_err(|e| WorkflowError::resource(root, e))?.path();
            if !category_path.is_dir() {
                continue;
            }
            let Some(category) = file_name(&category_path) else {
                continue;
            };
            let files = std::fs::read_dir(&category_path)
                .map_err(|e| WorkflowError::resource(&category_path, e))?;
            for file in files {
                let path = file.map_err(|e| WorkflowError::resource(&category_path, e))?.path();
                if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                    continue;
                }
                if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                    templates.push(TemplateInfo {
                        category: category.clone(),
                        name: name.to_string(),
                        path: path.clone(),
                    });
                }
            }
        }
        templates.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
        Ok(templates)
    }

    fn expand(&self, expression: &str, data: &Value) -> Result<String> {
        let mut tokens = expression.split_whitespace();
        let Some(head) = tokens.next() else {
            return Err(WorkflowError::Template("empty placeholder".to_string()));
        };

        if let Some(helper) = self.helpers.get(head) {
            let args = tokens
                .map(|token| resolve_argument(token, data))
                .collect::<Result<Vec<_>>>()?;
            return helper(&args);
        }
        if tokens.next().is_some() {
            return Err(WorkflowError::Template(format!("unknown helper '{}'", head)));
        }
        lookup(data, head)
            .map(render_value)
            .ok_or_else(|| WorkflowError::Template(format!("missing variable '{}'", head)))
    }
}

impl TemplateRenderer for TemplateEngine {
    fn render_file(&self, path: &Path, data: &Value) -> Result<String> {
        debug!("Rendering template {}", path.display());
        let template =
            std::fs::read_to_string(path).map_err(|e| WorkflowError::resource(path, e))?;
        self.render(&template, data)
    }
}

/// Resolve a dotted path (`a.b.0`) inside JSON data
fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Quoted literal, data path, or bare number
fn resolve_argument(token: &str, data: &Value) -> Result<Value> {
    for quote in ['"', '\''] {
        if let Some(inner) = token
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return Ok(Value::String(inner.to_string()));
        }
    }
    if let Some(value) = lookup(data, token) {
        return Ok(value.clone());
    }
    if token.parse::<f64>().is_ok() {
        return Ok(Value::String(token.to_string()));
    }
    Err(WorkflowError::Template(format!("missing variable '{}'", token)))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Extensions for a PHP version; `enum` is added from 8.1 on
pub fn php_extensions(version: &str) -> Vec<&'static str> {
    let mut extensions = BASE_PHP_EXTENSIONS.to_vec();
    if version_at_least(version, (8, 1)) {
        extensions.push("enum");
    }
    extensions
}

fn version_at_least(version: &str, minimum: (u32, u32)) -> bool {
    let mut parts = version.trim().split('.').map(|p| p.parse::<u32>().unwrap_or(0));
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    (major, minor) >= minimum
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().and_then(|n| n.to_str()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> TemplateEngine {
        TemplateEngine::new("resources/templates")
    }

    #[test]
    fn test_renders_dotted_paths() {
        let data = json!({"name": "Tests", "php": {"versions": ["8.2", "8.3"]}});
        let rendered = engine()
            .render("name: {{ name }}\nversions: [{{ php.versions }}]", &data)
            .unwrap();
        assert_eq!(rendered, "name: Tests\nversions: [8.2,8.3]");
    }

    #[test]
    fn test_github_expressions_pass_through() {
        let rendered = engine()
            .render("php-version: ${{ matrix.php-version }}", &json!({}))
            .unwrap();
        assert_eq!(rendered, "php-version: ${{ matrix.php-version }}");
    }

    #[test]
    fn test_missing_variable_is_error() {
        let err = engine().render("{{ nope }}", &json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Template error: missing variable 'nope'");
    }

    #[test]
    fn test_php_extensions_helper() {
        let rendered = engine()
            .render("{{ phpExtensions version }}", &json!({"version": "8.2"}))
            .unwrap();
        assert_eq!(rendered, "pdo,json,bcmath,mbstring,xml,curl,enum");

        let rendered = engine().render("{{ phpExtensions \"7.4\" }}", &json!({})).unwrap();
        assert_eq!(rendered, "pdo,json,bcmath,mbstring,xml,curl");
    }

    #[test]
    fn test_if_equals_helper() {
        let data = json!({"db": "mysql"});
        let rendered = engine().render("{{ ifEquals db 'mysql' }}", &data).unwrap();
        assert_eq!(rendered, "true");
    }

    #[test]
    fn test_custom_helper() {
        let mut engine = engine();
        engine.register_helper("upper", |args| {
            Ok(args.first().map(render_value).unwrap_or_default().to_uppercase())
        });
        let rendered = engine.render("{{ upper name }}", &json!({"name": "ci"})).unwrap();
        assert_eq!(rendered, "CI");
    }

    #[test]
    fn test_list_and_render_file() {
        let dir = tempfile::tempdir().unwrap();
        let laravel = dir.path().join("laravel");
        std::fs::create_dir_all(&laravel).unwrap();
        std::fs::write(laravel.join("testing.template"), "name: {{ name }}\n").unwrap();
        std::fs::write(laravel.join("notes.txt"), "ignored").unwrap();

        let engine = TemplateEngine::new(dir.path());
        let templates = engine.list().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].category, "laravel");
        assert_eq!(templates[0].name, "testing");
        assert!(engine.exists("laravel/testing"));

        let rendered = engine
            .render_template("laravel/testing", &json!({"name": "Tests"}))
            .unwrap();
        assert_eq!(rendered, "name: Tests\n");
    }

    #[test]
    fn test_list_missing_directory_is_resource_error() {
        let engine = TemplateEngine::new("/nonexistent/templates");
        assert!(matches!(engine.list(), Err(WorkflowError::Resource { .. })));
    }
}
