//! Service container construction

use crate::core::document::put;
use serde_yaml::{Mapping, Value};

/// Builds the configuration of one service container
#[derive(Debug, Clone)]
pub struct ServiceBuilder {
    name: String,
    config: Mapping,
}

impl ServiceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: Mapping::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        put(&mut self.config, "image", image.into());
        self
    }

    /// Add one environment variable; repeated calls accumulate
    pub fn env(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.section("env").insert(Value::String(key.into()), value.into());
        self
    }

    /// Append a port mapping such as `3306:3306`
    pub fn port(mut self, port: impl Into<Value>) -> Self {
        self.list("ports").push(port.into());
        self
    }

    pub fn options(mut self, options: impl Into<String>) -> Self {
        put(&mut self.config, "options", options.into());
        self
    }

    pub fn volume(mut self, volume: impl Into<String>) -> Self {
        self.list("volumes").push(Value::String(volume.into()));
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        let mut credentials = Mapping::new();
        put(&mut credentials, "username", username.into());
        put(&mut credentials, "password", password.into());
        put(&mut self.config, "credentials", credentials);
        self
    }

    pub fn build(self) -> Mapping {
        self.config
    }

    fn section(&mut self, field: &str) -> &mut Mapping {
        let key = Value::String(field.to_string());
        let entry = self
            .config
            .entry(key)
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !entry.is_mapping() {
            *entry = Value::Mapping(Mapping::new());
        }
        match entry {
            Value::Mapping(map) => map,
            _ => unreachable!("entry was just set to a mapping"),
        }
    }

    fn list(&mut self, field: &str) -> &mut Vec<Value> {
        let key = Value::String(field.to_string());
        let entry = self
            .config
            .entry(key)
            .or_insert_with(|| Value::Sequence(Vec::new()));
        if !entry.is_sequence() {
            *entry = Value::Sequence(Vec::new());
        }
        match entry {
            Value::Sequence(items) => items,
            _ => unreachable!("entry was just set to a sequence"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_service() {
        let service = ServiceBuilder::new("mysql")
            .image("mysql:8.0")
            .env("MYSQL_DATABASE", "testing")
            .env("MYSQL_ROOT_PASSWORD", "password")
            .port("3306:3306")
            .options("--health-cmd=\"mysqladmin ping\"")
            .build();

        let expected: Mapping = serde_yaml::from_str(
            r#"
image: mysql:8.0
env:
  MYSQL_DATABASE: testing
  MYSQL_ROOT_PASSWORD: password
ports:
  - 3306:3306
options: --health-cmd="mysqladmin ping"
"#,
        )
        .unwrap();
        assert_eq!(service, expected);
    }

    #[test]
    fn test_ports_append() {
        let service = ServiceBuilder::new("web").port(80).port("443:443").build();
        let ports = service.get("ports").and_then(Value::as_sequence).unwrap();
        assert_eq!(ports.len(), 2);
    }
}
