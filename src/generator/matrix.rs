use crate::core::config::{MatrixConfig, OneOrMany};
use crate::core::document::put;
use crate::services::ComposerAnalyzer;
use serde_yaml::Mapping;

/// Produces matrix dimensions from shorthand configuration or a manifest
#[derive(Debug, Default, Clone, Copy)]
pub struct MatrixGenerator;

impl MatrixGenerator {
    pub fn new() -> Self {
        Self
    }

    /// `php`, `database` and `laravel` become the `php-version`, `database`
    /// and `laravel` dimensions; single values are wrapped in a list
    pub fn generate(&self, config: &MatrixConfig) -> Mapping {
        let mut matrix = Mapping::new();
        let dimensions = [
            ("php-version", &config.php),
            ("database", &config.database),
            ("laravel", &config.laravel),
        ];
        for (dimension, values) in dimensions {
            if let Some(values) = values.clone().map(OneOrMany::into_vec) {
                put(&mut matrix, dimension, values);
            }
        }
        matrix
    }

    /// Dimensions guessed from the manifest; empty guesses are left out
    pub fn generate_from_manifest(&self, composer: &ComposerAnalyzer) -> Mapping {
        let mut matrix = Mapping::new();
        let versions = composer.php_versions();
        if !versions.is_empty() {
            put(&mut matrix, "php-version", versions);
        }
        let databases = composer.databases();
        if !databases.is_empty() {
            put(&mut matrix, "database", databases);
        }
        matrix
    }
}
