//! Matrix strategy construction

use crate::builder::job::JobBuilder;
use crate::core::document::put;
use serde_yaml::{Mapping, Value};

/// Accumulated strategy of one job
///
/// A job owns at most one of these; re-entering [`JobBuilder::strategy`]
/// resumes the same state.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StrategyState {
    fail_fast: bool,
    matrix: Mapping,
    max_parallel: Option<u32>,
    exclude: Vec<Value>,
    include: Vec<Value>,
}

impl Default for StrategyState {
    fn default() -> Self {
        Self {
            fail_fast: true,
            matrix: Mapping::new(),
            max_parallel: None,
            exclude: Vec::new(),
            include: Vec::new(),
        }
    }
}

impl StrategyState {
    /// Fold into the `strategy` mapping of a job
    ///
    /// `fail-fast` is always present. `matrix` appears when a dimension was
    /// set, `max-parallel` when positive, and `exclude`/`include` are spliced
    /// into `matrix` when non-empty, creating it after `max-parallel` if no
    /// dimension exists.
    pub(crate) fn to_mapping(&self) -> Mapping {
        let mut strategy = Mapping::new();
        put(&mut strategy, "fail-fast", self.fail_fast);
        if !self.matrix.is_empty() {
            put(&mut strategy, "matrix", self.matrix.clone());
        }
        if let Some(max) = self.max_parallel.filter(|m| *m > 0) {
            put(&mut strategy, "max-parallel", max);
        }

        let mut extra = Mapping::new();
        if !self.exclude.is_empty() {
            put(&mut extra, "exclude", self.exclude.clone());
        }
        if !self.include.is_empty() {
            put(&mut extra, "include", self.include.clone());
        }
        if !extra.is_empty() {
            let matrix = strategy
                .entry(Value::String("matrix".to_string()))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
            if let Value::Mapping(matrix) = matrix {
                for (key, value) in extra {
                    matrix.insert(key, value);
                }
            }
        }
        strategy
    }
}

/// Strategy sub-builder of a [`JobBuilder`]
///
/// The job builder is moved in and handed back by [`StrategyBuilder::end`],
/// which also stores the folded strategy on the job.
///
/// ```
/// use gha_generator::builder::JobBuilder;
///
/// let job = JobBuilder::new("tests")
///     .strategy()
///     .matrix("php-version", vec!["8.2", "8.3"])
///     .fail_fast(false)
///     .end()
///     .build();
/// assert!(job.strategy.contains_key("matrix"));
/// ```
#[derive(Debug)]
pub struct StrategyBuilder {
    job: JobBuilder,
    state: StrategyState,
}

impl StrategyBuilder {
    pub(crate) fn new(job: JobBuilder, state: StrategyState) -> Self {
        Self { job, state }
    }

    /// Set one matrix dimension; any name is accepted
    pub fn matrix(mut self, key: impl Into<String>, values: impl Into<Value>) -> Self {
        self.state.matrix.insert(Value::String(key.into()), values.into());
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.state.fail_fast = fail_fast;
        self
    }

    /// Zero leaves `max-parallel` out
    pub fn max_parallel(mut self, max: u32) -> Self {
        self.state.max_parallel = Some(max);
        self
    }

    pub fn exclude(mut self, combination: Mapping) -> Self {
        self.state.exclude.push(Value::Mapping(combination));
        self
    }

    pub fn include(mut self, combination: Mapping) -> Self {
        self.state.include.push(Value::Mapping(combination));
        self
    }

    /// Current folded form, without leaving the builder
    pub fn to_mapping(&self) -> Mapping {
        self.state.to_mapping()
    }

    /// Store the strategy on the job and return to the job builder
    pub fn end(self) -> JobBuilder {
        let mut job = self.job;
        job.set_strategy(self.state);
        job
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn combination(key: &str, value: &str) -> Mapping {
        let mut map = Mapping::new();
        map.insert(key.into(), value.into());
        map
    }

    #[test]
    fn test_default_strategy_is_fail_fast_only() {
        let strategy = StrategyState::default().to_mapping();
        assert_eq!(serde_json::to_value(&strategy).unwrap(), json!({"fail-fast": true}));
    }

    #[test]
    fn test_matrix_with_exclude() {
        let strategy = JobBuilder::new("tests")
            .strategy()
            .matrix("php-version", vec!["8.2", "8.3"])
            .exclude(combination("php-version", "8.2"))
            .to_mapping();

        assert_eq!(
            serde_json::to_value(&strategy).unwrap(),
            json!({
                "fail-fast": true,
                "matrix": {
                    "php-version": ["8.2", "8.3"],
                    "exclude": [{"php-version": "8.2"}]
                }
            })
        );
    }

    #[test]
    fn test_fold_order() {
        let strategy = JobBuilder::new("tests")
            .strategy()
            .max_parallel(2)
            .matrix("os", vec!["ubuntu-latest"])
            .include(combination("os", "windows-latest"))
            .to_mapping();

        let keys: Vec<_> = strategy.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["fail-fast", "matrix", "max-parallel"]);
        let matrix = strategy.get("matrix").and_then(Value::as_mapping).unwrap();
        let matrix_keys: Vec<_> = matrix.keys().filter_map(Value::as_str).collect();
        assert_eq!(matrix_keys, vec!["os", "include"]);
    }

    #[test]
    fn test_include_without_dimensions_appends_matrix() {
        let strategy = JobBuilder::new("tests")
            .strategy()
            .max_parallel(3)
            .include(combination("php-version", "8.4"))
            .to_mapping();

        let keys: Vec<_> = strategy.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["fail-fast", "max-parallel", "matrix"]);
    }

    #[test]
    fn test_zero_max_parallel_is_omitted() {
        let strategy = JobBuilder::new("tests").strategy().max_parallel(0).to_mapping();
        assert!(!strategy.contains_key("max-parallel"));
    }

    #[test]
    fn test_strategy_resumes_same_state() {
        let job = JobBuilder::new("tests")
            .strategy()
            .matrix("php-version", vec!["8.2"])
            .end()
            .name("Tests")
            .strategy()
            .fail_fast(false)
            .end()
            .build();

        assert_eq!(
            serde_json::to_value(&job.strategy).unwrap(),
            json!({"fail-fast": false, "matrix": {"php-version": ["8.2"]}})
        );
    }
}
