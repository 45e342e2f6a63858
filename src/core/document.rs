//! Ordered key-value documents
//!
//! Every model serializes to a [`Document`] (an insertion-ordered YAML
//! mapping) before it becomes text. The helpers here write fields in the
//! order they are called and read fields back with shape checking.

use crate::core::error::{Result, WorkflowError};
use serde_yaml::{Mapping, Value};

/// Ordered mapping used as the intermediate form between models and text
pub type Document = Mapping;

/// Append `field` to `doc`
pub(crate) fn put(doc: &mut Document, field: &str, value: impl Into<Value>) {
    doc.insert(Value::String(field.to_string()), value.into());
}

/// Append `field` only when the string is set and non-empty
pub(crate) fn put_str(doc: &mut Document, field: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        put(doc, field, value);
    }
}

/// Append `field` only when the mapping has entries
pub(crate) fn put_mapping(doc: &mut Document, field: &str, value: &Mapping) {
    if !value.is_empty() {
        put(doc, field, value.clone());
    }
}

/// Render a scalar as a string; sequences and mappings have no scalar form
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Merge `entries` into `target`: existing keys keep their position, later values win
pub(crate) fn merge_into(target: &mut Mapping, entries: &Mapping) {
    for (key, value) in entries {
        target.insert(key.clone(), value.clone());
    }
}

/// Shape-checked reader over one level of a document
///
/// A field holding `null` reads the same as an absent field.
pub(crate) struct Fields<'a> {
    doc: &'a Mapping,
    path: String,
}

impl<'a> Fields<'a> {
    pub fn new(doc: &'a Mapping, path: impl Into<String>) -> Self {
        Self {
            doc,
            path: path.into(),
        }
    }

    /// Full dotted path of a field, used in error messages
    pub fn path_of(&self, field: &str) -> String {
        if self.path.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.path, field)
        }
    }

    pub fn value(&self, field: &str) -> Option<&'a Value> {
        self.doc.get(field).filter(|v| !v.is_null())
    }

    pub fn string(&self, field: &str) -> Result<Option<String>> {
        match self.value(field) {
            None => Ok(None),
            Some(value) => scalar_to_string(value)
                .map(Some)
                .ok_or_else(|| WorkflowError::invalid_field(self.path_of(field), "must be a string")),
        }
    }

    pub fn bool(&self, field: &str) -> Result<Option<bool>> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(WorkflowError::invalid_field(self.path_of(field), "must be a boolean")),
        }
    }

    pub fn u32(&self, field: &str) -> Result<Option<u32>> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| {
                    WorkflowError::invalid_field(self.path_of(field), "must be a non-negative integer")
                }),
            Some(_) => Err(WorkflowError::invalid_field(
                self.path_of(field),
                "must be a non-negative integer",
            )),
        }
    }

    pub fn mapping(&self, field: &str) -> Result<Option<&'a Mapping>> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::Mapping(map)) => Ok(Some(map)),
            Some(_) => Err(WorkflowError::invalid_field(self.path_of(field), "must be a mapping")),
        }
    }

    pub fn sequence(&self, field: &str) -> Result<Option<&'a [Value]>> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::Sequence(seq)) => Ok(Some(seq.as_slice())),
            Some(_) => Err(WorkflowError::invalid_field(self.path_of(field), "must be a sequence")),
        }
    }

    /// A list of scalars; a lone scalar reads as a one-element list
    pub fn strings(&self, field: &str) -> Result<Option<Vec<String>>> {
        let invalid = || WorkflowError::invalid_field(self.path_of(field), "must be a list of strings");
        match self.value(field) {
            None => Ok(None),
            Some(Value::Sequence(seq)) => seq
                .iter()
                .map(|item| scalar_to_string(item).ok_or_else(invalid))
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(value) => scalar_to_string(value).map(|s| Some(vec![s])).ok_or_else(invalid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_put_preserves_call_order() {
        let mut d = Document::new();
        put(&mut d, "zeta", "z");
        put(&mut d, "alpha", "a");
        let keys: Vec<_> = d.keys().filter_map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_put_str_skips_empty() {
        let mut d = Document::new();
        put_str(&mut d, "name", Some(""));
        put_str(&mut d, "id", None);
        assert!(d.is_empty());
    }

    #[test]
    fn test_merge_keeps_position_and_overrides() {
        let mut target = doc("A: 1\nB: 2\n");
        merge_into(&mut target, &doc("A: 3\nC: 4\n"));
        assert_eq!(serde_yaml::to_string(&target).unwrap(), "A: 3\nB: 2\nC: 4\n");
    }

    #[test]
    fn test_fields_null_reads_as_absent() {
        let d = doc("name: ~\n");
        let fields = Fields::new(&d, "");
        assert_eq!(fields.string("name").unwrap(), None);
    }

    #[test]
    fn test_fields_reports_dotted_path() {
        let d = doc("timeout-minutes: soon\n");
        let fields = Fields::new(&d, "jobs.build");
        let err = fields.u32("timeout-minutes").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'jobs.build.timeout-minutes' must be a non-negative integer"
        );
    }

    #[test]
    fn test_fields_strings_accepts_scalar() {
        let d = doc("needs: build\n");
        let fields = Fields::new(&d, "");
        assert_eq!(fields.strings("needs").unwrap(), Some(vec!["build".to_string()]));
    }
}
