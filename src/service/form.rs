//! Form assembly and validation of submitted values.

use crate::field::{UploadedFile, ROW_WIDTH};
use crate::model::Model;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{self, Write};

/// Raw form submission: text values and uploaded files, keyed by field name.
#[derive(Clone, Debug, Default)]
pub struct FormSubmission {
    pub values: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl FormSubmission {
    pub fn new() -> Self {
        FormSubmission::default()
    }

    pub fn value(mut self, name: impl Into<String>, raw: impl Into<String>) -> Self {
        self.values.insert(name.into(), raw.into());
        self
    }

    pub fn file(mut self, name: impl Into<String>, upload: UploadedFile) -> Self {
        self.files.insert(name.into(), upload);
        self
    }

    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// Submitted text as form values, for re-rendering a rejected form.
    pub fn raw_values(&self) -> HashMap<String, Value> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }
}

/// Typed data for every non-empty submitted field plus an error message per rejected field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidatedForm {
    pub data: HashMap<String, Value>,
    pub errors: HashMap<String, String>,
}

impl ValidatedForm {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct FormService;

impl FormService {
    /// Render every field in declaration order. Values come from `values` when given, else the
    /// configured defaults when `use_defaults`, else empty. A field starts a new grid row when
    /// the widths before it add up to a multiple of 12.
    pub fn render<W: Write>(
        out: &mut W,
        model: &Model,
        values: Option<&HashMap<String, Value>>,
        use_defaults: bool,
        errors: Option<&HashMap<String, String>>,
    ) -> fmt::Result {
        let mut active_col: u32 = 0;
        for field in model.fields() {
            let default;
            let value = match values {
                Some(values) => values.get(field.name()),
                None if use_defaults && !field.default_value().is_empty() => {
                    default = Value::String(field.default_value().to_string());
                    Some(&default)
                }
                None => None,
            };
            let error = errors.and_then(|e| e.get(field.name())).map(String::as_str);
            field.render(out, value, error, active_col % u32::from(ROW_WIDTH) == 0)?;
            active_col += u32::from(field.width());
        }
        Ok(())
    }

    /// Render to a string.
    pub fn render_to_string(
        model: &Model,
        values: Option<&HashMap<String, Value>>,
        use_defaults: bool,
        errors: Option<&HashMap<String, String>>,
    ) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = Self::render(&mut out, model, values, use_defaults, errors);
        out
    }

    /// Validate every editable field. Errors are collected, never short-circuited; empty values
    /// are left out of the data (unset on insert, unchanged on update).
    pub fn validate(model: &Model, submission: &FormSubmission) -> ValidatedForm {
        let mut result = ValidatedForm::default();
        for field in model.editable_fields() {
            let name = field.name();
            let mut raw = submission.get(name).to_string();

            if raw.is_empty() {
                if let (Some(handler), Some(upload)) = (field.file_handler(), submission.files.get(name)) {
                    match handler.handle_file(upload) {
                        Ok(reference) => raw = reference,
                        Err(e) => {
                            result.errors.insert(name.to_string(), e.message);
                            continue;
                        }
                    }
                }
            }

            if raw.is_empty() {
                continue;
            }

            match field.validate(&raw) {
                Ok(value) => {
                    result.data.insert(name.to_string(), value);
                }
                Err(e) => {
                    tracing::debug!(model = %model.name(), field = name, error = %e, "field rejected");
                    result.errors.insert(name.to_string(), e.message);
                }
            }
        }
        result
    }

    /// Pair a row (every column, field order) with field names.
    pub fn row_values(model: &Model, row: Vec<Value>) -> HashMap<String, Value> {
        model
            .fields()
            .iter()
            .zip(row)
            .map(|(f, v)| (f.name().to_string(), v))
            .collect()
    }
}
