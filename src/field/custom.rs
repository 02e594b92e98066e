//! User-supplied field variants, selected per field with the `field=<name>` tag option.

use super::html::{escape, value_text};
use super::FieldAttrs;
use crate::config::TagOptions;
use crate::error::{ConfigError, FieldError};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File received in a multipart submission.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Stores an uploaded file and returns the reference saved as the field's value.
pub trait FileHandler: Send + Sync {
    fn handle_file(&self, upload: &UploadedFile) -> Result<String, FieldError>;
}

/// Behaviour of a custom field. Only `validate` and `render_control` are required.
pub trait CustomField: Send + Sync {
    fn configure(&mut self, _options: &TagOptions) -> Result<(), ConfigError> {
        Ok(())
    }

    fn validate(&self, raw: &str) -> Result<Value, FieldError>;

    /// The bare control; the label/error wrapper is added by the caller.
    fn render_control(&self, attrs: &FieldAttrs, value: &str) -> String;

    fn render_string(&self, value: &Value) -> String {
        escape(&value_text(value))
    }

    fn file_handler(&self) -> Option<&dyn FileHandler> {
        None
    }

    fn sql_type(&self) -> &'static str {
        "TEXT"
    }
}

pub type CustomFieldFactory = Arc<dyn Fn() -> Box<dyn CustomField> + Send + Sync>;

/// Named custom field constructors. Each registered field gets its own instance.
#[derive(Clone, Default)]
pub struct CustomFieldRegistry {
    factories: HashMap<String, CustomFieldFactory>,
}

impl CustomFieldRegistry {
    pub fn new() -> Self {
        CustomFieldRegistry::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn CustomField> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn CustomField>> {
        self.factories.get(name).map(|f| f())
    }
}

/// Upload field: stores files under a directory and keeps the stored file name.
/// The `upload_dir` tag option overrides the directory per field.
#[derive(Clone, Debug)]
pub struct FileField {
    dir: PathBuf,
}

impl FileField {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileField { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CustomField for FileField {
    fn configure(&mut self, options: &TagOptions) -> Result<(), ConfigError> {
        if let Some(dir) = options.get("upload_dir") {
            if dir.is_empty() {
                return Err(ConfigError::InvalidOption {
                    field: "file".into(),
                    key: "upload_dir".into(),
                    reason: "must not be empty".into(),
                });
            }
            self.dir = PathBuf::from(dir);
        }
        Ok(())
    }

    fn validate(&self, raw: &str) -> Result<Value, FieldError> {
        Ok(Value::String(raw.to_string()))
    }

    fn render_control(&self, attrs: &FieldAttrs, value: &str) -> String {
        let current = if value.is_empty() {
            String::new()
        } else {
            format!("<p class=\"help-block\">{}</p>", escape(value))
        };
        format!(
            "{}<input type=\"file\" id=\"{}\" name=\"{}\">",
            current,
            escape(attrs.name()),
            escape(attrs.name())
        )
    }

    fn file_handler(&self) -> Option<&dyn FileHandler> {
        Some(self)
    }
}

impl FileHandler for FileField {
    fn handle_file(&self, upload: &UploadedFile) -> Result<String, FieldError> {
        let original = Path::new(&upload.file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");
        let stored = format!("{}-{}", uuid::Uuid::new_v4().simple(), original);
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            tracing::error!(dir = %self.dir.display(), error = %e, "upload directory unavailable");
            FieldError::new("upload failed")
        })?;
        std::fs::write(self.dir.join(&stored), &upload.bytes).map_err(|e| {
            tracing::error!(file = %stored, error = %e, "upload write failed");
            FieldError::new("upload failed")
        })?;
        tracing::info!(file = %stored, size = upload.bytes.len(), "stored upload");
        Ok(stored)
    }
}
