//! Field abstraction: one column's metadata plus its validate/render behaviour.
//!
//! Built-in variants are resolved at registration; user-supplied behaviour plugs in through
//! [`CustomField`], looked up by name in a [`CustomFieldRegistry`].

mod builtin;
pub mod custom;
pub mod html;

pub use custom::{CustomField, CustomFieldFactory, CustomFieldRegistry, FileField, FileHandler, UploadedFile};

use crate::config::TagOptions;
use crate::error::{ConfigError, FieldError};
use serde_json::Value;
use std::any::TypeId;
use std::fmt::{self, Write};

/// Grid units in one form row.
pub const ROW_WIDTH: u8 = 12;

/// Shared attributes of every field. `name` and `column_name` are fixed at construction.
#[derive(Clone, Debug)]
pub struct FieldAttrs {
    name: String,
    column_name: String,
    pub label: String,
    pub list: bool,
    pub searchable: bool,
    pub default_value: String,
    pub width: u8,
    pub read_only: bool,
}

impl FieldAttrs {
    fn new(name: String, column_name: String) -> Self {
        FieldAttrs {
            label: name.clone(),
            name,
            column_name,
            list: false,
            searchable: false,
            default_value: String::new(),
            width: ROW_WIDTH,
            read_only: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }
}

/// Registered model a foreign key points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelLink {
    pub index: usize,
    pub name: String,
    pub slug: String,
    pub table_name: String,
}

#[derive(Clone, Debug)]
pub struct ForeignKey {
    pub target_type: TypeId,
    pub target_type_name: &'static str,
    target: Option<ModelLink>,
}

impl ForeignKey {
    pub fn new(target_type: TypeId, target_type_name: &'static str) -> Self {
        ForeignKey {
            target_type,
            target_type_name,
            target: None,
        }
    }

    /// None until the target model has been registered.
    pub fn target(&self) -> Option<&ModelLink> {
        self.target.as_ref()
    }
}

pub enum FieldVariant {
    Text,
    Integer,
    Float,
    Boolean,
    Time,
    ForeignKey(ForeignKey),
    Custom {
        name: String,
        field: Box<dyn CustomField>,
    },
}

impl FieldVariant {
    pub fn kind_name(&self) -> &str {
        match self {
            FieldVariant::Text => "text",
            FieldVariant::Integer => "integer",
            FieldVariant::Float => "float",
            FieldVariant::Boolean => "boolean",
            FieldVariant::Time => "time",
            FieldVariant::ForeignKey(_) => "foreign_key",
            FieldVariant::Custom { name, .. } => name,
        }
    }
}

impl fmt::Debug for FieldVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldVariant::ForeignKey(fk) => f.debug_tuple("ForeignKey").field(fk).finish(),
            other => f.write_str(other.kind_name()),
        }
    }
}

#[derive(Debug)]
pub struct Field {
    attrs: FieldAttrs,
    variant: FieldVariant,
}

impl Field {
    pub fn new(name: impl Into<String>, column_name: impl Into<String>, variant: FieldVariant) -> Self {
        Field {
            attrs: FieldAttrs::new(name.into(), column_name.into()),
            variant,
        }
    }

    pub fn attrs(&self) -> &FieldAttrs {
        &self.attrs
    }

    pub fn name(&self) -> &str {
        &self.attrs.name
    }

    pub fn column_name(&self) -> &str {
        &self.attrs.column_name
    }

    pub fn label(&self) -> &str {
        &self.attrs.label
    }

    pub fn is_list(&self) -> bool {
        self.attrs.list
    }

    pub fn is_searchable(&self) -> bool {
        self.attrs.searchable
    }

    pub fn default_value(&self) -> &str {
        &self.attrs.default_value
    }

    pub fn width(&self) -> u8 {
        self.attrs.width
    }

    pub fn variant(&self) -> &FieldVariant {
        &self.variant
    }

    pub fn foreign_key(&self) -> Option<&ForeignKey> {
        match &self.variant {
            FieldVariant::ForeignKey(fk) => Some(fk),
            _ => None,
        }
    }

    /// Apply tag options: label, list, search, default, width. Custom fields also see every option.
    pub fn configure(&mut self, options: &TagOptions) -> Result<(), ConfigError> {
        if let Some(label) = options.get("label").filter(|l| !l.is_empty()) {
            self.attrs.label = label.to_string();
        }
        if options.flag("list") {
            self.attrs.list = true;
        }
        if options.flag("search") {
            self.attrs.searchable = true;
        }
        if let Some(default) = options.get("default") {
            self.attrs.default_value = default.to_string();
        }
        if let Some(width) = options.get("width") {
            self.attrs.width = parse_width(width).ok_or_else(|| ConfigError::InvalidWidth {
                field: self.attrs.name.clone(),
                value: width.to_string(),
            })?;
        }
        if let FieldVariant::Custom { field, .. } = &mut self.variant {
            field.configure(options)?;
        }
        Ok(())
    }

    /// The identifier column: always listed, never edited through the form.
    pub(crate) fn mark_identifier(&mut self) {
        self.attrs.list = true;
        self.attrs.read_only = true;
    }

    pub(crate) fn bind_target(&mut self, link: ModelLink) {
        if let FieldVariant::ForeignKey(fk) = &mut self.variant {
            fk.target = Some(link);
        }
    }

    /// Parse a raw submitted string into the field's typed value.
    pub fn validate(&self, raw: &str) -> Result<Value, FieldError> {
        match &self.variant {
            FieldVariant::Custom { field, .. } => field.validate(raw),
            builtin => builtin::validate(builtin, raw),
        }
    }

    /// Labeled control plus inline error text, wrapped in a grid column.
    pub fn render<W: Write>(
        &self,
        out: &mut W,
        value: Option<&Value>,
        error: Option<&str>,
        starts_row: bool,
    ) -> fmt::Result {
        let raw = value.map(html::value_text).unwrap_or_default();
        let control = match &self.variant {
            FieldVariant::Custom { field, .. } => field.render_control(&self.attrs, &raw),
            builtin => builtin::render_control(builtin, &self.attrs, &raw),
        };
        html::write_wrapper(
            out,
            &self.attrs.name,
            &self.attrs.label,
            self.attrs.width,
            &control,
            error,
            starts_row,
        )
    }

    /// Escaped, read-only text for list views.
    pub fn render_string(&self, value: &Value) -> String {
        if value.is_null() {
            return String::new();
        }
        match &self.variant {
            FieldVariant::Custom { field, .. } => field.render_string(value),
            builtin => builtin::render_string(builtin, value),
        }
    }

    /// Upload capability, present only on custom fields that accept files.
    pub fn file_handler(&self) -> Option<&dyn FileHandler> {
        match &self.variant {
            FieldVariant::Custom { field, .. } => field.file_handler(),
            _ => None,
        }
    }

    /// SQLite column type used when creating the table.
    pub fn sql_type(&self) -> &'static str {
        match &self.variant {
            FieldVariant::Text => "TEXT",
            FieldVariant::Integer | FieldVariant::ForeignKey(_) => "INTEGER",
            FieldVariant::Float => "REAL",
            FieldVariant::Boolean => "BOOLEAN",
            FieldVariant::Time => "DATETIME",
            FieldVariant::Custom { field, .. } => field.sql_type(),
        }
    }
}

fn parse_width(s: &str) -> Option<u8> {
    s.trim()
        .parse::<u8>()
        .ok()
        .filter(|w| (1..=ROW_WIDTH).contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_tag;
    use serde_json::json;

    fn configured(variant: FieldVariant, tag: &str) -> Result<Field, ConfigError> {
        let mut field = Field::new("Age", "age", variant);
        field.configure(&parse_tag(tag).unwrap())?;
        Ok(field)
    }

    #[test]
    fn defaults_before_configuration() {
        let field = Field::new("Name", "name", FieldVariant::Text);
        assert_eq!(field.label(), "Name");
        assert_eq!(field.width(), 12);
        assert!(!field.is_list());
        assert!(!field.is_searchable());
        assert_eq!(field.default_value(), "");
    }

    #[test]
    fn configure_applies_known_options() {
        let field = configured(FieldVariant::Integer, "label=Years,list,search,default=18,width=4").unwrap();
        assert_eq!(field.label(), "Years");
        assert!(field.is_list());
        assert!(field.is_searchable());
        assert_eq!(field.default_value(), "18");
        assert_eq!(field.width(), 4);
        assert_eq!(field.name(), "Age");
        assert_eq!(field.column_name(), "age");
    }

    #[test]
    fn configure_rejects_bad_width() {
        for tag in ["width=abc", "width=0", "width=13", "width=-1"] {
            let err = configured(FieldVariant::Integer, tag).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidWidth { .. }), "{}", tag);
        }
    }

    #[test]
    fn render_string_escapes_and_blanks_null() {
        let field = Field::new("Name", "name", FieldVariant::Text);
        assert_eq!(field.render_string(&json!("<b>Ann</b>")), "&lt;b&gt;Ann&lt;/b&gt;");
        assert_eq!(field.render_string(&Value::Null), "");
    }

    #[test]
    fn render_writes_label_value_and_error() {
        let field = configured(FieldVariant::Integer, "width=6").unwrap();
        let mut out = String::new();
        field
            .render(&mut out, Some(&json!("thirty")), Some("invalid integer"), true)
            .unwrap();
        assert!(out.contains("<label for=\"Age\">Age</label>"));
        assert!(out.contains("value=\"thirty\""));
        assert!(out.contains("invalid integer"));
        assert!(out.contains("col-sm-6"));
    }

    #[test]
    fn identifier_is_listed_and_read_only() {
        let mut field = Field::new("Id", "id", FieldVariant::Integer);
        field.mark_identifier();
        assert!(field.is_list());
        let mut out = String::new();
        field.render(&mut out, Some(&json!(7)), None, true).unwrap();
        assert!(out.contains("readonly"));
    }
}
