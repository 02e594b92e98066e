//! Validation and rendering for the built-in variants.

use super::html::{escape, value_text};
use super::{FieldAttrs, FieldVariant};
use crate::error::FieldError;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};

/// Storage format for time values.
const TIME_STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";
const TIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";
const TIME_PARSE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

pub(super) fn parse_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in TIME_PARSE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(t);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" => Some(false),
        _ => None,
    }
}

pub(super) fn validate(variant: &FieldVariant, raw: &str) -> Result<Value, FieldError> {
    match variant {
        FieldVariant::Text => Ok(Value::String(raw.to_string())),
        FieldVariant::Integer => raw
            .trim()
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|_| FieldError::new("invalid integer")),
        FieldVariant::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| FieldError::new("invalid number")),
        FieldVariant::Boolean => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| FieldError::new("invalid boolean")),
        FieldVariant::Time => parse_time(raw)
            .map(|t| Value::String(t.format(TIME_STORAGE_FORMAT).to_string()))
            .ok_or_else(|| FieldError::new("invalid time (expected YYYY-MM-DD HH:MM)")),
        FieldVariant::ForeignKey(_) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .map(|id| Value::Number(id.into()))
            .ok_or_else(|| FieldError::new("invalid reference id")),
        FieldVariant::Custom { .. } => unreachable!("custom fields validate themselves"),
    }
}

fn input(kind: &str, attrs: &FieldAttrs, value: &str, extra: &str) -> String {
    format!(
        "<input type=\"{}\" class=\"form-control\" id=\"{}\" name=\"{}\" value=\"{}\"{}{}>",
        kind,
        escape(attrs.name()),
        escape(attrs.name()),
        escape(value),
        extra,
        if attrs.read_only { " readonly" } else { "" }
    )
}

pub(super) fn render_control(variant: &FieldVariant, attrs: &FieldAttrs, raw: &str) -> String {
    match variant {
        FieldVariant::Text => input("text", attrs, raw, ""),
        FieldVariant::Integer => input("number", attrs, raw, " step=\"1\""),
        FieldVariant::Float => input("number", attrs, raw, " step=\"any\""),
        FieldVariant::Boolean => {
            let current = parse_bool(raw);
            let option = |value: &str, label: &str, selected: bool| {
                format!(
                    "<option value=\"{}\"{}>{}</option>",
                    value,
                    if selected { " selected" } else { "" },
                    label
                )
            };
            format!(
                "<select class=\"form-control\" id=\"{}\" name=\"{}\"{}>{}{}{}</select>",
                escape(attrs.name()),
                escape(attrs.name()),
                if attrs.read_only { " disabled" } else { "" },
                option("", "", current.is_none()),
                option("true", "Yes", current == Some(true)),
                option("false", "No", current == Some(false)),
            )
        }
        FieldVariant::Time => {
            // Unparseable input is echoed back so the user can correct it.
            let shown = parse_time(raw)
                .map(|t| t.format(TIME_INPUT_FORMAT).to_string())
                .unwrap_or_else(|| raw.to_string());
            input("datetime-local", attrs, &shown, "")
        }
        FieldVariant::ForeignKey(fk) => {
            let related = fk
                .target()
                .map(|t| {
                    format!(
                        " data-related=\"{}\" data-related-name=\"{}\"",
                        escape(&t.slug),
                        escape(&t.name)
                    )
                })
                .unwrap_or_default();
            input("number", attrs, raw, &format!(" step=\"1\" min=\"1\"{}", related))
        }
        FieldVariant::Custom { .. } => unreachable!("custom fields render themselves"),
    }
}

pub(super) fn render_string(variant: &FieldVariant, value: &Value) -> String {
    match variant {
        FieldVariant::Boolean => {
            let truthy = match value {
                Value::Bool(b) => Some(*b),
                Value::Number(n) => n.as_i64().map(|n| n != 0),
                Value::String(s) => parse_bool(s),
                _ => None,
            };
            match truthy {
                Some(true) => "Yes".into(),
                Some(false) => "No".into(),
                None => escape(&value_text(value)),
            }
        }
        FieldVariant::Time => {
            let text = value_text(value);
            parse_time(&text)
                .map(|t| t.format(TIME_DISPLAY_FORMAT).to_string())
                .unwrap_or_else(|| escape(&text))
        }
        _ => escape(&value_text(value)),
    }
}
