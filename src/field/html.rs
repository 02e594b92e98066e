//! HTML helpers shared by field renderers.

use serde_json::Value;
use std::fmt::{self, Write};

/// Escape text for element content and double/single-quoted attributes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Plain text form of a stored value, as it would be typed into a form.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Grid column wrapping one labeled control. A field that starts a row closes the previous one.
pub fn write_wrapper<W: Write>(
    out: &mut W,
    name: &str,
    label: &str,
    width: u8,
    control: &str,
    error: Option<&str>,
    starts_row: bool,
) -> fmt::Result {
    if starts_row {
        out.write_str("</div><div class=\"row\">")?;
    }
    write!(
        out,
        "<div class=\"col-sm-{}\"><div class=\"form-group\"><label for=\"{}\">{}</label>{}",
        width,
        escape(name),
        escape(label),
        control
    )?;
    if let Some(err) = error.filter(|e| !e.is_empty()) {
        write!(out, "<p class=\"text-danger\">{}</p>", escape(err))?;
    }
    out.write_str("</div></div>")
}
