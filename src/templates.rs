//! Page rendering collaborator. Handlers build a JSON context and hand it to a [`Templates`] implementation.

use crate::error::AppError;
use serde_json::Value;

/// Template names used by the handlers.
pub const TEMPLATE_NAMES: &[&str] = &["login.html", "index.html", "list.html", "popup.html", "edit.html"];

pub trait Templates: Send + Sync {
    fn render(&self, name: &str, context: &Value) -> Result<String, AppError>;
}

impl<F> Templates for F
where
    F: Fn(&str, &Value) -> Result<String, AppError> + Send + Sync,
{
    fn render(&self, name: &str, context: &Value) -> Result<String, AppError> {
        self(name, context)
    }
}

/// Renders the context as JSON embedded in a minimal page. Useful headless and in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonTemplates;

/// Id of the `<script>` element holding the context.
pub const CONTEXT_ELEMENT_ID: &str = "context";

impl Templates for JsonTemplates {
    fn render(&self, name: &str, context: &Value) -> Result<String, AppError> {
        if !TEMPLATE_NAMES.contains(&name) {
            return Err(AppError::Template {
                name: name.to_string(),
                message: "unknown template".into(),
            });
        }
        let json = serde_json::to_string(context).map_err(|e| AppError::Template {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        let title = context.get("title").and_then(Value::as_str).unwrap_or("");
        Ok(format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title></head>\
             <body data-template=\"{}\"><script type=\"application/json\" id=\"{}\">{}</script></body></html>\n",
            crate::field::html::escape(title),
            name,
            CONTEXT_ELEMENT_ID,
            escape_script_json(&json)
        ))
    }
}

/// Keep JSON valid while preventing it from closing the script element.
fn escape_script_json(json: &str) -> String {
    json.replace('&', "\\u0026")
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}

/// Recover the context from a page produced by [`JsonTemplates`].
pub fn extract_context(page: &str) -> Option<Value> {
    let open = format!("<script type=\"application/json\" id=\"{}\">", CONTEXT_ELEMENT_ID);
    let start = page.find(&open)? + open.len();
    let end = start + page[start..].find("</script>")?;
    serde_json::from_str(&page[start..end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn context_survives_markup_in_values() {
        let ctx = json!({ "title": "A & B", "form": "<input name=\"x\"></script>" });
        let page = JsonTemplates.render("edit.html", &ctx).unwrap();
        assert!(page.contains("<title>A &amp; B</title>"));
        assert!(!page.contains("</script></script>"));
        assert_eq!(extract_context(&page), Some(ctx));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let err = JsonTemplates.render("missing.html", &json!({})).unwrap_err();
        assert!(matches!(err, AppError::Template { .. }));
    }

    #[test]
    fn closures_are_templates() {
        let t = |name: &str, _ctx: &Value| -> Result<String, AppError> { Ok(name.to_uppercase()) };
        assert_eq!(t.render("list.html", &json!({})).unwrap(), "LIST.HTML");
    }
}
