//! HTTP handlers for login/logout and model list/edit pages.

pub mod auth;
pub mod model;
pub use auth::*;
pub use model::*;

use crate::error::AppError;
use crate::extractors::CurrentSession;
use crate::response::html;
use crate::state::AppState;
use axum::response::Response;
use serde::Deserialize;
use serde_json::{Map, Value};

/// `?q=` search term carried to every page.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Render `template` with the keys every page gets: title, path, q, anonymous, username, messages.
pub(crate) fn render_page(
    state: &AppState,
    session: &CurrentSession,
    q: &str,
    template: &str,
    mut ctx: Map<String, Value>,
) -> Result<Response, AppError> {
    ctx.insert("title".into(), Value::String(state.settings.title.clone()));
    ctx.insert("path".into(), Value::String(state.settings.path.clone()));
    ctx.insert("q".into(), Value::String(q.to_string()));
    ctx.entry("anonymous").or_insert(Value::Bool(false));
    let username = session.token().and_then(|t| state.sessions.username(t));
    ctx.insert("username".into(), username.map(Value::String).unwrap_or(Value::Null));
    let messages = session
        .token()
        .map(|t| state.sessions.take_messages(t))
        .unwrap_or_default();
    ctx.insert(
        "messages".into(),
        serde_json::to_value(messages).unwrap_or(Value::Array(Vec::new())),
    );
    let body = state.templates.render(template, &Value::Object(ctx))?;
    Ok(html(body))
}
