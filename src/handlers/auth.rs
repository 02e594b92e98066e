//! Index, login and logout.

use super::{render_page, SearchQuery};
use crate::error::AppError;
use crate::extractors::CurrentSession;
use crate::response::{redirect, redirect_with_cookie};
use crate::session::SESSION_COOKIE;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Response,
    Form,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn login_page(state: &AppState, session: &CurrentSession, error: Option<&str>) -> Result<Response, AppError> {
    let mut ctx = Map::new();
    ctx.insert("anonymous".into(), Value::Bool(true));
    if let Some(error) = error {
        ctx.insert("error".into(), Value::String(error.to_string()));
    }
    render_page(state, session, "", "login.html", ctx)
}

/// GET /: the model groups when logged in, the login form otherwise.
pub async fn index(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    if session.is_anonymous() {
        return login_page(&state, &session, None);
    }
    let groups: Vec<Value> = state
        .registry
        .groups()
        .iter()
        .map(|g| {
            let models: Vec<Value> = state
                .registry
                .group_models(g)
                .map(|m| json!({ "name": m.name(), "slug": m.slug() }))
                .collect();
            json!({ "name": g.name, "slug": g.slug, "models": models })
        })
        .collect();
    let mut ctx = Map::new();
    ctx.insert("groups".into(), Value::Array(groups));
    render_page(&state, &session, &query.q, "index.html", ctx)
}

/// POST /: check credentials and start a session.
pub async fn login(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let settings = &state.settings;
    if !session.is_anonymous() {
        return Ok(redirect(&settings.index_url()));
    }
    if form.username != settings.username || form.password != settings.password {
        tracing::warn!(username = %form.username, "login rejected");
        return login_page(&state, &session, Some("Invalid username or password."));
    }
    let token = state.sessions.create(&form.username);
    let cookie = format!(
        "{}={}; Path={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        token,
        settings.index_url()
    );
    Ok(redirect_with_cookie(&settings.index_url(), &cookie))
}

/// GET /logout/: end the session and clear the cookie.
pub async fn logout(State(state): State<AppState>, session: CurrentSession) -> Response {
    let settings = &state.settings;
    if let Some(token) = session.token() {
        state.sessions.remove(token);
    }
    let cookie = format!("{}=; Path={}; Max-Age=0", SESSION_COOKIE, settings.index_url());
    redirect_with_cookie(&settings.index_url(), &cookie)
}
