//! Model list, new/edit form and save handlers.

use super::{render_page, SearchQuery};
use crate::error::AppError;
use crate::extractors::{CurrentSession, SubmittedForm};
use crate::model::Model;
use crate::response::redirect;
use crate::service::{CrudService, FormService, FormSubmission};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

fn find_model<'a>(state: &'a AppState, slug: &str) -> Result<&'a Model, AppError> {
    state
        .registry
        .model(slug)
        .ok_or_else(|| AppError::NotFound(format!("model {}", slug)))
}

/// Identifiers are positive integers; anything else is a miss.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::NotFound(format!("id {}", raw)))
}

fn model_url(state: &AppState, slug: &str, rest: &str) -> String {
    state.settings.url(&format!("/model/{}/{}", slug, rest))
}

async fn render_list(
    state: &AppState,
    session: &CurrentSession,
    slug: &str,
    view: Option<&str>,
    q: &str,
) -> Result<Response, AppError> {
    let model = find_model(state, slug)?;
    let rows = CrudService::list(&state.pool, model, Some(q)).await?;
    let fields = model.list_fields();
    let results: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            fields
                .iter()
                .zip(row)
                .map(|(field, value)| field.render_string(value))
                .collect()
        })
        .collect();
    let template = match view {
        Some("popup") => "popup.html",
        _ => "list.html",
    };
    let mut ctx = Map::new();
    ctx.insert("name".into(), json!(model.name()));
    ctx.insert("slug".into(), json!(model.slug()));
    ctx.insert("columns".into(), json!(model.list_columns()));
    ctx.insert("results".into(), json!(results));
    ctx.insert("skipId".into(), json!(model.identifier().column_name() != "id"));
    render_page(state, session, q, template, ctx)
}

/// GET /model/:slug/
pub async fn list(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(slug): Path<String>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    render_list(&state, &session, &slug, None, &query.q).await
}

/// GET /model/:slug/:view/ (`popup` renders the picker used by foreign key inputs).
pub async fn list_view(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((slug, view)): Path<(String, String)>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    render_list(&state, &session, &slug, Some(&view), &query.q).await
}

fn render_edit(
    state: &AppState,
    session: &CurrentSession,
    model: &Model,
    id: Option<i64>,
    values: Option<&HashMap<String, Value>>,
    errors: Option<&HashMap<String, String>>,
) -> Result<Response, AppError> {
    let form = FormService::render_to_string(model, values, id.is_none(), errors);
    let mut ctx = Map::new();
    ctx.insert("id".into(), json!(id.unwrap_or(0)));
    ctx.insert("name".into(), json!(model.name()));
    ctx.insert("slug".into(), json!(model.slug()));
    ctx.insert("form".into(), Value::String(form));
    if let Some(errors) = errors {
        ctx.insert("errors".into(), json!(errors));
    }
    render_page(state, session, "", "edit.html", ctx)
}

/// GET /model/:slug/new/
pub async fn new_form(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let model = find_model(&state, &slug)?;
    render_edit(&state, &session, model, None, None, None)
}

/// GET /model/:slug/edit/:id/
pub async fn edit_form(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let model = find_model(&state, &slug)?;
    let id = parse_id(&id)?;
    let row = CrudService::read(&state.pool, model, id).await?;
    let values = FormService::row_values(model, row);
    render_edit(&state, &session, model, Some(id), Some(&values), None)
}

/// POST /model/:slug/new/
pub async fn save_new(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(slug): Path<String>,
    SubmittedForm(submission): SubmittedForm,
) -> Result<Response, AppError> {
    save(&state, &session, &slug, None, submission).await
}

/// POST /model/:slug/edit/:id/
pub async fn save_existing(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((slug, id)): Path<(String, String)>,
    SubmittedForm(submission): SubmittedForm,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    save(&state, &session, &slug, Some(id), submission).await
}

/// Validate and store. Rejected submissions re-render the form with per-field errors and write nothing.
async fn save(
    state: &AppState,
    session: &CurrentSession,
    slug: &str,
    id: Option<i64>,
    submission: FormSubmission,
) -> Result<Response, AppError> {
    let model = find_model(state, slug)?;
    let mut validated = FormService::validate(model, &submission);
    if validated.is_valid() {
        for name in CrudService::missing_references(&state.pool, &state.registry, model, &validated.data).await? {
            validated.errors.insert(name, "invalid reference id".to_string());
        }
    }
    if !validated.is_valid() {
        tracing::info!(model = %model.name(), errors = validated.errors.len(), "submission rejected");
        let mut values = submission.raw_values();
        if let Some(id) = id {
            values.insert(model.identifier().name().to_string(), json!(id));
        }
        return render_edit(state, session, model, id, Some(&values), Some(&validated.errors));
    }

    let saved_id = match id {
        Some(id) => {
            CrudService::update(&state.pool, model, id, &validated.data).await?;
            id
        }
        None => CrudService::create(&state.pool, model, &validated.data).await?,
    };
    tracing::info!(model = %model.name(), id = saved_id, created = id.is_none(), "row saved");

    if let Some(token) = session.token() {
        state
            .sessions
            .add_message(token, "success", format!("{} has been saved.", model.name()));
    }

    if submission.get("done") == "true" {
        Ok(redirect(&model_url(state, slug, "")))
    } else {
        Ok(redirect(&model_url(state, slug, &format!("edit/{}/", saved_id))))
    }
}
