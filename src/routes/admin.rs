//! Admin page routes, mounted below `AdminSettings::path`.
//! Everything except the index/login page and static assets requires a session.

use crate::extractors::CurrentSession;
use crate::handlers::{edit_form, index, list, list_view, login, logout, new_form, save_existing, save_new};
use crate::response::redirect;
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

/// Largest accepted request body (uploads included).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

async fn require_session(
    State(state): State<AppState>,
    session: CurrentSession,
    req: Request,
    next: Next,
) -> Response {
    if session.is_anonymous() {
        tracing::debug!(path = %req.uri().path(), "no session, redirecting to login");
        return redirect(&state.settings.index_url());
    }
    next.run(req).await
}

pub fn admin_routes(state: AppState) -> Router {
    let settings = state.settings.clone();

    let protected = Router::new()
        .route(&settings.url("/logout/"), get(logout))
        .route(&settings.url("/model/:slug/"), get(list))
        .route(&settings.url("/model/:slug/new/"), get(new_form).post(save_new))
        .route(&settings.url("/model/:slug/edit/:id/"), get(edit_form).post(save_existing))
        .route(&settings.url("/model/:slug/:view/"), get(list_view))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    let mut public = Router::new().route(&settings.index_url(), get(index).post(login));
    if settings.path != "/" {
        public = public.route(&settings.path, get(index).post(login));
    }

    public
        .nest_service(&settings.url("/static"), ServeDir::new(&settings.static_dir))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(DefaultBodyLimit::disable()),
        )
        .with_state(state)
}
