//! HTML page and redirect helpers.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};

pub fn html(body: String) -> Response {
    Html(body).into_response()
}

/// 302 Found to `location`.
pub fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// 302 Found to `location`, setting a cookie on the way.
pub fn redirect_with_cookie(location: &str, cookie: &str) -> Response {
    let mut response = redirect(location);
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}
