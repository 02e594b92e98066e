//! Routers: the admin pages and the health/readiness/version endpoints.

mod admin;
mod status;
pub use admin::{admin_routes, MAX_BODY_BYTES};
pub use status::status_routes;
