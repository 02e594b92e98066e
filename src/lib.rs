//! autoadmin: a CRUD admin interface generated from model declarations.
//!
//! Declare models with [`AdminModel`], register them on an [`AdminBuilder`], build the
//! [`Registry`] and serve [`admin_routes`] over a SQLite pool.

pub mod case;
pub mod config;
pub mod error;
pub mod extractors;
pub mod field;
pub mod handlers;
pub mod logging;
pub mod model;
pub mod registry;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod session;
pub mod sql;
pub mod state;
pub mod store;
pub mod templates;

pub use config::{parse_tag, AdminSettings, NameTransform, TagOptions};
pub use error::{AppError, ConfigError, FieldError, RegistrationError};
pub use logging::init_tracing;
pub use field::{CustomField, Field, FieldVariant, FileField, FileHandler, UploadedFile};
pub use model::{AdminModel, FieldDescriptor, FieldKind, FieldType, Model, ModelGroup};
pub use registry::{AdminBuilder, GroupId, Registry};
pub use routes::{admin_routes, status_routes};
pub use schema::ensure_tables;
pub use service::{CrudService, FormService, FormSubmission, ValidatedForm};
pub use session::{Message, SessionStore};
pub use state::AppState;
pub use store::connect;
pub use templates::{JsonTemplates, Templates};
