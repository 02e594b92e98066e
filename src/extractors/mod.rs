//! Request extractors: login session and form submissions.

pub mod form;
pub mod session;
pub use form::SubmittedForm;
pub use session::{cookie_value, CurrentSession};
