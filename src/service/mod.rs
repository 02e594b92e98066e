//! CrudService: generic CRUD using the safe SQL builder. FormService: form rendering and validation.

mod crud;
mod form;
pub use crud::CrudService;
pub use form::{FormService, FormSubmission, ValidatedForm};
