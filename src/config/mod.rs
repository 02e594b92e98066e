pub mod settings;
pub mod tag;

pub use settings::*;
pub use tag::*;
