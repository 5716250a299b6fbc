pub mod defaults;
pub mod validation;

pub use defaults::apply_defaults;
pub use validation::{column_errors, validate, validate_identity};
