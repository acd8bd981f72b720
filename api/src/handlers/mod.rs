pub mod error;

pub use error::{handle_domain_error, validation_error};
