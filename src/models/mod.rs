pub mod atom;
pub mod enums;
pub mod payload;
pub mod template;

pub use atom::*;
pub use enums::*;
pub use payload::*;
pub use template::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Malformed template {id}: {reason}")]
    MalformedTemplate { id: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
