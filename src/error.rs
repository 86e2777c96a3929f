use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrewireError>;

#[derive(Debug, Error)]
pub enum PrewireError {
    #[error("Duplicate type declaration: {name}")]
    DuplicateDeclaration { name: String },

    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Internal error: {0}")]
    Internal(String),
}
