use thiserror::Error;

/// Setup-time failures. Per-document validation never returns these: syntax
/// errors, engine faults and unresolvable paths all degrade locally inside
/// the lint pass.
#[derive(Error, Debug)]
pub enum SchemaLintError {
    /// Schema file could not be read
    #[error("Failed to read schema file: {0}")]
    SchemaFileRead(#[from] std::io::Error),

    /// Schema file is not valid JSON
    #[error("Failed to parse schema as JSON: {0}")]
    SchemaParse(#[from] serde_json::Error),

    /// The schema document itself does not compile
    #[error("Invalid JSON schema provided: {0}")]
    InvalidSchema(String),
}
