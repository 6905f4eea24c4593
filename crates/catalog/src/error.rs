use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid catalog document: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Unsupported catalog schema_version {0} (expected 1)")]
    UnsupportedSchemaVersion(u32),

    #[error("Duplicate activity id '{0}'")]
    DuplicateActivity(String),

    #[error("Duplicate theme label '{0}'")]
    DuplicateTheme(String),

    #[error("Activity '{id}' references unknown theme '{theme}'")]
    UnknownTheme { id: String, theme: String },

    #[error("Activity '{id}' has invalid duration range {min}..{max} minutes")]
    InvalidDuration { id: String, min: u32, max: u32 },

    #[error("Activity '{id}' has invalid level_required {level} (must be >= 1)")]
    InvalidLevel { id: String, level: u32 },

    #[error("Catalog registry already installed")]
    AlreadyInstalled,
}
