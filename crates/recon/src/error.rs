use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad prefix, empty file name, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// The tag grammar could not be compiled.
    #[error("invalid tag grammar: {0}")]
    Grammar(String),
}
