use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqlFixError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Schema query error: {0}")]
    SchemaQuery(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("API error: status {status}, body: {body}")]
    Api { status: u16, body: String },

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SqlFixError>;
