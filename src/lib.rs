pub mod config;
pub mod error;
pub mod executor;
pub mod llm;
pub mod prompts;
pub mod schema;
pub mod validator;
