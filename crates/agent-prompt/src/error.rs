//! Prompt errors

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PromptError>;

#[derive(Error, Debug)]
pub enum PromptError {
    /// Jinja syntax error, reported when the template is created
    #[error("Template {id} does not parse: {detail}")]
    Syntax { id: String, detail: String },

    /// Rendering failed against the given bindings
    #[error("Template {id} failed to render: {detail}")]
    Render { id: String, detail: String },

    #[error("No template registered as {0}")]
    UnknownTemplate(String),

    /// A prompt directory or `.prompt` file could not be read
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
