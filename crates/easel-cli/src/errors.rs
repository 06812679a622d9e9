//! Error types for the controller runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::tools::ToolError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("a tool must be provided; run `easel --help` for the list")]
    MissingCommand,
    #[error("invalid keyword argument '{argument}': expected KEY=JSON")]
    InvalidKeywordArgument { argument: String },
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(serde_json::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}

impl AppError {
    /// Host-side traceback carried by a failed tool call.
    pub(crate) fn traceback(&self) -> Option<&str> {
        match self {
            Self::Tool(error) => error.traceback(),
            _ => None,
        }
    }
}
