//! Error types for stencil runs.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by runner primitives, run-steps and teardowns.
#[derive(Debug, Error)]
pub enum Error {
    /// A transformer rejected a file.
    #[error("transform of {name} failed: {message}")]
    Transform { name: String, message: String },

    /// Writing or removing a file on the real filesystem failed.
    #[error("write to {} failed: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file exists on the real filesystem but could not be read.
    #[error("read of {} failed: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A command could not be spawned or exited unsuccessfully.
    #[error("command `{command}` failed: {message}")]
    Command { command: String, message: String },

    /// The HTTP exchange failed or answered with status 400 or above.
    #[error("request {request} failed: {message}")]
    Request {
        request: String,
        status: Option<u16>,
        message: String,
    },

    /// The name is neither in the disk nor on the real filesystem.
    #[error("file not found: {name}")]
    NotFound { name: String },

    /// A teardown step failed.
    #[error("teardown of generator {generator} failed: {source}")]
    Teardown {
        generator: String,
        #[source]
        source: Box<Error>,
    },

    /// An asset bundle could not be enumerated.
    #[error("asset bundle error: {message}")]
    Asset { message: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// The caller cancelled the run before the primitive started.
    #[error("cancelled before {operation}")]
    Cancelled { operation: String },

    /// `run` was called on a runner that already ran.
    #[error("runner already ran; construct a fresh runner per run")]
    AlreadyRan,

    /// Free-form failure returned by a user run-step.
    #[error("{message}")]
    Step { message: String },
}

impl Error {
    /// Failure raised from inside a run-step or teardown.
    pub fn step(message: impl Into<String>) -> Self {
        Error::Step {
            message: message.into(),
        }
    }

    /// Failure raised from inside a transformer.
    pub fn transform(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Transform {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// HTTP status attached to a request failure, if the exchange completed.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request { status, .. } => *status,
            _ => None,
        }
    }
}

/// Result type alias for stencil operations.
pub type Result<T> = std::result::Result<T, Error>;
