//! Error types for the recolor crate.
//!
//! Nothing in a recolor pass is fatal. These errors surface at the edges:
//! loading a [`Config`](crate::Config), compiling a transform, or a single
//! fetch. The pass itself logs them and degrades locally.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a [`Config`](crate::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document could not be deserialized.
    #[error("failed to parse config{}: {source}", display_path(.path))]
    Parse {
        /// Optional source file path.
        path: Option<PathBuf>,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A URL pattern is not a valid regular expression.
    #[error("invalid url pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

/// Errors raised by the transform sandbox.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The transform expression has a syntax error.
    #[error("transform does not compile: {0}")]
    Compile(#[source] minijinja::Error),

    /// Evaluating the transform failed (unknown filter, fuel exhausted, ...).
    #[error("transform failed: {0}")]
    Eval(#[source] minijinja::Error),

    /// The transform returned something other than 3 or 4 finite numbers.
    #[error("transform must return [r, g, b] or [r, g, b, a], got {0}")]
    Shape(String),
}

/// Errors raised by a [`Fetch`](crate::Fetch) implementation.
///
/// Source collection turns every one of these into an empty contribution.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    /// The request never produced a response body.
    #[error("failed to fetch {url}: {message}")]
    Transport { url: String, message: String },

    /// A local stylesheet could not be read.
    #[error("failed to read {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Umbrella error for callers that combine several recolor operations.
#[derive(Debug, Error)]
pub enum RecolorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The color grammar could not be compiled from the library's names.
    #[error("invalid color grammar: {0}")]
    Grammar(#[from] regex::Error),
}

/// Result type for recolor operations.
pub type Result<T> = std::result::Result<T, RecolorError>;
