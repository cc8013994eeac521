//! Error types for definition resolution and mount extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no swagger definition found")]
    NoDefinitionFound,

    // IO errors (exit code 3)
    #[error("cannot read local swagger definition ({path}): {source}")]
    ReadDefinition {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error while fetching swagger definition from s3://{bucket}/{key}: {message}")]
    RemoteFetch {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("cannot read body of s3://{bucket}/{key}: {message}")]
    RemoteBody {
        bucket: String,
        key: String,
        message: String,
    },

    // Definition errors (exit code 2)
    #[error("cannot serialize inline definition body: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot parse swagger definition: {message}")]
    DocumentParse { message: String },
}

impl ResolveError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ResolveError::ReadDefinition { .. }
            | ResolveError::RemoteFetch { .. }
            | ResolveError::RemoteBody { .. } => 3,
            _ => 2,
        }
    }
}

/// Reasons a handler reference could not be pulled out of an integration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrationError {
    #[error("integration has no uri")]
    MissingUri,

    #[error("unsupported integration uri shape: {actual}")]
    UnsupportedUri { actual: String },

    #[error("integration uri does not reference a function: {uri}")]
    NoFunctionReference { uri: String },
}

/// Errors while loading a SAM template.
#[derive(Debug, Error)]
pub enum TemplateError {
    // IO errors (exit code 3)
    #[error("template not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Template errors (exit code 2)
    #[error("invalid template: {message}")]
    Parse { message: String },

    #[error("invalid properties on resource '{name}': {source}")]
    InvalidResource {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no AWS::Serverless::Api resource named '{name}'")]
    UnknownApi { name: String },
}

impl TemplateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            TemplateError::FileNotFound { .. } | TemplateError::Read { .. } => 3,
            _ => 2,
        }
    }
}
