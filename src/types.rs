//! Core types shared by the resolution pipeline.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Operation-level extension naming the backend integration.
pub const INTEGRATION_EXTENSION: &str = "x-amazon-apigateway-integration";

/// Path-level extension routing every otherwise unmapped method.
pub const ANY_METHOD_EXTENSION: &str = "x-amazon-apigateway-any-method";

/// Returns the JSON type name for log and error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// HTTP methods a path can be mounted for.
///
/// Methods outside this set are never mounted, even when a document defines them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    /// Every supported method, in mount order.
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
        Method::Head,
        Method::Options,
    ];

    /// Lowercase verb as emitted in mounts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Delete => "delete",
            Method::Patch => "patch",
            Method::Head => "head",
            Method::Options => "options",
        }
    }

    /// Parse a verb case-insensitively.
    ///
    /// Returns `None` for anything outside the supported set.
    pub fn parse(s: &str) -> Option<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single route binding handed to the routing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountDescriptor {
    /// Mount identifier; always the path.
    pub name: String,
    /// Route template, e.g. `/users/{id}`.
    pub path: String,
    pub method: Method,
    /// Resolved handler reference, empty when none could be resolved.
    pub handler: String,
}

impl MountDescriptor {
    pub fn new(path: &str, method: Method, handler: impl Into<String>) -> Self {
        Self {
            name: path.to_string(),
            path: path.to_string(),
            method,
            handler: handler.into(),
        }
    }

    /// Whether a handler reference was resolved for this mount.
    pub fn has_handler(&self) -> bool {
        !self.handler.is_empty()
    }
}

/// Versioned object-storage reference (`{Bucket, Key, Version}` in SAM).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3Location {
    pub bucket: String,
    pub key: String,
    /// Object version; empty selects the latest version.
    #[serde(default, deserialize_with = "version_string")]
    pub version: String,
}

impl S3Location {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            version: String::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

// Templates write versions both as strings and as bare numbers.
fn version_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawVersion {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<RawVersion>::deserialize(deserializer)? {
        None => String::new(),
        Some(RawVersion::Text(s)) => s,
        Some(RawVersion::Number(n)) => n.to_string(),
    })
}

/// Where the raw API definition comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionSource {
    /// Filesystem path to the definition.
    LocalFile(PathBuf),
    /// Object in S3 (or an S3-compatible store).
    ObjectLocation(S3Location),
    /// Definition given verbatim as JSON text.
    InlineText(String),
    /// Definition given as a structured mapping, e.g. decoded YAML.
    InlineStructure(Map<String, Value>),
}

impl DefinitionSource {
    /// Short label for log output.
    pub fn kind(&self) -> &'static str {
        match self {
            DefinitionSource::LocalFile(_) => "local file",
            DefinitionSource::ObjectLocation(_) => "object location",
            DefinitionSource::InlineText(_) => "inline text",
            DefinitionSource::InlineStructure(_) => "inline structure",
        }
    }
}
