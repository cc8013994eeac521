//! Typed view of a Swagger / OpenAPI 2.x definition.
//!
//! Only the parts needed to build mounts are modelled: the path map, the
//! operations of the supported methods, and vendor extensions on paths and
//! operations. Everything else in the document is ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::ResolveError;
use crate::types::Method;

/// Parsed API definition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiDocument {
    /// Path template to path item, iterated in lexicographic order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub paths: BTreeMap<String, PathItem>,
}

impl ApiDocument {
    /// Operation defined for `method` on `path`, if any.
    pub fn operation(&self, path: &str, method: Method) -> Option<&Operation> {
        self.paths.get(path)?.operation(method)
    }
}

/// Operations and vendor extensions of one path.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct PathItem {
    operations: BTreeMap<Method, Operation>,
    extensions: Map<String, Value>,
}

impl PathItem {
    pub fn operation(&self, method: Method) -> Option<&Operation> {
        self.operations.get(&method)
    }

    /// Path-level extension payload by exact name.
    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }

    /// Supported methods that have an operation, in mount order.
    pub fn methods(&self) -> impl Iterator<Item = Method> + '_ {
        Method::ALL
            .into_iter()
            .filter(|m| self.operations.contains_key(m))
    }
}

impl TryFrom<Map<String, Value>> for PathItem {
    type Error = String;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut item = PathItem::default();

        for (key, value) in raw {
            if key.starts_with("x-") {
                item.extensions.insert(key, value);
                continue;
            }
            // parameters, $ref and unsupported verbs
            let Some(method) = Method::parse(&key) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let operation: Operation = serde_json::from_value(value)
                .map_err(|e| format!("invalid '{}' operation: {}", key, e))?;

            if item.operations.contains_key(&method) {
                tracing::warn!(key = %key, "duplicate operation for method; keeping the first");
                continue;
            }
            item.operations.insert(method, operation);
        }

        Ok(item)
    }
}

/// A single operation; only its vendor extensions are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Operation {
    extensions: Map<String, Value>,
}

impl Operation {
    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }
}

impl From<Map<String, Value>> for Operation {
    fn from(raw: Map<String, Value>) -> Self {
        Self {
            extensions: raw.into_iter().filter(|(k, _)| k.starts_with("x-")).collect(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, PathItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse raw definition bytes.
///
/// JSON is tried first; input that is not JSON is retried as YAML. When both
/// fail the JSON error is reported.
///
/// # Errors
///
/// Returns `ResolveError::DocumentParse` if the bytes are not a definition.
pub fn parse_document(bytes: &[u8]) -> Result<ApiDocument, ResolveError> {
    match serde_json::from_slice::<ApiDocument>(bytes) {
        Ok(doc) => Ok(doc),
        Err(json_err) => serde_yaml::from_slice::<ApiDocument>(bytes).map_err(|yaml_err| {
            tracing::debug!(error = %yaml_err, "definition is not YAML either");
            ResolveError::DocumentParse {
                message: json_err.to_string(),
            }
        }),
    }
}
