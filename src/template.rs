//! SAM template loading.
//!
//! Templates are read as JSON, falling back to YAML. CloudFormation
//! short-form intrinsic tags in YAML (`!Sub`, `!Ref`, `!GetAtt`, ...) are
//! rewritten to their long form so inline definition bodies look the same
//! regardless of how the template was written:
//!
//! | Short form | Long form |
//! |------------|-----------|
//! | `!Ref X` | `{"Ref": "X"}` |
//! | `!GetAtt A.B` | `{"Fn::GetAtt": ["A", "B"]}` |
//! | `!Condition C` | `{"Condition": "C"}` |
//! | `!Sub s` (any other tag) | `{"Fn::Sub": "s"}` |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::api::ServerlessApi;
use crate::error::TemplateError;

/// Resource type carrying an API definition.
pub const SERVERLESS_API_TYPE: &str = "AWS::Serverless::Api";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawTemplate {
    #[serde(default)]
    resources: BTreeMap<String, Resource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Resource {
    #[serde(rename = "Type")]
    resource_type: String,
    #[serde(default)]
    properties: Value,
}

/// A parsed SAM template.
#[derive(Debug, Clone)]
pub struct ServerlessTemplate {
    resources: BTreeMap<String, Resource>,
    base_dir: Option<PathBuf>,
}

impl ServerlessTemplate {
    /// All serverless APIs, ordered by logical id.
    ///
    /// Relative local `DefinitionUri` paths are resolved against the
    /// template's directory when it is known.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::InvalidResource` if an API's properties do not
    /// have the expected shape.
    pub fn apis(&self) -> Result<Vec<(String, ServerlessApi)>, TemplateError> {
        self.resources
            .iter()
            .filter(|(_, resource)| resource.resource_type == SERVERLESS_API_TYPE)
            .map(|(name, resource)| {
                self.decode_api(name, resource)
                    .map(|api| (name.clone(), api))
            })
            .collect()
    }

    /// A single serverless API by logical id.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::UnknownApi` if there is no such API resource.
    pub fn api(&self, name: &str) -> Result<ServerlessApi, TemplateError> {
        match self.resources.get(name) {
            Some(resource) if resource.resource_type == SERVERLESS_API_TYPE => {
                self.decode_api(name, resource)
            }
            _ => Err(TemplateError::UnknownApi {
                name: name.to_string(),
            }),
        }
    }

    fn decode_api(&self, name: &str, resource: &Resource) -> Result<ServerlessApi, TemplateError> {
        let mut api = if resource.properties.is_null() {
            ServerlessApi::default()
        } else {
            ServerlessApi::deserialize(&resource.properties).map_err(|source| {
                TemplateError::InvalidResource {
                    name: name.to_string(),
                    source,
                }
            })?
        };

        if let Some(base_dir) = &self.base_dir {
            api.rebase(base_dir);
        }
        Ok(api)
    }
}

/// Load a template from a file.
///
/// # Errors
///
/// Returns `TemplateError::FileNotFound` if the file doesn't exist,
/// `TemplateError::Read` if it can't be read, or `TemplateError::Parse` if it
/// isn't a template.
pub fn load_template(path: &Path) -> Result<ServerlessTemplate, TemplateError> {
    if !path.exists() {
        return Err(TemplateError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    load_template_str(&content, path.parent())
}

/// Load a template from a string.
///
/// `base_dir` is used to resolve relative local definition paths.
///
/// # Errors
///
/// Returns `TemplateError::Parse` if the content is neither a JSON nor a
/// YAML template.
pub fn load_template_str(
    content: &str,
    base_dir: Option<&Path>,
) -> Result<ServerlessTemplate, TemplateError> {
    let value = match serde_json::from_str::<Value>(content) {
        Ok(value) => value,
        Err(_) => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| TemplateError::Parse {
                    message: e.to_string(),
                })?;
            yaml_to_json(yaml)?
        }
    };

    let raw: RawTemplate = serde_json::from_value(value).map_err(|e| TemplateError::Parse {
        message: e.to_string(),
    })?;

    Ok(ServerlessTemplate {
        resources: raw.resources,
        base_dir: base_dir.map(Path::to_path_buf),
    })
}

fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, TemplateError> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => yaml_number(&n),
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(mapping_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let name = tag.trim_start_matches('!').to_string();
            long_form(&name, yaml_to_json(tagged.value)?)
        }
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::from(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn mapping_key(key: serde_yaml::Value) -> Result<String, TemplateError> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        other => Err(TemplateError::Parse {
            message: format!("unsupported mapping key: {:?}", other),
        }),
    }
}

/// Expand a short-form intrinsic to its long form.
fn long_form(name: &str, value: Value) -> Value {
    let (key, value) = match name {
        "Ref" | "Condition" => (name.to_string(), value),
        "GetAtt" => {
            let value = match value {
                Value::String(s) => match s.split_once('.') {
                    Some((resource, attribute)) => {
                        Value::Array(vec![resource.into(), attribute.into()])
                    }
                    None => Value::String(s.clone()),
                },
                other => other,
            };
            ("Fn::GetAtt".to_string(), value)
        }
        other => (format!("Fn::{}", other), value),
    };

    let mut map = Map::new();
    map.insert(key, value);
    Value::Object(map)
}
