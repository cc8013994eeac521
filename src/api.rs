//! `AWS::Serverless::Api` resources and mount resolution.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::document::parse_document;
use crate::error::ResolveError;
use crate::mounts::extract_mounts;
use crate::source::{definition_bytes, ObjectStore};
use crate::types::{DefinitionSource, MountDescriptor, S3Location};

/// `DefinitionUri` property: a path or an S3 location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DefinitionUri {
    Path(String),
    Location(S3Location),
}

/// The definition-related properties of a serverless API resource.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerlessApi {
    #[serde(default)]
    pub definition_uri: Option<DefinitionUri>,
    /// JSON text or a structured mapping.
    #[serde(default)]
    pub definition_body: Option<Value>,
}

impl ServerlessApi {
    pub fn from_uri(path: impl Into<String>) -> Self {
        Self {
            definition_uri: Some(DefinitionUri::Path(path.into())),
            ..Self::default()
        }
    }

    pub fn from_location(location: S3Location) -> Self {
        Self {
            definition_uri: Some(DefinitionUri::Location(location)),
            ..Self::default()
        }
    }

    pub fn from_body(body: Value) -> Self {
        Self {
            definition_body: Some(body),
            ..Self::default()
        }
    }

    /// The source to load the definition from.
    ///
    /// The first populated source wins, checked in the order: local URI,
    /// object location, inline text, inline structure. A body that is neither
    /// text nor a mapping counts as absent.
    pub fn definition_source(&self) -> Option<DefinitionSource> {
        match &self.definition_uri {
            Some(DefinitionUri::Path(path)) => {
                return Some(DefinitionSource::LocalFile(path.into()))
            }
            Some(DefinitionUri::Location(location)) => {
                return Some(DefinitionSource::ObjectLocation(location.clone()))
            }
            None => {}
        }

        match &self.definition_body {
            Some(Value::String(text)) => Some(DefinitionSource::InlineText(text.clone())),
            Some(Value::Object(map)) => Some(DefinitionSource::InlineStructure(map.clone())),
            _ => None,
        }
    }

    /// Resolve a relative local `DefinitionUri` against `base_dir`.
    pub fn rebase(&mut self, base_dir: &Path) {
        if let Some(DefinitionUri::Path(path)) = &mut self.definition_uri {
            if Path::new(path.as_str()).is_relative() {
                *path = base_dir.join(path.as_str()).to_string_lossy().into_owned();
            }
        }
    }
}

/// Load the raw definition bytes for an API.
///
/// # Errors
///
/// Returns `ResolveError::NoDefinitionFound` if the API has no usable source,
/// or the source reader's error.
pub fn resolve_definition(
    api: &ServerlessApi,
    store: &dyn ObjectStore,
) -> Result<Vec<u8>, ResolveError> {
    let source = api
        .definition_source()
        .ok_or(ResolveError::NoDefinitionFound)?;
    tracing::debug!(source = source.kind(), "loading API definition");
    definition_bytes(&source, store)
}

/// Resolve the route mounts of an API.
///
/// Loads the definition, parses it and extracts the mounts. Each call works
/// from scratch; nothing is cached.
///
/// # Errors
///
/// Returns the first loading or parsing error. Problems with individual
/// integrations are logged and never fail the resolution.
pub fn resolve_mounts(
    api: &ServerlessApi,
    store: &dyn ObjectStore,
) -> Result<Vec<MountDescriptor>, ResolveError> {
    let bytes = resolve_definition(api, store)?;
    let doc = parse_document(&bytes)?;
    Ok(extract_mounts(&doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::NoObjectStore;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn deserializes_uri_forms() {
        let api: ServerlessApi =
            serde_json::from_value(json!({ "DefinitionUri": "swagger.yaml", "StageName": "prod" }))
                .unwrap();
        assert_eq!(
            api.definition_uri,
            Some(DefinitionUri::Path("swagger.yaml".into()))
        );

        let api: ServerlessApi = serde_json::from_value(json!({
            "DefinitionUri": { "Bucket": "b", "Key": "k", "Version": "1" }
        }))
        .unwrap();
        assert_eq!(
            api.definition_uri,
            Some(DefinitionUri::Location(
                S3Location::new("b", "k").with_version("1")
            ))
        );
    }

    #[test]
    fn uri_wins_over_inline_text() {
        let api = ServerlessApi {
            definition_uri: Some(DefinitionUri::Path("swagger.json".into())),
            definition_body: Some(json!("{}")),
        };
        assert_eq!(
            api.definition_source(),
            Some(DefinitionSource::LocalFile(PathBuf::from("swagger.json")))
        );
    }

    #[test]
    fn location_wins_over_inline_structure() {
        let api = ServerlessApi {
            definition_uri: Some(DefinitionUri::Location(S3Location::new("b", "k"))),
            definition_body: Some(json!({ "paths": {} })),
        };
        assert!(matches!(
            api.definition_source(),
            Some(DefinitionSource::ObjectLocation(_))
        ));
    }

    #[test]
    fn inline_forms() {
        let api = ServerlessApi::from_body(json!("{\"paths\": {}}"));
        assert!(matches!(
            api.definition_source(),
            Some(DefinitionSource::InlineText(_))
        ));

        let api = ServerlessApi::from_body(json!({ "paths": {} }));
        assert!(matches!(
            api.definition_source(),
            Some(DefinitionSource::InlineStructure(_))
        ));
    }

    #[test]
    fn unusable_body_is_no_source() {
        assert_eq!(ServerlessApi::default().definition_source(), None);
        assert_eq!(ServerlessApi::from_body(json!(42)).definition_source(), None);
        assert_eq!(ServerlessApi::from_body(json!([])).definition_source(), None);
    }

    #[test]
    fn no_definition_found() {
        let result = resolve_mounts(&ServerlessApi::default(), &NoObjectStore);
        assert!(matches!(result, Err(ResolveError::NoDefinitionFound)));
    }

    #[test]
    fn empty_inline_document_has_no_mounts() {
        let mounts = resolve_mounts(&ServerlessApi::from_body(json!("{}")), &NoObjectStore).unwrap();
        assert!(mounts.is_empty());
    }

    #[test]
    fn invalid_inline_text_is_parse_error() {
        let result = resolve_mounts(&ServerlessApi::from_body(json!("{")), &NoObjectStore);
        assert!(matches!(result, Err(ResolveError::DocumentParse { .. })));
    }

    #[test]
    fn rebase_only_touches_relative_paths() {
        let mut api = ServerlessApi::from_uri("api/swagger.json");
        api.rebase(Path::new("/templates"));
        assert_eq!(
            api.definition_source(),
            Some(DefinitionSource::LocalFile(PathBuf::from(
                "/templates/api/swagger.json"
            )))
        );

        let mut api = ServerlessApi::from_uri("/abs/swagger.json");
        api.rebase(Path::new("/templates"));
        assert_eq!(
            api.definition_uri,
            Some(DefinitionUri::Path("/abs/swagger.json".into()))
        );
    }
}
