//! Definition loading from the four supported sources.
//!
//! Local files are read directly, inline text and structures are encoded in
//! place, and object locations go through an [`ObjectStore`].

use crate::error::ResolveError;
use crate::types::{DefinitionSource, S3Location};

/// Blocking object-storage GET.
///
/// `version` is always passed; an empty string selects the latest version.
/// Implementations report request failures as [`ResolveError::RemoteFetch`] and
/// body read failures as [`ResolveError::RemoteBody`].
pub trait ObjectStore {
    fn get_object(&self, bucket: &str, key: &str, version: &str) -> Result<Vec<u8>, ResolveError>;
}

/// Store used when object-storage support is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObjectStore;

impl ObjectStore for NoObjectStore {
    fn get_object(&self, bucket: &str, key: &str, _version: &str) -> Result<Vec<u8>, ResolveError> {
        Err(ResolveError::RemoteFetch {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: "object storage support is not enabled".to_string(),
        })
    }
}

/// Resolve the raw definition bytes for a source.
///
/// # Errors
///
/// Returns `ResolveError::ReadDefinition` for unreadable local files, the
/// store's error for object locations, and `ResolveError::Serialize` if an
/// inline structure cannot be encoded.
pub fn definition_bytes(
    source: &DefinitionSource,
    store: &dyn ObjectStore,
) -> Result<Vec<u8>, ResolveError> {
    match source {
        DefinitionSource::LocalFile(path) => {
            std::fs::read(path).map_err(|source| ResolveError::ReadDefinition {
                path: path.clone(),
                source,
            })
        }
        DefinitionSource::ObjectLocation(location) => fetch_object(location, store),
        DefinitionSource::InlineText(text) => Ok(text.as_bytes().to_vec()),
        DefinitionSource::InlineStructure(map) => {
            serde_json::to_vec(map).map_err(|source| ResolveError::Serialize { source })
        }
    }
}

fn fetch_object(location: &S3Location, store: &dyn ObjectStore) -> Result<Vec<u8>, ResolveError> {
    tracing::debug!(
        bucket = %location.bucket,
        key = %location.key,
        version = %location.version,
        "fetching definition from object storage"
    );
    store.get_object(&location.bucket, &location.key, &location.version)
}
