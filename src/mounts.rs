//! Mount extraction.
//!
//! Each path is processed in two phases:
//!
//! 1. **Explicit**: every supported method whose operation carries
//!    `x-amazon-apigateway-integration` becomes a mount.
//! 2. **Wildcard**: if the path carries `x-amazon-apigateway-any-method`, every
//!    supported method not mounted in phase 1 is mounted with the wildcard's
//!    integration.
//!
//! Explicit mappings always win; the wildcard only fills gaps. Paths are
//! visited in lexicographic order and methods in [`Method::ALL`] order, so
//! the output is deterministic.

use crate::document::{ApiDocument, PathItem};
use crate::integration::{parse_integration, IntegrationDescriptor};
use crate::types::{Method, MountDescriptor, ANY_METHOD_EXTENSION, INTEGRATION_EXTENSION};

/// Build the mounts for every path of a document.
///
/// Never yields two mounts for the same path and method.
pub fn extract_mounts(doc: &ApiDocument) -> Vec<MountDescriptor> {
    let mut mounts = Vec::new();

    for (path, item) in &doc.paths {
        let explicit = explicit_mounts(path, item);
        let mapped: Vec<Method> = explicit.iter().map(|m| m.method).collect();

        mounts.extend(explicit);
        mounts.extend(wildcard_mounts(path, item, &mapped));
    }

    mounts
}

/// Phase 1: mounts for operations with their own integration.
///
/// Operations without the integration extension produce no mount. A mount
/// whose integration cannot be parsed is still emitted, with an empty handler.
pub fn explicit_mounts(path: &str, item: &PathItem) -> Vec<MountDescriptor> {
    item.methods()
        .filter_map(|method| {
            let payload = item
                .operation(method)?
                .extension(INTEGRATION_EXTENSION)
                .filter(|payload| !payload.is_null())?;
            let integration = parse_integration(payload);
            Some(MountDescriptor::new(
                path,
                method,
                resolve_handler(path, integration.as_ref()),
            ))
        })
        .collect()
}

/// Phase 2: wildcard mounts for the methods not in `mapped`.
///
/// Returns nothing when the path has no any-method extension or when that
/// extension is not an object. A missing or unparsable nested integration
/// still mounts every unmapped method, with an empty handler.
pub fn wildcard_mounts(path: &str, item: &PathItem, mapped: &[Method]) -> Vec<MountDescriptor> {
    let Some(any_method) = item.extension(ANY_METHOD_EXTENSION) else {
        return Vec::new();
    };

    let Some(any_method) = any_method.as_object() else {
        tracing::warn!(path = %path, "skipping unparsable {}", ANY_METHOD_EXTENSION);
        return Vec::new();
    };

    let integration = any_method
        .get(INTEGRATION_EXTENSION)
        .filter(|payload| !payload.is_null())
        .and_then(parse_integration);

    let handler = resolve_handler(path, integration.as_ref());
    Method::ALL
        .into_iter()
        .filter(|method| !mapped.contains(method))
        .map(|method| MountDescriptor::new(path, method, handler.clone()))
        .collect()
}

fn resolve_handler(path: &str, integration: Option<&IntegrationDescriptor>) -> String {
    let Some(integration) = integration else {
        tracing::warn!(path = %path, "mounting without a handler");
        return String::new();
    };

    match integration.function_reference() {
        Ok(handler) => handler,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "could not extract Lambda function reference");
            String::new()
        }
    }
}
