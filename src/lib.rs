//! SAM API mount resolution
//!
//! Turns the API definition of an `AWS::Serverless::Api` resource into the
//! list of route mounts a local router needs: one (path, method, handler)
//! binding per routed operation.
//!
//! # Example
//!
//! ```
//! use sam_api_mounts::{resolve_mounts, Method, NoObjectStore, ServerlessApi};
//! use serde_json::json;
//!
//! let api = ServerlessApi::from_body(json!({
//!     "swagger": "2.0",
//!     "paths": {
//!         "/users": {
//!             "get": {
//!                 "x-amazon-apigateway-integration": {
//!                     "type": "aws_proxy",
//!                     "uri": "arn:aws:apigateway:us-east-1:lambda:path/2015-03-31/functions/arn:aws:lambda:us-east-1:123456789012:function:ListUsers/invocations"
//!                 }
//!             }
//!         }
//!     }
//! }));
//!
//! let mounts = resolve_mounts(&api, &NoObjectStore).unwrap();
//! assert_eq!(mounts.len(), 1);
//! assert_eq!(mounts[0].method, Method::Get);
//! assert_eq!(mounts[0].handler, "ListUsers");
//! ```
//!
//! # Definition Sources
//!
//! Checked in this order; the first one present wins:
//!
//! | Source | Property |
//! |--------|----------|
//! | Local file | `DefinitionUri: path/to/swagger.json` |
//! | S3 object | `DefinitionUri: {Bucket, Key, Version}` |
//! | Inline text | `DefinitionBody: "{...}"` |
//! | Inline structure | `DefinitionBody: {swagger: ...}` |
//!
//! # Routing Extensions
//!
//! | Extension | Level | Effect |
//! |-----------|-------|--------|
//! | `x-amazon-apigateway-integration` | operation | Mounts that method |
//! | `x-amazon-apigateway-any-method` | path | Mounts every method not mounted explicitly |

mod api;
mod document;
mod error;
mod integration;
mod mounts;
#[cfg(feature = "s3")]
mod s3;
mod source;
mod template;
mod types;

pub use api::{resolve_definition, resolve_mounts, DefinitionUri, ServerlessApi};
pub use document::{parse_document, ApiDocument, Operation, PathItem};
pub use error::{IntegrationError, ResolveError, TemplateError};
pub use integration::{parse_integration, IntegrationDescriptor};
pub use mounts::{explicit_mounts, extract_mounts, wildcard_mounts};
pub use source::{definition_bytes, NoObjectStore, ObjectStore};
pub use template::{load_template, load_template_str, ServerlessTemplate, SERVERLESS_API_TYPE};
pub use types::{
    DefinitionSource, Method, MountDescriptor, S3Location, ANY_METHOD_EXTENSION,
    INTEGRATION_EXTENSION,
};

#[cfg(feature = "s3")]
pub use s3::{S3Config, S3ObjectStore};
