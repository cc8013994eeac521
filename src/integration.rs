//! API Gateway integration extension parsing.
//!
//! The `x-amazon-apigateway-integration` payload carries the backend `uri`,
//! which for Lambda proxies has the shape
//! `arn:aws:apigateway:<region>:lambda:path/2015-03-31/functions/<target>/invocations`.
//! `<target>` is either a Lambda function ARN or, inside templates, a
//! substitution such as `${MyFunction.Arn}`.

use serde::Deserialize;
use serde_json::Value;

use crate::error::IntegrationError;
use crate::types::json_type_name;

const FUNCTIONS_MARKER: &str = "functions/";
const INVOCATIONS_MARKER: &str = "/invocations";

/// Typed form of an integration extension payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationDescriptor {
    #[serde(rename = "type", default)]
    pub integration_type: Option<String>,
    #[serde(default)]
    pub http_method: Option<String>,
    /// Plain string or a CloudFormation expression.
    #[serde(default)]
    pub uri: Option<Value>,
    #[serde(default)]
    pub passthrough_behavior: Option<String>,
}

impl IntegrationDescriptor {
    /// Extract the handler reference from the integration `uri`.
    ///
    /// Lambda ARNs yield the function name, `${Name.Arn}` and `${Name}`
    /// substitutions yield `Name`, and any other target is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns `IntegrationError` if there is no `uri`, its shape is not
    /// understood, or it does not point at a function.
    pub fn function_reference(&self) -> Result<String, IntegrationError> {
        let uri = self.uri.as_ref().ok_or(IntegrationError::MissingUri)?;
        let rendered = render_uri(uri)?;
        function_from_uri(&rendered)
    }
}

/// Decode an integration payload.
///
/// Returns `None` (after logging a warning) if the payload does not have the
/// integration shape. Never fails the caller.
pub fn parse_integration(payload: &Value) -> Option<IntegrationDescriptor> {
    if !payload.is_object() {
        tracing::warn!(
            "API Gateway integration is {}, expected an object",
            json_type_name(payload)
        );
        return None;
    }

    match IntegrationDescriptor::deserialize(payload) {
        Ok(descriptor) => Some(descriptor),
        Err(e) => {
            tracing::warn!(error = %e, "could not parse API Gateway integration");
            None
        }
    }
}

/// Flatten a `uri` value into a single string.
///
/// `Ref` and `Fn::GetAtt` render as `${...}` substitutions so that they
/// resolve the same way as their `Fn::Sub` spelling.
fn render_uri(uri: &Value) -> Result<String, IntegrationError> {
    let unsupported = || IntegrationError::UnsupportedUri {
        actual: uri.to_string(),
    };

    let map = match uri {
        Value::String(s) => return Ok(s.clone()),
        Value::Object(map) if map.len() == 1 => map,
        _ => return Err(unsupported()),
    };

    if let Some(sub) = map.get("Fn::Sub") {
        return match sub {
            Value::String(s) => Ok(s.clone()),
            Value::Array(args) => args
                .first()
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(unsupported),
            _ => Err(unsupported()),
        };
    }

    if let Some(join) = map.get("Fn::Join") {
        let (separator, parts) = match join.as_array().map(Vec::as_slice) {
            Some([Value::String(sep), Value::Array(parts)]) => (sep, parts),
            _ => return Err(unsupported()),
        };
        let rendered = parts
            .iter()
            .map(render_uri)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(rendered.join(separator.as_str()));
    }

    if let Some(Value::String(name)) = map.get("Ref") {
        return Ok(format!("${{{}}}", name));
    }

    if let Some(get_att) = map.get("Fn::GetAtt") {
        return match get_att {
            Value::String(s) => Ok(format!("${{{}}}", s)),
            Value::Array(args) => match args.as_slice() {
                [Value::String(resource), Value::String(attribute)] => {
                    Ok(format!("${{{}.{}}}", resource, attribute))
                }
                _ => Err(unsupported()),
            },
            _ => Err(unsupported()),
        };
    }

    Err(unsupported())
}

fn function_from_uri(uri: &str) -> Result<String, IntegrationError> {
    let no_function = || IntegrationError::NoFunctionReference {
        uri: uri.to_string(),
    };

    let start = uri
        .find(FUNCTIONS_MARKER)
        .map(|idx| idx + FUNCTIONS_MARKER.len())
        .ok_or_else(no_function)?;
    let rest = &uri[start..];
    let end = rest.rfind(INVOCATIONS_MARKER).ok_or_else(no_function)?;
    let target = &rest[..end];

    if target.is_empty() {
        return Err(no_function());
    }

    if let Some(substitution) = target.strip_prefix("${") {
        let inner = substitution
            .split_once('}')
            .map(|(inner, _)| inner)
            .ok_or_else(no_function)?;
        let name = inner.strip_suffix(".Arn").unwrap_or(inner);
        if name.is_empty() {
            return Err(no_function());
        }
        return Ok(name.to_string());
    }

    // arn:<partition>:lambda:<region>:<account>:function:<name>[:<qualifier>]
    if target.starts_with("arn:") {
        let parts: Vec<&str> = target.split(':').collect();
        if parts.len() >= 7 && parts[2] == "lambda" && parts[5] == "function" {
            return Ok(parts[6].to_string());
        }
    }

    Ok(target.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lambda_uri(target: &str) -> String {
        format!(
            "arn:aws:apigateway:us-east-1:lambda:path/2015-03-31/functions/{}/invocations",
            target
        )
    }

    fn reference(uri: Value) -> Result<String, IntegrationError> {
        let descriptor = parse_integration(&json!({ "type": "aws_proxy", "uri": uri })).unwrap();
        descriptor.function_reference()
    }

    #[test]
    fn parses_descriptor_fields() {
        let descriptor = parse_integration(&json!({
            "type": "aws_proxy",
            "httpMethod": "POST",
            "passthroughBehavior": "when_no_match",
            "uri": "arn:aws:apigateway:x",
            "responses": {}
        }))
        .unwrap();

        assert_eq!(descriptor.integration_type.as_deref(), Some("aws_proxy"));
        assert_eq!(descriptor.http_method.as_deref(), Some("POST"));
        assert_eq!(descriptor.passthrough_behavior.as_deref(), Some("when_no_match"));
        assert_eq!(descriptor.uri, Some(json!("arn:aws:apigateway:x")));
    }

    #[test]
    fn malformed_payload_is_none() {
        assert!(parse_integration(&json!("aws_proxy")).is_none());
        assert!(parse_integration(&json!(true)).is_none());
        assert!(parse_integration(&json!([])).is_none());
        assert!(parse_integration(&json!({ "type": 42 })).is_none());
    }

    #[test]
    fn lambda_arn_yields_function_name() {
        let uri = lambda_uri("arn:aws:lambda:us-east-1:123456789012:function:ListUsers");
        assert_eq!(reference(json!(uri)).unwrap(), "ListUsers");
    }

    #[test]
    fn qualified_lambda_arn_drops_qualifier() {
        let uri = lambda_uri("arn:aws:lambda:us-east-1:123456789012:function:ListUsers:live");
        assert_eq!(reference(json!(uri)).unwrap(), "ListUsers");
    }

    #[test]
    fn sub_expression_yields_logical_id() {
        let uri = lambda_uri("${ListUsersFunction.Arn}");
        assert_eq!(
            reference(json!({ "Fn::Sub": uri })).unwrap(),
            "ListUsersFunction"
        );

        let uri = lambda_uri("${ListUsersFunction}");
        assert_eq!(
            reference(json!({ "Fn::Sub": [uri, {}] })).unwrap(),
            "ListUsersFunction"
        );
    }

    #[test]
    fn join_expression_renders_parts() {
        let uri = json!({
            "Fn::Join": ["", [
                "arn:aws:apigateway:us-east-1:lambda:path/2015-03-31/functions/",
                { "Fn::GetAtt": ["Handler", "Arn"] },
                "/invocations"
            ]]
        });
        assert_eq!(reference(uri).unwrap(), "Handler");

        let uri = json!({
            "Fn::Join": ["", [
                "arn:aws:apigateway:us-east-1:lambda:path/2015-03-31/functions/",
                { "Ref": "HandlerArn" },
                "/invocations"
            ]]
        });
        assert_eq!(reference(uri).unwrap(), "HandlerArn");
    }

    #[test]
    fn other_targets_returned_verbatim() {
        assert_eq!(reference(json!(lambda_uri("fn-list-users"))).unwrap(), "fn-list-users");
    }

    #[test]
    fn missing_uri() {
        let descriptor = parse_integration(&json!({ "type": "mock" })).unwrap();
        assert_eq!(
            descriptor.function_reference(),
            Err(IntegrationError::MissingUri)
        );
    }

    #[test]
    fn non_lambda_uri() {
        let result = reference(json!("https://example.com/backend"));
        assert!(matches!(
            result,
            Err(IntegrationError::NoFunctionReference { .. })
        ));
    }

    #[test]
    fn unsupported_uri_shape() {
        let result = reference(json!({ "Fn::ImportValue": "Shared" }));
        assert!(matches!(result, Err(IntegrationError::UnsupportedUri { .. })));

        let result = reference(json!(42));
        assert!(matches!(result, Err(IntegrationError::UnsupportedUri { .. })));
    }

    #[test]
    fn empty_target() {
        let result = reference(json!(lambda_uri("")));
        assert!(matches!(
            result,
            Err(IntegrationError::NoFunctionReference { .. })
        ));
    }
}
