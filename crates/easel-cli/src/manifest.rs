//! Capability manifest describing the controller tools as an OpenAPI
//! document.
//!
//! The manifest is documentation for tooling; the bridge never consults it.

use easel_proto::PROTOCOL_VERSION;
use serde::Serialize;
use serde_json::{Map, Value, json};
use strum::Display;

use crate::tools::{DEFAULT_BLUR_RADIUS, GAUSSIAN_BLUR_PROCEDURE};

/// OpenAPI version the manifest conforms to.
pub const OPENAPI_VERSION: &str = "3.0.0";

/// JSON schema types a tool parameter or result may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SchemaType {
    /// Text.
    String,
    /// Whole number.
    Integer,
    /// Floating-point number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// Ordered list.
    Array,
    /// Key/value map.
    Object,
}

/// One typed tool parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    /// Parameter name.
    pub name: &'static str,
    /// Schema type.
    pub kind: SchemaType,
    /// Human-readable description.
    pub description: &'static str,
    /// Default applied when the parameter is omitted.
    pub default: Option<Value>,
}

impl ParameterSpec {
    const fn required(name: &'static str, kind: SchemaType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            default: None,
        }
    }

    fn optional(
        name: &'static str,
        kind: SchemaType,
        description: &'static str,
        default: Value,
    ) -> Self {
        Self {
            name,
            kind,
            description,
            default: Some(default),
        }
    }

    fn schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".to_owned(), json!(self.kind));
        schema.insert("description".to_owned(), json!(self.description));
        if self.kind == SchemaType::Array {
            schema.insert("items".to_owned(), json!({}));
        }
        if let Some(default) = &self.default {
            schema.insert("default".to_owned(), default.clone());
        }
        Value::Object(schema)
    }
}

/// Static description of a controller tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    /// Tool name; also the manifest path.
    pub name: &'static str,
    /// One-line summary.
    pub summary: &'static str,
    /// Longer description.
    pub description: &'static str,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterSpec>,
    /// Type of the successful result.
    pub returns: SchemaType,
}

impl ToolDescriptor {
    fn request_body(&self) -> Option<Value> {
        if self.parameters.is_empty() {
            return None;
        }
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|parameter| (parameter.name.to_owned(), parameter.schema()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|parameter| parameter.default.is_none())
            .map(|parameter| parameter.name)
            .collect();
        let body_required = !required.is_empty();
        let mut schema = json!({ "type": "object", "properties": properties });
        if body_required {
            schema["required"] = json!(required);
        }
        Some(json!({
            "required": body_required,
            "content": { "application/json": { "schema": schema } },
        }))
    }

    fn operation(&self) -> Value {
        let mut operation = json!({
            "operationId": self.name,
            "summary": self.summary,
            "description": self.description,
            "responses": {
                "200": {
                    "description": "Successful response",
                    "content": {
                        "application/json": { "schema": { "type": self.returns } },
                    },
                },
                "default": {
                    "description": "Error response",
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "object",
                                "properties": { "error": { "type": "string" } },
                                "required": ["error"],
                            },
                        },
                    },
                },
            },
        });
        if let Some(body) = self.request_body() {
            operation["requestBody"] = body;
        }
        operation
    }
}

/// The tools the controller exposes.
#[must_use]
pub fn tool_registry() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "call_api",
            summary: "Call any operation on the host",
            description: "Resolves a dotted operation path against the host namespace and \
                          invokes it with the given positional and keyword arguments.",
            parameters: vec![
                ParameterSpec::required(
                    "api_path",
                    SchemaType::String,
                    "Dotted operation path, for example Studio.Image.get_width.",
                ),
                ParameterSpec::optional(
                    "args",
                    SchemaType::Array,
                    "Positional arguments.",
                    json!([]),
                ),
                ParameterSpec::optional(
                    "kwargs",
                    SchemaType::Object,
                    "Keyword arguments; image_id selects a context image.",
                    json!({}),
                ),
            ],
            returns: SchemaType::Object,
        },
        ToolDescriptor {
            name: "get_images",
            summary: "List open images",
            description: "Returns a handle for every image open in the host.",
            parameters: Vec::new(),
            returns: SchemaType::Array,
        },
        ToolDescriptor {
            name: "get_image_info",
            summary: "Describe one image",
            description: "Returns the name, width, height and layer handles of an image.",
            parameters: vec![ParameterSpec::required(
                "image_id",
                SchemaType::Integer,
                "Id of the image to describe.",
            )],
            returns: SchemaType::Object,
        },
        ToolDescriptor {
            name: "apply_gaussian_blur",
            summary: "Blur the active layer",
            description: "Runs the host's Gaussian blur procedure on the active layer of an \
                          image and refreshes the displays.",
            parameters: vec![
                ParameterSpec::required(
                    "image_id",
                    SchemaType::Integer,
                    "Id of the image to blur.",
                ),
                ParameterSpec::optional(
                    "radius",
                    SchemaType::Number,
                    "Blur radius in pixels.",
                    json!(DEFAULT_BLUR_RADIUS),
                ),
            ],
            returns: SchemaType::Object,
        },
    ]
}

/// Builds the OpenAPI document for `tools`.
#[must_use]
pub fn openapi_document(tools: &[ToolDescriptor]) -> Value {
    let paths: Map<String, Value> = tools
        .iter()
        .map(|tool| (format!("/{}", tool.name), json!({ "post": tool.operation() })))
        .collect();
    json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": "Easel bridge tools",
            "version": PROTOCOL_VERSION,
            "description": format!(
                "Controller tools for the Easel command bridge. Filters run through \
                 Pdb.run_procedure, for example {GAUSSIAN_BLUR_PROCEDURE}."
            ),
        },
        "paths": paths,
    })
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn document() -> Value {
        openapi_document(&tool_registry())
    }

    #[rstest]
    fn declares_the_openapi_version(document: Value) {
        assert_eq!(document["openapi"], "3.0.0");
    }

    #[rstest]
    fn every_tool_has_a_post_path(document: Value) {
        for tool in tool_registry() {
            let operation = &document["paths"][format!("/{}", tool.name)]["post"];
            assert_eq!(operation["operationId"], tool.name);
            assert!(operation["responses"]["200"].is_object());
            assert_eq!(
                operation["responses"]["default"]["content"]["application/json"]["schema"]
                    ["properties"]["error"]["type"],
                "string"
            );
        }
    }

    #[rstest]
    fn tools_without_parameters_omit_the_request_body(document: Value) {
        let operation = &document["paths"]["/get_images"]["post"];
        assert!(operation.get("requestBody").is_none());
        assert_eq!(
            operation["responses"]["200"]["content"]["application/json"]["schema"]["type"],
            "array"
        );
    }

    #[rstest]
    fn only_parameters_without_defaults_are_required(document: Value) {
        let schema = &document["paths"]["/apply_gaussian_blur"]["post"]["requestBody"]["content"]
            ["application/json"]["schema"];
        assert_eq!(schema["required"], json!(["image_id"]));
        assert_eq!(schema["properties"]["radius"]["type"], "number");
        assert_eq!(schema["properties"]["radius"]["default"], json!(5.0));
    }

    #[rstest]
    fn info_version_is_the_protocol_revision(document: Value) {
        assert_eq!(document["info"]["version"], PROTOCOL_VERSION);
    }

    #[rstest]
    fn bodies_with_a_required_parameter_are_required(document: Value) {
        let body = &document["paths"]["/call_api"]["post"]["requestBody"];
        assert_eq!(body["required"], json!(true));
    }

    #[rstest]
    fn bodies_of_only_optional_parameters_are_optional() {
        let tool = ToolDescriptor {
            name: "flatten",
            summary: "Flatten an image",
            description: "Merges visible layers.",
            parameters: vec![ParameterSpec::optional(
                "visible_only",
                SchemaType::Boolean,
                "Skip hidden layers.",
                json!(true),
            )],
            returns: SchemaType::Object,
        };

        let body = tool.request_body().expect("body for a parameterised tool");

        assert_eq!(body["required"], json!(false));
        assert!(
            body["content"]["application/json"]["schema"]
                .get("required")
                .is_none()
        );
    }

    #[rstest]
    #[case(SchemaType::String, "string")]
    #[case(SchemaType::Integer, "integer")]
    #[case(SchemaType::Number, "number")]
    #[case(SchemaType::Boolean, "boolean")]
    #[case(SchemaType::Array, "array")]
    #[case(SchemaType::Object, "object")]
    fn schema_types_use_json_schema_names(#[case] kind: SchemaType, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
        assert_eq!(json!(kind), json!(expected));
    }
}
