//! OpenAPI / Swagger parser.
//!
//! Produces one `api-info` node, then one `api-path` node per path (with an
//! `api-operation` child per HTTP method), then one `api-schema` node per
//! named schema. Operation and schema details are rendered as pipe tables in
//! the node text; the same rows are kept in `attributes` for templates.

use std::fmt::Write;
use std::path::Path;

use folio_core::{ContentNode, Metadata, ParsedContent};
use serde_json::{Map, Value, json};

use crate::parser::{ParseOptions, Parser};
use crate::{ParseError, ParseErrorKind};

const FORMAT: &str = "openapi";
const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Source syntax of an API description.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Syntax {
    Json,
    Yaml,
}

/// Parser for OpenAPI 3 and Swagger 2 documents in JSON or YAML.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenApiParser;

impl OpenApiParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Parser for OpenApiParser {
    fn format(&self) -> &str {
        FORMAT
    }

    fn parse(&self, source: &str, options: &ParseOptions) -> Result<ParsedContent, ParseError> {
        let path = options.path();
        let root = decode(source, path)?;

        if options.validate_schema {
            validate(&root).map_err(|e| e.with_optional_path(path))?;
        }

        let info = root.get("info").and_then(Value::as_object);
        let title = info
            .and_then(|i| str_field(i, "title"))
            .unwrap_or("Untitled")
            .to_owned();
        let description = info
            .and_then(|i| str_field(i, "description"))
            .map(str::to_owned);

        let servers = server_urls(&root);
        let mut sections = vec![info_node(info, &root, &servers)];
        sections.extend(path_nodes(&root));
        sections.extend(schema_nodes(&root));

        let mut metadata = Metadata::new();
        if let Some(version) = info.and_then(|i| str_field(i, "version")) {
            metadata.insert("version".to_owned(), json!(version));
        }
        if let Some(spec_version) = spec_version(&root) {
            metadata.insert("openapiVersion".to_owned(), json!(spec_version));
        }
        metadata.insert("servers".to_owned(), json!(servers));
        if options.path.is_some() {
            metadata.insert("originalPath".to_owned(), json!(options.source_name()));
        }
        if options.extract_examples {
            metadata.insert("examples".to_owned(), Value::Object(extract_examples(&root)));
        }

        tracing::debug!(
            title = %title,
            nodes = sections.len(),
            "parsed API description"
        );

        Ok(ParsedContent {
            title,
            description,
            metadata,
            sections,
            assets: Vec::new(),
            references: Vec::new(),
        })
    }
}

/// `info.title` of an API description, without building nodes.
///
/// Accepts JSON or YAML; returns `None` for anything unparsable.
#[must_use]
pub fn extract_title(source: &str) -> Option<String> {
    let value: Value = serde_yaml::from_str(source).ok()?;
    value
        .pointer("/info/title")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn detect_syntax(source: &str, path: Option<&Path>) -> Result<Syntax, ParseError> {
    let ext = path
        .and_then(Path::extension)
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("json") => Ok(Syntax::Json),
        Some("yaml" | "yml") => Ok(Syntax::Yaml),
        Some(other) => Err(ParseError::new(
            ParseErrorKind::Unsupported,
            FORMAT,
            format!("unsupported file extension '.{other}', expected .json, .yaml or .yml"),
        )
        .with_optional_path(path)),
        None if source.trim_start().starts_with('{') => Ok(Syntax::Json),
        None => Ok(Syntax::Yaml),
    }
}

fn decode(source: &str, path: Option<&Path>) -> Result<Map<String, Value>, ParseError> {
    let value: Value = match detect_syntax(source, path)? {
        Syntax::Json => serde_json::from_str(source).map_err(|e| {
            ParseError::malformed(FORMAT, "invalid JSON")
                .with_source(e)
                .with_optional_path(path)
        })?,
        Syntax::Yaml => serde_yaml::from_str(source).map_err(|e| {
            ParseError::malformed(FORMAT, "invalid YAML")
                .with_source(e)
                .with_optional_path(path)
        })?,
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::malformed(FORMAT, "document root must be an object")
            .with_optional_path(path)),
    }
}

/// Check for the fields every API description needs.
///
/// Reports all missing fields at once.
fn validate(root: &Map<String, Value>) -> Result<(), ParseError> {
    let mut missing = Vec::new();
    if !root.contains_key("openapi") && !root.contains_key("swagger") {
        missing.push("openapi");
    }
    if !root.contains_key("info") {
        missing.push("info");
    }
    if !root.contains_key("paths") {
        missing.push("paths");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ParseError::new(
            ParseErrorKind::Validation,
            FORMAT,
            format!("missing required fields: {}", missing.join(", ")),
        ))
    }
}

fn spec_version(root: &Map<String, Value>) -> Option<String> {
    ["openapi", "swagger"]
        .into_iter()
        .find_map(|key| root.get(key))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

/// Server URLs (OpenAPI 3 `servers`, or Swagger 2 `schemes` + `host` + `basePath`).
fn server_urls(root: &Map<String, Value>) -> Vec<String> {
    if let Some(servers) = root.get("servers").and_then(Value::as_array) {
        return servers
            .iter()
            .filter_map(|s| s.get("url").and_then(Value::as_str))
            .map(str::to_owned)
            .collect();
    }

    let Some(host) = str_field(root, "host") else {
        return Vec::new();
    };
    let base_path = str_field(root, "basePath").unwrap_or_default();
    let schemes: Vec<&str> = root
        .get("schemes")
        .and_then(Value::as_array)
        .map(|s| s.iter().filter_map(Value::as_str).collect())
        .filter(|s: &Vec<&str>| !s.is_empty())
        .unwrap_or_else(|| vec!["https"]);
    schemes
        .into_iter()
        .map(|scheme| format!("{scheme}://{host}{base_path}"))
        .collect()
}

/// Resolve a local `$ref` (`#/components/...`) one level deep.
fn resolve<'a>(root: &'a Map<String, Value>, value: &'a Value) -> &'a Value {
    let Some(reference) = value.get("$ref").and_then(Value::as_str) else {
        return value;
    };
    let Some(pointer) = reference.strip_prefix('#') else {
        return value;
    };
    let mut segments = pointer.split('/').filter(|s| !s.is_empty());
    let Some(first) = segments.next() else {
        return value;
    };
    let mut current = root.get(first);
    for segment in segments {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        current = current.and_then(|v| v.get(&segment));
    }
    current.unwrap_or(value)
}

/// Short type label for a schema (`string(date-time)`, `array<User>`...).
fn schema_type(schema: &Value) -> String {
    if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        return reference.rsplit('/').next().unwrap_or(reference).to_owned();
    }
    match schema.get("type").and_then(Value::as_str) {
        Some("array") => {
            let items = schema.get("items").map_or_else(|| "any".to_owned(), schema_type);
            format!("array<{items}>")
        }
        Some(ty) => match schema.get("format").and_then(Value::as_str) {
            Some(format) => format!("{ty}({format})"),
            None => ty.to_owned(),
        },
        None if schema.get("properties").is_some() => "object".to_owned(),
        None => "any".to_owned(),
    }
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn write_table(out: &mut String, headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }
    let _ = writeln!(out, "| {} |", headers.join(" | "));
    let _ = writeln!(
        out,
        "|{}|",
        headers.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    );
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| cell(c)).collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }
}

fn push_paragraph(out: &mut String, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(text);
    out.push('\n');
}

fn push_heading(out: &mut String, heading: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "#### {heading}\n");
}

fn info_node(
    info: Option<&Map<String, Value>>,
    root: &Map<String, Value>,
    servers: &[String],
) -> ContentNode {
    let empty = Map::new();
    let info = info.unwrap_or(&empty);
    let mut text = String::new();

    if let Some(title) = str_field(info, "title") {
        let version = str_field(info, "version").unwrap_or("unversioned");
        push_paragraph(&mut text, &format!("**{title}** (version {version})"));
    }
    if let Some(description) = str_field(info, "description") {
        push_paragraph(&mut text, description);
    }

    let server_rows: Vec<Vec<String>> = match root.get("servers").and_then(Value::as_array) {
        Some(entries) => entries
            .iter()
            .map(|s| {
                vec![
                    s.get("url").and_then(Value::as_str).unwrap_or_default().to_owned(),
                    s.get("description").and_then(Value::as_str).unwrap_or_default().to_owned(),
                ]
            })
            .collect(),
        None => servers.iter().map(|url| vec![url.clone(), String::new()]).collect(),
    };
    if !server_rows.is_empty() {
        push_heading(&mut text, "Servers");
        write_table(&mut text, &["URL", "Description"], &server_rows);
    }

    if let Some(contact) = info.get("contact").and_then(Value::as_object) {
        let parts: Vec<&str> = ["name", "email", "url"]
            .into_iter()
            .filter_map(|k| str_field(contact, k))
            .collect();
        if !parts.is_empty() {
            push_paragraph(&mut text, &format!("Contact: {}", parts.join(", ")));
        }
    }
    if let Some(license) = info.get("license").and_then(Value::as_object) {
        let parts: Vec<&str> = ["name", "url"]
            .into_iter()
            .filter_map(|k| str_field(license, k))
            .collect();
        if !parts.is_empty() {
            push_paragraph(&mut text, &format!("License: {}", parts.join(", ")));
        }
    }

    let mut node = ContentNode::new("api-info")
        .with_title("API Information")
        .with_level(1)
        .with_text(text.trim_end())
        .with_attribute("servers", json!(servers));
    for key in ["title", "version", "description", "contact", "license"] {
        if let Some(value) = info.get(key) {
            node.attributes.insert(key.to_owned(), value.clone());
        }
    }
    node
}

fn path_nodes(root: &Map<String, Value>) -> Vec<ContentNode> {
    let Some(paths) = root.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    paths
        .iter()
        .filter_map(|(path, item)| item.as_object().map(|item| (path, item)))
        .map(|(path, item)| {
            let shared_params = item
                .get("parameters")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let mut text = String::new();
            for key in ["summary", "description"] {
                if let Some(value) = str_field(item, key) {
                    push_paragraph(&mut text, value);
                }
            }

            let mut node = ContentNode::new("api-path")
                .with_title(path.as_str())
                .with_level(2)
                .with_text(text.trim_end())
                .with_attribute("path", path.as_str());

            for (method, operation) in item {
                if !HTTP_METHODS.contains(&method.to_ascii_lowercase().as_str()) {
                    continue;
                }
                let Some(operation) = operation.as_object() else {
                    continue;
                };
                node.children
                    .push(operation_node(root, path, method, operation, shared_params));
            }
            node
        })
        .collect()
}

/// Merge path-level and operation-level parameters.
///
/// Operation parameters override path parameters with the same name and location.
fn merge_parameters<'a>(
    root: &'a Map<String, Value>,
    shared: &'a [Value],
    own: &'a [Value],
) -> Vec<&'a Value> {
    let key = |p: &Value| {
        (
            p.get("name").and_then(Value::as_str).unwrap_or_default().to_owned(),
            p.get("in").and_then(Value::as_str).unwrap_or_default().to_owned(),
        )
    };

    let own: Vec<&Value> = own.iter().map(|p| resolve(root, p)).collect();
    let mut merged: Vec<&Value> = shared
        .iter()
        .map(|p| resolve(root, p))
        .filter(|p| !own.iter().any(|o| key(o) == key(p)))
        .collect();
    merged.extend(own);
    merged
}

#[allow(clippy::too_many_lines)]
fn operation_node(
    root: &Map<String, Value>,
    path: &str,
    method: &str,
    operation: &Map<String, Value>,
    shared_params: &[Value],
) -> ContentNode {
    let method_upper = method.to_ascii_uppercase();
    let own_params = operation
        .get("parameters")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let params = merge_parameters(root, shared_params, own_params);

    let mut text = String::new();
    for key in ["summary", "description"] {
        if let Some(value) = str_field(operation, key) {
            push_paragraph(&mut text, value);
        }
    }
    if operation.get("deprecated").and_then(Value::as_bool) == Some(true) {
        push_paragraph(&mut text, "**Deprecated**");
    }

    let mut param_rows = Vec::new();
    let mut param_attrs = Vec::new();
    let mut body_attrs = Vec::new();
    for param in &params {
        let location = param.get("in").and_then(Value::as_str).unwrap_or_default();
        let name = param.get("name").and_then(Value::as_str).unwrap_or_default();
        let required = param.get("required").and_then(Value::as_bool).unwrap_or(false);
        let description = param.get("description").and_then(Value::as_str).unwrap_or_default();

        // Swagger 2 carries the request body as an `in: body` parameter.
        if location == "body" {
            let schema = param.get("schema").map_or_else(|| "any".to_owned(), schema_type);
            let consumes = operation
                .get("consumes")
                .or_else(|| root.get("consumes"))
                .and_then(Value::as_array)
                .and_then(|c| c.first())
                .and_then(Value::as_str)
                .unwrap_or("application/json");
            body_attrs.push(json!({
                "mediaType": consumes,
                "schema": schema,
                "required": required,
                "description": description,
            }));
            continue;
        }

        let ty = param
            .get("schema")
            .map(schema_type)
            .or_else(|| param.get("type").and_then(Value::as_str).map(str::to_owned))
            .unwrap_or_else(|| "any".to_owned());
        param_rows.push(vec![
            name.to_owned(),
            location.to_owned(),
            ty.clone(),
            yes_no(required),
            description.to_owned(),
        ]);
        param_attrs.push(json!({
            "name": name,
            "in": location,
            "type": ty,
            "required": required,
            "description": description,
        }));
    }
    if !param_rows.is_empty() {
        push_heading(&mut text, "Parameters");
        write_table(
            &mut text,
            &["Name", "In", "Type", "Required", "Description"],
            &param_rows,
        );
    }

    if let Some(body) = operation.get("requestBody").map(|b| resolve(root, b)) {
        let required = body.get("required").and_then(Value::as_bool).unwrap_or(false);
        let description = body.get("description").and_then(Value::as_str).unwrap_or_default();
        if let Some(content) = body.get("content").and_then(Value::as_object) {
            for (media_type, media) in content {
                let schema = media.get("schema").map_or_else(|| "any".to_owned(), schema_type);
                body_attrs.push(json!({
                    "mediaType": media_type,
                    "schema": schema,
                    "required": required,
                    "description": description,
                }));
            }
        }
    }
    if !body_attrs.is_empty() {
        let rows: Vec<Vec<String>> = body_attrs
            .iter()
            .map(|b| {
                vec![
                    b["mediaType"].as_str().unwrap_or_default().to_owned(),
                    b["schema"].as_str().unwrap_or_default().to_owned(),
                    yes_no(b["required"].as_bool().unwrap_or(false)),
                ]
            })
            .collect();
        push_heading(&mut text, "Request Body");
        write_table(&mut text, &["Media Type", "Schema", "Required"], &rows);
    }

    let mut response_rows = Vec::new();
    let mut response_attrs = Vec::new();
    if let Some(responses) = operation.get("responses").and_then(Value::as_object) {
        for (status, response) in responses {
            let response = resolve(root, response);
            let description = response
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let media_types: Vec<&str> = response
                .get("content")
                .and_then(Value::as_object)
                .map(|c| c.keys().map(String::as_str).collect())
                .unwrap_or_default();
            let schema = response
                .get("content")
                .and_then(Value::as_object)
                .and_then(|c| c.values().find_map(|m| m.get("schema")))
                .or_else(|| response.get("schema"))
                .map(schema_type)
                .unwrap_or_default();

            response_rows.push(vec![
                status.clone(),
                description.to_owned(),
                media_types.join(", "),
                schema.clone(),
            ]);
            response_attrs.push(json!({
                "status": status,
                "description": description,
                "mediaTypes": media_types,
                "schema": schema,
            }));
        }
    }
    if !response_rows.is_empty() {
        push_heading(&mut text, "Responses");
        write_table(
            &mut text,
            &["Status", "Description", "Media Types", "Schema"],
            &response_rows,
        );
    }

    let mut node = ContentNode::new("api-operation")
        .with_title(format!("{method_upper} {path}"))
        .with_level(3)
        .with_text(text.trim_end())
        .with_attribute("method", method_upper)
        .with_attribute("path", path)
        .with_attribute("parameters", param_attrs)
        .with_attribute("requestBody", body_attrs)
        .with_attribute("responses", response_attrs);
    for key in ["operationId", "summary", "tags", "deprecated"] {
        if let Some(value) = operation.get(key) {
            node.attributes.insert(key.to_owned(), value.clone());
        }
    }
    node
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "yes" } else { "no" };
    text.to_owned()
}

fn schema_nodes(root: &Map<String, Value>) -> Vec<ContentNode> {
    let schemas = root
        .get("components")
        .and_then(|c| c.get("schemas"))
        .or_else(|| root.get("definitions"))
        .and_then(Value::as_object);
    let Some(schemas) = schemas else {
        return Vec::new();
    };

    schemas
        .iter()
        .map(|(name, schema)| {
            let required: Vec<&str> = schema
                .get("required")
                .and_then(Value::as_array)
                .map(|r| r.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            let mut text = String::new();
            if let Some(description) = schema.get("description").and_then(Value::as_str) {
                push_paragraph(&mut text, description);
            }

            let mut rows = Vec::new();
            let mut attrs = Vec::new();
            if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
                for (prop, prop_schema) in properties {
                    let ty = schema_type(prop_schema);
                    let is_required = required.contains(&prop.as_str());
                    let description = prop_schema
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    rows.push(vec![
                        prop.clone(),
                        ty.clone(),
                        yes_no(is_required),
                        description.to_owned(),
                    ]);
                    attrs.push(json!({
                        "name": prop,
                        "type": ty,
                        "required": is_required,
                        "description": description,
                    }));
                }
            }
            if !rows.is_empty() {
                push_heading(&mut text, "Properties");
                write_table(&mut text, &["Property", "Type", "Required", "Description"], &rows);
            }

            ContentNode::new("api-schema")
                .with_title(name.as_str())
                .with_level(2)
                .with_text(text.trim_end())
                .with_attribute("name", name.as_str())
                .with_attribute("type", schema_type(schema))
                .with_attribute("required", required)
                .with_attribute("properties", attrs)
        })
        .collect()
}

/// Collect named and singular examples from every request and response.
///
/// Keys: `{path}.{method}.request.{mediaType}` and
/// `{path}.{method}.response.{status}.{mediaType}`. Singular `example`
/// values are stored under the name `default`.
fn extract_examples(root: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    let Some(paths) = root.get("paths").and_then(Value::as_object) else {
        return out;
    };

    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };
        for (method, operation) in item {
            if !HTTP_METHODS.contains(&method.to_ascii_lowercase().as_str()) {
                continue;
            }

            if let Some(content) = operation
                .get("requestBody")
                .map(|b| resolve(root, b))
                .and_then(|b| b.get("content"))
                .and_then(Value::as_object)
            {
                for (media_type, media) in content {
                    insert_examples(&mut out, format!("{path}.{method}.request.{media_type}"), media);
                }
            }

            let Some(responses) = operation.get("responses").and_then(Value::as_object) else {
                continue;
            };
            for (status, response) in responses {
                let response = resolve(root, response);
                if let Some(content) = response.get("content").and_then(Value::as_object) {
                    for (media_type, media) in content {
                        let key = format!("{path}.{method}.response.{status}.{media_type}");
                        insert_examples(&mut out, key, media);
                    }
                }
                // Swagger 2: `examples` maps media type to a single value.
                if let Some(examples) = response.get("examples").and_then(Value::as_object) {
                    for (media_type, value) in examples {
                        let key = format!("{path}.{method}.response.{status}.{media_type}");
                        let mut named = Map::new();
                        named.insert("default".to_owned(), value.clone());
                        out.insert(key, Value::Object(named));
                    }
                }
            }
        }
    }
    out
}

fn insert_examples(out: &mut Map<String, Value>, key: String, media: &Value) {
    let mut named = Map::new();
    if let Some(example) = media.get("example") {
        named.insert("default".to_owned(), example.clone());
    }
    if let Some(examples) = media.get("examples").and_then(Value::as_object) {
        for (name, example) in examples {
            let value = example.get("value").unwrap_or(example);
            named.insert(name.clone(), value.clone());
        }
    }
    if !named.is_empty() {
        out.insert(key, Value::Object(named));
    }
}
