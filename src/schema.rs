//! Response schema declarations.
//!
//! Gemini's structured-output mode accepts a schema alongside the
//! prompt and constrains generation to it. [`Schema`] is a small
//! builder producing that wire format, so each JSON stage can declare
//! the exact shape it expects without hand-writing nested
//! `serde_json::json!` trees.

use serde_json::{json, Map, Value};

#[derive(Debug, Clone)]
enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
    Enumeration(Vec<String>),
    Array(Box<Schema>),
    Object(Vec<Field>),
}

#[derive(Debug, Clone)]
struct Field {
    name: String,
    schema: Schema,
    required: bool,
}

/// Declarative response schema in the provider's wire format.
///
/// # Example
///
/// ```
/// use studio_pipeline::schema::Schema;
///
/// let schema = Schema::object()
///     .field("summary", Schema::string())
///     .field("key_points", Schema::array(Schema::string()));
/// let wire = schema.to_value();
/// assert_eq!(wire["type"], "OBJECT");
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    kind: SchemaKind,
    description: Option<String>,
}

impl Schema {
    fn of(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaKind::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaKind::Number)
    }

    pub fn integer() -> Self {
        Self::of(SchemaKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(SchemaKind::Boolean)
    }

    /// A string constrained to one of the given values.
    pub fn enumeration<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::of(SchemaKind::Enumeration(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn array(items: Schema) -> Self {
        Self::of(SchemaKind::Array(Box::new(items)))
    }

    /// An object with no fields yet; add them with [`field`](Self::field)
    /// and [`optional_field`](Self::optional_field).
    pub fn object() -> Self {
        Self::of(SchemaKind::Object(Vec::new()))
    }

    /// Add a required field. Panics if the schema is not an object —
    /// schemas are assembled from literals at startup, so this is a
    /// programming error, not runtime input.
    pub fn field(self, name: impl Into<String>, schema: Schema) -> Self {
        self.push_field(name.into(), schema, true)
    }

    /// Add an optional field.
    pub fn optional_field(self, name: impl Into<String>, schema: Schema) -> Self {
        self.push_field(name.into(), schema, false)
    }

    fn push_field(mut self, name: String, schema: Schema, required: bool) -> Self {
        match &mut self.kind {
            SchemaKind::Object(fields) => {
                fields.push(Field {
                    name,
                    schema,
                    required,
                });
                self
            }
            _ => panic!("fields can only be added to object schemas"),
        }
    }

    /// Attach a description, surfaced to the model as guidance.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Serialize to the provider's schema JSON.
    pub fn to_value(&self) -> Value {
        let mut out = match &self.kind {
            SchemaKind::String => json!({"type": "STRING"}),
            SchemaKind::Number => json!({"type": "NUMBER"}),
            SchemaKind::Integer => json!({"type": "INTEGER"}),
            SchemaKind::Boolean => json!({"type": "BOOLEAN"}),
            SchemaKind::Enumeration(values) => json!({"type": "STRING", "enum": values}),
            SchemaKind::Array(items) => json!({"type": "ARRAY", "items": items.to_value()}),
            SchemaKind::Object(fields) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for field in fields {
                    properties.insert(field.name.clone(), field.schema.to_value());
                    if field.required {
                        required.push(Value::String(field.name.clone()));
                    }
                }
                let mut obj = json!({"type": "OBJECT", "properties": properties});
                if !required.is_empty() {
                    obj["required"] = Value::Array(required);
                }
                obj
            }
        };
        if let Some(ref description) = self.description {
            out["description"] = json!(description);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalar_schemas() {
        assert_eq!(Schema::string().to_value(), json!({"type": "STRING"}));
        assert_eq!(Schema::number().to_value(), json!({"type": "NUMBER"}));
        assert_eq!(Schema::integer().to_value(), json!({"type": "INTEGER"}));
        assert_eq!(Schema::boolean().to_value(), json!({"type": "BOOLEAN"}));
    }

    #[test]
    fn test_enumeration_schema() {
        let wire = Schema::enumeration(["draft", "final"]).to_value();
        assert_eq!(wire, json!({"type": "STRING", "enum": ["draft", "final"]}));
    }

    #[test]
    fn test_array_of_strings() {
        let wire = Schema::array(Schema::string()).to_value();
        assert_eq!(wire, json!({"type": "ARRAY", "items": {"type": "STRING"}}));
    }

    #[test]
    fn test_object_with_required_and_optional_fields() {
        let wire = Schema::object()
            .field("title", Schema::string())
            .field("overall_score", Schema::number())
            .optional_field("notes", Schema::string())
            .to_value();

        assert_eq!(wire["type"], "OBJECT");
        assert_eq!(wire["properties"]["title"]["type"], "STRING");
        assert_eq!(wire["properties"]["notes"]["type"], "STRING");
        assert_eq!(wire["required"], json!(["title", "overall_score"]));
    }

    #[test]
    fn test_description_attached() {
        let wire = Schema::string().describe("one short headline").to_value();
        assert_eq!(wire["description"], "one short headline");
    }

    #[test]
    fn test_nested_objects() {
        let section = Schema::object()
            .field("heading", Schema::string())
            .field("body", Schema::string());
        let wire = Schema::object()
            .field("main_sections", Schema::array(section))
            .to_value();

        let items = &wire["properties"]["main_sections"]["items"];
        assert_eq!(items["type"], "OBJECT");
        assert_eq!(items["required"], json!(["heading", "body"]));
    }

    #[test]
    #[should_panic(expected = "object schemas")]
    fn test_field_on_non_object_panics() {
        let _ = Schema::string().field("x", Schema::string());
    }
}
