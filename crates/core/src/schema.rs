//! Structured store schema synthesis.
//!
//! Responsibilities:
//! - Derive a class definition from the typed entries, one property per
//!   entry in collection order.
//! - Render the definition as managed object format (MOF) text: namespace
//!   creation, class delete and recreate, and one keyed instance.
//!
//! Does NOT handle:
//! - Compiling or applying the text (see `store`).
//!
//! Invariants:
//! - The class always begins with `[key] String InstanceKey;`.
//! - Entries whose name equals the key property (ignoring case) are left out.
//! - Rendering is pure string generation.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entries::EntryCollection;
use crate::value::TypeTag;

/// Name of the key property every synthesized class carries.
pub const INSTANCE_KEY_PROPERTY: &str = "InstanceKey";

/// Property types of the structured store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    DateTime,
    Boolean,
    Real64,
    String,
}

impl PropertyType {
    /// The MOF keyword of this type.
    pub fn keyword(self) -> &'static str {
        match self {
            PropertyType::DateTime => "DateTime",
            PropertyType::Boolean => "Boolean",
            PropertyType::Real64 => "Real64",
            PropertyType::String => "String",
        }
    }
}

impl From<TypeTag> for PropertyType {
    fn from(tag: TypeTag) -> Self {
        match tag {
            TypeTag::DateTime => PropertyType::DateTime,
            TypeTag::Boolean => PropertyType::Boolean,
            TypeTag::Number => PropertyType::Real64,
            TypeTag::String | TypeTag::Null => PropertyType::String,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            PropertyType::DateTime,
            PropertyType::Boolean,
            PropertyType::Real64,
            PropertyType::String,
        ]
        .into_iter()
        .find(|t| t.keyword().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unsupported property type '{s}'"))
    }
}

/// One typed property of the class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
}

/// Class definition derived from an entry collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDefinition {
    pub namespace: String,
    pub class_name: String,
    pub description: String,
    pub properties: Vec<PropertyDefinition>,
}

impl SchemaDefinition {
    /// Map every entry to a property, in order.
    ///
    /// Entries named like the key property or not usable as an identifier
    /// are left out.
    pub fn from_entries(
        entries: &EntryCollection,
        namespace: &str,
        class_name: &str,
        description: &str,
    ) -> Self {
        let properties = entries
            .iter()
            .filter(|entry| {
                let name = entry.name();
                if name.eq_ignore_ascii_case(INSTANCE_KEY_PROPERTY) {
                    tracing::warn!(
                        name = %name,
                        "Entry name collides with the key property; leaving it out of the schema"
                    );
                    return false;
                }
                if !is_property_identifier(name) {
                    tracing::warn!(
                        name = %name,
                        "Entry name is not a valid property identifier; \
                         leaving it out of the schema"
                    );
                    return false;
                }
                true
            })
            .map(|entry| PropertyDefinition {
                name: entry.name().to_string(),
                property_type: PropertyType::from(entry.tag()),
            })
            .collect();

        Self {
            namespace: namespace.to_string(),
            class_name: class_name.to_string(),
            description: description.to_string(),
            properties,
        }
    }
}

/// True when `name` may be declared as a MOF property: it starts with a
/// letter or `_`.
pub fn is_property_identifier(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
}

/// Renders schema definitions as MOF text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaSynthesizer;

impl SchemaSynthesizer {
    /// Derive and render the schema for `entries`.
    pub fn synthesize(
        &self,
        entries: &EntryCollection,
        namespace: &str,
        class_name: &str,
        description: &str,
    ) -> String {
        self.render(&SchemaDefinition::from_entries(
            entries,
            namespace,
            class_name,
            description,
        ))
    }

    pub fn render(&self, schema: &SchemaDefinition) -> String {
        let mut out = String::new();
        let segments: Vec<&str> = schema
            .namespace
            .split('\\')
            .filter(|segment| !segment.is_empty())
            .collect();

        for depth in 1..segments.len() {
            let parent = segments[..depth].join("\\");
            let _ = writeln!(out, "#pragma namespace(\"{}\")", pragma_path(&parent));
            let _ = writeln!(out, "instance of __Namespace");
            let _ = writeln!(out, "{{");
            let _ = writeln!(out, "    Name = \"{}\";", escape_mof_string(segments[depth]));
            let _ = writeln!(out, "}};");
            out.push('\n');
        }

        let _ = writeln!(
            out,
            "#pragma namespace(\"{}\")",
            pragma_path(&segments.join("\\"))
        );
        let _ = writeln!(
            out,
            "#pragma deleteclass(\"{}\", NOFAIL)",
            escape_mof_string(&schema.class_name)
        );
        out.push('\n');

        let _ = writeln!(
            out,
            "[Description(\"{}\")]",
            escape_mof_string(&schema.description)
        );
        let _ = writeln!(out, "class {}", schema.class_name);
        let _ = writeln!(out, "{{");
        let _ = writeln!(out, "    [key] String {INSTANCE_KEY_PROPERTY};");
        for property in &schema.properties {
            let _ = writeln!(out, "    {} {};", property.property_type, property.name);
        }
        let _ = writeln!(out, "}};");
        out.push('\n');

        let _ = writeln!(out, "instance of {}", schema.class_name);
        let _ = writeln!(out, "{{");
        let _ = writeln!(
            out,
            "    {INSTANCE_KEY_PROPERTY} = \"{}\";",
            escape_mof_string(&schema.class_name)
        );
        for property in &schema.properties {
            let _ = writeln!(out, "    {} = NULL;", property.name);
        }
        let _ = writeln!(out, "}};");

        out
    }
}

/// Local machine object path of a namespace, MOF-escaped.
fn pragma_path(namespace: &str) -> String {
    escape_mof_string(&format!("\\\\.\\{namespace}"))
}

/// Escape text for a MOF string literal.
pub fn escape_mof_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Reverse of [`escape_mof_string`].
pub fn unescape_mof_string(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('t') => unescaped.push('\t'),
            Some(other) => unescaped.push(other),
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Timestamp, TypedEntry, TypedValue};
    use chrono::NaiveDate;

    fn foo_bar_entries() -> EntryCollection {
        let ts = Timestamp::Floating(
            NaiveDate::from_ymd_opt(2020, 3, 22)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        );
        [
            TypedEntry::new("Foo", TypedValue::DateTime(ts), "2020-03-22"),
            TypedEntry::new("Bar", TypedValue::Boolean(true), "True"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_type_mapping() {
        assert_eq!(PropertyType::from(TypeTag::DateTime).keyword(), "DateTime");
        assert_eq!(PropertyType::from(TypeTag::Boolean).keyword(), "Boolean");
        assert_eq!(PropertyType::from(TypeTag::Number).keyword(), "Real64");
        assert_eq!(PropertyType::from(TypeTag::String).keyword(), "String");
        assert_eq!(PropertyType::from(TypeTag::Null).keyword(), "String");
    }

    #[test]
    fn test_property_type_from_keyword() {
        assert_eq!("real64".parse::<PropertyType>(), Ok(PropertyType::Real64));
        assert!("uint32".parse::<PropertyType>().is_err());
    }

    #[test]
    fn test_schema_lists_properties_in_order() {
        let text = SchemaSynthesizer.synthesize(
            &foo_bar_entries(),
            r"root\cimv2",
            "OSDInfo",
            "Operating system deployment information",
        );

        let key = text.find("[key] String InstanceKey;").unwrap();
        let foo = text.find("DateTime Foo;").unwrap();
        let bar = text.find("Boolean Bar;").unwrap();
        assert!(key < foo && foo < bar);

        let instance = text.find("instance of OSDInfo").unwrap();
        let instance_block = &text[instance..];
        assert!(instance_block.contains("InstanceKey = \"OSDInfo\";"));
        assert!(instance_block.contains("Foo = NULL;"));
        assert!(instance_block.contains("Bar = NULL;"));
    }

    #[test]
    fn test_schema_creates_each_namespace_segment() {
        let text = SchemaSynthesizer.synthesize(
            &EntryCollection::new(),
            r"root\cimv2\OSDInfo",
            "OSDInfo",
            "d",
        );
        let expected_prefix = concat!(
            "#pragma namespace(\"\\\\\\\\.\\\\root\")\n",
            "instance of __Namespace\n",
            "{\n",
            "    Name = \"cimv2\";\n",
            "};\n",
            "\n",
            "#pragma namespace(\"\\\\\\\\.\\\\root\\\\cimv2\")\n",
            "instance of __Namespace\n",
            "{\n",
            "    Name = \"OSDInfo\";\n",
            "};\n",
            "\n",
            "#pragma namespace(\"\\\\\\\\.\\\\root\\\\cimv2\\\\OSDInfo\")\n",
            "#pragma deleteclass(\"OSDInfo\", NOFAIL)\n",
        );
        assert!(text.starts_with(expected_prefix), "unexpected schema:\n{text}");
    }

    #[test]
    fn test_root_namespace_creates_nothing() {
        let text = SchemaSynthesizer.synthesize(&EntryCollection::new(), "root", "OSDInfo", "d");
        assert!(!text.contains("__Namespace"));
        assert!(text.contains("class OSDInfo\n{\n    [key] String InstanceKey;\n};"));
    }

    #[test]
    fn test_key_collision_is_left_out() {
        let entries: EntryCollection = [
            TypedEntry::new("instancekey", TypedValue::String("x".to_string()), "x"),
            TypedEntry::new("Model", TypedValue::String("y".to_string()), "y"),
        ]
        .into_iter()
        .collect();
        let schema = SchemaDefinition::from_entries(&entries, "root", "OSDInfo", "d");
        assert_eq!(schema.properties.len(), 1);
        assert_eq!(schema.properties[0].name, "Model");
    }

    #[test]
    fn test_digit_leading_name_is_left_out() {
        let entries: EntryCollection = [
            TypedEntry::new("2ndDisk", TypedValue::String("D:".to_string()), "D:"),
            TypedEntry::new("Model", TypedValue::String("X1".to_string()), "X1"),
        ]
        .into_iter()
        .collect();
        let text = SchemaSynthesizer.synthesize(&entries, "root", "OSDInfo", "d");
        assert!(text.contains("    String Model;"));
        assert!(!text.contains("2ndDisk"));
    }

    #[test]
    fn test_is_property_identifier() {
        assert!(is_property_identifier("Model"));
        assert!(is_property_identifier("_Private"));
        assert!(!is_property_identifier("2ndDisk"));
        assert!(!is_property_identifier(""));
    }

    #[test]
    fn test_description_is_escaped() {
        let text = SchemaSynthesizer.synthesize(
            &EntryCollection::new(),
            "root",
            "OSDInfo",
            "Say \"hi\" C:\\",
        );
        assert!(text.contains(r#"[Description("Say \"hi\" C:\\")]"#));
    }

    #[test]
    fn test_escape_round_trip() {
        let original = "a\\b \"c\"\n\td";
        assert_eq!(unescape_mof_string(&escape_mof_string(original)), original);
    }
}
