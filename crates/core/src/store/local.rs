//! In-process schema compiler for the JSON structured store.
//!
//! Understands the MOF subset produced by `SchemaSynthesizer`: namespace
//! pragmas, `deleteclass` pragmas, `__Namespace` instances, a description
//! qualifier, class definitions and instances with literal values.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use super::json::{ClassRecord, JsonStructuredStore};
use super::{CompileOutput, SchemaCompiler};
use crate::error::StoreError;
use crate::schema::{PropertyDefinition, PropertyType, unescape_mof_string};

static PRAGMA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^#pragma\s+(\w+)\s*\(\s*"((?:[^"\\]|\\.)*)"\s*(?:,\s*(\w+)\s*)?\)$"#)
        .expect("pattern is a compile-time constant with valid syntax")
});

static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bDescription\s*\(\s*"((?:[^"\\]|\\.)*)"\s*\)"#)
        .expect("pattern is a compile-time constant with valid syntax")
});

static PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:(\[key\])\s*)?([A-Za-z][A-Za-z0-9]*)\s+([A-Za-z_][A-Za-z0-9_]*)\s*;$")
        .expect("pattern is a compile-time constant with valid syntax")
});

static ASSIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.+?)\s*;$")
        .expect("pattern is a compile-time constant with valid syntax")
});

static STRING_LITERAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"((?:[^"\\]|\\.)*)"$"#)
        .expect("pattern is a compile-time constant with valid syntax")
});

const NAMESPACE_CLASS: &str = "__Namespace";

#[derive(Debug, Clone, PartialEq)]
enum Statement {
    Namespace(String),
    DeleteClass(String),
    Class {
        name: String,
        description: Option<String>,
        key: String,
        properties: Vec<PropertyDefinition>,
    },
    Instance {
        class_name: String,
        values: IndexMap<String, Value>,
    },
}

/// Applies generated schema files to a `JsonStructuredStore`.
#[derive(Debug, Clone)]
pub struct LocalCompiler {
    store: JsonStructuredStore,
}

impl LocalCompiler {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStructuredStore::new(store_path),
        }
    }

    fn apply(&self, statements: Vec<Statement>) -> Result<usize, StoreError> {
        let mut namespace = "root".to_string();
        let mut applied = 0;
        for statement in statements {
            match statement {
                Statement::Namespace(ns) => namespace = ns,
                Statement::DeleteClass(class_name) => {
                    self.store.delete_class(&namespace, &class_name)?;
                }
                Statement::Class {
                    name,
                    description,
                    key,
                    properties,
                } => {
                    let record = ClassRecord {
                        description,
                        key,
                        properties,
                        instances: Vec::new(),
                    };
                    self.store.define_class(&namespace, &name, record)?;
                }
                Statement::Instance { class_name, values }
                    if class_name.eq_ignore_ascii_case(NAMESPACE_CLASS) =>
                {
                    let Some(Value::String(child)) = values.get("Name") else {
                        return Err(StoreError::Command {
                            message: "__Namespace instance without a Name".to_string(),
                        });
                    };
                    self.store.create_namespace(&format!("{namespace}\\{child}"))?;
                }
                Statement::Instance { class_name, values } => {
                    self.store.put_instance(&namespace, &class_name, values)?;
                }
            }
            applied += 1;
        }
        Ok(applied)
    }
}

impl SchemaCompiler for LocalCompiler {
    fn compile(&self, path: &Path, auto_recover: bool) -> Result<CompileOutput, StoreError> {
        let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let statements = parse(&text)?;
        tracing::debug!(
            file = %path.display(),
            statements = statements.len(),
            auto_recover,
            store = %self.store.path().display(),
            "Applying schema to local structured store"
        );
        let applied = self.apply(statements)?;

        Ok(CompileOutput {
            exit_code: Some(0),
            stdout: format!(
                "Parsing MOF file: {}\n{applied} statements applied\nDone!\n",
                path.display()
            ),
            stderr: String::new(),
        })
    }
}

fn schema_error(line: usize, message: impl Into<String>) -> StoreError {
    StoreError::Schema {
        line,
        message: message.into(),
    }
}

/// Strip the `\\.\` local machine prefix from an object path.
fn namespace_from_object_path(path: &str) -> String {
    path.strip_prefix("\\\\.\\").unwrap_or(path).to_string()
}

fn parse_literal(line: usize, literal: &str) -> Result<Value, StoreError> {
    if literal.eq_ignore_ascii_case("NULL") {
        return Ok(Value::Null);
    }
    if literal.eq_ignore_ascii_case("TRUE") {
        return Ok(Value::Bool(true));
    }
    if literal.eq_ignore_ascii_case("FALSE") {
        return Ok(Value::Bool(false));
    }
    if let Some(caps) = STRING_LITERAL_RE.captures(literal) {
        return Ok(Value::String(unescape_mof_string(&caps[1])));
    }
    literal
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| schema_error(line, format!("unsupported literal {literal}")))
}

/// Parse the generated MOF subset into statements.
fn parse(text: &str) -> Result<Vec<Statement>, StoreError> {
    let mut statements = Vec::new();
    let mut description: Option<String> = None;
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with("//"));

    while let Some((number, line)) = lines.next() {
        if line.starts_with("#pragma") {
            let caps = PRAGMA_RE
                .captures(line)
                .ok_or_else(|| schema_error(number, "malformed pragma"))?;
            let argument = unescape_mof_string(&caps[2]);
            match caps[1].to_ascii_lowercase().as_str() {
                "namespace" => {
                    statements.push(Statement::Namespace(namespace_from_object_path(&argument)))
                }
                "deleteclass" => statements.push(Statement::DeleteClass(argument)),
                other => return Err(schema_error(number, format!("unsupported pragma {other}"))),
            }
        } else if line.starts_with('[') {
            if let Some(caps) = DESCRIPTION_RE.captures(line) {
                description = Some(unescape_mof_string(&caps[1]));
            }
        } else if let Some(name) = line.strip_prefix("class ") {
            let name = name.trim().to_string();
            expect_open_brace(&mut lines, number)?;
            let mut key = None;
            let mut properties = Vec::new();
            loop {
                let (number, line) = lines
                    .next()
                    .ok_or_else(|| schema_error(number, format!("class {name} is not closed")))?;
                if line == "};" {
                    break;
                }
                let caps = PROPERTY_RE
                    .captures(line)
                    .ok_or_else(|| schema_error(number, format!("malformed property: {line}")))?;
                let property_type: PropertyType = caps[2]
                    .parse()
                    .map_err(|message: String| schema_error(number, message))?;
                let property_name = caps[3].to_string();
                if caps.get(1).is_some() {
                    key = Some(property_name);
                } else {
                    properties.push(PropertyDefinition {
                        name: property_name,
                        property_type,
                    });
                }
            }
            let key = key.ok_or_else(|| schema_error(number, format!("class {name} has no key")))?;
            statements.push(Statement::Class {
                name,
                description: description.take(),
                key,
                properties,
            });
        } else if let Some(class_name) = line.strip_prefix("instance of ") {
            let class_name = class_name.trim().to_string();
            expect_open_brace(&mut lines, number)?;
            let mut values = IndexMap::new();
            loop {
                let (number, line) = lines.next().ok_or_else(|| {
                    schema_error(number, format!("instance of {class_name} is not closed"))
                })?;
                if line == "};" {
                    break;
                }
                let caps = ASSIGN_RE
                    .captures(line)
                    .ok_or_else(|| schema_error(number, format!("malformed assignment: {line}")))?;
                values.insert(caps[1].to_string(), parse_literal(number, &caps[2])?);
            }
            statements.push(Statement::Instance { class_name, values });
        } else {
            return Err(schema_error(number, format!("unexpected text: {line}")));
        }
    }

    Ok(statements)
}

fn expect_open_brace<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    header_line: usize,
) -> Result<(), StoreError> {
    match lines.next() {
        Some((_, "{")) => Ok(()),
        Some((number, other)) => Err(schema_error(number, format!("expected '{{', found {other}"))),
        None => Err(schema_error(header_line, "expected '{' before end of file")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::EntryCollection;
    use crate::schema::{INSTANCE_KEY_PROPERTY, SchemaSynthesizer};
    use crate::store::StructuredStore;
    use crate::value::{TypedEntry, TypedValue};

    fn write_schema(dir: &tempfile::TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("OSDInfo.mof");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_compiles_generated_schema() {
        let dir = tempfile::tempdir().unwrap();
        let entries: EntryCollection = [
            TypedEntry::new("Model", TypedValue::String("X".to_string()), "X"),
            TypedEntry::new("IsVM", TypedValue::Boolean(true), "True"),
        ]
        .into_iter()
        .collect();
        let text = SchemaSynthesizer.synthesize(&entries, r"root\cimv2\OSDInfo", "OSDInfo", "d");
        let path = write_schema(&dir, &text);

        let store_path = dir.path().join("wmi.json");
        let output = LocalCompiler::new(&store_path).compile(&path, true).unwrap();
        assert!(output.is_success());

        let store = JsonStructuredStore::new(&store_path);
        assert!(store.namespace_exists(r"root\cimv2\OSDInfo").unwrap());
        let class = store.class(r"root\cimv2\OSDInfo", "OSDInfo").unwrap().unwrap();
        assert_eq!(class.key, INSTANCE_KEY_PROPERTY);
        assert_eq!(class.description.as_deref(), Some("d"));
        assert_eq!(class.properties.len(), 2);
        assert_eq!(class.properties[1].property_type, PropertyType::Boolean);

        let instance = store.instance(r"root\cimv2\OSDInfo", "OSDInfo").unwrap().unwrap();
        assert_eq!(instance[INSTANCE_KEY_PROPERTY], Value::String("OSDInfo".to_string()));
        assert_eq!(instance["Model"], Value::Null);
    }

    #[test]
    fn test_recompiling_replaces_the_class() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("wmi.json");
        let compiler = LocalCompiler::new(&store_path);

        let first: EntryCollection = [TypedEntry::new("Old", TypedValue::Number(1.0), "1")]
            .into_iter()
            .collect();
        let mof = SchemaSynthesizer.synthesize(&first, "root", "OSDInfo", "d");
        let path = write_schema(&dir, &mof);
        compiler.compile(&path, true).unwrap();

        let second: EntryCollection = [TypedEntry::new("New", TypedValue::Number(2.0), "2")]
            .into_iter()
            .collect();
        let mof = SchemaSynthesizer.synthesize(&second, "root", "OSDInfo", "d");
        let path = write_schema(&dir, &mof);
        compiler.compile(&path, true).unwrap();

        let store = JsonStructuredStore::new(&store_path);
        assert_eq!(
            store.instance_properties("root", "OSDInfo").unwrap(),
            Some(vec!["InstanceKey".to_string(), "New".to_string()])
        );
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_schema(
            &dir,
            "#pragma namespace(\"\\\\\\\\.\\\\root\")\nclass X\n{\n    Bogus;\n};\n",
        );
        let err = LocalCompiler::new(dir.path().join("wmi.json"))
            .compile(&path, true)
            .unwrap_err();
        assert!(matches!(err, StoreError::Schema { line: 4, .. }), "got {err:?}");
        assert!(err.is_compile_failure());
    }

    #[test]
    fn test_class_without_key_is_rejected() {
        let err = parse("class X\n{\n    String A;\n};\n").unwrap_err();
        assert!(matches!(err, StoreError::Schema { line: 1, .. }));
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse_literal(1, "NULL").unwrap(), Value::Null);
        assert_eq!(parse_literal(1, "true").unwrap(), Value::Bool(true));
        assert_eq!(parse_literal(1, "\"a\\\"b\"").unwrap(), Value::String("a\"b".to_string()));
        assert_eq!(parse_literal(1, "2.5").unwrap(), serde_json::json!(2.5));
        assert!(parse_literal(1, "bareword").is_err());
    }

    #[test]
    fn test_namespace_pragma_strips_machine_prefix() {
        let statements = parse("#pragma namespace(\"\\\\\\\\.\\\\root\\\\cimv2\")\n").unwrap();
        assert_eq!(statements, vec![Statement::Namespace(r"root\cimv2".to_string())]);
    }
}
