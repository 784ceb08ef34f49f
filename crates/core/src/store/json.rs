//! JSON-file backed stores.
//!
//! Responsibilities:
//! - `JsonRegistryStore`: key path -> value name -> typed string value.
//! - `JsonStructuredStore`: namespaces, classes and instances, including the
//!   operations the in-process compiler applies.
//!
//! Invariants:
//! - Key paths, value names, namespaces, class names and property names
//!   match ignoring ASCII case; the first spelling written is kept.
//! - Every operation loads the file, applies one change and writes it back
//!   atomically. Unrelated content is preserved.
//! - DateTime properties are stored in CIM DMTF form.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{HierarchicalStore, StructuredStore, ValueKind, read_document, write_document};
use crate::error::StoreError;
use crate::schema::{INSTANCE_KEY_PROPERTY, PropertyDefinition, PropertyType};
use crate::value::TypedValue;

fn find_key<'a, V>(map: &'a IndexMap<String, V>, name: &str) -> Option<&'a str> {
    map.keys()
        .find(|key| key.eq_ignore_ascii_case(name))
        .map(String::as_str)
}

/// Insert-or-get by case-insensitive key, keeping the existing spelling.
fn entry_ignore_case<'a, V: Default>(map: &'a mut IndexMap<String, V>, name: &str) -> &'a mut V {
    let key = find_key(map, name).unwrap_or(name).to_string();
    map.entry(key).or_default()
}

fn get_ignore_case<'a, V>(map: &'a IndexMap<String, V>, name: &str) -> Option<&'a V> {
    let key = find_key(map, name)?.to_string();
    map.get(&key)
}

fn get_mut_ignore_case<'a, V>(map: &'a mut IndexMap<String, V>, name: &str) -> Option<&'a mut V> {
    let key = find_key(map, name)?.to_string();
    map.get_mut(&key)
}

/// One value in the registry document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryValue {
    #[serde(rename = "type")]
    pub kind: ValueKind,
    pub data: String,
}

type RegistryDocument = IndexMap<String, IndexMap<String, RegistryValue>>;

/// Hierarchical store kept in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonRegistryStore {
    path: PathBuf,
}

impl JsonRegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value `name` under `key_path`.
    pub fn read_value(
        &self,
        key_path: &str,
        name: &str,
    ) -> Result<Option<RegistryValue>, StoreError> {
        let document: RegistryDocument = read_document(&self.path)?;
        Ok(get_ignore_case(&document, key_path)
            .and_then(|values| get_ignore_case(values, name))
            .cloned())
    }

    /// Every value under `key_path`, in write order.
    pub fn values(&self, key_path: &str) -> Result<IndexMap<String, RegistryValue>, StoreError> {
        let document: RegistryDocument = read_document(&self.path)?;
        Ok(get_ignore_case(&document, key_path).cloned().unwrap_or_default())
    }
}

impl HierarchicalStore for JsonRegistryStore {
    fn write_value(
        &mut self,
        path: &str,
        name: &str,
        value: &str,
        kind: ValueKind,
    ) -> Result<(), StoreError> {
        let mut document: RegistryDocument = read_document(&self.path)?;
        let values = entry_ignore_case(&mut document, path);
        let key = find_key(values, name).unwrap_or(name).to_string();
        values.insert(
            key,
            RegistryValue {
                kind,
                data: value.to_string(),
            },
        );
        write_document(&self.path, &document)
    }
}

/// A class stored in the structured document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub key: String,
    pub properties: Vec<PropertyDefinition>,
    #[serde(default)]
    pub instances: Vec<IndexMap<String, Value>>,
}

impl ClassRecord {
    fn property_type(&self, name: &str) -> Option<PropertyType> {
        if name.eq_ignore_ascii_case(&self.key) {
            return Some(PropertyType::String);
        }
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.property_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StructuredDocument {
    #[serde(default)]
    namespaces: BTreeSet<String>,
    #[serde(default)]
    classes: IndexMap<String, IndexMap<String, ClassRecord>>,
}

impl StructuredDocument {
    fn has_namespace(&self, namespace: &str) -> bool {
        namespace.eq_ignore_ascii_case("root")
            || self
                .namespaces
                .iter()
                .any(|ns| ns.eq_ignore_ascii_case(namespace))
    }

    fn class(&self, namespace: &str, class_name: &str) -> Option<&ClassRecord> {
        get_ignore_case(&self.classes, namespace)
            .and_then(|classes| get_ignore_case(classes, class_name))
    }
}

/// Structured store kept in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonStructuredStore {
    path: PathBuf,
}

impl JsonStructuredStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StructuredDocument, StoreError> {
        read_document(&self.path)
    }

    fn save(&self, document: &StructuredDocument) -> Result<(), StoreError> {
        write_document(&self.path, document)
    }

    /// The class definition, if it exists.
    pub fn class(
        &self,
        namespace: &str,
        class_name: &str,
    ) -> Result<Option<ClassRecord>, StoreError> {
        Ok(self.load()?.class(namespace, class_name).cloned())
    }

    pub fn namespace_exists(&self, namespace: &str) -> Result<bool, StoreError> {
        Ok(self.load()?.has_namespace(namespace))
    }

    /// Property values of the first instance of `class_name`.
    pub fn instance(
        &self,
        namespace: &str,
        class_name: &str,
    ) -> Result<Option<IndexMap<String, Value>>, StoreError> {
        Ok(self
            .load()?
            .class(namespace, class_name)
            .and_then(|class| class.instances.first().cloned()))
    }

    /// Create `namespace` and every parent below `root`.
    pub(crate) fn create_namespace(&self, namespace: &str) -> Result<(), StoreError> {
        let mut document = self.load()?;
        let mut current = String::new();
        for segment in namespace.split('\\').filter(|s| !s.is_empty()) {
            if !current.is_empty() {
                current.push('\\');
            }
            current.push_str(segment);
            if !document.has_namespace(&current) {
                document.namespaces.insert(current.clone());
            }
        }
        self.save(&document)
    }

    /// Remove `class_name` and its instances; a missing class is not an error.
    pub(crate) fn delete_class(&self, namespace: &str, class_name: &str) -> Result<(), StoreError> {
        let mut document = self.load()?;
        if let Some(classes) = get_mut_ignore_case(&mut document.classes, namespace)
            && let Some(key) = find_key(classes, class_name).map(str::to_string)
        {
            classes.shift_remove(&key);
            self.save(&document)?;
        }
        Ok(())
    }

    /// Define (or redefine) a class. The namespace must exist.
    pub(crate) fn define_class(
        &self,
        namespace: &str,
        class_name: &str,
        record: ClassRecord,
    ) -> Result<(), StoreError> {
        let mut document = self.load()?;
        if !document.has_namespace(namespace) {
            return Err(StoreError::Command {
                message: format!("namespace {namespace} does not exist"),
            });
        }
        let classes = entry_ignore_case(&mut document.classes, namespace);
        let key = find_key(classes, class_name).unwrap_or(class_name).to_string();
        classes.insert(key, record);
        self.save(&document)
    }

    /// Create or replace the instance whose key matches.
    pub(crate) fn put_instance(
        &self,
        namespace: &str,
        class_name: &str,
        values: IndexMap<String, Value>,
    ) -> Result<(), StoreError> {
        let mut document = self.load()?;
        let class = get_mut_ignore_case(&mut document.classes, namespace)
            .and_then(|classes| get_mut_ignore_case(classes, class_name))
            .ok_or_else(|| StoreError::Command {
                message: format!("class {class_name} is not defined in {namespace}"),
            })?;

        for name in values.keys() {
            if class.property_type(name).is_none() {
                return Err(StoreError::PropertyNotFound {
                    class_name: class_name.to_string(),
                    property: name.clone(),
                });
            }
        }

        let key_property = class.key.clone();
        let key_value = get_ignore_case(&values, &key_property).cloned();
        let existing = class.instances.iter().position(|instance| {
            get_ignore_case(instance, &key_property).cloned() == key_value
        });
        match existing {
            Some(index) => class.instances[index] = values,
            None => class.instances.push(values),
        }
        self.save(&document)
    }
}

/// Convert `value` to the JSON stored for a property of `declared` type.
fn property_json(
    property: &str,
    declared: PropertyType,
    value: &TypedValue,
) -> Result<Value, StoreError> {
    let mismatch = || StoreError::TypeMismatch {
        property: property.to_string(),
        declared: declared.to_string(),
        actual: value.tag().to_string(),
    };
    match (declared, value) {
        (_, TypedValue::Null) => Ok(Value::Null),
        (PropertyType::DateTime, TypedValue::DateTime(ts)) => Ok(Value::String(ts.to_cim())),
        (PropertyType::Boolean, TypedValue::Boolean(b)) => Ok(Value::Bool(*b)),
        (PropertyType::Real64, TypedValue::Number(n)) => {
            serde_json::Number::from_f64(*n).map(Value::Number).ok_or_else(mismatch)
        }
        (PropertyType::String, other) => Ok(Value::String(other.display_string())),
        _ => Err(mismatch()),
    }
}

impl StructuredStore for JsonStructuredStore {
    fn instance_properties(
        &self,
        namespace: &str,
        class_name: &str,
    ) -> Result<Option<Vec<String>>, StoreError> {
        let document = self.load()?;
        let Some(class) = document.class(namespace, class_name) else {
            return Ok(None);
        };
        if class.instances.is_empty() {
            return Ok(None);
        }
        let mut names = vec![class.key.clone()];
        names.extend(class.properties.iter().map(|p| p.name.clone()));
        Ok(Some(names))
    }

    fn set_property(
        &mut self,
        namespace: &str,
        class_name: &str,
        property: &str,
        value: &TypedValue,
    ) -> Result<(), StoreError> {
        let mut document = self.load()?;
        let class = get_mut_ignore_case(&mut document.classes, namespace)
            .and_then(|classes| get_mut_ignore_case(classes, class_name))
            .ok_or_else(|| StoreError::InstanceNotFound {
                namespace: namespace.to_string(),
                class_name: class_name.to_string(),
            })?;

        if property.eq_ignore_ascii_case(INSTANCE_KEY_PROPERTY)
            || property.eq_ignore_ascii_case(&class.key)
        {
            return Err(StoreError::Command {
                message: format!("key property {property} cannot be changed"),
            });
        }
        let declared = class
            .property_type(property)
            .ok_or_else(|| StoreError::PropertyNotFound {
                class_name: class_name.to_string(),
                property: property.to_string(),
            })?;
        let json = property_json(property, declared, value)?;

        let instance = class
            .instances
            .first_mut()
            .ok_or_else(|| StoreError::InstanceNotFound {
                namespace: namespace.to_string(),
                class_name: class_name.to_string(),
            })?;
        let key = find_key(instance, property).unwrap_or(property).to_string();
        instance.insert(key, json);

        self.save(&document)
    }
}
