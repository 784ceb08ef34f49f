//! Deployment metadata normalization and schema synthesis.
//!
//! This crate turns the untyped name/value pairs of a deployment environment
//! into typed entries, synthesizes a structured-store schema that matches the
//! inferred types, and writes the result to a registry-like store and a
//! class/instance store.

pub mod collector;
pub mod defaults;
pub mod entries;
pub mod error;
pub mod infer;
pub mod names;
pub mod schema;
pub mod source;
pub mod store;
pub mod timezone;
pub mod value;
pub mod writer;

pub use collector::VariableCollector;
pub use defaults::DeploymentProduct;
pub use entries::EntryCollection;
pub use error::{ConversionError, SourceError, StoreError};
pub use infer::TypeInferenceEngine;
pub use schema::{PropertyType, SchemaDefinition, SchemaSynthesizer};
pub use source::{EnvSource, JsonFileSource, MapSource, VariableSource};
pub use store::{
    CompileOutput, HierarchicalStore, SchemaCompiler, StructuredStore, ValueKind,
};
pub use timezone::{SourceZone, TimezoneNormalizer};
pub use value::{Timestamp, TypeTag, TypedEntry, TypedValue};
pub use writer::{EntryFailure, PublishReport, StoreWriter, WriteReport};
