//! Core contracts for entigen.
//!
//! This crate defines the configuration document model, the dotted field
//! path accessor, and the error type shared across the engine and CLI.

pub mod document;
pub mod error;
pub mod path;

pub use document::{ConfigDocument, GeneratorRule, InstanceSpec, TypelistRow};
pub use error::{Error, Result};
pub use path::{FieldPath, PathSegment};

/// Reserved entity key carrying the requested target type.
pub const INSTANCE_TYPE_KEY: &str = "_instanceType";
/// Reserved entity key carrying the instance spec name.
pub const INSTANCE_NAME_KEY: &str = "_instanceName";
