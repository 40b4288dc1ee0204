//! Script-driven fake entity generation engine for entigen.
//!
//! This crate turns a tabular rule document (instance specs, per-field
//! generator scripts, typelists) into ordered lists of nested entities.
//! Scripts run on an embedded evaluator against a named-variable binding
//! that exposes document roots, the entity under construction (`_this`) and
//! every entity generated so far in the pass (`_<instanceName>`).

pub mod dsl;
pub mod engine;
pub mod errors;
pub mod model;
pub mod output;
pub mod script;
pub mod translit;

pub use engine::GenerationEngine;
pub use errors::GenerationError;
pub use model::{DEFAULT_COUNT, GenerateOptions, RunSummary};
pub use script::{Binding, CompiledScript, ScriptCache, ScriptEngine};
