use std::collections::HashMap;
use std::rc::Rc;

use rhai::{AST, Dynamic, Engine, Scope};
use thiserror::Error;

/// A compiled script, shared between the cache and call sites.
pub type CompiledScript = Rc<AST>;

/// Failure inside the embedded evaluator, without engine context.
///
/// The generation engine wraps these with the offending instance name,
/// field and script source before surfacing them.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("compile error: {0}")]
    Compile(String),
    #[error("{0}")]
    Eval(String),
}

/// Named-variable snapshot visible to one script evaluation.
///
/// Entries resolve back-to-front: a later entry shadows an earlier one with
/// the same name. The engine assembles bindings as document roots first,
/// then `_this`, then one `_<instanceName>` entry per generated entity.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    entries: Vec<(String, Dynamic)>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Dynamic) {
        self.entries.push((name.into(), value));
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, Dynamic)>) {
        self.entries.extend(entries);
    }

    fn scope(&self) -> Scope<'static> {
        let mut scope = Scope::new();
        for (name, value) in &self.entries {
            scope.push_dynamic(name.clone(), value.clone());
        }
        scope
    }
}

/// Thin wrapper over the embedded expression evaluator.
///
/// Binding construction lives outside this type so the evaluator stays
/// swappable; only compilation and evaluation go through here.
pub struct ScriptEngine {
    engine: Engine,
}

impl ScriptEngine {
    /// An engine without the DSL runtime library installed.
    pub fn new() -> Self {
        Self::with_engine(Engine::new())
    }

    /// Wrap a pre-configured evaluator (DSL functions already registered).
    pub fn with_engine(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn compile(&self, source: &str) -> Result<CompiledScript, ScriptError> {
        self.engine
            .compile(source)
            .map(Rc::new)
            .map_err(|err| ScriptError::Compile(err.to_string()))
    }

    pub fn run(&self, script: &CompiledScript, binding: &Binding) -> Result<Dynamic, ScriptError> {
        let mut scope = binding.scope();
        self.engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, script.as_ref())
            .map_err(|err| ScriptError::Eval(err.to_string()))
    }

    /// Compile-and-run convenience for one-off evaluations (conditions).
    pub fn evaluate(&self, source: &str, binding: &Binding) -> Result<Dynamic, ScriptError> {
        let compiled = self.compile(source)?;
        self.run(&compiled, binding)
    }
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Memoizes compiled scripts by exact source text.
///
/// No normalization: two textually different but semantically identical
/// scripts compile separately. Never evicts; a session processes a bounded,
/// small configuration.
#[derive(Debug, Default)]
pub struct ScriptCache {
    scripts: HashMap<String, CompiledScript>,
}

impl ScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled script for `source`, compiling at most once per
    /// distinct source string for the lifetime of the session.
    pub fn get(
        &mut self,
        engine: &ScriptEngine,
        source: &str,
    ) -> Result<CompiledScript, ScriptError> {
        if let Some(script) = self.scripts.get(source) {
            return Ok(Rc::clone(script));
        }
        let compiled = engine.compile(source)?;
        self.scripts.insert(source.to_string(), Rc::clone(&compiled));
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}
