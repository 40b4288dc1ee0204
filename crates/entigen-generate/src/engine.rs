use std::rc::Rc;

use chrono::Local;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rhai::Dynamic;
use serde_json::{Map as JsonMap, Value};
use tracing::{info, trace, warn};

use entigen_core::{
    ConfigDocument, FieldPath, GeneratorRule, INSTANCE_NAME_KEY, INSTANCE_TYPE_KEY, InstanceSpec,
};

use crate::dsl::{self, DslState};
use crate::errors::GenerationError;
use crate::model::{DEFAULT_COUNT, GenerateOptions, RunSummary};
use crate::script::{Binding, ScriptCache, ScriptEngine, ScriptError};

/// One generation session over a configuration document.
///
/// The session owns the script cache and the DSL runtime state (RNG, clock,
/// lookup tables); both live exactly as long as the session. Evaluation is
/// strictly sequential, one script at a time.
pub struct GenerationEngine {
    document: ConfigDocument,
    specs: Vec<InstanceSpec>,
    rules: Vec<GeneratorRule>,
    script: ScriptEngine,
    cache: ScriptCache,
    roots: Vec<(String, Dynamic)>,
    summary: RunSummary,
}

impl GenerationEngine {
    pub fn new(
        document: ConfigDocument,
        options: GenerateOptions,
    ) -> Result<Self, GenerationError> {
        let seed = options.seed.unwrap_or_else(rand::random);
        let today = options.today.unwrap_or_else(|| Local::now().date_naive());
        let rng = ChaCha8Rng::seed_from_u64(seed);

        let state = Rc::new(DslState::from_document(&document, today, rng)?);
        let mut engine = rhai::Engine::new();
        dsl::install(&mut engine, state);

        let specs = document.instance_specs()?;
        let rules = document.generator_rules()?;
        let roots = root_bindings(&document)?;

        info!(
            seed,
            today = %today,
            specs = specs.len(),
            rules = rules.len(),
            "generation session ready"
        );

        Ok(Self {
            document,
            specs,
            rules,
            script: ScriptEngine::with_engine(engine),
            cache: ScriptCache::new(),
            roots,
            summary: RunSummary::default(),
        })
    }

    /// One generation pass for `target_type`.
    ///
    /// Specs are considered in declared order; each spec's condition is
    /// evaluated exactly once per pass, with every entity generated so far
    /// in this pass visible as `_<instanceName>`. Duplicate spec names are
    /// undefined behavior: the later binding happens to shadow the earlier
    /// one, but that is an artifact of scope assembly, not a guarantee.
    pub fn generate(&mut self, target_type: &str) -> Result<Vec<Value>, GenerationError> {
        let specs: Vec<InstanceSpec> = self
            .specs
            .iter()
            .filter(|spec| spec.type_name == target_type)
            .cloned()
            .collect();

        let mut results = Vec::new();
        for spec in &specs {
            let names = name_bindings(&results)?;
            if !self.evaluate_condition(spec, &names)? {
                info!(target_type, instance = %spec.name, "skipped");
                self.summary.specs_skipped += 1;
                continue;
            }

            info!(target_type, instance = %spec.name, "generating");
            let mut entity = blank_instance(target_type, &spec.name);
            self.populate(&mut entity, spec, target_type, &names)?;
            results.push(entity);
        }

        self.summary.entities_generated += results.len() as u64;
        Ok(results)
    }

    /// Run `passes` consecutive generation passes, concatenating results.
    ///
    /// Cross-entity visibility (`_<name>`) is scoped to a single pass; each
    /// pass starts from an empty result list.
    pub fn run_passes(
        &mut self,
        target_type: &str,
        passes: u64,
    ) -> Result<Vec<Value>, GenerationError> {
        let mut all = Vec::new();
        for pass in 0..passes {
            info!(pass, target_type, "pass started");
            let mut batch = self.generate(target_type)?;
            info!(pass, entities = batch.len(), "pass finished");
            all.append(&mut batch);
            self.summary.passes += 1;
        }
        Ok(all)
    }

    /// The document's requested pass count, falling back to
    /// [`DEFAULT_COUNT`] with a warning when missing or malformed.
    pub fn requested_count(&self) -> u64 {
        match self.document.value("numberToGenerate") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(
                    raw = %raw,
                    default = DEFAULT_COUNT,
                    "malformed numberToGenerate, using default"
                );
                DEFAULT_COUNT
            }),
            None => {
                warn!(
                    default = DEFAULT_COUNT,
                    "numberToGenerate missing, using default"
                );
                DEFAULT_COUNT
            }
        }
    }

    pub fn target_type(&self) -> Option<String> {
        self.document.value("targetType")
    }

    pub fn field_order(&self) -> Vec<String> {
        self.document.field_order()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            scripts_compiled: self.cache.len() as u64,
            ..self.summary.clone()
        }
    }

    fn evaluate_condition(
        &mut self,
        spec: &InstanceSpec,
        names: &[(String, Dynamic)],
    ) -> Result<bool, GenerationError> {
        // Conditions are one-off evaluations against the not-yet-created
        // candidate, so _this is unset here.
        let mut binding = Binding::new();
        binding.extend(self.roots.iter().cloned());
        binding.set("_this", Dynamic::UNIT);
        binding.extend(names.iter().cloned());

        self.summary.conditions_evaluated += 1;
        let outcome = self
            .script
            .evaluate(&spec.condition, &binding)
            .map_err(|err| script_failure(&spec.name, "<condition>", &spec.condition, err))?;

        outcome
            .as_bool()
            .map_err(|found| GenerationError::NonBooleanCondition {
                instance: spec.name.clone(),
                script: spec.condition.clone(),
                found: found.to_string(),
            })
    }

    fn populate(
        &mut self,
        entity: &mut Value,
        spec: &InstanceSpec,
        target_type: &str,
        names: &[(String, Dynamic)],
    ) -> Result<(), GenerationError> {
        // Rules run strictly in declared order. A rule may read fields the
        // entity does not yet have; ordering them correctly is the
        // configuration author's responsibility, not inferred here.
        for index in 0..self.rules.len() {
            if self.rules[index].target_type != target_type {
                continue;
            }
            let Some(script_text) = self.rules[index].logic.get(&spec.name) else {
                continue; // no logic for this instance: intentional no-op
            };
            let script_text = script_text.clone();
            let target_field = self.rules[index].target_field.clone();
            let location = target_field.as_deref().unwrap_or("<no field>").to_string();
            trace!(field = %location, script = %script_text, "running generator");

            let compiled = self
                .cache
                .get(&self.script, &script_text)
                .map_err(|err| script_failure(&spec.name, &location, &script_text, err))?;

            let mut binding = Binding::new();
            binding.extend(self.roots.iter().cloned());
            binding.set("_this", to_binding_value(entity)?);
            binding.extend(names.iter().cloned());

            let result = self
                .script
                .run(&compiled, &binding)
                .map_err(|err| script_failure(&spec.name, &location, &script_text, err))?;

            if let Some(field) = &target_field {
                let value = rhai::serde::from_dynamic::<Value>(&result).map_err(|err| {
                    script_failure(&spec.name, &location, &script_text, ScriptError::Eval(err.to_string()))
                })?;
                trace!(field = %field, value = %value, "set");
                FieldPath::parse(field)?.set(entity, value)?;
            }
        }

        Ok(())
    }
}

fn blank_instance(target_type: &str, instance_name: &str) -> Value {
    let mut entity = JsonMap::new();
    entity.insert(
        INSTANCE_TYPE_KEY.to_string(),
        Value::String(target_type.to_string()),
    );
    entity.insert(
        INSTANCE_NAME_KEY.to_string(),
        Value::String(instance_name.to_string()),
    );
    Value::Object(entity)
}

fn root_bindings(document: &ConfigDocument) -> Result<Vec<(String, Dynamic)>, GenerationError> {
    document
        .root()
        .iter()
        .map(|(key, value)| Ok((key.clone(), to_binding_value(value)?)))
        .collect()
}

fn name_bindings(results: &[Value]) -> Result<Vec<(String, Dynamic)>, GenerationError> {
    results
        .iter()
        .map(|entity| {
            let name = entity
                .get(INSTANCE_NAME_KEY)
                .and_then(Value::as_str)
                .unwrap_or_default();
            Ok((format!("_{name}"), to_binding_value(entity)?))
        })
        .collect()
}

fn to_binding_value(value: &Value) -> Result<Dynamic, GenerationError> {
    rhai::serde::to_dynamic(value).map_err(|err| GenerationError::Binding(err.to_string()))
}

fn script_failure(
    instance: &str,
    location: &str,
    script: &str,
    err: ScriptError,
) -> GenerationError {
    GenerationError::Script {
        instance: instance.to_string(),
        location: location.to_string(),
        script: script.to_string(),
        message: err.to_string(),
    }
}
