//! Runtime helper library exposed to every script.
//!
//! Helpers are registered on the evaluator by name, so script text calls
//! them directly (`randomFromTypelist("GENDER")`). All randomness flows
//! through one session RNG, which keeps seeded runs reproducible.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Duration, NaiveDate};
use rand::{Rng, RngCore};
use rand_chacha::ChaCha8Rng;
use rhai::{Array, Dynamic, Engine, EvalAltResult, Map, Position};
use serde_json::Value;

use entigen_core::ConfigDocument;

use crate::errors::GenerationError;
use crate::translit;

/// Shared state behind the DSL helpers: clock, RNG and the lookup tables
/// read from the configuration document.
pub struct DslState {
    today: NaiveDate,
    rng: RefCell<ChaCha8Rng>,
    typelists: Vec<TypelistEntry>,
    email_domains: Vec<String>,
    addresses: Vec<String>,
    complex_names: Vec<String>,
}

struct TypelistEntry {
    type_name: String,
    key: String,
    row: Map,
}

impl DslState {
    pub fn from_document(
        document: &ConfigDocument,
        today: NaiveDate,
        rng: ChaCha8Rng,
    ) -> Result<Self, GenerationError> {
        let mut typelists = Vec::new();
        for entry in document.typelist_rows()? {
            let mut row = Map::new();
            row.insert("type".into(), entry.type_name.clone().into());
            row.insert("key".into(), entry.key.clone().into());
            row.insert("value".into(), to_dynamic(&entry.value)?);
            typelists.push(TypelistEntry {
                type_name: entry.type_name,
                key: entry.key,
                row,
            });
        }

        Ok(Self {
            today,
            rng: RefCell::new(rng),
            typelists,
            email_domains: string_values(document, "emailDomains"),
            addresses: string_values(document, "addresses"),
            complex_names: string_values(document, "complexNames"),
        })
    }

    fn random_index(&self, len: usize) -> usize {
        self.rng.borrow_mut().random_range(0..len)
    }

    fn uuid(&self) -> String {
        let mut bytes = [0_u8; 16];
        self.rng.borrow_mut().fill_bytes(&mut bytes);
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;
        uuid::Uuid::from_bytes(bytes).to_string()
    }

    fn random_from(&self, list: Array) -> Result<Dynamic, Box<EvalAltResult>> {
        if list.is_empty() {
            return Err(runtime_error("randomFrom called with an empty list"));
        }
        let index = self.random_index(list.len());
        Ok(list[index].clone())
    }

    fn random_int_between(&self, from: i64, to: i64) -> i64 {
        // from > to returns from unchanged, matching the source rule set.
        if from >= to {
            return from;
        }
        self.rng.borrow_mut().random_range(from..to)
    }

    fn random_boolean(&self, ratio: f64) -> bool {
        self.rng.borrow_mut().random_bool(ratio.clamp(0.0, 1.0))
    }

    fn random_digit(&self, count: i64) -> String {
        let mut rng = self.rng.borrow_mut();
        (0..count.max(0))
            .map(|_| char::from(b'0' + rng.random_range(0..10) as u8))
            .collect()
    }

    fn typelist(&self, type_name: &str) -> Array {
        self.typelists
            .iter()
            .filter(|entry| entry.type_name == type_name)
            .map(|entry| Dynamic::from(entry.row.clone()))
            .collect()
    }

    fn typelist_as_map(&self, type_name: &str) -> Map {
        let mut map = Map::new();
        for entry in &self.typelists {
            if entry.type_name == type_name {
                let value = entry.row.get("value").cloned().unwrap_or(Dynamic::UNIT);
                map.insert(entry.key.as_str().into(), value);
            }
        }
        map
    }

    fn typelist_value(&self, type_name: &str, key: &str) -> Dynamic {
        self.typelists
            .iter()
            .find(|entry| entry.type_name == type_name && entry.key == key)
            .and_then(|entry| entry.row.get("value"))
            .map(|value| Dynamic::from(value.to_string()))
            .unwrap_or(Dynamic::UNIT)
    }

    fn random_from_typelist(&self, type_name: &str) -> Result<Dynamic, Box<EvalAltResult>> {
        self.random_from(self.typelist(type_name))
    }

    fn random_from_typelist_not(
        &self,
        type_name: &str,
        exclude_key: &str,
    ) -> Result<Dynamic, Box<EvalAltResult>> {
        let rows: Array = self
            .typelists
            .iter()
            .filter(|entry| entry.type_name == type_name && entry.key != exclude_key)
            .map(|entry| Dynamic::from(entry.row.clone()))
            .collect();
        self.random_from(rows)
    }

    fn date_of_birth(&self, age: i64) -> String {
        // Intentionally not calendar-accurate: age * 365 days, always.
        let date = self.today - Duration::days(age * 365);
        date.format("%Y-%m-%d").to_string()
    }

    fn date_of_birth_between(&self, age_from: i64, age_to: i64) -> String {
        // The offset uses (age_to - age_from), not an age sampled inside the
        // range. A quirk of the source rule set, preserved verbatim.
        let date = self.today - Duration::days((age_to - age_from) * 365);
        date.format("%Y-%m-%d").to_string()
    }

    fn email_from(&self, parts: &[&str]) -> Result<String, Box<EvalAltResult>> {
        if self.email_domains.is_empty() {
            return Err(runtime_error("no emailDomains configured"));
        }
        let domain = &self.email_domains[self.random_index(self.email_domains.len())];
        let email = format!("{}@{}", parts.join("_"), domain);
        Ok(translit::to_latin(&email))
    }

    fn phone(&self, phone_type: &str) -> String {
        let mut rng = self.rng.borrow_mut();
        match phone_type {
            "HOME" => format!(
                "03-{:04}-{:04}",
                rng.random_range(0..10000),
                rng.random_range(0..10000)
            ),
            "MOBILE" => format!(
                "090-{:04}-{:04}",
                rng.random_range(0..10000),
                rng.random_range(0..10000)
            ),
            _ => String::new(),
        }
    }

    fn address(&self) -> Result<Map, Box<EvalAltResult>> {
        if self.addresses.is_empty() {
            return Err(runtime_error("no addresses configured"));
        }
        let base = &self.addresses[self.random_index(self.addresses.len())];

        let mut text = base.clone();
        if !self.complex_names.is_empty() && self.random_boolean(0.5) {
            let complex = &self.complex_names[self.random_index(self.complex_names.len())];
            let unit = self.rng.borrow_mut().random_range(100..1100);
            text = format!("{text} {complex} {unit}");
        }

        let mut rendered = Map::new();
        rendered.insert("latin".into(), translit::to_latin(&text).into());
        rendered.insert("text".into(), text.into());
        Ok(rendered)
    }
}

/// Register every DSL helper on the evaluator.
pub fn install(engine: &mut Engine, state: Rc<DslState>) {
    let s = Rc::clone(&state);
    engine.register_fn("generateUUID", move || s.uuid());

    let s = Rc::clone(&state);
    engine.register_fn("randomFrom", move |list: Array| s.random_from(list));

    let s = Rc::clone(&state);
    engine.register_fn("randomIntBetween", move |from: i64, to: i64| {
        s.random_int_between(from, to)
    });

    let s = Rc::clone(&state);
    engine.register_fn("randomBoolean", move || s.random_boolean(0.5));
    let s = Rc::clone(&state);
    engine.register_fn("randomBoolean", move |ratio: f64| s.random_boolean(ratio));

    let s = Rc::clone(&state);
    engine.register_fn("randomDigit", move |count: i64| s.random_digit(count));

    let s = Rc::clone(&state);
    engine.register_fn("typelist", move |type_name: &str| s.typelist(type_name));

    let s = Rc::clone(&state);
    engine.register_fn("typelistAsMap", move |type_name: &str| {
        s.typelist_as_map(type_name)
    });

    let s = Rc::clone(&state);
    engine.register_fn("typelistValue", move |type_name: &str, key: &str| {
        s.typelist_value(type_name, key)
    });

    let s = Rc::clone(&state);
    engine.register_fn("randomFromTypelist", move |type_name: &str| {
        s.random_from_typelist(type_name)
    });

    let s = Rc::clone(&state);
    engine.register_fn(
        "randomFromTypelistNot",
        move |type_name: &str, exclude_key: &str| s.random_from_typelist_not(type_name, exclude_key),
    );

    let s = Rc::clone(&state);
    engine.register_fn("generateDateOfBirth", move |age: i64| s.date_of_birth(age));

    let s = Rc::clone(&state);
    engine.register_fn(
        "generateDateOfBirthBetween",
        move |age_from: i64, age_to: i64| s.date_of_birth_between(age_from, age_to),
    );

    let s = Rc::clone(&state);
    engine.register_fn("generateEmailFrom", move |a: &str| s.email_from(&[a]));
    let s = Rc::clone(&state);
    engine.register_fn("generateEmailFrom", move |a: &str, b: &str| {
        s.email_from(&[a, b])
    });
    let s = Rc::clone(&state);
    engine.register_fn("generateEmailFrom", move |a: &str, b: &str, c: &str| {
        s.email_from(&[a, b, c])
    });
    let s = Rc::clone(&state);
    engine.register_fn("generateEmailFrom", move |parts: Array| {
        let parts: Vec<String> = parts.iter().map(|part| part.to_string()).collect();
        let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
        s.email_from(&refs)
    });

    let s = Rc::clone(&state);
    engine.register_fn("generatePhone", move |phone_type: &str| s.phone(phone_type));

    let s = Rc::clone(&state);
    engine.register_fn("generateAddress", move || s.address());
}

fn string_values(document: &ConfigDocument, key: &str) -> Vec<String> {
    document
        .list(key)
        .iter()
        .filter_map(|entry| match entry {
            Value::String(text) => Some(text.clone()),
            Value::Object(map) => map
                .get("value")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
        .collect()
}

fn to_dynamic(value: &Value) -> Result<Dynamic, GenerationError> {
    rhai::serde::to_dynamic(value).map_err(|err| GenerationError::Binding(err.to_string()))
}

fn runtime_error(message: impl Into<String>) -> Box<EvalAltResult> {
    Box::new(EvalAltResult::ErrorRuntime(
        Dynamic::from(message.into()),
        Position::NONE,
    ))
}
