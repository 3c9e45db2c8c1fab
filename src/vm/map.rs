use gc::{Finalize, Trace};
use std::collections::HashMap;

use super::value::Value;
use super::ExecutionError;
use crate::helpers::ImmutableString;

/// An insertion-ordered hash map keyed by the canonical string encoding of
/// its keys: `"s"` for strings, `name:` for keywords, bare text for symbols.
#[derive(Debug, Clone, Default)]
pub struct Map {
    entries: Vec<(ImmutableString, Value)>,
    index: HashMap<ImmutableString, usize>,
}

impl Finalize for Map {}
unsafe impl Trace for Map {
    custom_trace!(this, {
        for &(_, ref v) in this.entries.iter() {
            mark(v);
        }
    });
}

impl PartialEq for Map {
    fn eq(&self, other: &Map) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|&(ref k, ref v)| other.get(k).map_or(false, |w| *v == *w))
    }
}

impl Map {
    pub fn new() -> Map {
        Map::default()
    }

    /// Builds a map from alternating keys and values. Later keys win.
    pub fn from_pairs(items: &[Value], name: &str) -> Result<Map, ExecutionError> {
        check!(items.len() % 2 == 0, ExecutionError::BadArgc(name.to_string()));
        let mut map = Map::new();
        for pair in items.chunks(2) {
            map.insert(map_key(&pair[0], name)?, pair[1].clone());
        }
        Ok(map)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn insert(&mut self, key: ImmutableString, value: Value) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn remove(&mut self, key: &str) {
        if let Some(i) = self.index.remove(key) {
            self.entries.remove(i);
            for slot in self.index.values_mut() {
                if *slot > i {
                    *slot -= 1;
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ImmutableString, &Value)> {
        self.entries.iter().map(|&(ref k, ref v)| (k, v))
    }

    /// Keys decoded back to values
    pub fn keys(&self) -> Vec<Value> {
        self.entries.iter().map(|&(ref k, _)| key_value(k)).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.iter().map(|&(_, ref v)| v.clone()).collect()
    }
}

/// Canonical encoding of a value used as a map key
pub fn map_key(key: &Value, name: &str) -> Result<ImmutableString, ExecutionError> {
    match *key {
        Value::String(ref s) => Ok(format!("\"{}\"", s).into()),
        Value::Keyword(ref k) => Ok(format!("{}:", k).into()),
        Value::Symbol(ref s) => Ok(s.clone()),
        _ => Err(ExecutionError::BadArgType(
            name.to_string(),
            "string, keyword or symbol",
        )),
    }
}

/// Inverse of `map_key`. A symbol whose name ends in `:` shares its key with
/// the keyword of the same bare name and decodes as that keyword.
pub fn key_value(key: &str) -> Value {
    if key.len() >= 2 && key.starts_with('"') && key.ends_with('"') {
        Value::string(&key[1..key.len() - 1])
    } else if key.ends_with(':') {
        Value::keyword(key)
    } else {
        Value::symbol(key)
    }
}
