//! Persistent key/value properties
//!
//! Both the player and each level carry a property table that survives
//! save/restore. Values are loosely typed; typed getters report mismatches.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single stored property value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    Str(String),
}

impl PropValue {
    fn type_name(&self) -> &'static str {
        match self {
            PropValue::Bool(_) => "bool",
            PropValue::Int(_) => "int",
            PropValue::Long(_) => "long",
            PropValue::Str(_) => "string",
        }
    }
}

/// Property lookup errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropsError {
    #[error("property '{0}' does not exist")]
    Missing(String),

    #[error("property '{key}' is a {found}, not a {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Key/value property table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Props {
    values: HashMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: PropValue) {
        self.values.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i32) {
        self.set(key, PropValue::Int(value));
    }

    pub fn set_long(&mut self, key: impl Into<String>, value: i64) {
        self.set(key, PropValue::Long(value));
    }

    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.set(key, PropValue::Bool(value));
    }

    pub fn get_int(&self, key: &str) -> Result<i32, PropsError> {
        match self.lookup(key)? {
            PropValue::Int(v) => Ok(*v),
            other => Err(wrong_type(key, "int", other)),
        }
    }

    pub fn get_long(&self, key: &str) -> Result<i64, PropsError> {
        match self.lookup(key)? {
            PropValue::Long(v) => Ok(*v),
            PropValue::Int(v) => Ok(i64::from(*v)),
            other => Err(wrong_type(key, "long", other)),
        }
    }

    /// Marker-style truthiness: set and not explicitly false or empty
    pub fn is_set(&self, key: &str) -> bool {
        match self.values.get(key) {
            None | Some(PropValue::Bool(false)) => false,
            Some(PropValue::Str(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    fn lookup(&self, key: &str) -> Result<&PropValue, PropsError> {
        self.values
            .get(key)
            .ok_or_else(|| PropsError::Missing(key.to_string()))
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &PropValue) -> PropsError {
    PropsError::WrongType {
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}
