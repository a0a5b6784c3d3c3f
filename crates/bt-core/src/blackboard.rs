use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::BlackboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Text => "text",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value stored on the blackboard.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "kind", content = "value", rename_all = "snake_case")
)]
pub enum BbValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl BbValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            BbValue::Bool(_) => ValueKind::Bool,
            BbValue::Int(_) => ValueKind::Int,
            BbValue::Float(_) => ValueKind::Float,
            BbValue::Text(_) => ValueKind::Text,
        }
    }
}

impl From<bool> for BbValue {
    fn from(value: bool) -> Self {
        BbValue::Bool(value)
    }
}

impl From<i32> for BbValue {
    fn from(value: i32) -> Self {
        BbValue::Int(value as i64)
    }
}

impl From<i64> for BbValue {
    fn from(value: i64) -> Self {
        BbValue::Int(value)
    }
}

impl From<f32> for BbValue {
    fn from(value: f32) -> Self {
        BbValue::Float(value as f64)
    }
}

impl From<f64> for BbValue {
    fn from(value: f64) -> Self {
        BbValue::Float(value)
    }
}

impl From<String> for BbValue {
    fn from(value: String) -> Self {
        BbValue::Text(value)
    }
}

impl From<&str> for BbValue {
    fn from(value: &str) -> Self {
        BbValue::Text(value.to_string())
    }
}

/// A Rust type that can be read back from a [`BbValue`].
///
/// `Default` supplies the value returned for keys that were never written.
pub trait BbType: Default + Into<BbValue> + Sized {
    const KIND: ValueKind;

    fn from_value(key: &str, value: &BbValue) -> Result<Self, BlackboardError>;
}

fn mismatch<T: BbType>(key: &str, value: &BbValue) -> BlackboardError {
    BlackboardError::TypeMismatch {
        key: key.to_string(),
        expected: T::KIND,
        found: value.kind(),
    }
}

macro_rules! impl_bb_type {
    ($ty:ty, $kind:ident, $v:ident => $read:expr) => {
        impl BbType for $ty {
            const KIND: ValueKind = ValueKind::$kind;

            fn from_value(key: &str, value: &BbValue) -> Result<Self, BlackboardError> {
                match value {
                    BbValue::$kind($v) => Ok($read),
                    other => Err(mismatch::<Self>(key, other)),
                }
            }
        }
    };
}

impl_bb_type!(bool, Bool, v => *v);
impl_bb_type!(i64, Int, v => *v);
impl_bb_type!(f64, Float, v => *v);
impl_bb_type!(f32, Float, v => *v as f32);
impl_bb_type!(String, Text, v => v.clone());

impl BbType for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(key: &str, value: &BbValue) -> Result<Self, BlackboardError> {
        match value {
            BbValue::Int(v) => i32::try_from(*v).map_err(|_| BlackboardError::OutOfRange {
                key: key.to_string(),
                value: *v,
                target: "i32",
            }),
            other => Err(mismatch::<Self>(key, other)),
        }
    }
}

/// A blackboard key that carries its value type.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

/// Keyed data shared by every node of one tree instance.
///
/// Reads are soft: a key that was never written reads as the type's default. A key
/// holding a value of another kind is a [`BlackboardError::TypeMismatch`].
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Blackboard {
    values: BTreeMap<String, BbValue>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }

    /// Insert a new key; an existing key is left untouched and reported as
    /// [`BlackboardError::DuplicateKey`].
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<BbValue>,
    ) -> Result<(), BlackboardError> {
        let key = checked_key(key.into())?;
        match self.values.entry(key) {
            Entry::Occupied(entry) => Err(BlackboardError::DuplicateKey(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(value.into());
                Ok(())
            }
        }
    }

    /// Insert or overwrite a key, returning the previous value.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<BbValue>,
    ) -> Result<Option<BbValue>, BlackboardError> {
        let key = checked_key(key.into())?;
        Ok(self.values.insert(key, value.into()))
    }

    pub fn get<T: BbType>(&self, key: &str) -> Result<T, BlackboardError> {
        Ok(self.try_get(key)?.unwrap_or_default())
    }

    /// Like [`Blackboard::get`], but distinguishes a missing key from a default value.
    pub fn try_get<T: BbType>(&self, key: &str) -> Result<Option<T>, BlackboardError> {
        self.values
            .get(key)
            .map(|value| T::from_value(key, value))
            .transpose()
    }

    pub fn value(&self, key: &str) -> Option<&BbValue> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<BbValue> {
        self.values.remove(key)
    }

    pub fn read<T: BbType>(&self, key: BbKey<T>) -> Result<T, BlackboardError> {
        self.get(key.name)
    }

    pub fn write<T: BbType>(
        &mut self,
        key: BbKey<T>,
        value: T,
    ) -> Result<Option<BbValue>, BlackboardError> {
        self.set(key.name, value)
    }
}

fn checked_key(key: String) -> Result<String, BlackboardError> {
    if key.is_empty() {
        return Err(BlackboardError::EmptyKey);
    }
    Ok(key)
}
