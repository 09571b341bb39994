//! `Values`: an ordered list of [`Value`]s, the JSON array counterpart.

use serde::Serialize;

use crate::error::Result;
use crate::value::Value;

pub(crate) static EMPTY_VALUES: Values = Values::new();

/// An ordered list of Values. No uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Values {
    vals: Vec<Value>,
}

impl Values {
    pub const fn new() -> Self {
        Values { vals: Vec::new() }
    }

    /// Converts every element with [`Value::from_native`], failing on the first
    /// element that cannot be converted.
    pub fn from_native<I, T>(items: I) -> Result<Values>
    where
        I: IntoIterator<Item = T>,
        T: Serialize,
    {
        items
            .into_iter()
            .map(|item| Value::from_native(&item))
            .collect::<Result<Vec<_>>>()
            .map(Values::from)
    }

    pub fn push(&mut self, value: impl Into<Value>) -> &mut Self {
        self.vals.push(value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    /// The element at `index`, or `Null` when out of range.
    pub fn get(&self, index: usize) -> &Value {
        Value::or_null(self.vals.get(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.vals.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.vals
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.vals
    }

    /// Converts each element with [`Value::as_interface`].
    pub fn to_interface(&self) -> Vec<serde_json::Value> {
        self.vals.iter().map(Value::as_interface).collect()
    }
}

impl From<Vec<Value>> for Values {
    fn from(vals: Vec<Value>) -> Self {
        Values { vals }
    }
}

impl FromIterator<Value> for Values {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Values {
            vals: iter.into_iter().collect(),
        }
    }
}

impl Extend<Value> for Values {
    fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        self.vals.extend(iter);
    }
}

impl IntoIterator for Values {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.vals.into_iter()
    }
}

impl<'a> IntoIterator for &'a Values {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.vals.iter()
    }
}
