//! Boxed wrapper types: single-field carriers that are transparent on the
//! wire.
//!
//! `BoolValue(true)` encodes as `true`, `StringValues(["a"])` as `["a"]`,
//! `StringMap` as a plain JSON object. `BytesValue` uses the `"b64."` string
//! convention, and `Float32Value` / `Float64Value` write non-finite values as
//! `"NaN"`, `"Infinity"` or `"-Infinity"`. `StringsMap` drops entries whose list is empty when encoding.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! boxed_scalar {
    ($($name:ident($(#[$field:meta])* $t:ty);)*) => {$(
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name {
            $(#[$field])*
            pub val: $t,
        }

        impl $name {
            pub fn new(val: $t) -> Self {
                $name { val }
            }
        }

        impl From<$t> for $name {
            fn from(val: $t) -> Self {
                $name { val }
            }
        }
    )*};
}

boxed_scalar! {
    BoolValue(bool);
    Int32Value(i32);
    Int64Value(i64);
    Uint32Value(u32);
    Uint64Value(u64);
    Float32Value(#[serde(with = "crate::float")] f32);
    Float64Value(#[serde(with = "crate::float")] f64);
    StringValue(String);
}

/// Binary carrier, written as a `"b64."` string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BytesValue {
    #[serde(with = "crate::b64")]
    pub val: Vec<u8>,
}

impl BytesValue {
    pub fn new(val: impl Into<Vec<u8>>) -> Self {
        BytesValue { val: val.into() }
    }
}

macro_rules! boxed_list {
    ($($name:ident($t:ty);)*) => {$(
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name {
            pub vals: Vec<$t>,
        }

        impl $name {
            pub fn new(vals: Vec<$t>) -> Self {
                $name { vals }
            }

            pub fn len(&self) -> usize {
                self.vals.len()
            }

            pub fn is_empty(&self) -> bool {
                self.vals.is_empty()
            }
        }

        impl From<Vec<$t>> for $name {
            fn from(vals: Vec<$t>) -> Self {
                $name { vals }
            }
        }
    )*};
}

boxed_list! {
    BoolValues(bool);
    Int32Values(i32);
    Int64Values(i64);
    Uint32Values(u32);
    Uint64Values(u64);
    Float32Values(f32);
    Float64Values(f64);
    StringValues(String);
}

impl StringValues {
    pub fn append<I, S>(&mut self, vals: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vals.extend(vals.into_iter().map(Into::into));
        self
    }

    pub fn contains(&self, element: &str) -> bool {
        self.vals.iter().any(|v| v == element)
    }

    /// A copy without duplicates; the first occurrence of each string wins.
    pub fn unique(&self) -> StringValues {
        let mut seen = std::collections::HashSet::new();
        self.vals
            .iter()
            .filter(|v| seen.insert(v.as_str()))
            .cloned()
            .collect::<Vec<_>>()
            .into()
    }

    /// Whether any element, read as a regular expression, matches `expr`.
    ///
    /// Elements that are not valid patterns never match. An empty `expr`
    /// matches nothing.
    pub fn matched(&self, expr: &str) -> bool {
        !expr.is_empty() && self.patterns_matching(expr).next().is_some()
    }

    /// The elements that, read as regular expressions, match `expr`.
    pub fn matches(&self, expr: &str) -> StringValues {
        if expr.is_empty() {
            return StringValues::default();
        }
        self.patterns_matching(expr)
            .cloned()
            .collect::<Vec<_>>()
            .into()
    }

    fn patterns_matching<'a>(&'a self, expr: &'a str) -> impl Iterator<Item = &'a String> + 'a {
        self.vals.iter().filter(move |pattern| {
            Regex::new(pattern)
                .map(|re| re.is_match(expr))
                .unwrap_or(false)
        })
    }
}

impl<S: Into<String>> FromIterator<S> for StringValues {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        StringValues {
            vals: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// String to string map, transparent on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringMap {
    pub vals: BTreeMap<String, String>,
}

impl StringMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, val: impl Into<String>) -> &mut Self {
        self.vals.insert(key.into(), val.into());
        self
    }

    pub fn get(&self, key: &str) -> &str {
        self.vals.get(key).map_or("", String::as_str)
    }
}

/// String to string-list map. Entries with an empty list are not encoded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringsMap {
    pub vals: BTreeMap<String, StringValues>,
}

impl StringsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, vals: StringValues) -> &mut Self {
        self.vals.insert(key.into(), vals);
        self
    }

    pub fn get(&self, key: &str) -> Option<&StringValues> {
        self.vals.get(key)
    }
}

impl Serialize for StringsMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.vals.iter().filter(|(_, v)| !v.is_empty()))
    }
}

impl<'de> Deserialize<'de> for StringsMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let vals = Option::<BTreeMap<String, StringValues>>::deserialize(deserializer)?;
        Ok(StringsMap {
            vals: vals.unwrap_or_default(),
        })
    }
}
