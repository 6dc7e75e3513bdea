//! Bind values and ordered input mappings.
//!
//! [`Scalar`] is the only kind of value the fragment builders accept: it is
//! untyped on the Rust side and converts to the column type the server asks
//! for when bound. [`FieldMap`] is the ordered `name -> Scalar` mapping that
//! callers hand to the builders (usually straight from a JSON body).

use bytes::BytesMut;
use rust_decimal::Decimal;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

use crate::error::{JoblyError, JoblyResult};

/// A single untyped bind value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Convert a JSON value. Arrays and objects are not scalars and yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Null => Some(Scalar::Null),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Scalar::Int)
                .or_else(|| n.as_f64().map(Scalar::Float)),
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Falsy values are `null`, `false`, `0`, `0.0`, NaN and `""`.
    ///
    /// Filters treat a falsy value exactly like a missing key.
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Null => false,
            Scalar::Bool(b) => *b,
            Scalar::Int(i) => *i != 0,
            Scalar::Float(f) => *f != 0.0 && !f.is_nan(),
            Scalar::Text(s) => !s.is_empty(),
        }
    }

    /// Numeric view used for range checks. Numeric strings count.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Null | Scalar::Bool(_) => None,
        }
    }

    /// Text view used by pattern transforms.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::Text(_) => "text",
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v.into())
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map_or(Scalar::Null, Into::into)
    }
}

/// Largest integer magnitude FLOAT4 holds exactly.
const F32_EXACT: u64 = 1 << 24;
/// Largest integer magnitude FLOAT8 holds exactly.
const F64_EXACT: u64 = 1 << 53;

impl ToSql for Scalar {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Scalar::Null => Ok(IsNull::Yes),
            Scalar::Bool(b) if *ty == Type::BOOL => b.to_sql(ty, out),
            Scalar::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                Type::INT8 => i.to_sql(ty, out),
                Type::FLOAT4 if i.unsigned_abs() <= F32_EXACT => (*i as f32).to_sql(ty, out),
                Type::FLOAT8 if i.unsigned_abs() <= F64_EXACT => (*i as f64).to_sql(ty, out),
                Type::FLOAT4 | Type::FLOAT8 => Err(out_of_range(self, ty)),
                Type::NUMERIC => Decimal::from(*i).to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Scalar::Float(f) => match *ty {
                Type::FLOAT4 => {
                    let narrowed = *f as f32;
                    if narrowed.is_infinite() && f.is_finite() {
                        return Err(out_of_range(self, ty));
                    }
                    narrowed.to_sql(ty, out)
                }
                Type::FLOAT8 => f.to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*f)?.to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Scalar::Text(s) if is_numeric(ty) => {
                parse_numeric(s, ty)
                    .ok_or_else(|| mismatch(self, ty))?
                    .to_sql(ty, out)
            }
            Scalar::Text(s) if <&str as ToSql>::accepts(ty) => s.as_str().to_sql(ty, out),
            _ => Err(mismatch(self, ty)),
        }
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::BOOL || is_numeric(ty) || <&str as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

fn is_numeric(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::INT2 | Type::INT4 | Type::INT8 | Type::FLOAT4 | Type::FLOAT8 | Type::NUMERIC
    )
}

/// Read a numeric string sent for a numeric column, the way the server
/// would coerce an untyped literal. `None` if it is not a number.
fn parse_numeric(s: &str, ty: &Type) -> Option<NumericText> {
    let s = s.trim();
    if *ty == Type::NUMERIC {
        return Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .ok()
            .map(NumericText::Decimal);
    }
    match s.parse::<i64>() {
        Ok(i) => Some(NumericText::Scalar(Scalar::Int(i))),
        Err(_) => s.parse::<f64>().ok().map(|f| NumericText::Scalar(Scalar::Float(f))),
    }
}

/// A numeric string after parsing, ready to bind.
#[derive(Debug)]
enum NumericText {
    Decimal(Decimal),
    Scalar(Scalar),
}

impl NumericText {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            NumericText::Decimal(d) => d.to_sql(ty, out),
            NumericText::Scalar(v) => v.to_sql(ty, out),
        }
    }
}

fn mismatch(value: &Scalar, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("cannot bind {} value to column of type {}", value.kind(), ty).into()
}

fn out_of_range(value: &Scalar, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("{} value out of range for column of type {}", value.kind(), ty).into()
}

/// An ordered mapping of field names to [`Scalar`] values.
///
/// Keys are unique; iteration order is insertion order. Inserting an existing
/// key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, Scalar)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning the previous value for the key if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build from a JSON object, keeping key order.
    ///
    /// Entries holding arrays or objects are skipped: they can never be a
    /// column value or a recognized filter.
    pub fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        object
            .iter()
            .filter_map(|(k, v)| Scalar::from_json(v).map(|s| (k.clone(), s)))
            .collect()
    }

    /// Build from any JSON value; only objects are accepted.
    pub fn from_json(value: &serde_json::Value) -> JoblyResult<Self> {
        value
            .as_object()
            .map(Self::from_json_object)
            .ok_or_else(|| JoblyError::invalid_input("Expected a JSON object"))
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<Scalar>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self::from_json_object(&object))
    }
}
