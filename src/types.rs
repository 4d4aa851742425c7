//! Core data types for fieldlog-rs
//!
//! This module contains the fundamental data structures passed between
//! pipeline steps and written to output files.
//!
//! # Main Types
//!
//! - [`VariableType`] - Enum of supported variable types (u8, u16, f32, etc.)
//! - [`RawValue`] - One undecoded field as acquired from a source
//! - [`Value`] - A decoded, dynamically typed value
//! - [`Record`] - An insertion-ordered mapping from field name to [`Value`]
//!
//! # Ordering
//!
//! Records preserve insertion order: iterating a record visits fields in the
//! order they were produced, which is also the CSV column order. Re-inserting
//! an existing key replaces the value but keeps the key's original position.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// An insertion-ordered mapping from field name to value
pub type Record = IndexMap<String, Value>;

/// Represents the type of a decoded variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VariableType {
    /// 8-bit unsigned integer
    U8,
    /// 16-bit unsigned integer
    U16,
    /// 32-bit unsigned integer
    #[default]
    U32,
    /// 64-bit unsigned integer
    U64,
    /// 8-bit signed integer
    I8,
    /// 16-bit signed integer
    I16,
    /// 32-bit signed integer
    I32,
    /// 64-bit signed integer
    I64,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
    /// Boolean value
    Bool,
    /// Raw bytes (kept undecoded)
    Raw(usize),
}

impl VariableType {
    /// Returns the size in bytes of this variable type
    pub fn size_bytes(&self) -> usize {
        match self {
            VariableType::U8 | VariableType::I8 | VariableType::Bool => 1,
            VariableType::U16 | VariableType::I16 => 2,
            VariableType::U32 | VariableType::I32 | VariableType::F32 => 4,
            VariableType::U64 | VariableType::I64 | VariableType::F64 => 8,
            VariableType::Raw(size) => *size,
        }
    }

    /// Look up a builtin type by its configuration name
    pub fn from_name(name: &str) -> Option<VariableType> {
        Some(match name {
            "u8" => VariableType::U8,
            "u16" => VariableType::U16,
            "u32" => VariableType::U32,
            "u64" => VariableType::U64,
            "i8" => VariableType::I8,
            "i16" => VariableType::I16,
            "i32" => VariableType::I32,
            "i64" => VariableType::I64,
            "f32" => VariableType::F32,
            "f64" => VariableType::F64,
            "bool" => VariableType::Bool,
            _ => return None,
        })
    }

    /// Decode little-endian bytes into a typed [`Value`]
    ///
    /// Returns `None` when fewer bytes are supplied than the type requires.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Option<Value> {
        if bytes.len() < self.size_bytes() {
            return None;
        }

        Some(match self {
            VariableType::U8 => Value::UInt(bytes[0] as u64),
            VariableType::I8 => Value::Int(bytes[0] as i8 as i64),
            VariableType::Bool => Value::Bool(bytes[0] != 0),
            VariableType::U16 => Value::UInt(u16::from_le_bytes([bytes[0], bytes[1]]) as u64),
            VariableType::I16 => Value::Int(i16::from_le_bytes([bytes[0], bytes[1]]) as i64),
            VariableType::U32 => {
                Value::UInt(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u64)
            }
            VariableType::I32 => {
                Value::Int(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64)
            }
            VariableType::F32 => {
                Value::Float(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64)
            }
            VariableType::U64 => Value::UInt(u64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])),
            VariableType::I64 => Value::Int(i64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])),
            VariableType::F64 => Value::Float(f64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])),
            VariableType::Raw(size) => Value::Str(
                bytes[..*size]
                    .iter()
                    .map(|b| format!("{:02x}", b))
                    .collect::<String>(),
            ),
        })
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableType::U8 => write!(f, "u8"),
            VariableType::U16 => write!(f, "u16"),
            VariableType::U32 => write!(f, "u32"),
            VariableType::U64 => write!(f, "u64"),
            VariableType::I8 => write!(f, "i8"),
            VariableType::I16 => write!(f, "i16"),
            VariableType::I32 => write!(f, "i32"),
            VariableType::I64 => write!(f, "i64"),
            VariableType::F32 => write!(f, "f32"),
            VariableType::F64 => write!(f, "f64"),
            VariableType::Bool => write!(f, "bool"),
            VariableType::Raw(size) => write!(f, "{} bytes", size),
        }
    }
}

/// One raw field as acquired from a source, before decoding
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Undecoded bytes, e.g. a register window or a serial frame slice
    Bytes(Vec<u8>),
    /// A signed integer already extracted by the transport layer
    Int(i64),
    /// An unsigned integer already extracted by the transport layer
    UInt(u64),
    /// A float already extracted by the transport layer
    Float(f64),
    /// A string field
    Str(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Bytes(b) => write!(f, "{} bytes", b.len()),
            RawValue::Int(v) => write!(f, "{}", v),
            RawValue::UInt(v) => write!(f, "{}", v),
            RawValue::Float(v) => write!(f, "{}", v),
            RawValue::Str(v) => write!(f, "{}", v),
        }
    }
}

/// A decoded, dynamically typed value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing or not-available value
    Null,
    /// Boolean value
    Bool(bool),
    /// Signed integer value
    Int(i64),
    /// Unsigned integer value
    UInt(u64),
    /// Floating point value
    Float(f64),
    /// String value
    Str(String),
    /// Nested record
    Map(Record),
}

impl Value {
    /// Return the inner record for map values
    pub fn as_map(&self) -> Option<&Record> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Consume the value, returning the inner record for map values
    pub fn into_map(self) -> Option<Record> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// True for map values
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Short name of the value's shape, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Map(_) => "map",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (key, value)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::UInt(v) => serializer.serialize_u64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Str(v) => serializer.serialize_str(v),
            Value::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (key, value) in m {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Map(v)
    }
}
