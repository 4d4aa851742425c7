//! Decoding raw payloads into named typed variables
//!
//! A [`DataDecoder`] is built once from an ordered variable specification and
//! retained for the lifetime of the input step that owns it. Each decode call
//! checks that the raw payload's arity matches the specification, then
//! converts every field to its declared type and applies the configured
//! conversion.
//!
//! Type names in a [`VariableDef`] are resolved against custom registrations
//! first, then the builtin primitive names (`u8` .. `f64`, `bool`), so a
//! deployment can alias e.g. `"adc_count"` to `u16` without touching the
//! field definitions.

use crate::error::{FieldLogError, Result};
use crate::types::{RawValue, Record, Value, VariableType};
use std::collections::HashMap;

/// Signature for custom conversion functions
///
/// A custom conversion receives the raw field directly and has full control
/// over typing; the declared variable type is not applied first.
pub type ConversionFn = fn(&RawValue) -> Result<Value>;

/// How a typed field value is derived from its raw field
#[derive(Debug, Clone, Copy, Default)]
pub enum Conversion {
    /// Keep the typed value as decoded
    #[default]
    Passthrough,
    /// Linear scaling: `value * factor + offset`, producing a float
    Scale { factor: f64, offset: f64 },
    /// Any nonzero numeric value becomes `true`
    Boolean,
    /// A registered conversion function
    Custom(ConversionFn),
}

/// One variable definition as written in configuration
#[derive(Debug, Clone)]
pub struct VariableDef {
    /// Field name in the decoded record
    pub name: String,
    /// Type name, resolved against custom registrations then builtins
    pub type_name: String,
    /// Conversion for this variable; `None` falls back to the decoder default
    pub conversion: Option<Conversion>,
}

impl VariableDef {
    /// Create a definition with the default conversion
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            conversion: None,
        }
    }

    /// Set the conversion for this variable
    pub fn with_conversion(mut self, conversion: Conversion) -> Self {
        self.conversion = Some(conversion);
        self
    }
}

/// Defaults applied to every variable that does not specify its own
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableDefaults {
    /// Conversion used when a definition and the overrides are both silent
    pub conversion: Option<Conversion>,
}

/// A fully resolved variable specification
#[derive(Debug, Clone)]
struct VariableSpec {
    name: String,
    var_type: VariableType,
    conversion: Conversion,
}

/// Decodes raw payloads into records according to a fixed specification
#[derive(Debug)]
pub struct DataDecoder {
    variables: Vec<VariableSpec>,
}

impl DataDecoder {
    /// Build a decoder from definitions, per-name conversion overrides,
    /// custom type registrations and defaults
    ///
    /// Fails with a configuration error on an unknown type name or a
    /// duplicate variable name.
    pub fn new(
        variables: Vec<VariableDef>,
        conversion_overrides: &HashMap<String, Conversion>,
        custom_types: &HashMap<String, VariableType>,
        defaults: VariableDefaults,
    ) -> Result<Self> {
        let mut specs = Vec::with_capacity(variables.len());
        for def in variables {
            let var_type = custom_types
                .get(&def.type_name)
                .copied()
                .or_else(|| VariableType::from_name(&def.type_name))
                .ok_or_else(|| {
                    FieldLogError::Config(format!(
                        "unknown variable type {:?} for variable {:?}",
                        def.type_name, def.name
                    ))
                })?;
            if specs.iter().any(|s: &VariableSpec| s.name == def.name) {
                return Err(FieldLogError::Config(format!(
                    "duplicate variable name {:?}",
                    def.name
                )));
            }
            let conversion = conversion_overrides
                .get(&def.name)
                .copied()
                .or(def.conversion)
                .or(defaults.conversion)
                .unwrap_or_default();
            specs.push(VariableSpec {
                name: def.name,
                var_type,
                conversion,
            });
        }
        Ok(Self { variables: specs })
    }

    /// Number of fields one raw payload must carry
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Field names in specification order
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|s| s.name.as_str())
    }

    /// Decode one raw payload into a record
    ///
    /// The payload must carry exactly one raw field per specified variable,
    /// in specification order.
    pub fn decode_data(&self, raw_data: &[RawValue]) -> Result<Record> {
        if raw_data.len() != self.variables.len() {
            return Err(FieldLogError::Decode(format!(
                "payload arity mismatch: expected {} fields, got {}",
                self.variables.len(),
                raw_data.len()
            )));
        }

        let mut record = Record::with_capacity(self.variables.len());
        for (spec, raw) in self.variables.iter().zip(raw_data) {
            let value = decode_field(spec, raw)
                .map_err(|e| e.with_context(format!("decoding variable {:?}", spec.name)))?;
            record.insert(spec.name.clone(), value);
        }
        Ok(record)
    }
}

fn decode_field(spec: &VariableSpec, raw: &RawValue) -> Result<Value> {
    // Custom conversions see the raw field directly; all others get the
    // value coerced to its declared type first.
    if let Conversion::Custom(f) = spec.conversion {
        return f(raw);
    }
    let typed = coerce(spec.var_type, raw)?;
    apply_conversion(spec.conversion, typed)
}

/// Convert one raw field to its declared type
fn coerce(var_type: VariableType, raw: &RawValue) -> Result<Value> {
    let mismatch = || {
        FieldLogError::Decode(format!(
            "raw value {} does not fit declared type {}",
            raw, var_type
        ))
    };

    match raw {
        RawValue::Bytes(bytes) => var_type.decode_bytes(bytes).ok_or_else(|| {
            FieldLogError::Decode(format!(
                "raw field of {} bytes is too short for type {}",
                bytes.len(),
                var_type
            ))
        }),
        RawValue::Int(v) => coerce_int(var_type, *v).ok_or_else(mismatch),
        RawValue::UInt(v) => coerce_uint(var_type, *v).ok_or_else(mismatch),
        RawValue::Float(v) => match var_type {
            VariableType::F32 | VariableType::F64 => Ok(Value::Float(*v)),
            _ => Err(mismatch()),
        },
        RawValue::Str(_) => Err(FieldLogError::Decode(format!(
            "string field requires a custom conversion, declared type is {}",
            var_type
        ))),
    }
}

fn coerce_int(var_type: VariableType, v: i64) -> Option<Value> {
    match var_type {
        VariableType::I8 => i8::try_from(v).ok().map(|x| Value::Int(x as i64)),
        VariableType::I16 => i16::try_from(v).ok().map(|x| Value::Int(x as i64)),
        VariableType::I32 => i32::try_from(v).ok().map(|x| Value::Int(x as i64)),
        VariableType::I64 => Some(Value::Int(v)),
        VariableType::U8 => u8::try_from(v).ok().map(|x| Value::UInt(x as u64)),
        VariableType::U16 => u16::try_from(v).ok().map(|x| Value::UInt(x as u64)),
        VariableType::U32 => u32::try_from(v).ok().map(|x| Value::UInt(x as u64)),
        VariableType::U64 => u64::try_from(v).ok().map(Value::UInt),
        VariableType::F32 | VariableType::F64 => Some(Value::Float(v as f64)),
        VariableType::Bool => Some(Value::Bool(v != 0)),
        VariableType::Raw(_) => None,
    }
}

fn coerce_uint(var_type: VariableType, v: u64) -> Option<Value> {
    match var_type {
        VariableType::U8 => u8::try_from(v).ok().map(|x| Value::UInt(x as u64)),
        VariableType::U16 => u16::try_from(v).ok().map(|x| Value::UInt(x as u64)),
        VariableType::U32 => u32::try_from(v).ok().map(|x| Value::UInt(x as u64)),
        VariableType::U64 => Some(Value::UInt(v)),
        VariableType::I8 => i8::try_from(v).ok().map(|x| Value::Int(x as i64)),
        VariableType::I16 => i16::try_from(v).ok().map(|x| Value::Int(x as i64)),
        VariableType::I32 => i32::try_from(v).ok().map(|x| Value::Int(x as i64)),
        VariableType::I64 => i64::try_from(v).ok().map(Value::Int),
        VariableType::F32 | VariableType::F64 => Some(Value::Float(v as f64)),
        VariableType::Bool => Some(Value::Bool(v != 0)),
        VariableType::Raw(_) => None,
    }
}

fn apply_conversion(conversion: Conversion, typed: Value) -> Result<Value> {
    match conversion {
        Conversion::Passthrough => Ok(typed),
        Conversion::Scale { factor, offset } => {
            let numeric = match &typed {
                Value::Int(v) => *v as f64,
                Value::UInt(v) => *v as f64,
                Value::Float(v) => *v,
                other => {
                    return Err(FieldLogError::Decode(format!(
                        "cannot scale non-numeric value of type {}",
                        other.type_name()
                    )))
                }
            };
            Ok(Value::Float(numeric * factor + offset))
        }
        Conversion::Boolean => match typed {
            Value::Bool(v) => Ok(Value::Bool(v)),
            Value::Int(v) => Ok(Value::Bool(v != 0)),
            Value::UInt(v) => Ok(Value::Bool(v != 0)),
            Value::Float(v) => Ok(Value::Bool(v != 0.0)),
            other => Err(FieldLogError::Decode(format!(
                "cannot convert value of type {} to bool",
                other.type_name()
            ))),
        },
        // Handled in decode_field before coercion
        Conversion::Custom(f) => f(&RawValue::Str(typed.to_string())),
    }
}
