//! Scalar conversion between value kinds.

use remap_api::{Kind, Value};

use crate::error::{ParseError, RemapError};

/// Converter attached to a field: turns a source value into a value of the
/// field's kind. `Ok(None)` means there is nothing to write.
pub type ConvertFn = fn(&Value, Kind) -> Result<Option<Value>, RemapError>;

/// Default converter.
///
/// - `Null` and empty or whitespace-only strings convert to `None`.
/// - An `Any` target keeps the source value's own kind.
/// - Floats are written to strings with exactly four fractional digits.
/// - Strings that are not integers are parsed as floats and truncated
///   toward zero when the target is an integer.
/// - Integer results are narrowed to the target width.
pub fn convert(value: &Value, target: Kind) -> Result<Option<Value>, RemapError> {
    let target = match target {
        Kind::Any => value.kind(),
        other => other,
    };

    match value {
        Value::Null => Ok(None),
        Value::Str(s) => from_str(s, target),
        other => from_scalar(other, target).map(Some),
    }
}

fn from_str(s: &str, target: Kind) -> Result<Option<Value>, RemapError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }

    let value = match target {
        Kind::String => Value::Str(s.to_string()),
        k if k.is_signed() => {
            let v = match s.parse::<i64>() {
                Ok(v) => v,
                Err(int_err) => match s.parse::<f64>() {
                    Ok(f) => f as i64,
                    Err(_) => return Err(failed(s, target, int_err.into())),
                },
            };
            narrow_signed(v, k)
        }
        k if k.is_unsigned() => {
            let v = match s.parse::<u64>() {
                Ok(v) => v,
                Err(int_err) => match s.parse::<f64>() {
                    Ok(f) => f as u64,
                    Err(_) => return Err(failed(s, target, int_err.into())),
                },
            };
            narrow_unsigned(v, k)
        }
        k if k.is_float() => {
            let normalized = s.replace(',', ".");
            match normalized.parse::<f64>() {
                Ok(f) => narrow_float(f, k),
                Err(e) => return Err(failed(s, target, e.into())),
            }
        }
        Kind::Bool => match parse_bool(s) {
            Some(b) => Value::Bool(b),
            None => return Err(failed(s, target, ParseError::Bool)),
        },
        _ => return Err(unsupported(Kind::String, target)),
    };
    Ok(Some(value))
}

fn from_scalar(value: &Value, target: Kind) -> Result<Value, RemapError> {
    let converted = match (value, target) {
        (Value::Int(v), Kind::String) => Value::Str(v.to_string()),
        (Value::UInt(v), Kind::String) => Value::Str(v.to_string()),
        (Value::Float(v), Kind::String) => Value::Str(format!("{v:.4}")),
        (Value::Bool(v), Kind::String) => Value::Str(v.to_string()),

        (Value::Int(v), k) if k.is_signed() => narrow_signed(*v, k),
        (Value::UInt(v), k) if k.is_signed() => narrow_signed(*v as i64, k),
        (Value::Float(v), k) if k.is_signed() => narrow_signed(*v as i64, k),

        (Value::Int(v), k) if k.is_unsigned() => narrow_unsigned(*v as u64, k),
        (Value::UInt(v), k) if k.is_unsigned() => narrow_unsigned(*v, k),
        (Value::Float(v), k) if k.is_unsigned() => narrow_unsigned(*v as u64, k),

        (Value::Int(v), k) if k.is_float() => narrow_float(*v as f64, k),
        (Value::UInt(v), k) if k.is_float() => narrow_float(*v as f64, k),
        (Value::Float(v), k) if k.is_float() => narrow_float(*v, k),

        (Value::Int(v), Kind::Bool) => Value::Bool(*v != 0),
        (Value::UInt(v), Kind::Bool) => Value::Bool(*v != 0),
        (Value::Float(v), Kind::Bool) => Value::Bool(*v != 0.0),
        (Value::Bool(v), Kind::Bool) => Value::Bool(*v),

        (other, target) => return Err(unsupported(other.kind(), target)),
    };
    Ok(converted)
}

fn narrow_signed(v: i64, kind: Kind) -> Value {
    let v = match kind {
        Kind::I8 => v as i8 as i64,
        Kind::I16 => v as i16 as i64,
        Kind::I32 => v as i32 as i64,
        Kind::Isize => v as isize as i64,
        _ => v,
    };
    Value::Int(v)
}

fn narrow_unsigned(v: u64, kind: Kind) -> Value {
    let v = match kind {
        Kind::U8 => v as u8 as u64,
        Kind::U16 => v as u16 as u64,
        Kind::U32 => v as u32 as u64,
        Kind::Usize => v as usize as u64,
        _ => v,
    };
    Value::UInt(v)
}

fn narrow_float(v: f64, kind: Kind) -> Value {
    match kind {
        Kind::F32 => Value::Float(v as f32 as f64),
        _ => Value::Float(v),
    }
}

/// Boolean literals accepted from text.
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn failed(s: &str, to: Kind, source: ParseError) -> RemapError {
    RemapError::ConversionFailed {
        field: None,
        value: s.to_string(),
        to,
        source,
    }
}

fn unsupported(from: Kind, to: Kind) -> RemapError {
    RemapError::UnsupportedType {
        field: None,
        from,
        to,
    }
}
