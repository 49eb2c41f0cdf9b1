//! Per-field type inference
//!
//! Classification order, first match wins:
//! 1. empty string -> `String`
//! 2. `-?[0-9]+` -> `Integer` (values outside `i64` become `Float`)
//! 3. decimal or scientific notation -> `Float` (non-finite results stay `String`)
//! 4. anything else -> `String`, verbatim

use std::fmt;

use serde::Serialize;

use crate::parser::{Record, TypedRecord};

/// A classified field value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Integer(i64),
    Float(f64),
    String(String),
}

impl TypedValue {
    /// Classify an owned field, reusing its allocation when it stays a string
    pub fn from_field(field: String) -> Self {
        match classify(&field) {
            Some(value) => value,
            None => TypedValue::String(field),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, TypedValue::Integer(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, TypedValue::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, TypedValue::String(_))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers are widened
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Integer(i) => Some(*i as f64),
            TypedValue::Float(f) => Some(*f),
            TypedValue::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Integer(i) => write!(f, "{}", i),
            TypedValue::Float(x) => write!(f, "{}", x),
            TypedValue::String(s) => f.write_str(s),
        }
    }
}

/// Classify a field. Total: every input maps to exactly one variant.
pub fn infer(field: &str) -> TypedValue {
    classify(field).unwrap_or_else(|| TypedValue::String(field.to_string()))
}

/// Classify every field of a record
pub fn infer_record(record: Record) -> TypedRecord {
    record.into_iter().map(TypedValue::from_field).collect()
}

/// Numeric classification, `None` when the field is a string
fn classify(field: &str) -> Option<TypedValue> {
    if field.is_empty() {
        return None;
    }

    if is_integer_literal(field.as_bytes()) {
        return match field.parse::<i64>() {
            Ok(i) => Some(TypedValue::Integer(i)),
            Err(_) => parse_finite(field),
        };
    }

    if is_float_literal(field.as_bytes()) {
        return parse_finite(field);
    }

    None
}

#[inline]
fn parse_finite(field: &str) -> Option<TypedValue> {
    field
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(TypedValue::Float)
}

/// `^-?[0-9]+$`
fn is_integer_literal(bytes: &[u8]) -> bool {
    let digits = bytes.strip_prefix(b"-").unwrap_or(bytes);
    !digits.is_empty() && digits.iter().all(u8::is_ascii_digit)
}

/// `^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?$`
fn is_float_literal(bytes: &[u8]) -> bool {
    let mut idx = 0;
    let len = bytes.len();

    if idx < len && (bytes[idx] == b'+' || bytes[idx] == b'-') {
        idx += 1;
    }

    let int_start = idx;
    while idx < len && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    let mut mantissa_digits = idx - int_start;

    if idx < len && bytes[idx] == b'.' {
        idx += 1;
        let frac_start = idx;
        while idx < len && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        mantissa_digits += idx - frac_start;
    }

    if mantissa_digits == 0 {
        return false;
    }

    if idx < len && (bytes[idx] == b'e' || bytes[idx] == b'E') {
        idx += 1;
        if idx < len && (bytes[idx] == b'+' || bytes[idx] == b'-') {
            idx += 1;
        }
        let exp_start = idx;
        while idx < len && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == exp_start {
            return false;
        }
    }

    idx == len
}
