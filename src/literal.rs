// Copyright 2025 Cowboy AI, LLC.

//! Scalar literal values
//!
//! Literal guards and enum guards accept a finite set of scalars. Membership
//! uses SameValueZero equality: identical to strict equality except that
//! `NaN` equals `NaN`. `+0` and `-0` stay equal.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::{PropertyKey, Value};

/// A scalar that can appear in a literal set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// The missing-value sentinel
    Undefined,
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Number
    Number(f64),
    /// Big integer
    BigInt(i128),
    /// String
    String(String),
}

impl Literal {
    /// SameValueZero comparison between two literals
    pub fn same_value_zero(&self, other: &Literal) -> bool {
        match (self, other) {
            (Literal::Undefined, Literal::Undefined) | (Literal::Null, Literal::Null) => true,
            (Literal::Bool(a), Literal::Bool(b)) => a == b,
            (Literal::Number(a), Literal::Number(b)) => same_number(*a, *b),
            (Literal::BigInt(a), Literal::BigInt(b)) => a == b,
            (Literal::String(a), Literal::String(b)) => a == b,
            _ => false,
        }
    }

    /// True if `value` is this literal under SameValueZero
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Literal::Undefined, Value::Undefined) | (Literal::Null, Value::Null) => true,
            (Literal::Bool(a), Value::Bool(b)) => a == b,
            (Literal::Number(a), Value::Number(b)) => same_number(*a, *b),
            (Literal::BigInt(a), Value::BigInt(b)) => a == b,
            (Literal::String(a), Value::String(b)) => a.as_str() == &**b,
            _ => false,
        }
    }

    /// The key a value of this literal is stored under in an enum mapping
    pub fn to_key_string(&self) -> String {
        match self {
            Literal::Undefined => "undefined".to_string(),
            Literal::Null => "null".to_string(),
            Literal::Bool(flag) => flag.to_string(),
            Literal::Number(number) => number_to_string(*number),
            Literal::BigInt(number) => number.to_string(),
            Literal::String(text) => text.clone(),
        }
    }

    /// Property key form of this literal
    pub fn to_property_key(&self) -> PropertyKey {
        PropertyKey::from(self.to_key_string())
    }

    /// True for numeric literals
    pub fn is_number(&self) -> bool {
        matches!(self, Literal::Number(_))
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.same_value_zero(other)
    }
}

fn same_number(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Render a number the way it reads as a property key: `0`, `1.5`, `NaN`, `Infinity`
///
/// Magnitudes from `1e21` up and below `1e-6` use exponent form (`1e+21`, `1e-7`).
pub(crate) fn number_to_string(number: f64) -> String {
    if number.is_nan() {
        "NaN".to_string()
    } else if number.is_infinite() {
        let text = if number > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if number == 0.0 {
        "0".to_string()
    } else if number.abs() >= 1e21 || number.abs() < 1e-6 {
        let text = format!("{number:e}");
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => text,
        }
    } else {
        number.to_string()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Undefined => f.write_str("undefined"),
            Literal::Null => f.write_str("null"),
            Literal::Bool(flag) => write!(f, "{flag}"),
            Literal::Number(number) => f.write_str(&number_to_string(*number)),
            Literal::BigInt(number) => write!(f, "{number}n"),
            Literal::String(text) => write!(f, "{text:?}"),
        }
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Undefined => Value::Undefined,
            Literal::Null => Value::Null,
            Literal::Bool(flag) => Value::Bool(flag),
            Literal::Number(number) => Value::Number(number),
            Literal::BigInt(number) => Value::BigInt(number),
            Literal::String(text) => Value::from(text),
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Number(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Number(f64::from(value))
    }
}

impl From<u32> for Literal {
    fn from(value: u32) -> Self {
        Literal::Number(f64::from(value))
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Number(value as f64)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}
