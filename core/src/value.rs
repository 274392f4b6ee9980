//! Typed option values and the converters that produce them.
//!
//! Every option carries a [`ValueKind`], which both names the payload type it
//! stores and converts a fragment of command-line text into a [`Value`].
//! Conversion is pure: it never looks at the registry or at other options.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A value stored by an option after a successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    /// A named enumerator together with its integer value.
    Enum { name: String, value: i64 },
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Enum { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string payload, or the enumerator name for enum values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Enum { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
            Self::Enum { name, .. } => f.write_str(name),
        }
    }
}

/// One accepted spelling of an enum-valued option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub value: i64,
    pub description: String,
}

impl EnumValue {
    pub fn new(name: &str, value: i64, description: &str) -> Self {
        Self {
            name: name.to_string(),
            value,
            description: description.to_string(),
        }
    }
}

/// Signature of a user-supplied converter.
pub type ConvertFn = dyn Fn(&str) -> Result<Value, String> + Send + Sync;

/// A converter supplied by the tool instead of one of the built-in kinds.
#[derive(Clone)]
pub struct CustomConverter {
    type_name: String,
    convert: Arc<ConvertFn>,
}

impl CustomConverter {
    pub fn new<F>(type_name: &str, convert: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.to_string(),
            convert: Arc::new(convert),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl fmt::Debug for CustomConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomConverter")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Rejection of a text fragment by a converter.
///
/// The messages match the wording users of the toolchain already know, e.g.
/// `'x' value invalid for integer argument!`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("'{0}' is invalid value for boolean argument! Try 0 or 1")]
    InvalidBool(String),
    #[error("'{0}' value invalid for integer argument!")]
    InvalidInt(String),
    #[error("'{0}' value invalid for uint argument!")]
    InvalidUInt(String),
    #[error("'{0}' value invalid for floating point argument!")]
    InvalidFloat(String),
    #[error("Cannot find option named '{0}'!")]
    UnknownEnumValue(String),
    #[error("'{value}' value invalid for {type_name} argument: {reason}")]
    Custom {
        type_name: String,
        value: String,
        reason: String,
    },
}

/// The payload type of an option together with its converter.
#[derive(Debug, Clone, Default)]
pub enum ValueKind {
    Bool,
    Int,
    UInt,
    Float,
    #[default]
    String,
    Enum(Vec<EnumValue>),
    Custom(CustomConverter),
}

impl ValueKind {
    /// Converts `text` into a value of this kind.
    pub fn convert(&self, text: &str) -> Result<Value, ConversionError> {
        match self {
            Self::Bool => parse_bool(text).map(Value::Bool),
            Self::Int => parse_int(text)
                .map(Value::Int)
                .ok_or_else(|| ConversionError::InvalidInt(text.to_string())),
            Self::UInt => parse_uint(text)
                .map(Value::UInt)
                .ok_or_else(|| ConversionError::InvalidUInt(text.to_string())),
            Self::Float => text
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| ConversionError::InvalidFloat(text.to_string())),
            Self::String => Ok(Value::Str(text.to_string())),
            Self::Enum(values) => values
                .iter()
                .find(|v| v.name == text)
                .map(|v| Value::Enum {
                    name: v.name.clone(),
                    value: v.value,
                })
                .ok_or_else(|| ConversionError::UnknownEnumValue(text.to_string())),
            Self::Custom(custom) => {
                (custom.convert)(text).map_err(|reason| ConversionError::Custom {
                    type_name: custom.type_name.clone(),
                    value: text.to_string(),
                    reason,
                })
            }
        }
    }

    /// Whether an option of this kind takes a value unless told otherwise.
    ///
    /// Booleans are switches (`-v`, or `-v=false`); everything else needs text.
    pub fn takes_value_by_default(&self) -> bool {
        !matches!(self, Self::Bool)
    }

    /// Short name used by help renderers and error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Bool => "boolean",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "number",
            Self::String => "string",
            Self::Enum(_) => "value",
            Self::Custom(custom) => custom.type_name(),
        }
    }
}

fn parse_bool(text: &str) -> Result<bool, ConversionError> {
    match text {
        "" | "1" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(ConversionError::InvalidBool(text.to_string())),
    }
}

/// Splits an optional radix prefix (`0x`, `0o`, `0b`) off an unsigned literal.
fn split_radix(digits: &str) -> (u32, &str) {
    let lower = digits.get(..2).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("0x") => (16, &digits[2..]),
        Some("0o") => (8, &digits[2..]),
        Some("0b") => (2, &digits[2..]),
        _ => (10, digits),
    }
}

fn parse_uint(text: &str) -> Option<u64> {
    let digits = text.strip_prefix('+').unwrap_or(text);
    let (radix, digits) = split_radix(digits);
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

fn parse_int(text: &str) -> Option<i64> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (radix, digits) = split_radix(rest);
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = i128::from(u64::from_str_radix(digits, radix).ok()?);
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_spellings() {
        for text in ["", "1", "true", "TRUE", "True"] {
            assert_eq!(ValueKind::Bool.convert(text), Ok(Value::Bool(true)));
        }
        for text in ["0", "false", "FALSE", "False"] {
            assert_eq!(ValueKind::Bool.convert(text), Ok(Value::Bool(false)));
        }
        assert_eq!(
            ValueKind::Bool.convert("yes"),
            Err(ConversionError::InvalidBool("yes".to_string()))
        );
    }

    #[test]
    fn test_int_radix_and_sign() {
        assert_eq!(ValueKind::Int.convert("42"), Ok(Value::Int(42)));
        assert_eq!(ValueKind::Int.convert("-0x10"), Ok(Value::Int(-16)));
        assert_eq!(ValueKind::Int.convert("0b101"), Ok(Value::Int(5)));
        assert_eq!(ValueKind::Int.convert("0o17"), Ok(Value::Int(15)));
        assert_eq!(
            ValueKind::Int.convert("-9223372036854775808"),
            Ok(Value::Int(i64::MIN))
        );
        assert!(ValueKind::Int.convert("9223372036854775808").is_err());
        assert!(ValueKind::Int.convert("--1").is_err());
        assert!(ValueKind::Int.convert("").is_err());
        assert!(ValueKind::Int.convert("12abc").is_err());
    }

    #[test]
    fn test_uint_rejects_negative() {
        assert_eq!(ValueKind::UInt.convert("0xff"), Ok(Value::UInt(255)));
        assert_eq!(
            ValueKind::UInt.convert("-1"),
            Err(ConversionError::InvalidUInt("-1".to_string()))
        );
    }

    #[test]
    fn test_float_and_string() {
        assert_eq!(ValueKind::Float.convert("2.5"), Ok(Value::Float(2.5)));
        assert!(ValueKind::Float.convert("two").is_err());
        assert_eq!(
            ValueKind::String.convert("a b"),
            Ok(Value::Str("a b".to_string()))
        );
    }

    #[test]
    fn test_enum_lookup() {
        let kind = ValueKind::Enum(vec![
            EnumValue::new("O0", 0, "No optimization"),
            EnumValue::new("O2", 2, "Default optimization"),
        ]);
        assert_eq!(
            kind.convert("O2"),
            Ok(Value::Enum {
                name: "O2".to_string(),
                value: 2
            })
        );
        assert_eq!(
            kind.convert("O3").unwrap_err().to_string(),
            "Cannot find option named 'O3'!"
        );
    }

    #[test]
    fn test_custom_converter_reports_reason() {
        let kind = ValueKind::Custom(CustomConverter::new("percent", |text| {
            let n: u64 = text.parse().map_err(|_| "not a number".to_string())?;
            if n > 100 {
                return Err("must be at most 100".to_string());
            }
            Ok(Value::UInt(n))
        }));
        assert_eq!(kind.convert("40"), Ok(Value::UInt(40)));
        assert_eq!(
            kind.convert("140").unwrap_err().to_string(),
            "'140' value invalid for percent argument: must be at most 100"
        );
    }
}
