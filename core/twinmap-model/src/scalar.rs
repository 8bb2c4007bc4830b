//! Scalar and enum codec.
//!
//! Converts between typed scalar values and their wire representation:
//! - strings, booleans and numbers map to the matching JSON value
//! - date/times are RFC 3339 strings
//! - durations are ISO 8601 duration strings (`P1DT2H3M4.5S`)
//! - enums are their symbolic member name, never an ordinal

use std::fmt::{self, Write as _};

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use serde_json::{Number, Value};

use crate::error::{MappingError, MappingResult};

/// The declared type of a property field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Boolean,
    Integer,
    Double,
    DateTime,
    Duration,
    Enum {
        name: &'static str,
        members: &'static [&'static str],
    },
}

impl ScalarType {
    /// The value written for an absent field when encoding in
    /// [`EncodeMode::Canonical`](crate::EncodeMode::Canonical).
    pub fn zero_value(&self) -> MappingResult<ScalarValue> {
        Ok(match self {
            Self::String => ScalarValue::String(String::new()),
            Self::Boolean => ScalarValue::Boolean(false),
            Self::Integer => ScalarValue::Integer(0),
            Self::Double => ScalarValue::Double(0.0),
            Self::DateTime => ScalarValue::DateTime(DateTime::<Utc>::UNIX_EPOCH.fixed_offset()),
            Self::Duration => ScalarValue::Duration(TimeDelta::zero()),
            Self::Enum { name, members } => {
                let first = members.first().ok_or_else(|| MappingError::UnknownEnumMember {
                    enum_name: (*name).to_string(),
                    value: String::new(),
                })?;
                ScalarValue::Enum((*first).to_string())
            }
        })
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Boolean => f.write_str("boolean"),
            Self::Integer => f.write_str("integer"),
            Self::Double => f.write_str("double"),
            Self::DateTime => f.write_str("dateTime"),
            Self::Duration => f.write_str("duration"),
            Self::Enum { name, .. } => write!(f, "enum {name}"),
        }
    }
}

/// A typed scalar, independent of the Rust field type it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    Double(f64),
    DateTime(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Enum(String),
}

impl ScalarValue {
    fn type_label(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Double(_) => "double",
            Self::DateTime(_) => "dateTime",
            Self::Duration(_) => "duration",
            Self::Enum(_) => "enum member",
        }
    }
}

fn wire_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Encode a scalar value for the wire.
pub fn encode_scalar(value: &ScalarValue, declared: &ScalarType) -> MappingResult<Value> {
    match (declared, value) {
        (ScalarType::String, ScalarValue::String(s)) => Ok(Value::String(s.clone())),
        (ScalarType::Boolean, ScalarValue::Boolean(b)) => Ok(Value::Bool(*b)),
        (ScalarType::Integer, ScalarValue::Integer(i)) => Ok(Value::from(*i)),
        (ScalarType::Double, ScalarValue::Double(d)) => Number::from_f64(*d)
            .map(Value::Number)
            .ok_or_else(|| MappingError::type_mismatch("finite double", d.to_string())),
        (ScalarType::DateTime, ScalarValue::DateTime(dt)) => Ok(Value::String(dt.to_rfc3339())),
        (ScalarType::Duration, ScalarValue::Duration(d)) => Ok(Value::String(format_duration(*d))),
        (ScalarType::Enum { name, members }, ScalarValue::Enum(member)) => {
            if members.contains(&member.as_str()) {
                Ok(Value::String(member.clone()))
            } else {
                Err(MappingError::UnknownEnumMember {
                    enum_name: (*name).to_string(),
                    value: member.clone(),
                })
            }
        }
        (expected, found) => Err(MappingError::type_mismatch(
            expected.to_string(),
            found.type_label(),
        )),
    }
}

/// Decode a wire value into the declared scalar type.
pub fn decode_scalar(wire: &Value, declared: &ScalarType) -> MappingResult<ScalarValue> {
    let mismatch = || MappingError::type_mismatch(declared.to_string(), wire_label(wire));
    match declared {
        ScalarType::String => wire
            .as_str()
            .map(|s| ScalarValue::String(s.to_owned()))
            .ok_or_else(mismatch),
        ScalarType::Boolean => wire.as_bool().map(ScalarValue::Boolean).ok_or_else(mismatch),
        ScalarType::Integer => wire
            .as_i64()
            .or_else(|| {
                // Stores may hand back whole numbers as floats.
                wire.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                    .map(|f| f as i64)
            })
            .map(ScalarValue::Integer)
            .ok_or_else(mismatch),
        ScalarType::Double => wire.as_f64().map(ScalarValue::Double).ok_or_else(mismatch),
        ScalarType::DateTime => {
            let text = wire.as_str().ok_or_else(mismatch)?;
            DateTime::parse_from_rfc3339(text)
                .map(ScalarValue::DateTime)
                .map_err(|_| MappingError::type_mismatch("RFC 3339 dateTime", text))
        }
        ScalarType::Duration => {
            let text = wire.as_str().ok_or_else(mismatch)?;
            parse_duration(text)
                .map(ScalarValue::Duration)
                .ok_or_else(|| MappingError::type_mismatch("ISO 8601 duration", text))
        }
        ScalarType::Enum { name, members } => {
            let text = wire.as_str().ok_or_else(mismatch)?;
            if members.contains(&text) {
                Ok(ScalarValue::Enum(text.to_owned()))
            } else {
                Err(MappingError::UnknownEnumMember {
                    enum_name: (*name).to_string(),
                    value: text.to_owned(),
                })
            }
        }
    }
}

// ── ISO 8601 durations ──────────────────────────────────────────

const SECONDS_PER_DAY: i64 = 86_400;

/// Format a duration as `[-]P[nD][T[nH][nM][n[.f]S]]`.
pub fn format_duration(duration: TimeDelta) -> String {
    let negative = duration < TimeDelta::zero();
    let duration = if negative { -duration } else { duration };

    let total = duration.num_seconds();
    let nanos = duration.subsec_nanos();
    let days = total / SECONDS_PER_DAY;
    let hours = total % SECONDS_PER_DAY / 3600;
    let minutes = total % 3600 / 60;
    let seconds = total % 60;

    let mut out = String::from(if negative { "-P" } else { "P" });
    if days > 0 {
        let _ = write!(out, "{days}D");
    }
    let has_time = hours > 0 || minutes > 0 || seconds > 0 || nanos > 0;
    if has_time || days == 0 {
        out.push('T');
        if hours > 0 {
            let _ = write!(out, "{hours}H");
        }
        if minutes > 0 {
            let _ = write!(out, "{minutes}M");
        }
        if seconds > 0 || nanos > 0 || !has_time {
            if nanos > 0 {
                let fraction = format!("{nanos:09}");
                let _ = write!(out, "{seconds}.{}S", fraction.trim_end_matches('0'));
            } else {
                let _ = write!(out, "{seconds}S");
            }
        }
    }
    out
}

/// Parse an ISO 8601 duration. Years and months are rejected because they
/// have no fixed length.
pub fn parse_duration(text: &str) -> Option<TimeDelta> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let rest = rest.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };
    if date_part.is_empty() && time_part.is_none_or(str::is_empty) {
        return None;
    }

    let mut total = TimeDelta::zero();
    for (whole, nanos, unit) in components(date_part)? {
        let unit_seconds = match unit {
            'W' => 7 * SECONDS_PER_DAY,
            'D' => SECONDS_PER_DAY,
            _ => return None,
        };
        total = total.checked_add(&scaled(whole, nanos, unit_seconds)?)?;
    }
    if let Some(time_part) = time_part {
        for (whole, nanos, unit) in components(time_part)? {
            let unit_seconds = match unit {
                'H' => 3600,
                'M' => 60,
                'S' => 1,
                _ => return None,
            };
            total = total.checked_add(&scaled(whole, nanos, unit_seconds)?)?;
        }
    }
    Some(if negative { -total } else { total })
}

/// Split `1D` / `2H30M4.5S` into (whole, fractional nanos, unit) triples.
fn components(part: &str) -> Option<Vec<(i64, i64, char)>> {
    let mut out = Vec::new();
    let mut number = String::new();
    for ch in part.chars() {
        if ch.is_ascii_digit() || ch == '.' || ch == ',' {
            number.push(if ch == ',' { '.' } else { ch });
            continue;
        }
        if number.is_empty() {
            return None;
        }
        let (whole, fraction) = match number.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (number.as_str(), ""),
        };
        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let nanos = if fraction.is_empty() {
            0
        } else {
            let digits: String = fraction.chars().chain(std::iter::repeat('0')).take(9).collect();
            digits.parse().ok()?
        };
        out.push((whole, nanos, ch));
        number.clear();
    }
    if !number.is_empty() {
        return None;
    }
    Some(out)
}

fn scaled(whole: i64, nanos: i64, unit_seconds: i64) -> Option<TimeDelta> {
    let seconds = TimeDelta::try_seconds(whole.checked_mul(unit_seconds)?)?;
    let fraction = TimeDelta::nanoseconds(nanos.checked_mul(unit_seconds)?);
    seconds.checked_add(&fraction)
}

// ── Rust type bridges ───────────────────────────────────────────

/// A Rust type that can back a property field.
pub trait Scalar: Sized {
    fn scalar_type() -> ScalarType;
    fn into_scalar(self) -> ScalarValue;
    fn from_scalar(value: ScalarValue) -> MappingResult<Self>;
}

fn unexpected<T>(expected: &ScalarType, found: &ScalarValue) -> MappingResult<T> {
    Err(MappingError::type_mismatch(
        expected.to_string(),
        found.type_label(),
    ))
}

impl Scalar for String {
    fn scalar_type() -> ScalarType {
        ScalarType::String
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::String(self)
    }

    fn from_scalar(value: ScalarValue) -> MappingResult<Self> {
        match value {
            ScalarValue::String(s) => Ok(s),
            other => unexpected(&Self::scalar_type(), &other),
        }
    }
}

impl Scalar for bool {
    fn scalar_type() -> ScalarType {
        ScalarType::Boolean
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Boolean(self)
    }

    fn from_scalar(value: ScalarValue) -> MappingResult<Self> {
        match value {
            ScalarValue::Boolean(b) => Ok(b),
            other => unexpected(&Self::scalar_type(), &other),
        }
    }
}

impl Scalar for i64 {
    fn scalar_type() -> ScalarType {
        ScalarType::Integer
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Integer(self)
    }

    fn from_scalar(value: ScalarValue) -> MappingResult<Self> {
        match value {
            ScalarValue::Integer(i) => Ok(i),
            other => unexpected(&Self::scalar_type(), &other),
        }
    }
}

impl Scalar for i32 {
    fn scalar_type() -> ScalarType {
        ScalarType::Integer
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Integer(i64::from(self))
    }

    fn from_scalar(value: ScalarValue) -> MappingResult<Self> {
        match value {
            ScalarValue::Integer(i) => i32::try_from(i)
                .map_err(|_| MappingError::type_mismatch("32-bit integer", i.to_string())),
            other => unexpected(&Self::scalar_type(), &other),
        }
    }
}

impl Scalar for f64 {
    fn scalar_type() -> ScalarType {
        ScalarType::Double
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Double(self)
    }

    fn from_scalar(value: ScalarValue) -> MappingResult<Self> {
        match value {
            ScalarValue::Double(d) => Ok(d),
            ScalarValue::Integer(i) => Ok(i as f64),
            other => unexpected(&Self::scalar_type(), &other),
        }
    }
}

impl Scalar for DateTime<FixedOffset> {
    fn scalar_type() -> ScalarType {
        ScalarType::DateTime
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::DateTime(self)
    }

    fn from_scalar(value: ScalarValue) -> MappingResult<Self> {
        match value {
            ScalarValue::DateTime(dt) => Ok(dt),
            other => unexpected(&Self::scalar_type(), &other),
        }
    }
}

impl Scalar for DateTime<Utc> {
    fn scalar_type() -> ScalarType {
        ScalarType::DateTime
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::DateTime(self.fixed_offset())
    }

    fn from_scalar(value: ScalarValue) -> MappingResult<Self> {
        match value {
            ScalarValue::DateTime(dt) => Ok(dt.with_timezone(&Utc)),
            other => unexpected(&Self::scalar_type(), &other),
        }
    }
}

impl Scalar for TimeDelta {
    fn scalar_type() -> ScalarType {
        ScalarType::Duration
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Duration(self)
    }

    fn from_scalar(value: ScalarValue) -> MappingResult<Self> {
        match value {
            ScalarValue::Duration(d) => Ok(d),
            other => unexpected(&Self::scalar_type(), &other),
        }
    }
}

/// A fieldless enum mapped by symbolic member name.
///
/// Implement it with [`twin_enum!`](crate::twin_enum) rather than by hand.
pub trait TwinEnum: Sized + 'static {
    /// Member names in declaration order. The first one is the zero value.
    const MEMBERS: &'static [&'static str];

    fn name(&self) -> &'static str;

    fn from_name(name: &str) -> Option<Self>;
}

/// Implements [`TwinEnum`] for a fieldless enum.
///
/// ```
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// enum Gender {
///     #[default]
///     Female,
///     Male,
///     NonBinary,
/// }
///
/// twinmap_model::twin_enum!(Gender { Female, Male, NonBinary });
///
/// use twinmap_model::TwinEnum;
/// assert_eq!(Gender::NonBinary.name(), "NonBinary");
/// assert_eq!(Gender::from_name("Male"), Some(Gender::Male));
/// ```
#[macro_export]
macro_rules! twin_enum {
    ($ty:ty { $($variant:ident),+ $(,)? }) => {
        impl $crate::TwinEnum for $ty {
            const MEMBERS: &'static [&'static str] = &[$(stringify!($variant)),+];

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($variant) => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}
