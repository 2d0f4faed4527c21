use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// --- Byte order ---

/// Packing order of a signal inside its message.
///
/// Little endian signals are located by their least significant bit, big
/// endian signals by their most significant bit under the DBC sawtooth
/// numbering (see [`crate::layout`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ByteOrder::LittleEndian => "little_endian",
            ByteOrder::BigEndian => "big_endian",
        };
        f.write_str(s)
    }
}

// --- Choices ---

/// An enumerated value: maps a raw integer to a human-readable label.
///
/// Some formats attach per-language descriptions to the label; they are kept
/// in `comments`, keyed by language code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedSignalValue {
    value: i64,
    name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    comments: BTreeMap<String, String>,
}

impl NamedSignalValue {
    pub fn new(value: i64, name: impl Into<String>) -> Self {
        Self {
            value,
            name: name.into(),
            comments: BTreeMap::new(),
        }
    }

    pub fn with_comments(mut self, comments: BTreeMap<String, String>) -> Self {
        self.comments = comments;
        self
    }

    /// The label the raw value is mapped to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw value that gets mapped.
    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn comments(&self) -> &BTreeMap<String, String> {
        &self.comments
    }
}

impl fmt::Display for NamedSignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq<str> for NamedSignalValue {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for NamedSignalValue {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

/// Raw value -> label table of an enumerated signal.
pub type Choices = BTreeMap<i64, NamedSignalValue>;

// --- Scalar / piecewise duality ---

/// A conversion parameter that is either global or given per piecewise
/// segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentValue<T> {
    Scalar(T),
    Segmented(Vec<T>),
}

impl<T> SegmentValue<T> {
    /// The only value, or the first segment's value.
    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn is_segmented(&self) -> bool {
        matches!(self, SegmentValue::Segmented(_))
    }

    /// Number of values (1 for a scalar).
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// View both variants as a slice; a scalar is a one-element slice.
    pub fn as_slice(&self) -> &[T] {
        match self {
            SegmentValue::Scalar(v) => std::slice::from_ref(v),
            SegmentValue::Segmented(v) => v,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> SegmentValue<U> {
        match self {
            SegmentValue::Scalar(v) => SegmentValue::Scalar(f(v)),
            SegmentValue::Segmented(v) => SegmentValue::Segmented(v.iter().map(f).collect()),
        }
    }
}

// --- Intervals ---

/// Closed interval `[start, end]` of one piecewise segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, value: f64) -> bool {
        self.start <= value && value <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <= x <= {}", self.start, self.end)
    }
}

impl From<(f64, f64)> for Interval {
    fn from((start, end): (f64, f64)) -> Self {
        Self { start, end }
    }
}

// --- Values ---

/// Encoded value of a signal as it appears in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Integer(i64),
    Float(f64),
}

impl RawValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            RawValue::Integer(v) => v as f64,
            RawValue::Float(v) => v,
        }
    }

    /// The integer this value denotes, if it denotes one exactly.
    pub fn as_exact_integer(&self) -> Option<i64> {
        match *self {
            RawValue::Integer(v) => Some(v),
            RawValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(v as i64),
            RawValue::Float(_) => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Integer(v) => write!(f, "{v}"),
            RawValue::Float(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! raw_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for RawValue {
            fn from(v: $t) -> Self {
                RawValue::Integer(i64::from(v))
            }
        })*
    };
}

raw_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<f32> for RawValue {
    fn from(v: f32) -> Self {
        RawValue::Float(f64::from(v))
    }
}

/// Physical (scaled) value of a signal, or its enumerated label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Integer(i64),
    Float(f64),
    Named(NamedSignalValue),
    Text(String),
}

impl SignalValue {
    /// Numeric view; `None` for labels.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SignalValue::Integer(v) => Some(*v as f64),
            SignalValue::Float(v) => Some(*v),
            SignalValue::Named(_) | SignalValue::Text(_) => None,
        }
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Integer(v) => write!(f, "{v}"),
            SignalValue::Float(v) => write!(f, "{v}"),
            SignalValue::Named(v) => write!(f, "{v}"),
            SignalValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<RawValue> for SignalValue {
    fn from(v: RawValue) -> Self {
        match v {
            RawValue::Integer(i) => SignalValue::Integer(i),
            RawValue::Float(x) => SignalValue::Float(x),
        }
    }
}

macro_rules! signal_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for SignalValue {
            fn from(v: $t) -> Self {
                SignalValue::Integer(i64::from(v))
            }
        })*
    };
}

signal_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for SignalValue {
    fn from(v: f64) -> Self {
        SignalValue::Float(v)
    }
}

impl From<&str> for SignalValue {
    fn from(v: &str) -> Self {
        SignalValue::Text(v.to_string())
    }
}

impl From<String> for SignalValue {
    fn from(v: String) -> Self {
        SignalValue::Text(v)
    }
}

impl From<NamedSignalValue> for SignalValue {
    fn from(v: NamedSignalValue) -> Self {
        SignalValue::Named(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_value_slices() {
        let scalar = SegmentValue::Scalar(2.0);
        assert_eq!(scalar.as_slice(), &[2.0]);
        assert_eq!(scalar.first(), Some(&2.0));
        assert!(!scalar.is_segmented());

        let segmented = SegmentValue::Segmented(vec![1.0, 3.0]);
        assert_eq!(segmented.len(), 2);
        assert_eq!(segmented.first(), Some(&1.0));
        assert_eq!(segmented.map(|v| v * 2.0), SegmentValue::Segmented(vec![2.0, 6.0]));
    }

    #[test]
    fn test_named_value_compares_with_str() {
        let v = NamedSignalValue::new(1, "ON");
        assert!(v == "ON");
        assert_eq!(v.to_string(), "ON");
        assert_eq!(v.value(), 1);
    }

    #[test]
    fn test_raw_value_exact_integer() {
        assert_eq!(RawValue::Float(3.0).as_exact_integer(), Some(3));
        assert_eq!(RawValue::Float(3.5).as_exact_integer(), None);
        assert_eq!(RawValue::Float(f64::NAN).as_exact_integer(), None);
        assert_eq!(RawValue::from(7u8).as_exact_integer(), Some(7));
    }

    #[test]
    fn test_interval_display() {
        assert_eq!(Interval::new(0.0, 5.5).to_string(), "0 <= x <= 5.5");
        assert!(Interval::new(0.0, 5.0).contains(5.0));
        assert!(!Interval::new(0.0, 5.0).contains(5.1));
    }
}
