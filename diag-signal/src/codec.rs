//! Signal value codec: raw <-> scaled conversion.
//!
//! A [`SignalBase`] carries either one global linear function
//! (`scaled = raw * scale + offset`) or a piecewise linear one, where every
//! segment has its own scale/offset and a closed raw interval. Scaled segment
//! intervals are derived once at build time.
//!
//! Values are immutable; use [`SignalBase::to_builder`] to derive a codec with
//! different conversion parameters.

use serde::Serialize;
use thiserror::Error;

use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::types::{ByteOrder, Choices, Interval, RawValue, SegmentValue, SignalValue};

/// Largest magnitude an `f64` can have and still convert into an `i64`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_807.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("invalid conversion parameters for '{signal}': {reason}")]
    InvalidParameters { signal: String, reason: String },
    #[error("Value {value} is not in any of the specified intervals: {intervals}")]
    OutOfRange { value: f64, intervals: String },
    #[error("Signal {0} has no choices.")]
    NoChoices(String),
    #[error("Choice {choice} not found in data element {signal}.")]
    ChoiceNotFound { choice: String, signal: String },
    #[error("value {value} of '{signal}' cannot be represented as a raw integer")]
    UnsupportedValue { signal: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalBase {
    name: String,
    start: u32,
    length: u32,
    byte_order: ByteOrder,
    is_signed: bool,
    is_float: bool,
    scale: SegmentValue<f64>,
    offset: SegmentValue<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    minimum: Option<SegmentValue<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    maximum: Option<SegmentValue<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    choices: Option<Choices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    segment_boundaries_raw: Option<Vec<Interval>>,
    #[serde(skip)]
    segment_boundaries_scaled: Option<Vec<Interval>>,
}

impl SignalBase {
    pub fn builder(name: impl Into<String>, start: u32, length: u32) -> SignalBaseBuilder {
        SignalBaseBuilder::new(name, start, length)
    }

    /// Builder pre-filled with this codec's parameters.
    pub fn to_builder(&self) -> SignalBaseBuilder {
        SignalBaseBuilder {
            name: self.name.clone(),
            start: self.start,
            length: self.length,
            byte_order: self.byte_order,
            is_signed: self.is_signed,
            is_float: self.is_float,
            scale: self.scale.clone(),
            offset: self.offset.clone(),
            minimum: self.minimum.clone(),
            maximum: self.maximum.clone(),
            unit: self.unit.clone(),
            choices: self.choices.clone(),
            segment_boundaries: self.segment_boundaries_raw.clone(),
        }
    }

    /// New codec with replaced scale and offset; segment boundaries are kept
    /// and their scaled counterparts re-derived.
    pub fn with_scale_offset(
        &self,
        scale: SegmentValue<f64>,
        offset: SegmentValue<f64>,
    ) -> Result<SignalBase, CodecError> {
        self.to_builder().scale(scale).offset(offset).build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start bit in the DBC numbering convention.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Length in bits.
    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Informational only; ignore when `is_float` is set.
    pub fn is_signed(&self) -> bool {
        self.is_signed
    }

    pub fn is_float(&self) -> bool {
        self.is_float
    }

    pub fn minimum(&self) -> Option<&SegmentValue<f64>> {
        self.minimum.as_ref()
    }

    pub fn maximum(&self) -> Option<&SegmentValue<f64>> {
        self.maximum.as_ref()
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn choices(&self) -> Option<&Choices> {
        self.choices.as_ref()
    }

    /// All scale factors (one per segment for piecewise codecs).
    pub fn scales(&self) -> &SegmentValue<f64> {
        &self.scale
    }

    /// All offsets (one per segment for piecewise codecs).
    pub fn offsets(&self) -> &SegmentValue<f64> {
        &self.offset
    }

    /// First or only scale factor.
    pub fn scale(&self) -> f64 {
        self.scale.first().copied().unwrap_or(1.0)
    }

    /// First or only offset.
    pub fn offset(&self) -> f64 {
        self.offset.first().copied().unwrap_or(0.0)
    }

    pub fn is_piecewise(&self) -> bool {
        self.segment_boundaries_raw.is_some()
    }

    pub fn segment_boundaries_raw(&self) -> Option<&[Interval]> {
        self.segment_boundaries_raw.as_deref()
    }

    pub fn segment_boundaries_scaled(&self) -> Option<&[Interval]> {
        self.segment_boundaries_scaled.as_deref()
    }

    /// `(offset, scale)` applicable to a raw value.
    ///
    /// Without a value, or for a globally scaled codec, the first (only) pair
    /// is returned. Otherwise segments are scanned in declaration order and the
    /// first one whose closed interval contains the value wins, so a value on a
    /// boundary shared by two segments resolves to the earlier segment.
    pub fn get_offset_scaling_from_raw(&self, raw: Option<f64>) -> Result<(f64, f64), CodecError> {
        self.offset_scaling_in(raw, self.segment_boundaries_raw.as_deref())
    }

    /// `(offset, scale)` applicable to a scaled value. Same matching rules as
    /// [`Self::get_offset_scaling_from_raw`], against the scaled intervals.
    pub fn get_offset_scaling_from_scaled(
        &self,
        scaled: Option<f64>,
    ) -> Result<(f64, f64), CodecError> {
        self.offset_scaling_in(scaled, self.segment_boundaries_scaled.as_deref())
    }

    fn offset_scaling_in(
        &self,
        value: Option<f64>,
        intervals: Option<&[Interval]>,
    ) -> Result<(f64, f64), CodecError> {
        let (value, intervals) = match (value, intervals) {
            (Some(v), Some(iv)) => (v, iv),
            _ => return Ok((self.offset(), self.scale())),
        };

        let found = intervals
            .iter()
            .zip(self.offset.iter().zip(self.scale.iter()))
            .find(|(interval, _)| interval.contains(value));

        match found {
            Some((_, (offset, scale))) => Ok((*offset, *scale)),
            None => Err(CodecError::OutOfRange {
                value,
                intervals: intervals
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" OR "),
            }),
        }
    }

    /// Convert a raw value to its scaled value.
    ///
    /// With `decode_choices` set, a raw value that is a key of the choice
    /// table is returned as its label instead of a number.
    pub fn raw_to_scaled(
        &self,
        raw: impl Into<RawValue>,
        decode_choices: bool,
    ) -> Result<SignalValue, CodecError> {
        let raw = raw.into();

        if decode_choices {
            if let (Some(choices), Some(key)) = (&self.choices, raw.as_exact_integer()) {
                if let Some(named) = choices.get(&key) {
                    return Ok(SignalValue::Named(named.clone()));
                }
            }
        }

        let (offset, scale) = self.get_offset_scaling_from_raw(Some(raw.as_f64()))?;

        // scale 1 with an integral offset needs no floating point math
        if let Some(shift) = integral_shift(offset, scale) {
            match raw {
                RawValue::Integer(v) => {
                    if let Some(scaled) = v.checked_add(shift) {
                        return Ok(SignalValue::Integer(scaled));
                    }
                }
                RawValue::Float(v) => return Ok(SignalValue::Float(v + offset)),
            }
        }

        Ok(SignalValue::Float(raw.as_f64() * scale + offset))
    }

    /// Convert a scaled value (number or choice label) to the raw value.
    ///
    /// Integer signals are rounded half to even; float signals keep the
    /// fractional part.
    pub fn scaled_to_raw(&self, scaled: impl Into<SignalValue>) -> Result<RawValue, CodecError> {
        match scaled.into() {
            SignalValue::Named(named) => {
                Ok(RawValue::Integer(self.choice_string_to_number(named.name())?))
            }
            SignalValue::Text(label) => Ok(RawValue::Integer(self.choice_string_to_number(&label)?)),
            SignalValue::Integer(v) => {
                let (offset, scale) = self.get_offset_scaling_from_scaled(Some(v as f64))?;
                if let Some(shift) = integral_shift(offset, scale) {
                    if let Some(raw) = v.checked_sub(shift) {
                        return Ok(if self.is_float {
                            RawValue::Float(raw as f64)
                        } else {
                            RawValue::Integer(raw)
                        });
                    }
                }
                self.cast_raw((v as f64 - offset) / scale)
            }
            SignalValue::Float(v) => {
                let (offset, scale) = self.get_offset_scaling_from_scaled(Some(v))?;
                let raw = if integral_shift(offset, scale).is_some() {
                    v - offset
                } else {
                    (v - offset) / scale
                };
                self.cast_raw(raw)
            }
        }
    }

    fn cast_raw(&self, value: f64) -> Result<RawValue, CodecError> {
        if self.is_float {
            return Ok(RawValue::Float(value));
        }

        let rounded = value.round_ties_even();
        if !rounded.is_finite() || rounded.abs() >= I64_LIMIT {
            return Err(CodecError::UnsupportedValue {
                signal: self.name.clone(),
                value: value.to_string(),
            });
        }
        Ok(RawValue::Integer(rounded as i64))
    }

    /// Raw value of a choice label. When several raw values share the label,
    /// the smallest one is returned.
    pub fn choice_string_to_number(&self, label: &str) -> Result<i64, CodecError> {
        let choices = self
            .choices
            .as_ref()
            .ok_or_else(|| CodecError::NoChoices(self.name.clone()))?;

        choices
            .iter()
            .find(|(_, named)| named.name() == label)
            .map(|(value, _)| *value)
            .ok_or_else(|| CodecError::ChoiceNotFound {
                choice: label.to_string(),
                signal: self.name.clone(),
            })
    }
}

/// The offset as an integer if `scale == 1` and the offset is integral.
#[allow(clippy::float_cmp)]
fn integral_shift(offset: f64, scale: f64) -> Option<i64> {
    if scale == 1.0 && offset.fract() == 0.0 && offset.abs() < I64_LIMIT {
        Some(offset as i64)
    } else {
        None
    }
}

/// Assembles a [`SignalBase`] and checks its conversion parameters.
#[derive(Debug, Clone)]
pub struct SignalBaseBuilder {
    name: String,
    start: u32,
    length: u32,
    byte_order: ByteOrder,
    is_signed: bool,
    is_float: bool,
    scale: SegmentValue<f64>,
    offset: SegmentValue<f64>,
    minimum: Option<SegmentValue<f64>>,
    maximum: Option<SegmentValue<f64>>,
    unit: Option<String>,
    choices: Option<Choices>,
    segment_boundaries: Option<Vec<Interval>>,
}

impl SignalBaseBuilder {
    pub fn new(name: impl Into<String>, start: u32, length: u32) -> Self {
        Self {
            name: name.into(),
            start,
            length,
            byte_order: ByteOrder::LittleEndian,
            is_signed: false,
            is_float: false,
            scale: SegmentValue::Scalar(1.0),
            offset: SegmentValue::Scalar(0.0),
            minimum: None,
            maximum: None,
            unit: None,
            choices: None,
            segment_boundaries: None,
        }
    }

    pub fn start(mut self, start: u32) -> Self {
        self.start = start;
        self
    }

    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn is_signed(mut self, is_signed: bool) -> Self {
        self.is_signed = is_signed;
        self
    }

    pub fn is_float(mut self, is_float: bool) -> Self {
        self.is_float = is_float;
        self
    }

    pub fn scale(mut self, scale: SegmentValue<f64>) -> Self {
        self.scale = scale;
        self
    }

    pub fn offset(mut self, offset: SegmentValue<f64>) -> Self {
        self.offset = offset;
        self
    }

    /// Global linear conversion; clears any segment boundaries.
    pub fn linear(mut self, scale: f64, offset: f64) -> Self {
        self.scale = SegmentValue::Scalar(scale);
        self.offset = SegmentValue::Scalar(offset);
        self.segment_boundaries = None;
        self
    }

    /// Piecewise conversion from `(raw interval, scale, offset)` triples.
    pub fn piecewise(mut self, segments: impl IntoIterator<Item = (Interval, f64, f64)>) -> Self {
        let mut boundaries = Vec::new();
        let mut scales = Vec::new();
        let mut offsets = Vec::new();
        for (interval, scale, offset) in segments {
            boundaries.push(interval);
            scales.push(scale);
            offsets.push(offset);
        }
        self.segment_boundaries = Some(boundaries);
        self.scale = SegmentValue::Segmented(scales);
        self.offset = SegmentValue::Segmented(offsets);
        self
    }

    pub fn segment_boundaries(mut self, boundaries: Option<Vec<Interval>>) -> Self {
        self.segment_boundaries = boundaries;
        self
    }

    pub fn minimum(mut self, minimum: Option<SegmentValue<f64>>) -> Self {
        self.minimum = minimum;
        self
    }

    pub fn maximum(mut self, maximum: Option<SegmentValue<f64>>) -> Self {
        self.maximum = maximum;
        self
    }

    pub fn unit(mut self, unit: Option<String>) -> Self {
        self.unit = unit;
        self
    }

    pub fn choices(mut self, choices: Option<Choices>) -> Self {
        self.choices = choices;
        self
    }

    /// Build, logging overlap warnings through the `log` facade.
    pub fn build(self) -> Result<SignalBase, CodecError> {
        self.build_with(&mut LogSink)
    }

    /// Build, reporting overlap warnings to `sink`.
    pub fn build_with(self, sink: &mut dyn DiagnosticSink) -> Result<SignalBase, CodecError> {
        self.check_parameters()?;

        let segment_boundaries_scaled = self
            .segment_boundaries
            .as_deref()
            .map(|raw| derive_scaled_boundaries(&self.name, raw, &self.scale, &self.offset, sink));

        Ok(SignalBase {
            name: self.name,
            start: self.start,
            length: self.length,
            byte_order: self.byte_order,
            is_signed: self.is_signed,
            is_float: self.is_float,
            scale: self.scale,
            offset: self.offset,
            minimum: self.minimum,
            maximum: self.maximum,
            unit: self.unit,
            choices: self.choices,
            segment_boundaries_raw: self.segment_boundaries,
            segment_boundaries_scaled,
        })
    }

    fn check_parameters(&self) -> Result<(), CodecError> {
        let invalid = |reason: String| CodecError::InvalidParameters {
            signal: self.name.clone(),
            reason,
        };

        // scaled -> raw divides by the scale
        if let Some(i) = self.scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
            return Err(invalid(format!("scale factor of segment {i} must be finite and non-zero")));
        }

        let flags = [
            self.scale.is_segmented(),
            self.offset.is_segmented(),
            self.segment_boundaries.is_some(),
        ];
        if !flags.contains(&true) {
            return Ok(());
        }
        if flags.contains(&false) {
            return Err(invalid(
                "scale, offset and segment boundaries must all be given per segment".into(),
            ));
        }

        let segments = self.segment_boundaries.as_ref().map_or(0, Vec::len);
        if segments == 0 {
            return Err(invalid("piecewise conversion needs at least one segment".into()));
        }
        if self.scale.len() != segments || self.offset.len() != segments {
            return Err(invalid(format!(
                "{} segment boundaries but {} scale factors and {} offsets",
                segments,
                self.scale.len(),
                self.offset.len()
            )));
        }
        Ok(())
    }
}

/// Map each raw interval through its segment's transform, reporting segments
/// whose scaled start does not lie above every earlier segment's scaled end.
fn derive_scaled_boundaries(
    name: &str,
    raw: &[Interval],
    scales: &SegmentValue<f64>,
    offsets: &SegmentValue<f64>,
    sink: &mut dyn DiagnosticSink,
) -> Vec<Interval> {
    let mut scaled_boundaries = Vec::with_capacity(raw.len());
    let mut last_max: Option<f64> = None;

    for (i, (interval, (scale, offset))) in raw
        .iter()
        .zip(scales.iter().zip(offsets.iter()))
        .enumerate()
    {
        let a = interval.start * scale + offset;
        let b = interval.end * scale + offset;
        // a negative slope flips the interval
        let scaled = Interval::new(a.min(b), a.max(b));

        if let Some(prev_max) = last_max {
            if prev_max >= scaled.start {
                sink.report(Diagnostic::OverlappingSegments {
                    signal: name.to_string(),
                    segment: i,
                    scaled_start: scaled.start,
                    previous_max: prev_max,
                });
            }
        }
        last_max = Some(last_max.map_or(scaled.end, |m| m.max(scaled.end)));
        scaled_boundaries.push(scaled);
    }

    scaled_boundaries
}
