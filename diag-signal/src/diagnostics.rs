//! Non-fatal findings reported while building codecs or loading a database.
//!
//! Conditions that are tolerated (skipped) rather than raised are surfaced
//! through a [`DiagnosticSink`] passed in by the caller, so every parse or
//! build call decides where its warnings go.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A piecewise segment starts (in scaled space) at or below the end of
    /// an earlier segment, so scaled -> raw conversion is ambiguous.
    OverlappingSegments {
        signal: String,
        segment: usize,
        scaled_start: f64,
        previous_max: f64,
    },
    /// An indirect DID data reference names an id missing from the DID table.
    MissingDidReference { did: String, reference: String },
    /// A field carries no type reference and was skipped.
    UnresolvedField { did: String, field: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::OverlappingSegments {
                signal,
                segment,
                scaled_start,
                previous_max,
            } => write!(
                f,
                "Piecewise linear type: {signal} has overlapping segments! \
                 Segment {segment} starts at phys val {scaled_start:?} \
                 but one of the prev segments ended at {previous_max:?}. \
                 Encoding might be ambiguous."
            ),
            Diagnostic::MissingDidReference { did, reference } => write!(
                f,
                "DID '{did}' references unknown DID data '{reference}', skipping"
            ),
            Diagnostic::UnresolvedField { did, field } => write!(
                f,
                "field '{field}' in DID '{did}' has no type reference, skipping"
            ),
        }
    }
}

/// Receiver of non-fatal diagnostics.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics for the caller to inspect.
impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to the `log` facade as warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
    }
}
