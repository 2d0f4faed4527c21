use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Deref;

use crate::codec::SignalBase;

// --- Fields ---

/// A field of a DID: position, size, conversion and choices.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Data(SignalBase);

impl Data {
    pub fn new(base: SignalBase) -> Self {
        Self(base)
    }

    pub fn codec(&self) -> &SignalBase {
        &self.0
    }

    pub fn into_codec(self) -> SignalBase {
        self.0
    }
}

impl Deref for Data {
    type Target = SignalBase;

    fn deref(&self) -> &SignalBase {
        &self.0
    }
}

impl From<SignalBase> for Data {
    fn from(base: SignalBase) -> Self {
        Self(base)
    }
}

/// A signal of a bus message, as produced by the message-oriented formats.
///
/// Shares the conversion engine with [`Data`] and adds the bus specific
/// attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    #[serde(flatten)]
    base: SignalBase,
    pub initial: Option<i64>,
    /// Raw value that marks the signal as invalid.
    pub invalid: Option<i64>,
    pub receivers: Vec<String>,
    pub is_multiplexer: bool,
    pub multiplexer_ids: Option<Vec<i64>>,
    pub multiplexer_signal: Option<String>,
    /// J1939 suspect parameter number.
    pub spn: Option<u32>,
    /// Comment without a language tag.
    pub comment: Option<String>,
    /// Comments keyed by language.
    pub comments: BTreeMap<String, String>,
}

impl Signal {
    pub fn new(base: SignalBase) -> Self {
        Self {
            base,
            initial: None,
            invalid: None,
            receivers: Vec::new(),
            is_multiplexer: false,
            multiplexer_ids: None,
            multiplexer_signal: None,
            spn: None,
            comment: None,
            comments: BTreeMap::new(),
        }
    }

    pub fn codec(&self) -> &SignalBase {
        &self.base
    }

    /// The untagged comment, else the English one, else any.
    pub fn comment(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .or_else(|| self.comments.get("EN").map(String::as_str))
            .or_else(|| self.comments.values().next().map(String::as_str))
    }
}

impl Deref for Signal {
    type Target = SignalBase;

    fn deref(&self) -> &SignalBase {
        &self.base
    }
}

// --- Records ---

/// Diagnostic identifier: a named, fixed-layout record of fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Did {
    pub identifier: u32,
    pub name: String,
    /// Length in bytes.
    pub length: u32,
    /// Fields in layout order.
    pub datas: Vec<Data>,
}

impl Did {
    pub fn get_data_by_name(&self, name: &str) -> Option<&Data> {
        self.datas.iter().find(|d| d.name() == name)
    }
}

/// All DIDs of one loaded document, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct InternalDatabase {
    pub dids: Vec<Did>,
}

impl InternalDatabase {
    pub fn new(dids: Vec<Did>) -> Self {
        Self { dids }
    }

    pub fn get_did_by_identifier(&self, identifier: u32) -> Option<&Did> {
        self.dids.iter().find(|d| d.identifier == identifier)
    }

    pub fn get_did_by_name(&self, name: &str) -> Option<&Did> {
        self.dids.iter().find(|d| d.name == name)
    }
}
