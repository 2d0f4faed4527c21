//! CDD parser: XML string -> InternalDatabase.
//!
//! Orchestrates the phases:
//! 1. XML deserialization (cdd_model)
//! 2. Data type catalog (catalog)
//! 3. DID reference index (ref_resolver)
//! 4. DID assembly (this module)

use std::str::FromStr;

use diag_signal::{
    cdd_offset_to_dbc_start_bit, CodecError, Data, Diagnostic, DiagnosticSink, Did,
    InternalDatabase, Interval, SegmentValue, SignalBase,
};
use thiserror::Error;

use crate::catalog::{load_data_types, DataType, DataTypeCatalog};
use crate::cdd_model::{Candela, DataObj, DiagInst};
use crate::ref_resolver::CddIndex;

#[derive(Debug, Error)]
pub enum CddParseError {
    #[error("XML deserialization failed: {0}")]
    XmlError(#[from] quick_xml::DeError),
    #[error("Missing required element: {0}")]
    MissingElement(String),
    #[error("Missing required attribute '{attribute}' on {element}")]
    MissingAttribute { element: String, attribute: String },
    #[error("Invalid value '{value}' for attribute '{attribute}' on {element}")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
    #[error("Unknown byte order code '{0}'")]
    UnknownByteOrder(String),
    #[error("DID '{did}' references unknown data type '{dtref}'")]
    UnknownDataType { did: String, dtref: String },
    #[error("DID '{did}' exceeds the addressable bit range at field '{field}'")]
    BitOffsetOverflow { did: String, field: String },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl CddParseError {
    pub(crate) fn missing_attribute(element: &str, attribute: &str) -> Self {
        CddParseError::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

/// Result of a successful parse: the database plus every tolerated problem
/// found on the way.
#[derive(Debug)]
pub struct ParsedCdd {
    pub database: InternalDatabase,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a CDD XML string. Diagnostics are collected and also logged.
pub fn parse_cdd(xml: &str) -> Result<ParsedCdd, CddParseError> {
    let mut diagnostics = Vec::new();
    let database = parse_cdd_with(xml, &mut diagnostics)?;
    for diagnostic in &diagnostics {
        log::warn!("{diagnostic}");
    }
    Ok(ParsedCdd {
        database,
        diagnostics,
    })
}

/// Parse a CDD XML string, reporting diagnostics to `sink`.
pub fn parse_cdd_with(
    xml: &str,
    sink: &mut dyn DiagnosticSink,
) -> Result<InternalDatabase, CddParseError> {
    // Phase 1: XML deserialization
    let doc: Candela = quick_xml::de::from_str(xml)?;
    let ecu_doc = doc
        .ecu_doc
        .as_ref()
        .ok_or_else(|| CddParseError::MissingElement("ECUDOC".into()))?;

    // Phase 2: Data type catalog
    let catalog = match &ecu_doc.data_types {
        Some(data_types) => load_data_types(data_types)?,
        None => DataTypeCatalog::default(),
    };

    // Phase 3: DID reference index
    let index = CddIndex::build(ecu_doc);

    // Phase 4: DIDs of the first variant of the first ECU
    let var = ecu_doc
        .ecus
        .first()
        .ok_or_else(|| CddParseError::MissingElement("ECU".into()))?
        .vars
        .first()
        .ok_or_else(|| CddParseError::MissingElement("ECU/VAR".into()))?;

    let mut dids = Vec::new();
    for class in &var.diag_classes {
        for inst in &class.diag_insts {
            dids.push(load_did(inst, &catalog, &index, sink)?);
        }
    }
    log::info!("Loaded {} DIDs", dids.len());
    Ok(InternalDatabase::new(dids))
}

fn load_did(
    inst: &DiagInst,
    catalog: &DataTypeCatalog,
    index: &CddIndex,
    sink: &mut dyn DiagnosticSink,
) -> Result<Did, CddParseError> {
    let name = inst
        .qual
        .clone()
        .ok_or_else(|| CddParseError::MissingElement("QUAL of DIAGINST".into()))?;
    let element = format!("DIAGINST '{name}'");
    let static_value = inst
        .static_value
        .as_ref()
        .ok_or_else(|| CddParseError::MissingElement(format!("STATICVALUE of {element}")))?;
    let identifier: u32 = parse_attr(&element, "v", static_value.v.as_deref())?;

    let data_objs = collect_data_objs(&name, inst, index, sink);

    let mut bit_offset: u32 = 0;
    let mut datas = Vec::new();
    for obj in data_objs {
        let field = obj.qual.clone().unwrap_or_default();
        let Some(dtref) = obj.dtref.as_deref().filter(|r| !r.is_empty()) else {
            log::debug!("Skipping field '{field}' of {element}: no data type reference");
            sink.report(Diagnostic::UnresolvedField {
                did: name.clone(),
                field,
            });
            continue;
        };
        let data_type = catalog
            .get(dtref)
            .ok_or_else(|| CddParseError::UnknownDataType {
                did: name.clone(),
                dtref: dtref.to_string(),
            })?;
        let Some(data) = load_data(field, data_type, bit_offset, sink)? else {
            continue;
        };
        bit_offset = bit_offset.checked_add(data.length()).ok_or_else(|| {
            CddParseError::BitOffsetOverflow {
                did: name.clone(),
                field: data.name().to_string(),
            }
        })?;
        datas.push(data);
    }

    Ok(Did {
        identifier,
        name,
        length: bit_offset.div_ceil(8),
        datas,
    })
}

/// Direct fields first, then union members, then fields of referenced DIDs.
fn collect_data_objs<'a>(
    did: &str,
    inst: &'a DiagInst,
    index: &CddIndex<'a>,
    sink: &mut dyn DiagnosticSink,
) -> Vec<&'a DataObj> {
    let conts = &inst.simple_comp_conts;
    let mut data_objs: Vec<&DataObj> = conts.iter().flat_map(|c| &c.data_objs).collect();

    data_objs.extend(
        conts
            .iter()
            .flat_map(|c| &c.unions)
            .flat_map(|u| &u.structs)
            .flat_map(|s| &s.data_objs),
    );

    for data_ref in conts.iter().flat_map(|c| &c.did_data_refs) {
        let reference = data_ref.did_ref.clone().unwrap_or_default();
        match index.resolve_data_objs(&reference) {
            Some(objs) => data_objs.extend(objs),
            None => sink.report(Diagnostic::MissingDidReference {
                did: did.to_string(),
                reference,
            }),
        }
    }
    data_objs
}

/// Build one `Data` at `bit_offset`; `None` for an empty piecewise table.
fn load_data(
    name: String,
    data_type: &SegmentValue<DataType>,
    bit_offset: u32,
    sink: &mut dyn DiagnosticSink,
) -> Result<Option<Data>, CddParseError> {
    let Some(first) = data_type.first() else {
        return Ok(None);
    };
    let start = cdd_offset_to_dbc_start_bit(bit_offset, first.bit_length, first.byte_order);

    let builder = SignalBase::builder(name, start, first.bit_length)
        .byte_order(first.byte_order)
        .unit(first.unit.clone())
        .choices(first.choices.clone());

    let builder = match data_type {
        SegmentValue::Scalar(t) => builder
            .linear(t.scale, t.offset)
            .minimum(t.minimum.map(SegmentValue::Scalar))
            .maximum(t.maximum.map(SegmentValue::Scalar)),
        SegmentValue::Segmented(types) => {
            let minimum: Vec<f64> = types
                .iter()
                .map(|t| t.minimum.unwrap_or(f64::NEG_INFINITY))
                .collect();
            let maximum: Vec<f64> = types
                .iter()
                .map(|t| t.maximum.unwrap_or(f64::INFINITY))
                .collect();
            let segments = types
                .iter()
                .zip(minimum.iter().zip(&maximum))
                .map(|(t, (&min, &max))| (Interval::new(min, max), t.scale, t.offset));
            builder
                .piecewise(segments)
                .minimum(Some(SegmentValue::Segmented(minimum)))
                .maximum(Some(SegmentValue::Segmented(maximum)))
        }
    };

    Ok(Some(Data::new(builder.build_with(sink)?)))
}

pub(crate) fn parse_attr<T: FromStr>(
    element: &str,
    attribute: &str,
    value: Option<&str>,
) -> Result<T, CddParseError> {
    parse_opt_attr(element, attribute, value)?
        .ok_or_else(|| CddParseError::missing_attribute(element, attribute))
}

pub(crate) fn parse_opt_attr<T: FromStr>(
    element: &str,
    attribute: &str,
    value: Option<&str>,
) -> Result<Option<T>, CddParseError> {
    value
        .map(|v| {
            v.trim().parse().map_err(|_| CddParseError::InvalidAttribute {
                element: element.to_string(),
                attribute: attribute.to_string(),
                value: v.to_string(),
            })
        })
        .transpose()
}
