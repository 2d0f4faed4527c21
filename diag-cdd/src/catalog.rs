//! Data type catalog: `DATATYPES` -> id-keyed type descriptions.

use std::collections::{BTreeMap, HashMap};

use diag_signal::{ByteOrder, Choices, NamedSignalValue, SegmentValue};
use serde::Serialize;

use crate::cdd_model::{CValueType, CddDataType, Comp, DataTypesWrapper, TextMap};
use crate::parser::{parse_attr, parse_opt_attr, CddParseError};

/// Reusable description of one CDD data type (or one segment of a
/// piecewise type).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataType {
    pub id: String,
    pub name: String,
    pub bit_length: u32,
    pub encoding: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub choices: Option<Choices>,
    pub byte_order: ByteOrder,
    pub unit: Option<String>,
    pub scale: f64,
    pub offset: f64,
}

/// All data types of a document keyed by their `id`. Piecewise types hold
/// one [`DataType`] per component, in declaration order.
#[derive(Debug, Default)]
pub struct DataTypeCatalog {
    types: HashMap<String, SegmentValue<DataType>>,
}

impl DataTypeCatalog {
    pub fn get(&self, id: &str) -> Option<&SegmentValue<DataType>> {
        self.types.get(id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SegmentValue<DataType>)> {
        self.types.iter().map(|(id, t)| (id.as_str(), t))
    }
}

/// Build the catalog from a `DATATYPES` element. A later declaration with an
/// already used id replaces the earlier one.
pub fn load_data_types(data_types: &DataTypesWrapper) -> Result<DataTypeCatalog, CddParseError> {
    let mut types = HashMap::new();
    for dt in data_types.all() {
        let (id, entry) = load_data_type(dt)?;
        types.insert(id, entry);
    }
    log::info!("Loaded {} data types", types.len());
    Ok(DataTypeCatalog { types })
}

fn load_data_type(dt: &CddDataType) -> Result<(String, SegmentValue<DataType>), CddParseError> {
    let id = dt
        .id
        .clone()
        .ok_or_else(|| CddParseError::missing_attribute("data type", "id"))?;
    let element = format!("data type '{id}'");
    let name = dt
        .name
        .as_ref()
        .and_then(|n| n.first())
        .unwrap_or_default()
        .to_string();

    let cvalue = dt
        .cvalue_type
        .as_ref()
        .ok_or_else(|| CddParseError::MissingElement(format!("CVALUETYPE of {element}")))?;
    let bit_length = parse_bit_length(&element, cvalue)?;
    let byte_order = parse_byte_order(&element, cvalue.bo.as_deref())?;
    let minimum = parse_opt_attr::<i64>(&element, "minsz", cvalue.minsz.as_deref())?.map(|v| v as f64);
    let maximum = parse_opt_attr::<i64>(&element, "maxsz", cvalue.maxsz.as_deref())?.map(|v| v as f64);

    let unit = dt
        .pvalue_type
        .as_ref()
        .and_then(|p| p.unit.clone())
        .filter(|u| !u.is_empty());
    let choices = load_choices(&element, &dt.text_maps)?;

    let base = DataType {
        id: id.clone(),
        name,
        bit_length,
        encoding: cvalue.enc.clone(),
        minimum,
        maximum,
        choices,
        byte_order,
        unit,
        scale: 1.0,
        offset: 0.0,
    };

    let entry = match dt.comps.as_slice() {
        [] => SegmentValue::Scalar(base),
        [comp] => {
            let (scale, offset) = parse_comp(&element, comp)?;
            SegmentValue::Scalar(DataType { scale, offset, ..base })
        }
        comps => SegmentValue::Segmented(
            comps
                .iter()
                .map(|comp| {
                    let (scale, offset) = parse_comp(&element, comp)?;
                    Ok(DataType {
                        minimum: Some(parse_attr(&element, "s", comp.s.as_deref())?),
                        maximum: Some(parse_attr(&element, "e", comp.e.as_deref())?),
                        scale,
                        offset,
                        ..base.clone()
                    })
                })
                .collect::<Result<Vec<_>, CddParseError>>()?,
        ),
    };
    Ok((id, entry))
}

fn parse_bit_length(element: &str, cvalue: &CValueType) -> Result<u32, CddParseError> {
    let bit_length: u32 = parse_attr(element, "bl", cvalue.bl.as_deref())?;
    if bit_length == 0 {
        return Err(CddParseError::InvalidAttribute {
            element: element.to_string(),
            attribute: "bl".into(),
            value: "0".into(),
        });
    }
    Ok(bit_length)
}

/// `"21"` is Motorola (big endian), `"12"` Intel (little endian).
fn parse_byte_order(element: &str, bo: Option<&str>) -> Result<ByteOrder, CddParseError> {
    match bo {
        Some("21") => Ok(ByteOrder::BigEndian),
        Some("12") => Ok(ByteOrder::LittleEndian),
        Some(other) => Err(CddParseError::UnknownByteOrder(other.to_string())),
        None => Err(CddParseError::missing_attribute(element, "bo")),
    }
}

fn parse_comp(element: &str, comp: &Comp) -> Result<(f64, f64), CddParseError> {
    let scale = parse_attr(element, "f", comp.f.as_deref())?;
    let offset = parse_attr(element, "o", comp.o.as_deref())?;
    Ok((scale, offset))
}

/// Only single-value entries (`s == e`) become choices; ranged entries have
/// no one raw value to map.
fn load_choices(element: &str, text_maps: &[TextMap]) -> Result<Option<Choices>, CddParseError> {
    let mut choices = BTreeMap::new();
    for map in text_maps {
        let start = parse_parenthesized(element, "s", map.s.as_deref())?;
        let end = parse_parenthesized(element, "e", map.e.as_deref())?;
        let Some(text) = &map.text else {
            continue;
        };
        if start != end {
            log::debug!("Skipping ranged text entry ({start})..({end}) of {element}");
            continue;
        }
        let label = text.first().unwrap_or_default();
        let comments: BTreeMap<String, String> = text
            .tuvs
            .iter()
            .skip(1)
            .filter_map(|tuv| Some((tuv.lang.clone()?, tuv.value.clone().unwrap_or_default())))
            .collect();
        choices.insert(
            start,
            NamedSignalValue::new(start, label).with_comments(comments),
        );
    }
    Ok((!choices.is_empty()).then_some(choices))
}

fn parse_parenthesized(element: &str, attribute: &str, value: Option<&str>) -> Result<i64, CddParseError> {
    let value = value.map(|v| v.trim().trim_start_matches('(').trim_end_matches(')').trim());
    parse_attr(element, attribute, value)
}
