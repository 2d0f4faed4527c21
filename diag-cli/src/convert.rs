use anyhow::{Context, Result};
use diag_signal::{Data, Did, InternalDatabase, RawValue, SignalValue};
use std::path::Path;

use crate::load_database;

/// Direction of a conversion, with the value as typed on the command line.
#[derive(Debug)]
pub enum Request {
    Raw(String),
    Scaled(String),
}

pub fn run_convert(
    input: &Path,
    did: &str,
    data: &str,
    request: &Request,
    decode_choices: bool,
    verbose: bool,
) -> Result<()> {
    let parsed = load_database(input, verbose)?;
    let did = find_did(&parsed.database, did)?;
    let data = find_data(did, data)?;

    println!("{}", convert(data, request, decode_choices)?);
    Ok(())
}

fn convert(data: &Data, request: &Request, decode_choices: bool) -> Result<String> {
    let line = match request {
        Request::Raw(text) => {
            let raw = parse_raw(text)?;
            let scaled = data
                .raw_to_scaled(raw, decode_choices)
                .with_context(|| format!("scaling raw value {raw} of '{}'", data.name()))?;
            match (&scaled, data.unit()) {
                (SignalValue::Integer(_) | SignalValue::Float(_), Some(unit)) => {
                    format!("{scaled} {unit}")
                }
                _ => scaled.to_string(),
            }
        }
        Request::Scaled(text) => {
            let scaled = parse_scaled(text);
            data.scaled_to_raw(scaled)
                .with_context(|| format!("encoding '{text}' for '{}'", data.name()))?
                .to_string()
        }
    };
    Ok(line)
}

/// Look a DID up by name first, then by identifier.
fn find_did<'a>(db: &'a InternalDatabase, key: &str) -> Result<&'a Did> {
    if let Some(did) = db.get_did_by_name(key) {
        return Ok(did);
    }
    parse_identifier(key)
        .and_then(|id| db.get_did_by_identifier(id))
        .with_context(|| format!("no DID named or numbered '{key}'"))
}

fn find_data<'a>(did: &'a Did, name: &str) -> Result<&'a Data> {
    did.get_data_by_name(name)
        .with_context(|| format!("DID '{}' has no data element '{name}'", did.name))
}

fn parse_identifier(text: &str) -> Option<u32> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn parse_raw(text: &str) -> Result<RawValue> {
    if let Ok(v) = text.parse::<i64>() {
        return Ok(RawValue::Integer(v));
    }
    let v: f64 = text
        .parse()
        .with_context(|| format!("raw value '{text}' is not a number"))?;
    Ok(RawValue::Float(v))
}

/// Numbers are scaled values, anything else is a choice label.
fn parse_scaled(text: &str) -> SignalValue {
    if let Ok(v) = text.parse::<i64>() {
        SignalValue::Integer(v)
    } else if let Ok(v) = text.parse::<f64>() {
        SignalValue::Float(v)
    } else {
        SignalValue::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diag_signal::{NamedSignalValue, SignalBase};

    fn database() -> InternalDatabase {
        let speed = SignalBase::builder("Speed", 0, 16)
            .linear(0.5, 0.0)
            .unit(Some("km/h".into()))
            .build()
            .unwrap();
        let mode = SignalBase::builder("Mode", 16, 8)
            .choices(Some(
                [(0, NamedSignalValue::new(0, "Idle")), (1, NamedSignalValue::new(1, "Run"))]
                    .into_iter()
                    .collect(),
            ))
            .build()
            .unwrap();
        InternalDatabase::new(vec![Did {
            identifier: 0xF40D,
            name: "VehicleState".into(),
            length: 3,
            datas: vec![Data::new(speed), Data::new(mode)],
        }])
    }

    #[test]
    fn test_find_did_by_name_and_identifier() {
        let db = database();
        assert_eq!(find_did(&db, "VehicleState").unwrap().identifier, 0xF40D);
        assert_eq!(find_did(&db, "0xF40D").unwrap().name, "VehicleState");
        assert_eq!(find_did(&db, "62477").unwrap().name, "VehicleState");
        assert!(find_did(&db, "0x1").is_err());
        assert!(find_did(&db, "Unknown").is_err());
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(parse_raw("12").unwrap(), RawValue::Integer(12));
        assert_eq!(parse_raw("1.5").unwrap(), RawValue::Float(1.5));
        assert!(parse_raw("abc").is_err());
        assert_eq!(parse_scaled("-3"), SignalValue::Integer(-3));
        assert_eq!(parse_scaled("Run"), SignalValue::Text("Run".into()));
    }

    #[test]
    fn test_convert_raw_appends_unit() {
        let db = database();
        let speed = find_data(&db.dids[0], "Speed").unwrap();
        let line = convert(speed, &Request::Raw("100".into()), true).unwrap();
        assert_eq!(line, "50 km/h");
    }

    #[test]
    fn test_convert_choices() {
        let db = database();
        let mode = find_data(&db.dids[0], "Mode").unwrap();
        assert_eq!(convert(mode, &Request::Raw("1".into()), true).unwrap(), "Run");
        assert_eq!(convert(mode, &Request::Raw("1".into()), false).unwrap(), "1");
        assert_eq!(convert(mode, &Request::Scaled("Idle".into()), true).unwrap(), "0");
        assert!(convert(mode, &Request::Scaled("Stop".into()), true).is_err());
    }
}
