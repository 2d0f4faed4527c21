//! CDD XML deserialization model.
//!
//! Serde-deserializable types for the subset of the CANdela document
//! structure needed to assemble DIDs. Uses quick-xml with
//! `#[serde(rename = "TAG")]` for CDD element names; everything else in the
//! document is skipped by serde.

use serde::Deserialize;

// --- Root ---

#[derive(Debug, Deserialize)]
#[serde(rename = "CANDELA")]
pub struct Candela {
    #[serde(rename = "@dtdvers")]
    pub dtd_version: Option<String>,
    #[serde(rename = "ECUDOC")]
    pub ecu_doc: Option<EcuDoc>,
}

#[derive(Debug, Deserialize)]
pub struct EcuDoc {
    #[serde(rename = "DATATYPES")]
    pub data_types: Option<DataTypesWrapper>,
    #[serde(rename = "DIDS")]
    pub dids: Option<DidsWrapper>,
    #[serde(rename = "ECU", default)]
    pub ecus: Vec<Ecu>,
}

// --- Data types ---

/// All data type kinds share one shape; the kind only decides which
/// children are meaningful.
#[derive(Debug, Default, Deserialize)]
pub struct DataTypesWrapper {
    #[serde(rename = "IDENT", default)]
    pub idents: Vec<CddDataType>,
    #[serde(rename = "LINCOMP", default)]
    pub lin_comps: Vec<CddDataType>,
    #[serde(rename = "TEXTTBL", default)]
    pub text_tables: Vec<CddDataType>,
    #[serde(rename = "STRUCTDT", default)]
    pub struct_types: Vec<CddDataType>,
    #[serde(rename = "EOSITERDT", default)]
    pub iterator_types: Vec<CddDataType>,
    #[serde(rename = "COMPTBL", default)]
    pub comp_tables: Vec<CddDataType>,
}

impl DataTypesWrapper {
    /// All declared data types, grouped by kind in document kind order.
    pub fn all(&self) -> impl Iterator<Item = &CddDataType> {
        self.idents
            .iter()
            .chain(&self.lin_comps)
            .chain(&self.text_tables)
            .chain(&self.struct_types)
            .chain(&self.iterator_types)
            .chain(&self.comp_tables)
    }
}

#[derive(Debug, Deserialize)]
pub struct CddDataType {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(rename = "NAME")]
    pub name: Option<MultiLangText>,
    #[serde(rename = "CVALUETYPE")]
    pub cvalue_type: Option<CValueType>,
    #[serde(rename = "PVALUETYPE")]
    pub pvalue_type: Option<PValueType>,
    #[serde(rename = "TEXTMAP", default)]
    pub text_maps: Vec<TextMap>,
    #[serde(rename = "COMP", default)]
    pub comps: Vec<Comp>,
}

/// Coded (on-the-wire) value description.
#[derive(Debug, Deserialize)]
pub struct CValueType {
    #[serde(rename = "@bl")]
    pub bl: Option<String>,
    #[serde(rename = "@bo")]
    pub bo: Option<String>,
    #[serde(rename = "@enc")]
    pub enc: Option<String>,
    #[serde(rename = "@minsz")]
    pub minsz: Option<String>,
    #[serde(rename = "@maxsz")]
    pub maxsz: Option<String>,
}

/// Physical value description.
#[derive(Debug, Deserialize)]
pub struct PValueType {
    #[serde(rename = "UNIT")]
    pub unit: Option<String>,
}

/// Text table entry; `s`/`e` are parenthesized integers like `(3)`.
#[derive(Debug, Deserialize)]
pub struct TextMap {
    #[serde(rename = "@s")]
    pub s: Option<String>,
    #[serde(rename = "@e")]
    pub e: Option<String>,
    #[serde(rename = "TEXT")]
    pub text: Option<MultiLangText>,
}

/// Linear computation `f * raw + o`, optionally restricted to `[s, e]`.
#[derive(Debug, Deserialize)]
pub struct Comp {
    #[serde(rename = "@s")]
    pub s: Option<String>,
    #[serde(rename = "@e")]
    pub e: Option<String>,
    #[serde(rename = "@f")]
    pub f: Option<String>,
    #[serde(rename = "@o")]
    pub o: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MultiLangText {
    #[serde(rename = "TUV", default)]
    pub tuvs: Vec<Tuv>,
}

impl MultiLangText {
    /// Text of the first translation unit.
    pub fn first(&self) -> Option<&str> {
        self.tuvs.first().and_then(|t| t.value.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct Tuv {
    #[serde(rename = "@lang")]
    pub lang: Option<String>,
    #[serde(rename = "$text")]
    pub value: Option<String>,
}

// --- DID reference table ---

#[derive(Debug, Deserialize)]
pub struct DidsWrapper {
    #[serde(rename = "DID", default)]
    pub items: Vec<CddDid>,
}

#[derive(Debug, Deserialize)]
pub struct CddDid {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(rename = "STRUCTURE", default)]
    pub structures: Vec<DataObjContainer>,
}

// --- ECU / variants / diagnostic instances ---

#[derive(Debug, Deserialize)]
pub struct Ecu {
    #[serde(rename = "VAR", default)]
    pub vars: Vec<Var>,
}

#[derive(Debug, Deserialize)]
pub struct Var {
    #[serde(rename = "DIAGCLASS", default)]
    pub diag_classes: Vec<DiagClass>,
}

#[derive(Debug, Deserialize)]
pub struct DiagClass {
    #[serde(rename = "DIAGINST", default)]
    pub diag_insts: Vec<DiagInst>,
}

#[derive(Debug, Deserialize)]
pub struct DiagInst {
    #[serde(rename = "QUAL")]
    pub qual: Option<String>,
    #[serde(rename = "STATICVALUE")]
    pub static_value: Option<StaticValue>,
    #[serde(rename = "SIMPLECOMPCONT", default)]
    pub simple_comp_conts: Vec<SimpleCompCont>,
}

#[derive(Debug, Deserialize)]
pub struct StaticValue {
    #[serde(rename = "@v")]
    pub v: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SimpleCompCont {
    #[serde(rename = "DATAOBJ", default)]
    pub data_objs: Vec<DataObj>,
    #[serde(rename = "UNION", default)]
    pub unions: Vec<Union>,
    #[serde(rename = "DIDDATAREF", default)]
    pub did_data_refs: Vec<DidDataRef>,
}

#[derive(Debug, Deserialize)]
pub struct Union {
    #[serde(rename = "STRUCT", default)]
    pub structs: Vec<DataObjContainer>,
}

/// `STRUCT` inside a union and `STRUCTURE` inside a referenced DID.
#[derive(Debug, Deserialize)]
pub struct DataObjContainer {
    #[serde(rename = "DATAOBJ", default)]
    pub data_objs: Vec<DataObj>,
}

#[derive(Debug, Deserialize)]
pub struct DidDataRef {
    #[serde(rename = "@didRef")]
    pub did_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DataObj {
    #[serde(rename = "@dtref")]
    pub dtref: Option<String>,
    #[serde(rename = "QUAL")]
    pub qual: Option<String>,
}
