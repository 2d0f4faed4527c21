//! CDD reference resolution.
//!
//! Indexes the document's DID reference table so `DIDDATAREF@didRef` can be
//! resolved to the referenced DID's structure.

use std::collections::HashMap;

use crate::cdd_model::{CddDid, DataObj, EcuDoc};

/// Pre-indexed CDD data, borrowed from the parsed document.
pub struct CddIndex<'a> {
    pub dids: HashMap<&'a str, &'a CddDid>,
}

impl<'a> CddIndex<'a> {
    pub fn build(ecu_doc: &'a EcuDoc) -> Self {
        let mut dids = HashMap::new();
        if let Some(w) = &ecu_doc.dids {
            for did in &w.items {
                if let Some(id) = did.id.as_deref() {
                    dids.insert(id, did);
                }
            }
        }
        CddIndex { dids }
    }

    /// Data objects of a referenced DID, or `None` for a dangling reference.
    pub fn resolve_data_objs(
        &self,
        did_ref: &str,
    ) -> Option<impl Iterator<Item = &'a DataObj> + use<'a>> {
        self.dids
            .get(did_ref)
            .copied()
            .map(|did| did.structures.iter().flat_map(|s| &s.data_objs))
    }
}
