use crate::error::SchemaError;
use crate::layout::{LocalKey, UnionLayout};
use anyhow::Result;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

/// The case tag as 4 big-endian bytes, followed by the field name's UTF-8 bytes.
/// The fixed-width tag means distinct (tag, name) pairs never share a key.
pub fn composite_key(tag: i32, name: &[u8], buf: &mut Vec<u8>) {
    buf.clear();
    buf.extend_from_slice(&tag.to_be_bytes());
    buf.extend_from_slice(name);
}

/// Composite key -> (case index in the layout, slot index in the case).
#[derive(Debug)]
pub struct KeyMap {
    map: FxHashMap<Box<[u8]>, (usize, usize)>,
}

impl KeyMap {
    pub fn build(layout: &UnionLayout) -> Result<Self> {
        let mut map = FxHashMap::default();
        let mut buf = vec![];
        for (case_idx, case) in layout.cases.iter().enumerate() {
            for (slot_idx, slot) in case.slots.iter().enumerate() {
                let name = match &slot.key {
                    LocalKey::Name(name) => name,
                    LocalKey::Index(_) => continue,
                };
                composite_key(case.tag, name.as_bytes(), &mut buf);
                match map.entry(Box::from(&buf[..])) {
                    Entry::Vacant(entry) => {
                        entry.insert((case_idx, slot_idx));
                    }
                    Entry::Occupied(entry) => {
                        let (other_case_idx, _) = *entry.get();
                        return Err(SchemaError::KeyCollision {
                            type_name: layout.type_name,
                            case: case.name.clone(),
                            field: slot.name.clone(),
                            other_case: layout.cases[other_case_idx].name.clone(),
                        }
                        .into());
                    }
                }
            }
        }
        Ok(Self { map })
    }

    /// `scratch` is overwritten.
    pub fn lookup(&self, scratch: &mut Vec<u8>, tag: i32, name: &[u8]) -> Option<(usize, usize)> {
        composite_key(tag, name, scratch);
        self.map.get(&scratch[..]).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
