//! Decides how each case's fields are addressed on the wire,
//! and which field feeds each reconstruction parameter.

use crate::config::KeyMode;
use crate::error::SchemaError;
use crate::schema::{CaseDescriptor, FieldType, UnionSchema};
use anyhow::Result;
use itertools::Itertools;
use rustc_hash::FxHashSet;

/// The highest index key a positional field may carry.
/// A positional payload holds one element per key up to the highest one in use.
pub const MAX_INDEX_KEY: u32 = u16::MAX as u32;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum LayoutMode {
    Positional,
    Named,
}

impl From<KeyMode> for LayoutMode {
    fn from(keys: KeyMode) -> Self {
        match keys {
            KeyMode::Index => LayoutMode::Positional,
            KeyMode::Name => LayoutMode::Named,
        }
    }
}

/// A field's key, local to its case.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum LocalKey {
    Index(u32),
    Name(String),
}

#[derive(Clone, Debug)]
pub struct FieldSlot {
    pub name: String,
    pub ty: FieldType,
    pub key: LocalKey,
}

#[derive(Clone, Debug)]
pub struct CaseLayout {
    pub tag: i32,
    pub name: String,
    /// In declared field order.
    pub slots: Vec<FieldSlot>,
    /// Positional only. `None` iff the case has no fields.
    pub max_key: Option<u32>,
    /// Positional only. Index key -> slot, `None` at gaps.
    pub slot_by_key: Vec<Option<usize>>,
    /// Reconstruction parameter -> slot.
    pub param_slots: Vec<usize>,
    /// Position of the case in the schema's case list.
    pub source: usize,
}

impl CaseLayout {
    /// Length of the positional payload array.
    pub fn positional_len(&self) -> usize {
        self.slot_by_key.len()
    }
}

#[derive(Clone, Debug)]
pub struct UnionLayout {
    pub type_name: &'static str,
    pub mode: LayoutMode,
    /// Sorted by tag.
    pub cases: Vec<CaseLayout>,
}

pub fn plan<T>(schema: &UnionSchema<T>) -> Result<UnionLayout> {
    let type_name = schema.type_name;
    let mode = LayoutMode::from(schema.config.keys);

    let sorted = schema
        .cases
        .iter()
        .enumerate()
        .sorted_by_key(|(_, case)| case.tag)
        .collect::<Vec<_>>();
    for ((_, prev), (_, next)) in sorted.iter().tuple_windows() {
        if prev.tag == next.tag {
            return Err(SchemaError::DuplicateTag {
                type_name,
                tag: next.tag,
                first: prev.name.clone(),
                second: next.name.clone(),
            }
            .into());
        }
    }

    let cases = sorted
        .into_iter()
        .map(|(source, case)| plan_case(type_name, mode, source, case))
        .collect::<Result<Vec<_>>>()?;

    Ok(UnionLayout {
        type_name,
        mode,
        cases,
    })
}

fn plan_case<T>(
    type_name: &'static str,
    mode: LayoutMode,
    source: usize,
    case: &CaseDescriptor<T>,
) -> Result<CaseLayout> {
    let slots = case
        .fields
        .iter()
        .enumerate()
        .map(|(pos, fd)| {
            let key = match mode {
                LayoutMode::Positional => LocalKey::Index(fd.index.unwrap_or(pos as u32)),
                LayoutMode::Named => LocalKey::Name(fd.name.clone()),
            };
            FieldSlot {
                name: fd.name.clone(),
                ty: fd.ty,
                key,
            }
        })
        .collect::<Vec<_>>();

    /* Keys. */

    let mut max_key = None;
    let mut slot_by_key = vec![];
    match mode {
        LayoutMode::Positional => {
            let keys = slots
                .iter()
                .filter_map(|slot| match slot.key {
                    LocalKey::Index(i) => Some((i, slot)),
                    LocalKey::Name(_) => None,
                })
                .map(|(key, slot)| {
                    if key > MAX_INDEX_KEY {
                        return Err(SchemaError::KeyOutOfRange {
                            type_name,
                            case: case.name.clone(),
                            field: slot.name.clone(),
                            key,
                            max: MAX_INDEX_KEY,
                        });
                    }
                    Ok(key)
                })
                .collect::<Result<Vec<_>, _>>()?;
            max_key = keys.iter().max().copied();
            if let Some(max_key) = max_key {
                slot_by_key = vec![None; max_key as usize + 1];
            }
            for (slot_idx, key) in keys.into_iter().enumerate() {
                let entry = &mut slot_by_key[key as usize];
                if entry.is_some() {
                    return Err(SchemaError::DuplicateKey {
                        type_name,
                        case: case.name.clone(),
                        key,
                    }
                    .into());
                }
                *entry = Some(slot_idx);
            }
        }
        LayoutMode::Named => {
            let mut seen = FxHashSet::default();
            for slot in slots.iter() {
                if !seen.insert(slot.name.as_str()) {
                    return Err(SchemaError::DuplicateName {
                        type_name,
                        case: case.name.clone(),
                        name: slot.name.clone(),
                    }
                    .into());
                }
            }
        }
    }

    /* Params. */

    let params = case.params();
    let mut bound = vec![false; slots.len()];
    let mut param_slots = Vec::with_capacity(params.len());
    for (param_idx, param) in params.iter().enumerate() {
        let slot_idx = match mode {
            // By declared field position, whatever key that field carries.
            LayoutMode::Positional if param_idx < slots.len() => param_idx,
            LayoutMode::Positional => {
                return Err(SchemaError::ParamIndexNotFound {
                    type_name,
                    case: case.name.clone(),
                    param: param.name.clone(),
                    index: param_idx,
                }
                .into())
            }
            LayoutMode::Named => {
                let lowered = param.name.to_lowercase();
                let matches = slots
                    .iter()
                    .positions(|slot| slot.name.to_lowercase() == lowered)
                    .collect::<Vec<_>>();
                match matches[..] {
                    [slot_idx] => slot_idx,
                    [] => {
                        return Err(SchemaError::ParamNameNotFound {
                            type_name,
                            case: case.name.clone(),
                            param: param.name.clone(),
                        }
                        .into())
                    }
                    _ => {
                        return Err(SchemaError::DuplicateParamMatch {
                            type_name,
                            case: case.name.clone(),
                            param: param.name.clone(),
                        }
                        .into())
                    }
                }
            }
        };

        let slot = &slots[slot_idx];
        if slot.ty != param.ty {
            return Err(SchemaError::ParamTypeMismatch {
                type_name,
                case: case.name.clone(),
                param: param.name.clone(),
                param_type: param.ty.type_name(),
                field_type: slot.ty.type_name(),
            }
            .into());
        }
        if std::mem::replace(&mut bound[slot_idx], true) {
            return Err(SchemaError::ParamSlotReused {
                type_name,
                case: case.name.clone(),
                field: slot.name.clone(),
            }
            .into());
        }
        param_slots.push(slot_idx);
    }

    Ok(CaseLayout {
        tag: case.tag,
        name: case.name.clone(),
        slots,
        max_key,
        slot_by_key,
        param_slots,
        source,
    })
}
