use super::{Addressing, CasePlan, UnionCodec};
use crate::config::Representation;
use crate::error::FormatError;
use crate::layout::FieldSlot;
use crate::resolver::Resolver;
use crate::schema::{FieldRef, FieldType};
use anyhow::Result;
use std::io::Write;
use tagpack_wire::serde::{self as wire, WriteLen};

fn ser_raw(bytes: &[u8], w: &mut dyn Write) -> Result<WriteLen> {
    w.write_all(bytes)?;
    Ok(WriteLen::new_manual(bytes.len()))
}

impl<T> UnionCodec<T> {
    pub fn encode_value(
        &self,
        value: &T,
        w: &mut dyn Write,
        resolver: &Resolver,
    ) -> Result<WriteLen> {
        let tag = (self.tag_of)(value);
        let case = self
            .case_idx(tag)
            .map(|case_idx| &self.cases[case_idx])
            .ok_or(FormatError::UnknownTag {
                type_name: self.type_name,
                tag,
            })?;

        let fields = (case.deconstruct)(value);
        let slots = &case.layout.slots;
        if fields.len() != slots.len() {
            return Err(FormatError::FieldCountMismatch {
                type_name: self.type_name,
                case: case.layout.name.clone(),
                expected: slots.len(),
                found: fields.len(),
            }
            .into());
        }

        let mut w_len = ser_raw(&case.head, w)?;
        w_len += ser_raw(&case.payload_head, w)?;
        match &self.addressing {
            Addressing::Positional => {
                for slot_idx in case.layout.slot_by_key.iter() {
                    w_len += match slot_idx {
                        Some(slot_idx) => {
                            self.encode_field(case, &slots[*slot_idx], &fields[*slot_idx], w, resolver)?
                        }
                        None => wire::ser_nil(w)?,
                    };
                }
            }
            Addressing::Named(_) => {
                for (slot_idx, slot) in slots.iter().enumerate() {
                    w_len += ser_raw(&case.names[slot_idx], w)?;
                    w_len += self.encode_field(case, slot, &fields[slot_idx], w, resolver)?;
                }
            }
        }
        Ok(w_len)
    }

    /// `None` is written as nil, for a reference-like representation only.
    pub fn encode_opt(
        &self,
        value: Option<&T>,
        w: &mut dyn Write,
        resolver: &Resolver,
    ) -> Result<WriteLen> {
        match (value, self.representation) {
            (Some(value), _) => self.encode_value(value, w, resolver),
            (None, Representation::Reference) => wire::ser_nil(w),
            (None, Representation::Value) => Err(FormatError::AbsentValueType {
                type_name: self.type_name,
            }
            .into()),
        }
    }

    fn encode_field(
        &self,
        case: &CasePlan<T>,
        slot: &FieldSlot,
        field: &FieldRef<'_>,
        w: &mut dyn Write,
        resolver: &Resolver,
    ) -> Result<WriteLen> {
        let w_len = match (&slot.ty, field) {
            (FieldType::Prim(kind), field) => kind.ser(field, w)?,
            (FieldType::Nested(nested), FieldRef::Nested(value)) if nested.admits(*value) => {
                Some(nested.ser(resolver, *value, w)?)
            }
            _ => None,
        };
        w_len.ok_or_else(|| {
            FormatError::FieldTypeMismatch {
                type_name: self.type_name,
                case: case.layout.name.clone(),
                field: slot.name.clone(),
                expected: slot.ty.type_name(),
                found: field.kind_name(),
            }
            .into()
        })
    }
}
