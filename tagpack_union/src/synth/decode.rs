use super::{Addressing, CasePlan, UnionCodec};
use crate::codec::ReadSeek;
use crate::config::{Representation, UnknownTagPolicy};
use crate::error::FormatError;
use crate::layout::FieldSlot;
use crate::resolver::Resolver;
use crate::schema::{Args, FieldType, FieldValue};
use anyhow::{Context, Result};
use tagpack_wire::serde as wire;

/// The outcome of reading one envelope.
#[derive(Debug)]
pub enum Decoded<T> {
    Value(T),
    /// A nil in place of the envelope.
    Absent,
    /// A well-formed envelope whose tag matches no case. Its payload was consumed.
    UnknownTag(i32),
}

impl<T> UnionCodec<T> {
    pub fn decode_envelope(
        &self,
        r: &mut dyn ReadSeek,
        resolver: &Resolver,
    ) -> Result<(usize, Decoded<T>)> {
        /* nil */
        if wire::is_nil(r)? {
            return match self.representation {
                Representation::Reference => Ok((wire::deser_nil(r)?, Decoded::Absent)),
                Representation::Value => Err(FormatError::NilForValueType {
                    type_name: self.type_name,
                }
                .into()),
            };
        }

        /* envelope */
        let (mut r_len, len) = wire::deser_array_header(r)?;
        if len != 2 {
            return Err(FormatError::EnvelopeLength {
                type_name: self.type_name,
                len,
            }
            .into());
        }
        let (delta_r_len, tag) = wire::deser_int(r)?;
        r_len += delta_r_len;
        let tag: i32 = tag
            .narrow()
            .with_context(|| format!("{}: reading tag", self.type_name))?;

        /* case */
        let case = match self.case_idx(tag) {
            Some(case_idx) => &self.cases[case_idx],
            None => match self.unknown_tag {
                UnknownTagPolicy::Skip => {
                    r_len += wire::skip(r)?;
                    tracing::debug!(type_name = self.type_name, tag, "Skipped unknown tag");
                    return Ok((r_len, Decoded::UnknownTag(tag)));
                }
                UnknownTagPolicy::Reject => {
                    return Err(FormatError::UnknownTag {
                        type_name: self.type_name,
                        tag,
                    }
                    .into());
                }
            },
        };

        /* payload */
        let slots = &case.layout.slots;
        let mut values = slots.iter().map(|_| None).collect::<Vec<Option<FieldValue>>>();
        match &self.addressing {
            Addressing::Positional => {
                let (delta_r_len, len) = wire::deser_array_header(r)?;
                r_len += delta_r_len;
                for key in 0..len as usize {
                    match case.layout.slot_by_key.get(key).copied().flatten() {
                        Some(slot_idx) => {
                            let (delta_r_len, value) =
                                self.decode_field(case, &slots[slot_idx], r, resolver)?;
                            r_len += delta_r_len;
                            values[slot_idx] = value;
                        }
                        None => {
                            r_len += wire::skip(r)?;
                            tracing::trace!(type_name = self.type_name, tag, key, "Skipped gap");
                        }
                    }
                }
            }
            Addressing::Named(key_map) => {
                let (delta_r_len, len) = wire::deser_map_header(r)?;
                r_len += delta_r_len;
                let mut scratch = vec![];
                for _ in 0..len {
                    let (delta_r_len, name) = wire::deser_str_bytes(r)?;
                    r_len += delta_r_len;
                    match key_map.lookup(&mut scratch, tag, &name) {
                        Some((_, slot_idx)) => {
                            let (delta_r_len, value) =
                                self.decode_field(case, &slots[slot_idx], r, resolver)?;
                            r_len += delta_r_len;
                            values[slot_idx] = value;
                        }
                        None => {
                            r_len += wire::skip(r)?;
                            tracing::trace!(
                                type_name = self.type_name,
                                tag,
                                field = %String::from_utf8_lossy(&name),
                                "Skipped unknown field"
                            );
                        }
                    }
                }
            }
        }

        /* reconstruct */
        let args = case
            .layout
            .param_slots
            .iter()
            .map(|&slot_idx| {
                values[slot_idx].take().unwrap_or_else(|| {
                    tracing::trace!(
                        type_name = self.type_name,
                        tag,
                        field = %slots[slot_idx].name,
                        "Defaulted missing field"
                    );
                    slots[slot_idx].ty.default_value()
                })
            })
            .collect::<Vec<_>>();
        let args = Args::new(self.type_name, &case.layout.name, args);
        let value = (case.reconstruct)(args)
            .with_context(|| format!("{}.{}: reconstructing", self.type_name, case.layout.name))?;

        Ok((r_len, Decoded::Value(value)))
    }

    /// A nil in a primitive slot leaves the slot unset.
    fn decode_field(
        &self,
        case: &CasePlan<T>,
        slot: &FieldSlot,
        r: &mut dyn ReadSeek,
        resolver: &Resolver,
    ) -> Result<(usize, Option<FieldValue>)> {
        let context = || format!("{}.{}.{}", self.type_name, case.layout.name, slot.name);
        match &slot.ty {
            FieldType::Prim(kind) => {
                if wire::is_nil(r)? {
                    return Ok((wire::deser_nil(r)?, None));
                }
                let (r_len, value) = kind.deser(r).with_context(context)?;
                Ok((r_len, Some(value)))
            }
            FieldType::Nested(nested) => {
                let (r_len, value) = nested.deser(resolver, r).with_context(context)?;
                Ok((r_len, Some(FieldValue::Nested(value))))
            }
        }
    }
}
