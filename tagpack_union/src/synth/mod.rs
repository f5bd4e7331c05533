//! Per-type codec plans.
//!
//! A plan is built once from a `UnionSchema` and then only read. It holds, per case,
//! the slot layout plus every header and field name already encoded, so that
//! encoding is a sequence of byte copies around the field values.
//! Decoding dispatches by tag with a binary search, then by index or by composite key.

mod decode;
mod encode;
mod nullable;

pub use decode::Decoded;
pub use nullable::NullableCodec;

use crate::codec::{Codec, ReadSeek};
use crate::config::{Representation, UnknownTagPolicy};
use crate::error::FormatError;
use crate::key_map::KeyMap;
use crate::layout::{self, CaseLayout, LayoutMode};
use crate::resolver::Resolver;
use crate::schema::{Deconstruct, Reconstruct, UnionSchema};
use anyhow::Result;
use std::io::Write;
use tagpack_wire::serde::{self as wire, Ser, WriteLen};

#[derive(Debug)]
struct CasePlan<T> {
    layout: CaseLayout,
    /// Envelope array header, then the tag.
    head: Vec<u8>,
    /// Payload array or map header.
    payload_head: Vec<u8>,
    /// Named only. Encoded field names, per slot.
    names: Vec<Vec<u8>>,
    deconstruct: Deconstruct<T>,
    reconstruct: Reconstruct<T>,
}

#[derive(Debug)]
enum Addressing {
    Positional,
    Named(KeyMap),
}

#[derive(Debug)]
pub struct UnionCodec<T> {
    type_name: &'static str,
    representation: Representation,
    unknown_tag: UnknownTagPolicy,
    tag_of: fn(&T) -> i32,
    /// Sorted by tag.
    cases: Vec<CasePlan<T>>,
    addressing: Addressing,
}

impl<T> UnionCodec<T> {
    #[tracing::instrument(level = "debug", skip_all, fields(type_name = schema.type_name))]
    pub fn build(schema: UnionSchema<T>) -> Result<Self> {
        let layout = layout::plan(&schema)?;
        let addressing = match layout.mode {
            LayoutMode::Positional => Addressing::Positional,
            LayoutMode::Named => Addressing::Named(KeyMap::build(&layout)?),
        };

        let mut cases = Vec::with_capacity(layout.cases.len());
        for case_layout in layout.cases.iter() {
            let desc = &schema.cases[case_layout.source];

            let mut head = vec![];
            wire::ser_array_header(2, &mut head)?;
            case_layout.tag.ser(&mut head)?;

            let mut payload_head = vec![];
            let mut names = vec![];
            match layout.mode {
                LayoutMode::Positional => {
                    wire::ser_array_header(case_layout.positional_len(), &mut payload_head)?;
                }
                LayoutMode::Named => {
                    wire::ser_map_header(case_layout.slots.len(), &mut payload_head)?;
                    for slot in case_layout.slots.iter() {
                        names.push(slot.name.ser_solo()?);
                    }
                }
            }

            cases.push(CasePlan {
                layout: case_layout.clone(),
                head,
                payload_head,
                names,
                deconstruct: desc.deconstruct,
                reconstruct: desc.reconstruct,
            });
        }

        tracing::debug!(mode = ?layout.mode, cases = cases.len(), "Built codec");

        Ok(Self {
            type_name: schema.type_name,
            representation: schema.config.representation,
            unknown_tag: schema.config.unknown_tag,
            tag_of: schema.tag_of,
            cases,
            addressing,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn mode(&self) -> LayoutMode {
        match self.addressing {
            Addressing::Positional => LayoutMode::Positional,
            Addressing::Named(_) => LayoutMode::Named,
        }
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    pub fn tags(&self) -> impl Iterator<Item = i32> + '_ {
        self.cases.iter().map(|case| case.layout.tag)
    }

    fn case_idx(&self, tag: i32) -> Option<usize> {
        self.cases
            .binary_search_by_key(&tag, |case| case.layout.tag)
            .ok()
    }
}

impl<T> Codec<T> for UnionCodec<T> {
    fn encode(&self, value: &T, w: &mut dyn Write, resolver: &Resolver) -> Result<WriteLen> {
        self.encode_value(value, w, resolver)
    }

    /// Without an `Option` to hold it, absence is an error, and so is an unknown tag.
    fn decode(&self, r: &mut dyn ReadSeek, resolver: &Resolver) -> Result<(usize, T)> {
        let type_name = self.type_name;
        match self.decode_envelope(r, resolver)? {
            (r_len, Decoded::Value(value)) => Ok((r_len, value)),
            (_, Decoded::Absent) => Err(FormatError::UnexpectedNil { type_name }.into()),
            (_, Decoded::UnknownTag(tag)) => Err(FormatError::UnknownTag { type_name, tag }.into()),
        }
    }
}
