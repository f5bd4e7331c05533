use super::{Decoded, UnionCodec};
use crate::codec::{Codec, ReadSeek};
use crate::resolver::Resolver;
use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tagpack_wire::serde::WriteLen;

/// The codec of `Option<T>` for a union `T`.
///
/// `None` decodes from a nil, and from an envelope with an unknown tag
/// when the union's policy is to skip those.
pub struct NullableCodec<T>(Arc<UnionCodec<T>>);

impl<T> NullableCodec<T> {
    pub fn new(inner: Arc<UnionCodec<T>>) -> Self {
        Self(inner)
    }
}

impl<T> Codec<Option<T>> for NullableCodec<T> {
    fn encode(&self, value: &Option<T>, w: &mut dyn Write, resolver: &Resolver) -> Result<WriteLen> {
        self.0.encode_opt(value.as_ref(), w, resolver)
    }

    fn decode(&self, r: &mut dyn ReadSeek, resolver: &Resolver) -> Result<(usize, Option<T>)> {
        match self.0.decode_envelope(r, resolver)? {
            (r_len, Decoded::Value(value)) => Ok((r_len, Some(value))),
            (r_len, Decoded::Absent | Decoded::UnknownTag(_)) => Ok((r_len, None)),
        }
    }
}
