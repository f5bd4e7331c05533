use crate::resolver::Resolver;
use anyhow::Result;
use std::io::{Read, Seek, Write};
use std::marker::PhantomData;
use tagpack_wire::serde::{Deser, Ser, WriteLen};

/// Decoding may peek ahead, so input must be seekable.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// An encoder/decoder pair for values of type `T`.
///
/// `resolver` is where sub-codecs for nested values come from.
pub trait Codec<T>: Send + Sync {
    fn encode(&self, value: &T, w: &mut dyn Write, resolver: &Resolver) -> Result<WriteLen>;

    /// Returns the number of bytes consumed along with the value.
    fn decode(&self, r: &mut dyn ReadSeek, resolver: &Resolver) -> Result<(usize, T)>;
}

/// A codec for a single wire scalar.
pub struct PrimCodec<P>(PhantomData<fn() -> P>);

impl<P> PrimCodec<P> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<P> Default for PrimCodec<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Codec<P> for PrimCodec<P>
where
    P: Ser + Deser,
{
    fn encode(&self, value: &P, w: &mut dyn Write, _: &Resolver) -> Result<WriteLen> {
        value.ser(w)
    }

    fn decode(&self, r: &mut dyn ReadSeek, _: &Resolver) -> Result<(usize, P)> {
        P::deser(r)
    }
}
