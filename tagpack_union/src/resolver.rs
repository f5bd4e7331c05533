use crate::cache::UnionCache;
use crate::codec::{Codec, PrimCodec};
use crate::error::{FormatError, ResolveError};
use crate::reader::UnionReader;
use crate::schema::{Describe, SchemaProvider, UnionType};
use crate::synth::UnionCodec;
use anyhow::Result;
use rustc_hash::FxHashMap;
use std::any::{self, Any, TypeId};
use std::io::{Cursor, Read, Seek};
use std::sync::Arc;

/// Hands out codecs by type.
///
/// Lookup order: explicitly registered codecs (primitives included), then unions,
/// then `Option<T>` of a union `T`.
pub struct Resolver {
    /// Each value is an `Arc<dyn Codec<U>>` for its key `U`.
    codecs: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
    schemas: SchemaProvider,
    unions: UnionCache,
}

pub struct ResolverBuilder {
    codecs: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
    schemas: SchemaProvider,
}

impl ResolverBuilder {
    fn new() -> Self {
        let builder = Self {
            codecs: FxHashMap::default(),
            schemas: SchemaProvider::default(),
        };
        builder
            .codec(PrimCodec::<bool>::new())
            .codec(PrimCodec::<i8>::new())
            .codec(PrimCodec::<i16>::new())
            .codec(PrimCodec::<i32>::new())
            .codec(PrimCodec::<i64>::new())
            .codec(PrimCodec::<u8>::new())
            .codec(PrimCodec::<u16>::new())
            .codec(PrimCodec::<u32>::new())
            .codec(PrimCodec::<u64>::new())
            .codec(PrimCodec::<f32>::new())
            .codec(PrimCodec::<f64>::new())
            .codec(PrimCodec::<char>::new())
            .codec(PrimCodec::<String>::new())
            .codec(PrimCodec::<Vec<u8>>::new())
    }

    /// Replaces any codec already registered for `U`.
    pub fn codec<U: 'static>(mut self, codec: impl Codec<U> + 'static) -> Self {
        let codec: Arc<dyn Codec<U>> = Arc::new(codec);
        self.codecs.insert(TypeId::of::<U>(), Box::new(codec));
        self
    }

    pub fn union<T: UnionType>(mut self) -> Self {
        self.schemas.register::<T>();
        self
    }

    pub fn union_with<T: Send + Sync + 'static>(mut self, describe: Describe<T>) -> Self {
        self.schemas.register_with::<T>(describe);
        self
    }

    pub fn build(self) -> Resolver {
        Resolver {
            codecs: self.codecs,
            schemas: self.schemas,
            unions: UnionCache::new(),
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Resolver {
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    pub fn resolve<U: 'static>(&self) -> Result<Arc<dyn Codec<U>>> {
        if let Some(codec) = self
            .codecs
            .get(&TypeId::of::<U>())
            .and_then(|boxed| boxed.downcast_ref::<Arc<dyn Codec<U>>>())
        {
            return Ok(Arc::clone(codec));
        }
        if self.schemas.is_union::<U>() {
            let codec: Arc<dyn Codec<U>> = self.union_codec::<U>()?;
            return Ok(codec);
        }
        if let Some(factory) = self.schemas.nullable_factory::<U>() {
            return factory(self);
        }
        Err(ResolveError::NoCodec {
            type_name: any::type_name::<U>(),
        }
        .into())
    }

    /// The concrete codec of a registered union.
    pub fn union_codec<T: 'static>(&self) -> Result<Arc<UnionCodec<T>>> {
        self.unions
            .get_or_build::<T>(&self.schemas)?
            .ok_or_else(|| {
                ResolveError::NoCodec {
                    type_name: any::type_name::<T>(),
                }
                .into()
            })
    }

    pub fn serialize<T: 'static>(&self, value: &T) -> Result<Vec<u8>> {
        let codec = self.resolve::<T>()?;
        let mut buf = vec![];
        codec.encode(value, &mut buf, self)?;
        Ok(buf)
    }

    /// The whole of `buf` must be one value.
    pub fn deserialize<T: 'static>(&self, buf: &[u8]) -> Result<T> {
        let codec = self.resolve::<T>()?;
        let mut r = Cursor::new(buf);
        let (r_len, value) = codec.decode(&mut r, self)?;
        if r_len != buf.len() {
            return Err(FormatError::TrailingBytes {
                type_name: any::type_name::<T>(),
                len: buf.len().saturating_sub(r_len),
            }
            .into());
        }
        Ok(value)
    }

    /// Iterates consecutive values of `T` until `r` ends.
    pub fn reader<R: Read + Seek, T: 'static>(&self, r: R) -> Result<UnionReader<'_, R, T>> {
        let codec = self.resolve::<T>()?;
        Ok(UnionReader::new(r, codec, self))
    }

    pub fn schemas(&self) -> &SchemaProvider {
        &self.schemas
    }

    pub fn unions(&self) -> &UnionCache {
        &self.unions
    }
}
