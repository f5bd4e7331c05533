use crate::codec::Codec;
use crate::resolver::Resolver;
use crate::schema::{UnionSchema, UnionType};
use crate::synth::NullableCodec;
use anyhow::Result;
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

pub type Describe<T> = fn() -> UnionSchema<T>;
pub type CodecFactory<U> = fn(&Resolver) -> Result<Arc<dyn Codec<U>>>;

/// Explicitly registered schema descriptions, keyed by the described type.
///
/// Registering a union `T` also makes `Option<T>` resolvable.
#[derive(Default)]
pub struct SchemaProvider {
    describers: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
    nullable: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl SchemaProvider {
    pub fn register<T: UnionType>(&mut self) {
        self.register_with::<T>(T::describe);
    }

    pub fn register_with<T: Send + Sync + 'static>(&mut self, describe: Describe<T>) {
        self.describers.insert(TypeId::of::<T>(), Box::new(describe));

        let factory: CodecFactory<Option<T>> = nullable_codec::<T>;
        self.nullable
            .insert(TypeId::of::<Option<T>>(), Box::new(factory));
    }

    pub fn is_union<T: 'static>(&self) -> bool {
        self.describers.contains_key(&TypeId::of::<T>())
    }

    pub fn describer<T: 'static>(&self) -> Option<Describe<T>> {
        self.describers
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<Describe<T>>())
            .copied()
    }

    /// If `U` is `Option<T>` for a registered union `T`.
    pub fn nullable_factory<U: 'static>(&self) -> Option<CodecFactory<U>> {
        self.nullable
            .get(&TypeId::of::<U>())
            .and_then(|boxed| boxed.downcast_ref::<CodecFactory<U>>())
            .copied()
    }

    pub fn len(&self) -> usize {
        self.describers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.describers.is_empty()
    }
}

fn nullable_codec<T: Send + Sync + 'static>(
    resolver: &Resolver,
) -> Result<Arc<dyn Codec<Option<T>>>> {
    let inner = resolver.union_codec::<T>()?;
    Ok(Arc::new(NullableCodec::new(inner)))
}
