//! Built union codecs, one per type, for the life of the owning `Resolver`.

use crate::schema::SchemaProvider;
use crate::synth::UnionCodec;
use anyhow::{anyhow, Result};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::any::{self, Any, TypeId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Erased = Arc<dyn Any + Send + Sync>;

/// Each type gets its own one-shot cell, so a build in progress only blocks
/// callers asking for that same type.
/// A failed build leaves its cell empty; the next caller tries again.
#[derive(Default)]
pub struct UnionCache {
    entries: DashMap<TypeId, Arc<OnceCell<Erased>>>,
    builds: AtomicUsize,
}

impl UnionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Ok(None)` iff `provider` does not describe `T`.
    pub fn get_or_build<T: 'static>(
        &self,
        provider: &SchemaProvider,
    ) -> Result<Option<Arc<UnionCodec<T>>>> {
        let describe = match provider.describer::<T>() {
            None => return Ok(None),
            Some(describe) => describe,
        };

        let type_id = TypeId::of::<T>();
        // The shard lock must not be held while building.
        let cell = match self.entries.get(&type_id) {
            Some(cell) => Arc::clone(cell.value()),
            None => Arc::clone(self.entries.entry(type_id).or_default().value()),
        };

        let mut built = false;
        let erased = cell
            .get_or_try_init(|| -> Result<Erased> {
                let codec = UnionCodec::build(describe())?;
                self.builds.fetch_add(1, Ordering::Relaxed);
                built = true;
                let erased: Erased = Arc::new(codec);
                Ok(erased)
            })
            .inspect_err(|e| {
                tracing::warn!(type_name = any::type_name::<T>(), "Failed to build codec: {e:#}")
            })?;
        if !built {
            tracing::trace!(type_name = any::type_name::<T>(), "Cache hit");
        }

        let codec = Arc::clone(erased)
            .downcast::<UnionCodec<T>>()
            .map_err(|_| anyhow!("Cached codec is not for {}", any::type_name::<T>()))?;
        Ok(Some(codec))
    }

    /// How many codecs have been built successfully.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// How many types have been requested, built or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
