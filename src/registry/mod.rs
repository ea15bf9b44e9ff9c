//! # Type Codec Registry
//!
//! Maps runtime type identifiers to [`Codec`] records. Comes in two forms:
//! [`CodecRegistry`] for callers that manage their own instance, and a
//! process-wide global behind module-level functions, which is what the
//! table-mapping layer normally talks to.
//!
//! ## Lookup Contract
//!
//! "Ask me first; if I don't know it, handle it yourself." An unregistered
//! type id is a normal outcome, reported as `None`/`false`, never as an
//! error. The caller then falls back to the engine's native column types.
//! Errors are reserved for duplicate registration, malformed blobs and
//! failures propagated from the delegated reader/binder.
//!
//! ## Global Lifecycle
//!
//! The global registry is lazily self-initializing: the first call to any
//! operation (including `register`) installs the empty map and the built-in
//! default codecs before proceeding. [`clear`] wipes everything, defaults
//! included; the next touch repopulates the defaults. Overriding a built-in
//! codec therefore requires a `clear` first, otherwise the re-registration
//! fails as a duplicate.
//!
//! ## Concurrency
//!
//! One mutex guards the whole global registry. Initialization and
//! registration run entirely inside the critical section, so a codec is
//! never observed half-registered and concurrent first use cannot corrupt
//! the map. Lookups clone the `Arc<Codec>` out and release the lock before
//! delegating, the lock is never held across an engine primitive call.

use eyre::{bail, Result};
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use parking_lot::Mutex;
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

use crate::codec::float_blob;
use crate::codec::{BindSink, Codec, ColumnInfo, ColumnSource};

#[cfg(test)]
mod tests;

/// An instance-scoped codec registry.
#[derive(Debug, Default)]
pub struct CodecRegistry {
    codecs: HashMap<TypeId, Arc<Codec>>,
}

impl CodecRegistry {
    /// Creates an empty registry with no codecs, not even the defaults.
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Creates a registry pre-populated with the built-in geometric codecs.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        float_blob::install_defaults(&mut registry)
            .expect("default codec set installs into an empty registry");
        registry
    }

    /// Registers `codec` under `type_id`.
    ///
    /// Registration is all-or-nothing: on a duplicate id the call fails and
    /// the existing entry is untouched.
    pub fn register(&mut self, type_id: TypeId, codec: Codec) -> Result<()> {
        match self.codecs.entry(type_id) {
            Entry::Occupied(_) => bail!("codec already registered for {:?}", type_id),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(codec));
                Ok(())
            }
        }
    }

    /// Registers `codec` for the Rust type `T`.
    pub fn register_for<T: 'static>(&mut self, codec: Codec) -> Result<()> {
        if self.codecs.contains_key(&TypeId::of::<T>()) {
            bail!("codec already registered for {}", type_name::<T>());
        }
        self.register(TypeId::of::<T>(), codec)
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.codecs.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Returns the codec registered for `type_id`, if any.
    pub fn codec(&self, type_id: TypeId) -> Option<Arc<Codec>> {
        self.codecs.get(&type_id).cloned()
    }

    /// Decodes column `column_index` if a codec is registered for `type_id`.
    ///
    /// `Ok(None)` means "no codec, fall back to native handling". Reader
    /// errors propagate unwrapped.
    pub fn try_read(
        &self,
        type_id: TypeId,
        source: &dyn ColumnSource,
        column_index: usize,
    ) -> Result<Option<Box<dyn Any + Send>>> {
        match self.codecs.get(&type_id) {
            Some(codec) => Ok(Some(codec.read(source, column_index)?)),
            None => Ok(None),
        }
    }

    /// Returns the SQL column type for `type_id`, if a codec is registered.
    pub fn try_sql_type(&self, type_id: TypeId, column: &ColumnInfo) -> Option<String> {
        self.codecs.get(&type_id).map(|codec| codec.sql_type(column))
    }

    /// Binds `value` to `param_index` if a codec is registered for `type_id`.
    ///
    /// `Ok(false)` means "no codec"; nothing was bound. Bind errors from the
    /// engine propagate unwrapped.
    pub fn try_bind(
        &self,
        type_id: TypeId,
        sink: &mut dyn BindSink,
        param_index: usize,
        value: &dyn Any,
    ) -> Result<bool> {
        match self.codecs.get(&type_id) {
            Some(codec) => {
                codec.bind(sink, param_index, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

static GLOBAL: Mutex<Option<CodecRegistry>> = Mutex::new(None);

/// Lazy self-healing init: an unset slot gets an empty registry plus the
/// built-in defaults before the current operation proceeds.
fn ensure_initialized(slot: &mut Option<CodecRegistry>) -> &mut CodecRegistry {
    slot.get_or_insert_with(CodecRegistry::with_defaults)
}

fn lookup(type_id: TypeId) -> Option<Arc<Codec>> {
    let mut slot = GLOBAL.lock();
    ensure_initialized(&mut slot).codec(type_id)
}

/// Registers `codec` under `type_id` in the process-wide registry.
///
/// If this is the first touch of the registry, the defaults are installed
/// first, so registering a codec for a built-in type fails as a duplicate.
pub fn register(type_id: TypeId, codec: Codec) -> Result<()> {
    let mut slot = GLOBAL.lock();
    ensure_initialized(&mut slot).register(type_id, codec)
}

/// Registers `codec` for the Rust type `T` in the process-wide registry.
pub fn register_for<T: 'static>(codec: Codec) -> Result<()> {
    let mut slot = GLOBAL.lock();
    ensure_initialized(&mut slot).register_for::<T>(codec)
}

/// Reports whether the process-wide registry has a codec for `type_id`.
pub fn is_registered(type_id: TypeId) -> bool {
    lookup(type_id).is_some()
}

/// Global form of [`CodecRegistry::try_read`].
pub fn try_read(
    type_id: TypeId,
    source: &dyn ColumnSource,
    column_index: usize,
) -> Result<Option<Box<dyn Any + Send>>> {
    match lookup(type_id) {
        Some(codec) => Ok(Some(codec.read(source, column_index)?)),
        None => Ok(None),
    }
}

/// Reads column `column_index` as a `T`, downcasting the decoded value.
pub fn try_read_as<T: 'static>(source: &dyn ColumnSource, column_index: usize) -> Result<Option<T>> {
    match try_read(TypeId::of::<T>(), source, column_index)? {
        Some(boxed) => match boxed.downcast::<T>() {
            Ok(value) => Ok(Some(*value)),
            Err(_) => bail!(
                "codec for {} produced a value of a different type",
                type_name::<T>()
            ),
        },
        None => Ok(None),
    }
}

/// Global form of [`CodecRegistry::try_sql_type`].
pub fn try_sql_type(type_id: TypeId, column: &ColumnInfo) -> Option<String> {
    lookup(type_id).map(|codec| codec.sql_type(column))
}

/// Global form of [`CodecRegistry::try_bind`].
pub fn try_bind(
    type_id: TypeId,
    sink: &mut dyn BindSink,
    param_index: usize,
    value: &dyn Any,
) -> Result<bool> {
    match lookup(type_id) {
        Some(codec) => {
            codec.bind(sink, param_index, value)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Binds a concrete `value`, keying the lookup by its static type.
pub fn try_bind_value<T: Any>(sink: &mut dyn BindSink, param_index: usize, value: &T) -> Result<bool> {
    try_bind(TypeId::of::<T>(), sink, param_index, value)
}

/// Explicit re-initialization: wipes the process-wide registry, defaults
/// included. The next operation repopulates the defaults lazily.
pub fn clear() {
    *GLOBAL.lock() = None;
}
