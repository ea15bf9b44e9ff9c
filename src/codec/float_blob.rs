//! # Fixed-Layout Float Blob Codecs
//!
//! Binary layout for an N-component `f32` aggregate:
//!
//! ```text
//! +-----------+-----------+     +-----------+
//! | comp 0    | comp 1    | ... | comp N-1  |
//! | f32 LE    | f32 LE    |     | f32 LE    |
//! +-----------+-----------+     +-----------+
//! ```
//!
//! Exactly `4*N` bytes: each component as its little-endian IEEE-754 single
//! precision bits, in declared field order, no padding, no length prefix, no
//! type tag. The width and order are a persisted-state contract, existing
//! column data decodes only if they never change.
//!
//! | Type | N | Blob width |
//! |------|---|------------|
//! | `Vec2` | 2 | 8 bytes |
//! | `Vec3` | 3 | 12 bytes |
//! | `Rgba` | 4 | 16 bytes |
//!
//! Decoding validates the blob length first and fails loudly on a mismatch
//! rather than truncating or zero-padding.

use eyre::{bail, Result};
use smallvec::SmallVec;
use std::any::{type_name, Any};

use crate::codec::Codec;
use crate::geom::{Rgba, Vec2, Vec3};
use crate::registry::CodecRegistry;

/// The storage engine's binary affinity, answered by every default describer
/// regardless of column metadata.
pub const BLOB_SQL_TYPE: &str = "blob";

const MAX_COMPONENTS: usize = 4;

/// A fixed-size aggregate of `f32` components with a defined field order.
///
/// `write_components` and `from_components` must use the same order; the
/// blob layout is that order, little-endian, concatenated.
pub trait FloatAggregate: Copy + Send + 'static {
    const COMPONENT_COUNT: usize;

    fn write_components(&self, out: &mut [f32]);
    fn from_components(components: &[f32]) -> Self;
}

impl FloatAggregate for Vec2 {
    const COMPONENT_COUNT: usize = 2;

    fn write_components(&self, out: &mut [f32]) {
        out[0] = self.x;
        out[1] = self.y;
    }

    fn from_components(c: &[f32]) -> Self {
        Vec2::new(c[0], c[1])
    }
}

impl FloatAggregate for Vec3 {
    const COMPONENT_COUNT: usize = 3;

    fn write_components(&self, out: &mut [f32]) {
        out[0] = self.x;
        out[1] = self.y;
        out[2] = self.z;
    }

    fn from_components(c: &[f32]) -> Self {
        Vec3::new(c[0], c[1], c[2])
    }
}

impl FloatAggregate for Rgba {
    const COMPONENT_COUNT: usize = 4;

    fn write_components(&self, out: &mut [f32]) {
        out[0] = self.r;
        out[1] = self.g;
        out[2] = self.b;
        out[3] = self.a;
    }

    fn from_components(c: &[f32]) -> Self {
        Rgba::new(c[0], c[1], c[2], c[3])
    }
}

/// Serializes `value` to its fixed-layout blob, exactly `4*N` bytes.
pub fn encode<T: FloatAggregate>(value: &T) -> SmallVec<[u8; 16]> {
    let mut components = [0f32; MAX_COMPONENTS];
    value.write_components(&mut components[..T::COMPONENT_COUNT]);

    let mut bytes = SmallVec::new();
    for component in &components[..T::COMPONENT_COUNT] {
        bytes.extend_from_slice(&component.to_le_bytes());
    }
    bytes
}

/// Deserializes a fixed-layout blob back into `T`.
///
/// The blob must be exactly `4 * T::COMPONENT_COUNT` bytes; anything else is
/// a malformed blob and fails rather than reading past the end or padding.
pub fn decode<T: FloatAggregate>(bytes: &[u8]) -> Result<T> {
    let expected = 4 * T::COMPONENT_COUNT;
    if bytes.len() != expected {
        bail!(
            "malformed blob for {}: expected {} bytes, got {}",
            type_name::<T>(),
            expected,
            bytes.len()
        );
    }

    let mut components = [0f32; MAX_COMPONENTS];
    for (i, chunk) in bytes.chunks_exact(4).enumerate() {
        components[i] = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Ok(T::from_components(&components[..T::COMPONENT_COUNT]))
}

/// Builds the blob codec for one aggregate type.
pub fn float_blob_codec<T: FloatAggregate>() -> Codec {
    Codec::new(
        |source, column_index| {
            let bytes = source.blob(column_index)?;
            let value: T = decode(bytes)?;
            Ok(Box::new(value) as Box<dyn Any + Send>)
        },
        |_column| BLOB_SQL_TYPE.to_string(),
        |sink, param_index, value| {
            let Some(value) = value.downcast_ref::<T>() else {
                bail!(
                    "binder for {} was handed a value of a different type",
                    type_name::<T>()
                );
            };
            sink.bind_blob(param_index, &encode(value))
        },
    )
}

/// Registers the built-in codec set: `Vec2`, `Vec3` and `Rgba`.
pub fn install_defaults(registry: &mut CodecRegistry) -> Result<()> {
    registry.register_for::<Vec2>(float_blob_codec::<Vec2>())?;
    registry.register_for::<Vec3>(float_blob_codec::<Vec3>())?;
    registry.register_for::<Rgba>(float_blob_codec::<Rgba>())?;
    Ok(())
}
