//! # typecodec - Extension Type Codec Registry
//!
//! typecodec lets a data-access layer persist and retrieve application value
//! types the underlying storage engine has no native column type for. Codecs
//! are keyed by runtime type identifier and resolved at bind/read time; when
//! no codec is registered the registry reports "not found" so the caller can
//! fall back to the engine's native column handling.
//!
//! ## Quick Start
//!
//! ```ignore
//! use typecodec::geom::Vec2;
//! use typecodec::registry;
//!
//! // No setup needed: first touch installs the default geometric codecs.
//! let bound = registry::try_bind_value(&mut stmt, 1, &Vec2::new(3.5, -1.25))?;
//! assert!(bound);
//!
//! let v: Option<Vec2> = registry::try_read_as(&row, 0)?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │   Table mapping / statement layer    │  (external caller)
//! ├──────────────────────────────────────┤
//! │   registry: TypeId -> Arc<Codec>     │  lookup + delegate
//! ├──────────────────────────────────────┤
//! │   codec: reader/describer/binder     │  blob encode/decode
//! ├──────────────────────────────────────┤
//! │   ColumnSource / BindSink primitives │  (engine-provided)
//! └──────────────────────────────────────┘
//! ```
//!
//! ## Design Goals
//!
//! 1. **Unknown type is not an error**: lookup misses signal native fallback
//! 2. **Atomic registration**: reader, describer and binder live in one
//!    record, a type is fully registered or fully absent
//! 3. **Zero-setup defaults**: lazy first-touch initialization installs the
//!    built-in 2/3/4-component float codecs
//! 4. **Exact persisted layout**: default blobs are 8/12/16 little-endian
//!    bytes, byte-for-byte compatible with existing stored data
//!
//! ## Module Overview
//!
//! - [`geom`]: the built-in value types (`Vec2`, `Vec3`, `Rgba`)
//! - [`codec`]: the `Codec` record, engine primitives, float-blob layout
//! - [`registry`]: per-instance and process-wide registries

pub mod codec;
pub mod geom;
pub mod registry;

pub use codec::{BindSink, Codec, ColumnInfo, ColumnSource};
pub use geom::{Rgba, Vec2, Vec3};
pub use registry::CodecRegistry;
