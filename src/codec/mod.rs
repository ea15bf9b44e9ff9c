//! # Codec Records and Engine Primitives
//!
//! A `Codec` is the unit of registration: one record holding the reader,
//! SQL-type describer and binder for a single value type. Keeping the three
//! functions in one struct (instead of three parallel maps) makes partial
//! registration unrepresentable, a type is either fully registered or fully
//! absent.
//!
//! ## Function Contracts
//!
//! | Function | Signature | Contract |
//! |----------|-----------|----------|
//! | reader | `(&dyn ColumnSource, col) -> Result<Box<dyn Any + Send>>` | pure function of statement state, errors propagate unwrapped |
//! | describer | `(&ColumnInfo) -> String` | deterministic, used only at CREATE TABLE time |
//! | binder | `(&mut dyn BindSink, idx, &dyn Any) -> Result<()>` | side-effects the prepared statement, engine rejections propagate |
//!
//! ## Engine Primitives
//!
//! The registry never talks to the storage engine directly. Callers hand it
//! a [`ColumnSource`] (result-row side) or [`BindSink`] (prepared-statement
//! side); the stored functions call those two primitives and nothing else.
//! Statement lifecycle, stepping and native column types stay with the
//! caller.

use eyre::Result;
use std::any::Any;

pub mod float_blob;


/// Read-side engine primitive: exposes a result column as raw bytes.
pub trait ColumnSource {
    /// Returns the blob stored in `column_index` of the current row.
    fn blob(&self, column_index: usize) -> Result<&[u8]>;
}

/// Bind-side engine primitive: attaches raw bytes to a statement parameter.
pub trait BindSink {
    fn bind_blob(&mut self, param_index: usize, bytes: &[u8]) -> Result<()>;
}

/// Mapped-column metadata handed to describers at schema-generation time.
///
/// The built-in codecs ignore all of it and always answer the blob affinity,
/// but custom codecs may vary their SQL type on it (e.g. NOT NULL columns).
#[derive(Debug, Clone, Default)]
pub struct ColumnInfo {
    pub name: String,
    pub is_primary_key: bool,
    pub not_null: bool,
}

impl ColumnInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

pub type ReadFn = Box<dyn Fn(&dyn ColumnSource, usize) -> Result<Box<dyn Any + Send>> + Send + Sync>;
pub type SqlTypeFn = Box<dyn Fn(&ColumnInfo) -> String + Send + Sync>;
pub type BindFn = Box<dyn Fn(&mut dyn BindSink, usize, &dyn Any) -> Result<()> + Send + Sync>;

/// The reader/describer/binder triple governing how one value type is
/// stored and retrieved.
pub struct Codec {
    read: ReadFn,
    sql_type: SqlTypeFn,
    bind: BindFn,
}

impl Codec {
    pub fn new<R, S, B>(read: R, sql_type: S, bind: B) -> Self
    where
        R: Fn(&dyn ColumnSource, usize) -> Result<Box<dyn Any + Send>> + Send + Sync + 'static,
        S: Fn(&ColumnInfo) -> String + Send + Sync + 'static,
        B: Fn(&mut dyn BindSink, usize, &dyn Any) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            read: Box::new(read),
            sql_type: Box::new(sql_type),
            bind: Box::new(bind),
        }
    }

    /// Decodes the value in `column_index` of the current row.
    pub fn read(&self, source: &dyn ColumnSource, column_index: usize) -> Result<Box<dyn Any + Send>> {
        (self.read)(source, column_index)
    }

    /// Returns the SQL column type to declare for this value type.
    pub fn sql_type(&self, column: &ColumnInfo) -> String {
        (self.sql_type)(column)
    }

    /// Serializes `value` and binds it to `param_index`.
    pub fn bind(&self, sink: &mut dyn BindSink, param_index: usize, value: &dyn Any) -> Result<()> {
        (self.bind)(sink, param_index, value)
    }
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec").finish_non_exhaustive()
    }
}
