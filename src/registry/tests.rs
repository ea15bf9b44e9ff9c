//! Tests for the instance and process-wide codec registries

use super::*;
use crate::codec::float_blob::{encode, float_blob_codec};
use crate::geom::{Rgba, Vec2, Vec3};
use eyre::eyre;

/// Tests that touch the process-wide registry serialize on this lock so
/// `clear()` in one test cannot race another test's lazy re-init.
static GLOBAL_TEST_LOCK: Mutex<()> = Mutex::new(());

struct FakeRow {
    blobs: Vec<Vec<u8>>,
}

impl ColumnSource for FakeRow {
    fn blob(&self, column_index: usize) -> Result<&[u8]> {
        self.blobs
            .get(column_index)
            .map(|b| b.as_slice())
            .ok_or_else(|| eyre!("no column {}", column_index))
    }
}

#[derive(Default)]
struct FakeStatement {
    bound: Vec<(usize, Vec<u8>)>,
}

impl BindSink for FakeStatement {
    fn bind_blob(&mut self, param_index: usize, bytes: &[u8]) -> Result<()> {
        self.bound.push((param_index, bytes.to_vec()));
        Ok(())
    }
}

/// A type with no registered codec, standing in for engine-native values.
struct PlainInteger;

#[test]
fn new_registry_is_empty() {
    let registry = CodecRegistry::new();
    assert!(registry.is_empty());
    assert!(!registry.contains(TypeId::of::<Vec2>()));
}

#[test]
fn with_defaults_makes_builtins_usable_immediately() {
    let registry = CodecRegistry::with_defaults();
    assert_eq!(registry.len(), 3);

    let row = FakeRow {
        blobs: vec![encode(&Vec3::new(1.0, 2.0, 3.0)).to_vec()],
    };
    let value = registry
        .try_read(TypeId::of::<Vec3>(), &row, 0)
        .unwrap()
        .unwrap();
    assert_eq!(*value.downcast_ref::<Vec3>().unwrap(), Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn unknown_type_is_not_an_error_and_has_no_side_effects() {
    let registry = CodecRegistry::with_defaults();
    let row = FakeRow { blobs: vec![] };
    let mut stmt = FakeStatement::default();

    let read = registry.try_read(TypeId::of::<PlainInteger>(), &row, 0).unwrap();
    assert!(read.is_none());

    let described = registry.try_sql_type(TypeId::of::<PlainInteger>(), &ColumnInfo::named("n"));
    assert!(described.is_none());

    let bound = registry
        .try_bind(TypeId::of::<PlainInteger>(), &mut stmt, 1, &PlainInteger)
        .unwrap();
    assert!(!bound);
    assert!(stmt.bound.is_empty());
}

#[test]
fn duplicate_registration_fails_and_leaves_first_codec_working() {
    let mut registry = CodecRegistry::with_defaults();

    let err = registry
        .register_for::<Vec2>(float_blob_codec::<Vec2>())
        .unwrap_err();
    assert!(err.to_string().contains("already registered"));

    // The original registration still answers.
    let described = registry.try_sql_type(TypeId::of::<Vec2>(), &ColumnInfo::named("pos"));
    assert_eq!(described.as_deref(), Some("blob"));
}

#[test]
fn custom_codec_registers_and_binds() {
    struct Angle(f32);

    let mut registry = CodecRegistry::new();
    registry
        .register_for::<Angle>(Codec::new(
            |source, idx| {
                let bytes = source.blob(idx)?;
                if bytes.len() != 4 {
                    eyre::bail!("malformed angle blob: {} bytes", bytes.len());
                }
                let radians = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                Ok(Box::new(Angle(radians)) as Box<dyn Any + Send>)
            },
            |_| "blob".to_string(),
            |sink, idx, value| {
                let Some(angle) = value.downcast_ref::<Angle>() else {
                    eyre::bail!("not an angle");
                };
                sink.bind_blob(idx, &angle.0.to_le_bytes())
            },
        ))
        .unwrap();

    let mut stmt = FakeStatement::default();
    let bound = registry
        .try_bind(TypeId::of::<Angle>(), &mut stmt, 1, &Angle(1.5))
        .unwrap();
    assert!(bound);
    assert_eq!(stmt.bound[0].1, 1.5f32.to_le_bytes().to_vec());
}

#[test]
fn bind_error_from_engine_propagates_unwrapped() {
    struct RejectingStatement;

    impl BindSink for RejectingStatement {
        fn bind_blob(&mut self, _param_index: usize, _bytes: &[u8]) -> Result<()> {
            Err(eyre!("engine rejected the bind"))
        }
    }

    let registry = CodecRegistry::with_defaults();
    let err = registry
        .try_bind(
            TypeId::of::<Vec2>(),
            &mut RejectingStatement,
            1,
            &Vec2::new(0.0, 0.0),
        )
        .unwrap_err();
    assert!(err.to_string().contains("engine rejected"));
}

#[test]
fn global_lazy_init_makes_defaults_usable_without_setup() {
    let _guard = GLOBAL_TEST_LOCK.lock();
    clear();

    let row = FakeRow {
        blobs: vec![encode(&Vec2::new(3.5, -1.25)).to_vec()],
    };
    let value: Vec2 = try_read_as(&row, 0).unwrap().unwrap();
    assert_eq!(value, Vec2::new(3.5, -1.25));

    assert!(is_registered(TypeId::of::<Vec3>()));
    assert!(is_registered(TypeId::of::<Rgba>()));
}

#[test]
fn global_register_after_first_touch_rejects_builtin_override() {
    let _guard = GLOBAL_TEST_LOCK.lock();
    clear();

    // First touch of register() installs the defaults before applying the
    // caller's codec, so a built-in type id is already taken.
    let err = register_for::<Rgba>(float_blob_codec::<Rgba>()).unwrap_err();
    assert!(err.to_string().contains("already registered"));

    // The default codec survived the failed registration.
    let described = try_sql_type(TypeId::of::<Rgba>(), &ColumnInfo::named("tint"));
    assert_eq!(described.as_deref(), Some("blob"));
}

#[test]
fn global_clear_wipes_custom_registrations_but_defaults_heal() {
    let _guard = GLOBAL_TEST_LOCK.lock();
    clear();

    struct Custom;
    register_for::<Custom>(float_blob_codec::<Vec2>()).unwrap();
    assert!(is_registered(TypeId::of::<Custom>()));

    clear();

    // Custom registration is gone; built-ins repopulate on next touch.
    assert!(!is_registered(TypeId::of::<Custom>()));
    assert!(is_registered(TypeId::of::<Vec2>()));
}

#[test]
fn global_bind_by_value_type_roundtrips() {
    let _guard = GLOBAL_TEST_LOCK.lock();
    clear();

    let mut stmt = FakeStatement::default();
    let color = Rgba::new(1.0, 0.0, 0.0, 1.0);
    assert!(try_bind_value(&mut stmt, 2, &color).unwrap());
    assert_eq!(stmt.bound[0].1.len(), 16);

    let row = FakeRow {
        blobs: vec![stmt.bound[0].1.clone()],
    };
    let back: Rgba = try_read_as(&row, 0).unwrap().unwrap();
    assert_eq!(back, color);
}

#[test]
fn global_unknown_type_reports_not_found() {
    let _guard = GLOBAL_TEST_LOCK.lock();
    clear();

    let mut stmt = FakeStatement::default();
    assert!(!try_bind_value(&mut stmt, 1, &42i64).unwrap());
    assert!(stmt.bound.is_empty());
    assert!(try_sql_type(TypeId::of::<i64>(), &ColumnInfo::named("n")).is_none());
}

#[test]
fn concurrent_first_use_initializes_exactly_once() {
    let _guard = GLOBAL_TEST_LOCK.lock();
    clear();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            std::thread::spawn(|| {
                let described = try_sql_type(TypeId::of::<Vec2>(), &ColumnInfo::named("pos"));
                assert_eq!(described.as_deref(), Some("blob"));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // All threads saw a fully-populated registry.
    assert!(is_registered(TypeId::of::<Vec3>()));
}
