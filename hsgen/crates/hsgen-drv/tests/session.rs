//! Session Tests
//!
//! End-to-end behaviour of a bound session:
//! - start-up binding from a host description
//! - per-compilation lock stacks, marks and barriers
//! - compilations sharing one registry across threads
//! - the recompilation limit

mod common;

use common::{complete_host, mark_value, required_marks_only, stub_address};
use hsgen_drv::{DriverError, Session};
use hsgen_lir::{FrameError, LockDepth};
use hsgen_mark::{Mark, MarkError};
use hsgen_zgc::{BarrierError, BarrierRequest, BarrierStub, LocationClass, StoreKind};
use rayon::prelude::*;

// ============================================================================
// BINDING
// ============================================================================

#[test]
fn test_complete_host_binds_everything() {
    let session = Session::new(complete_host()).unwrap();
    assert_eq!(session.registry().bound_count(), Mark::COUNT);
    assert!(session.stubs().missing().is_empty());
    assert!(session.registry().has_entry_barrier());
}

#[test]
fn test_entry_barrier_may_be_absent() {
    let session = Session::new(required_marks_only()).unwrap();
    assert!(!session.registry().has_entry_barrier());
    assert!(session.registry().supports_method_handle_deopt());
    assert_eq!(
        session.registry().value(Mark::EntryBarrierPatch),
        Err(MarkError::Unavailable(Mark::EntryBarrierPatch))
    );
}

#[test]
fn test_missing_required_mark_fails_binding() {
    let mut config = complete_host();
    config.marks.shift_remove(&Mark::OsrEntry.constant_key());
    let err = Session::new(config).unwrap_err();
    assert!(matches!(
        err,
        DriverError::Mark(MarkError::Unsupported {
            mark: Mark::OsrEntry,
            ..
        })
    ));
}

// ============================================================================
// COMPILATIONS
// ============================================================================

#[test]
fn test_compilation_uses_host_values() {
    let session = Session::new(complete_host()).unwrap();
    let mut compilation = session.begin("Foo.bar()V").unwrap();

    assert_eq!(
        compilation.mark(0, Mark::VerifiedEntry).unwrap(),
        mark_value(Mark::VerifiedEntry)
    );
    let target = compilation
        .barrier(BarrierRequest::write(LocationClass::Field, StoreKind::Native))
        .unwrap()
        .unwrap();
    assert_eq!(
        target.address(),
        stub_address(BarrierStub::StoreBarrierOnNativeOopFieldWithoutHealing)
    );
}

#[test]
fn test_lock_slots_follow_host_lock_size() {
    let mut config = complete_host();
    config.frame.basic_lock_size = 16;
    let session = Session::new(config).unwrap();

    let summary = session
        .compile("Foo.bar()V", |c| {
            c.lock_slot(LockDepth(0))?;
            c.lock_slot(LockDepth(1))?;
            c.lock_slot(LockDepth(3))?;
            Ok(())
        })
        .unwrap();

    assert_eq!(summary.lock_slots.len(), 4);
    assert!(summary.lock_slots.iter().all(|slot| slot.size == 16));
    let depths: Vec<_> = summary.lock_slots.iter().map(|slot| slot.depth).collect();
    assert_eq!(depths, vec![0, 1, 2, 3]);
}

#[test]
fn test_frame_overflow_aborts_one_compilation() {
    let mut config = complete_host();
    config.frame.max_frame_size = 64;
    let session = Session::new(config).unwrap();

    let err = session
        .compile("Deep.locks()V", |c| c.lock_slot(LockDepth(16)).map(drop))
        .unwrap_err();
    assert!(matches!(
        err,
        DriverError::Frame(FrameError::FrameTooLarge { limit: 64, .. })
    ));

    // the session itself is unaffected
    let summary = session
        .compile("Shallow.lock()V", |c| c.lock_slot(LockDepth(0)).map(drop))
        .unwrap();
    assert_eq!(summary.lock_slots.len(), 1);
}

#[test]
fn test_unbound_optional_mark_fails_record() {
    let session = Session::new(required_marks_only()).unwrap();
    let err = session
        .compile("Foo.bar()V", |c| c.mark(0, Mark::EntryBarrierPatch).map(drop))
        .unwrap_err();
    assert!(matches!(
        err,
        DriverError::Mark(MarkError::Unavailable(Mark::EntryBarrierPatch))
    ));
}

#[test]
fn test_missing_stub_reported_at_dispatch() {
    let mut config = complete_host();
    config
        .stubs
        .insert(BarrierStub::LoadBarrierOnOopFieldPreloaded.name().to_string(), 0);
    let session = Session::new(config).unwrap();

    let err = session
        .compile("Foo.bar()V", |c| {
            c.barrier(BarrierRequest::read(LocationClass::Handle)).map(drop)
        })
        .unwrap_err();
    assert!(matches!(
        err,
        DriverError::Barrier(BarrierError::MissingStub("load_barrier_on_oop_field_preloaded"))
    ));
}

#[test]
fn test_deferred_init_barriers_from_host() {
    let mut config = complete_host();
    config.gc.deferred_init_barriers = true;
    let session = Session::new(config).unwrap();

    let mut compilation = session.begin("Foo.<init>()V").unwrap();
    let target = compilation
        .barrier(BarrierRequest::write(LocationClass::Init, StoreKind::Plain))
        .unwrap();
    assert_eq!(target, None);
}

// ============================================================================
// SHARING AND LIMITS
// ============================================================================

#[test]
fn test_parallel_compilations_share_registry() {
    let session = Session::new(complete_host()).unwrap();

    let summaries: Vec<_> = (0..64u32)
        .into_par_iter()
        .map(|i| {
            session.compile(&format!("M{}.run()V", i % 8), |c| {
                c.mark(0, Mark::VerifiedEntry)?;
                c.lock_slot(LockDepth(i % 4))?;
                Ok(())
            })
        })
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(summaries.len(), 64);
    for summary in &summaries {
        assert_eq!(summary.marks[0].value, mark_value(Mark::VerifiedEntry));
    }
    assert_eq!(session.counters().count("M3.run()V"), 8);
}

#[test]
fn test_recompilation_limit() {
    let mut config = complete_host();
    config.compiler.compilation_count_limit = 2;
    let session = Session::new(config).unwrap();

    session.begin("Hot.loop()V").unwrap();
    session.begin("Hot.loop()V").unwrap();
    let err = session.begin("Hot.loop()V").err().unwrap();

    assert!(err.is_process_fatal());
    assert!(err.to_string().contains("Hot.loop()V"));
    // other methods still compile
    assert!(session.begin("Cold.once()V").is_ok());
}
