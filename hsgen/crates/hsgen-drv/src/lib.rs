//! hsgen-drv - Host binding and compilation driver
//!
//! Loads a host description, binds the patch-point registry and the barrier
//! stub table from it once at start-up, and hands out per-method
//! [`Compilation`]s that own their frame, lock stack, mark recorder and
//! barrier set.
//!
//! ```rust
//! use hsgen_drv::{HostConfig, Session};
//! use hsgen_lir::LockDepth;
//! use hsgen_mark::Mark;
//!
//! let mut config = HostConfig::default();
//! for mark in Mark::ALL.iter().filter(|mark| !mark.is_optional()) {
//!     config.marks.insert(mark.constant_key(), 0x40 + mark.index() as i64);
//! }
//!
//! let session = Session::new(config)?;
//! let summary = session.compile("Foo.bar()V", |compilation| {
//!     compilation.mark(0, Mark::VerifiedEntry)?;
//!     compilation.lock_slot(LockDepth(1))?;
//!     Ok(())
//! })?;
//!
//! assert_eq!(summary.lock_slots.len(), 2);
//! # Ok::<(), hsgen_drv::DriverError>(())
//! ```

pub mod config;
pub mod counters;
pub mod error;
pub mod session;

pub use config::{CompilerConfig, FrameConfig, GcConfig, HostConfig, CONFIG_FILE_NAME};
pub use counters::CompilationCounters;
pub use error::{ConfigError, DriverError, Result};
pub use session::{
    BarrierCallSummary, CompilationSummary, Compilation, CompileId, CompileIdGenerator,
    LockSlotSummary, MarkSiteSummary, Session,
};
