//! Compiler sessions and per-method compilations.
//!
//! ```text
//!           Session (one per process, shared by compiler threads)
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Arc<MarkRegistry>   Arc<StubTable>   CompilationCounters     │
//! └──────────────────────────────────────────────────────────────┘
//!        │ begin(method)            │ begin(method)
//!        ▼                          ▼
//! ┌──────────────────┐       ┌──────────────────┐
//! │ Compilation #0   │       │ Compilation #1   │   owned by one thread,
//! │  StackFrame      │       │  StackFrame      │   dropped when done
//! │  LockStack       │       │  LockStack       │
//! │  MarkRecorder    │       │  MarkRecorder    │
//! │  ZBarrierSet     │       │  ZBarrierSet     │
//! └──────────────────┘       └──────────────────┘
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use hsgen_lir::{LockDepth, LockStack, StackFrame, StackSlot};
use hsgen_mark::{Mark, MarkRecorder, MarkRegistry};
use hsgen_util::define_idx;
use hsgen_zgc::{BarrierRequest, ForeignCallDescriptor, StubTable, ZBarrierSet};
use serde::Serialize;

use crate::config::HostConfig;
use crate::counters::CompilationCounters;
use crate::error::Result;

define_idx!(
    /// Identifier of one compilation within a session
    CompileId
);

/// Generator for unique CompileIds
#[derive(Debug, Default)]
pub struct CompileIdGenerator {
    counter: AtomicU32,
}

impl CompileIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
        }
    }

    /// Next id; wraps around after `u32::MAX`
    pub fn next(&self) -> CompileId {
        CompileId(self.counter.fetch_add(1, Ordering::Relaxed))
    }
}

/// Process-wide compiler state bound from a host description.
#[derive(Debug)]
pub struct Session {
    config: HostConfig,
    registry: Arc<MarkRegistry>,
    stubs: Arc<StubTable>,
    counters: CompilationCounters,
    compile_ids: CompileIdGenerator,
}

impl Session {
    /// Validate `config` and bind the registry and stub table from it.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Invalid` for a malformed description
    /// - `MarkError::Unsupported` if a required mark is missing
    /// - `BarrierError::UnknownStub` for a stub name no barrier uses
    pub fn new(config: HostConfig) -> Result<Self> {
        config.validate()?;

        let registry = MarkRegistry::new();
        registry.populate(|key| config.mark_constant(key))?;
        let stubs = StubTable::from_addresses(config.stub_addresses())?;

        log::info!(
            "bound {}/{} marks and {} barrier stubs",
            registry.bound_count(),
            Mark::COUNT,
            stubs.len()
        );

        let counters = CompilationCounters::new(config.compiler.compilation_count_limit);
        Ok(Self {
            config,
            registry: Arc::new(registry),
            stubs: Arc::new(stubs),
            counters,
            compile_ids: CompileIdGenerator::new(),
        })
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<MarkRegistry> {
        &self.registry
    }

    pub fn stubs(&self) -> &Arc<StubTable> {
        &self.stubs
    }

    pub fn counters(&self) -> &CompilationCounters {
        &self.counters
    }

    /// Start compiling `method`.
    ///
    /// # Errors
    ///
    /// `RecompilationLimit` if `method` was already compiled as often as the
    /// host allows.
    pub fn begin(&self, method: &str) -> Result<Compilation<'_>> {
        let count = self.counters.record(method)?;
        let id = self.compile_ids.next();
        log::debug!("compilation {} of {} (#{})", id.0, method, count);

        Ok(Compilation {
            id,
            method: method.to_string(),
            count,
            frame: StackFrame::new(self.config.frame_layout()),
            locks: LockStack::new(),
            marks: MarkRecorder::new(&self.registry),
            barriers: ZBarrierSet::with_policy(
                self.config.barrier_policy(),
                Arc::clone(&self.stubs),
            ),
            calls: Vec::new(),
        })
    }

    /// Run `body` as one compilation of `method` and summarize it.
    ///
    /// A failing body aborts only this compilation.
    pub fn compile<F>(&self, method: &str, body: F) -> Result<CompilationSummary>
    where
        F: FnOnce(&mut Compilation<'_>) -> Result<()>,
    {
        let mut compilation = self.begin(method)?;
        if let Err(err) = body(&mut compilation) {
            log::warn!("compilation {} of {} aborted: {}", compilation.id.0, method, err);
            return Err(err);
        }
        Ok(compilation.finish())
    }
}

/// State of one method compilation.
pub struct Compilation<'s> {
    id: CompileId,
    method: String,
    count: u32,
    frame: StackFrame,
    locks: LockStack,
    marks: MarkRecorder<'s>,
    barriers: ZBarrierSet,
    calls: Vec<(BarrierRequest, Option<ForeignCallDescriptor>)>,
}

impl<'s> Compilation<'s> {
    pub fn id(&self) -> CompileId {
        self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// How many times this method has been compiled, this one included
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn frame(&self) -> &StackFrame {
        &self.frame
    }

    pub fn locks(&self) -> &LockStack {
        &self.locks
    }

    pub fn barriers(&self) -> &ZBarrierSet {
        &self.barriers
    }

    /// Lock record for `depth`, materializing shallower ones as needed
    pub fn lock_slot(&mut self, depth: LockDepth) -> Result<StackSlot> {
        Ok(self.locks.slot_for(&mut self.frame, depth)?)
    }

    /// Tag code `offset` with `mark`, returning the host value to patch in
    pub fn mark(&mut self, offset: u32, mark: Mark) -> Result<i64> {
        self.marks.record(offset, mark)?;
        Ok(self.marks.registry().value(mark)?)
    }

    /// Whether the host bound `mark`, for capability-dependent emission
    pub fn has_mark(&self, mark: Mark) -> bool {
        self.marks.registry().is_bound(mark)
    }

    /// Barrier call for one heap access, `None` if it needs no barrier
    pub fn barrier(&mut self, request: BarrierRequest) -> Result<Option<ForeignCallDescriptor>> {
        let target = self.barriers.dispatch(&request)?.copied();
        self.calls.push((request, target));
        Ok(target)
    }

    pub fn finish(self) -> CompilationSummary {
        CompilationSummary {
            id: self.id.0,
            method: self.method,
            count: self.count,
            frame_size: self.frame.frame_size(),
            lock_slots: self
                .locks
                .iter()
                .map(|(depth, slot)| LockSlotSummary {
                    depth: depth.0,
                    offset: slot.offset(),
                    size: slot.size(),
                })
                .collect(),
            marks: self
                .marks
                .into_sites()
                .into_iter()
                .map(|site| MarkSiteSummary {
                    offset: site.offset,
                    mark: site.mark.name(),
                    value: site.value,
                })
                .collect(),
            barriers: self
                .calls
                .into_iter()
                .map(|(request, target)| BarrierCallSummary {
                    request: format!("{request:?}"),
                    stub: target.map(|t| t.name()),
                    address: target.map(|t| t.address()),
                })
                .collect(),
        }
    }
}

/// What one compilation produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompilationSummary {
    pub id: u32,
    pub method: String,
    pub count: u32,
    pub frame_size: u32,
    pub lock_slots: Vec<LockSlotSummary>,
    pub marks: Vec<MarkSiteSummary>,
    pub barriers: Vec<BarrierCallSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockSlotSummary {
    pub depth: u32,
    pub offset: i32,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkSiteSummary {
    pub offset: u32,
    pub mark: &'static str,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarrierCallSummary {
    pub request: String,
    pub stub: Option<&'static str>,
    pub address: Option<u64>,
}
