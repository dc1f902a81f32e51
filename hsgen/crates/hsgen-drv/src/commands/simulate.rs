//! Simulate command implementation.
//!
//! Runs a number of compilations of one method against a bound host,
//! in parallel, exercising every backend component each one needs:
//! entry marks, lock records for the requested nesting depths, barrier
//! dispatch for a handful of heap accesses and a return poll.

use anyhow::{bail, Result};
use hsgen_drv::{Compilation, CompilationSummary, DriverError, HostConfig, Session};
use hsgen_lir::LockDepth;
use hsgen_mark::Mark;
use hsgen_zgc::{BarrierRequest, LocationClass, StoreKind};
use rayon::prelude::*;

/// Arguments for the simulate command.
#[derive(Debug, Clone)]
pub struct SimulateArgs {
    /// Method being compiled.
    pub method: String,
    /// Monitor nesting depths the method locks at, in encounter order.
    pub depths: Vec<u32>,
    /// Number of compilations to run.
    pub count: u32,
    /// Print summaries as JSON.
    pub json: bool,
}

impl Default for SimulateArgs {
    fn default() -> Self {
        Self {
            method: "Example.run()V".to_string(),
            depths: Vec::new(),
            count: 1,
            json: false,
        }
    }
}

/// Outcome of a simulate run.
#[derive(Debug, Default)]
pub struct SimulateReport {
    /// Finished compilations, in compilation order.
    pub summaries: Vec<CompilationSummary>,
    /// Aborted compilations as `(request index, error)`, by request index.
    pub failures: Vec<(u32, DriverError)>,
}

/// Simulate command handler.
pub struct SimulateCommand {
    args: SimulateArgs,
    session: Session,
}

impl SimulateCommand {
    pub fn new(args: SimulateArgs, config: HostConfig) -> hsgen_drv::Result<Self> {
        Ok(Self {
            args,
            session: Session::new(config)?,
        })
    }

    /// Run all compilations.
    ///
    /// An aborted compilation does not stop the others; it is listed in
    /// [`SimulateReport::failures`]. Only a process-fatal error is
    /// returned as `Err`.
    pub fn run(&self) -> hsgen_drv::Result<SimulateReport> {
        self.run_with(|compilation, _| emit_method(compilation, &self.args.depths))
    }

    fn run_with<F>(&self, body: F) -> hsgen_drv::Result<SimulateReport>
    where
        F: Fn(&mut Compilation<'_>, u32) -> hsgen_drv::Result<()> + Sync,
    {
        let outcomes: Vec<_> = (0..self.args.count)
            .into_par_iter()
            .map(|index| {
                let outcome = self
                    .session
                    .compile(&self.args.method, |c| body(c, index));
                (index, outcome)
            })
            .collect();

        let mut report = SimulateReport::default();
        for (index, outcome) in outcomes {
            match outcome {
                Ok(summary) => report.summaries.push(summary),
                Err(err) if err.is_process_fatal() => return Err(err),
                Err(err) => report.failures.push((index, err)),
            }
        }
        report.summaries.sort_by_key(|summary| summary.id);
        Ok(report)
    }
}

/// Lower a synthetic method body.
fn emit_method(compilation: &mut Compilation<'_>, depths: &[u32]) -> hsgen_drv::Result<()> {
    let mut offset = 0;
    compilation.mark(offset, Mark::VerifiedEntry)?;
    offset += 8;
    if compilation.has_mark(Mark::EntryBarrierPatch) {
        compilation.mark(offset, Mark::EntryBarrierPatch)?;
        offset += 8;
    }
    compilation.mark(offset, Mark::FrameComplete)?;

    for &depth in depths {
        compilation.lock_slot(LockDepth(depth))?;
    }

    compilation.barrier(BarrierRequest::write(LocationClass::Field, StoreKind::Plain))?;
    compilation.barrier(BarrierRequest::write(LocationClass::Array, StoreKind::Atomic))?;
    compilation.barrier(BarrierRequest::read(LocationClass::Handle))?;

    offset += 64;
    compilation.mark(offset, Mark::PollReturnFar)?;
    Ok(())
}

fn print_text(summaries: &[CompilationSummary]) {
    for summary in summaries {
        println!(
            "compilation {} of {} (#{}), frame {} bytes",
            summary.id, summary.method, summary.count, summary.frame_size
        );
        for slot in &summary.lock_slots {
            println!(
                "  lock[{}] offset {} size {}",
                slot.depth, slot.offset, slot.size
            );
        }
        for site in &summary.marks {
            println!("  mark {:<24} @{:<4} = {:#x}", site.mark, site.offset, site.value);
        }
        for call in &summary.barriers {
            match (call.stub, call.address) {
                (Some(stub), Some(address)) => {
                    println!("  barrier {} -> {} ({:#x})", call.request, stub, address)
                }
                _ => println!("  barrier {} -> none", call.request),
            }
        }
    }
}

/// Run the simulate command.
///
/// Errors are returned as [`hsgen_drv::DriverError`] inside the
/// `anyhow::Error` so the caller can tell process-fatal ones apart.
pub fn run_simulate(args: SimulateArgs, config: HostConfig) -> Result<()> {
    let json = args.json;
    let count = args.count;
    let command = SimulateCommand::new(args, config)?;
    let report = command.run()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.summaries)?);
    } else {
        print_text(&report.summaries);
    }
    for (index, err) in &report.failures {
        tracing::error!("compilation request {} failed: {}", index, err);
    }
    tracing::info!("{} compilation(s) finished", report.summaries.len());

    if !report.failures.is_empty() {
        bail!("{} of {} compilations failed", report.failures.len(), count);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsgen_zgc::BarrierStub;

    fn host(limit: u32) -> HostConfig {
        let mut config = HostConfig::default();
        for mark in Mark::ALL.iter().filter(|mark| !mark.is_optional()) {
            config.marks.insert(mark.constant_key(), 0x200 + mark.index() as i64);
        }
        for (i, &stub) in BarrierStub::ALL.iter().enumerate() {
            config
                .stubs
                .insert(stub.name().to_string(), 0x7f00_0000 + i as u64 * 0x100);
        }
        config.compiler.compilation_count_limit = limit;
        config
    }

    fn args(depths: Vec<u32>, count: u32) -> SimulateArgs {
        SimulateArgs {
            depths,
            count,
            ..SimulateArgs::default()
        }
    }

    #[test]
    fn test_depths_with_gap() {
        let command = SimulateCommand::new(args(vec![0, 1, 3], 1), host(0)).unwrap();
        let report = command.run().unwrap();

        let summary = &report.summaries[0];
        assert_eq!(summary.lock_slots.len(), 4);
        assert_eq!(summary.barriers.len(), 3);
        assert!(summary.barriers.iter().all(|call| call.stub.is_some()));
        // no entry barrier exported, so it is not emitted
        assert!(summary.marks.iter().all(|site| site.mark != "ENTRY_BARRIER_PATCH"));
    }

    #[test]
    fn test_entry_barrier_emitted_when_exported() {
        let mut config = host(0);
        config
            .marks
            .insert(Mark::EntryBarrierPatch.constant_key(), 0x10);
        let summaries = SimulateCommand::new(args(vec![], 1), config)
            .unwrap()
            .run()
            .unwrap()
            .summaries;
        let site = summaries[0]
            .marks
            .iter()
            .find(|site| site.mark == "ENTRY_BARRIER_PATCH")
            .unwrap();
        assert_eq!(site.value, 0x10);
    }

    #[test]
    fn test_summaries_in_order() {
        let command = SimulateCommand::new(args(vec![0], 8), host(0)).unwrap();
        let report = command.run().unwrap();
        let ids: Vec<_> = report.summaries.iter().map(|s| s.id).collect();
        assert_eq!(ids, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_recompilation_limit() {
        let command = SimulateCommand::new(args(vec![], 3), host(2)).unwrap();
        let err = command.run().unwrap_err();
        assert!(matches!(err, DriverError::RecompilationLimit { limit: 2, .. }));
        assert!(err.is_process_fatal());
    }

    #[test]
    fn test_missing_stub_aborts_compilation() {
        let mut config = host(0);
        config.stubs.shift_remove("store_barrier_on_oop_field_with_healing");
        let report = SimulateCommand::new(args(vec![], 2), config)
            .unwrap()
            .run()
            .unwrap();

        assert!(report.summaries.is_empty());
        assert_eq!(report.failures.len(), 2);
        for (_, err) in &report.failures {
            assert!(matches!(err, DriverError::Barrier(_)));
            assert!(!err.is_process_fatal());
        }
    }

    #[test]
    fn test_failed_compilations_keep_finished_summaries() {
        let command = SimulateCommand::new(args(vec![0], 4), host(0)).unwrap();
        let report = command
            .run_with(|compilation, index| {
                emit_method(compilation, &[0])?;
                if index % 2 == 1 {
                    compilation.lock_slot(LockDepth(u32::MAX))?;
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(report.summaries.len(), 2);
        assert!(report.summaries.iter().all(|s| s.lock_slots.len() == 1));
        let mut failed: Vec<_> = report.failures.iter().map(|(index, _)| *index).collect();
        failed.sort_unstable();
        assert_eq!(failed, vec![1, 3]);
        assert!(report
            .failures
            .iter()
            .all(|(_, err)| matches!(err, DriverError::Frame(_))));
    }
}
