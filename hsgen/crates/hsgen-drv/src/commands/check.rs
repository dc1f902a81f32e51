//! Check command implementation.
//!
//! Binds a fresh registry and stub table from a host description and
//! reports what the host exports.

use anyhow::{bail, Context, Result};
use hsgen_drv::{HostConfig, Session};
use hsgen_mark::Mark;
use hsgen_zgc::BarrierStub;
use serde::Serialize;

/// Arguments for the check command.
#[derive(Debug, Clone, Default)]
pub struct CheckArgs {
    /// Print the report as JSON.
    pub json: bool,
}

/// Binding state of one mark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkStatus {
    pub name: &'static str,
    pub group: String,
    pub optional: bool,
    pub value: Option<i64>,
}

/// Export state of one barrier stub.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StubStatus {
    pub name: &'static str,
    pub address: Option<u64>,
}

/// What a host description provides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub marks: Vec<MarkStatus>,
    pub stubs: Vec<StubStatus>,
    pub entry_barrier: bool,
    pub method_handle_deopt: bool,
}

impl CheckReport {
    /// Report on a bound session.
    pub fn from_session(session: &Session) -> Self {
        let registry = session.registry();
        let marks = registry
            .snapshot()
            .into_iter()
            .map(|(mark, value)| mark_status(mark, value))
            .collect();
        let stubs = BarrierStub::ALL
            .iter()
            .map(|&stub| StubStatus {
                name: stub.name(),
                address: session.stubs().get(stub).ok().map(|desc| desc.address()),
            })
            .collect();

        Self {
            marks,
            stubs,
            entry_barrier: registry.has_entry_barrier(),
            method_handle_deopt: registry.supports_method_handle_deopt(),
        }
    }

    /// Report straight from the description, for hosts that failed binding.
    pub fn from_config(config: &HostConfig) -> Self {
        let value_of = |mark: Mark| config.mark_constant(&mark.constant_key());
        let marks = Mark::ALL
            .iter()
            .map(|&mark| mark_status(mark, value_of(mark)))
            .collect();
        let stubs = BarrierStub::ALL
            .iter()
            .map(|&stub| StubStatus {
                name: stub.name(),
                address: config.stubs.get(stub.name()).copied().filter(|&a| a != 0),
            })
            .collect();

        Self {
            marks,
            stubs,
            entry_barrier: value_of(Mark::EntryBarrierPatch).is_some(),
            method_handle_deopt: value_of(Mark::DeoptMhHandlerEntry).is_some(),
        }
    }

    pub fn missing_stubs(&self) -> Vec<&'static str> {
        self.stubs
            .iter()
            .filter(|stub| stub.address.is_none())
            .map(|stub| stub.name)
            .collect()
    }

    fn print_text(&self) {
        println!("Marks:");
        for mark in &self.marks {
            let value = match mark.value {
                Some(value) => format!("{value:#x}"),
                None if mark.optional => "not exported (optional)".to_string(),
                None => "MISSING".to_string(),
            };
            println!("  {:<55} {}", mark.name, value);
        }

        println!("Barrier stubs:");
        for stub in &self.stubs {
            let address = stub
                .address
                .map_or_else(|| "MISSING".to_string(), |a| format!("{a:#x}"));
            println!("  {:<55} {}", stub.name, address);
        }

        println!("Entry barrier: {}", yes_no(self.entry_barrier));
        println!("Method handle deopt: {}", yes_no(self.method_handle_deopt));
    }
}

fn mark_status(mark: Mark, value: Option<i64>) -> MarkStatus {
    MarkStatus {
        name: mark.name(),
        group: format!("{:?}", mark.group()),
        optional: mark.is_optional(),
        value,
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Check command handler.
pub struct CheckCommand {
    args: CheckArgs,
    config: HostConfig,
}

impl CheckCommand {
    pub fn new(args: CheckArgs, config: HostConfig) -> Self {
        Self { args, config }
    }

    pub fn run(self) -> Result<()> {
        let bound = Session::new(self.config.clone());
        let report = match &bound {
            Ok(session) => CheckReport::from_session(session),
            Err(_) => CheckReport::from_config(&self.config),
        };

        if self.args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            report.print_text();
        }

        bound.context("host description rejected")?;
        let missing = report.missing_stubs();
        if !missing.is_empty() {
            bail!("host does not export barrier stubs: {}", missing.join(", "));
        }

        tracing::info!("host description OK");
        Ok(())
    }
}

/// Run the check command.
pub fn run_check(args: CheckArgs, config: HostConfig) -> Result<()> {
    CheckCommand::new(args, config).run()
}
