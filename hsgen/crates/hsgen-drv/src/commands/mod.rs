//! Command modules for the hsgen CLI.
//!
//! Each subcommand lives in its own file with an args struct, a command
//! handler and a `run_*` entry point.

pub mod check;
pub mod simulate;

pub use check::{run_check, CheckArgs};
pub use simulate::{run_simulate, SimulateArgs};
