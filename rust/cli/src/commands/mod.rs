//! Command handlers, one module per subcommand.
//!
//! Each handler takes its output streams as `&mut dyn Write` and returns
//! `Result<(), CliError>`; `run` maps the result to an exit code.

pub mod cfg;
pub mod simulate;

pub use cfg::handle_cfg_command;
pub use simulate::{SimulateArgs, handle_simulate_command};
