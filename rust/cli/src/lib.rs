//! # Partydeck CLI Library
//!
//! Command-line tools around the partydeck match engine.
//!
//! The entry point is [`run`], which parses arguments, dispatches to a
//! subcommand and returns the process exit code.
//!
//! ```no_run
//! use std::io;
//! let args = ["partydeck", "simulate", "--players", "4", "--round-delay", "0"];
//! let code = partydeck_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Subcommands
//!
//! - `simulate`: play a full match between bots and print the rounds and standings
//! - `cfg`: show the resolved configuration and the source of each value

use clap::Parser;
use std::io::Write;

pub mod cli;
mod commands;
mod config;
mod decks;
mod error;
pub mod output;

use cli::{Commands, PartydeckCli};
use commands::{SimulateArgs, handle_cfg_command, handle_simulate_command};

pub use error::CliError;

const COMMANDS: &[&str] = &["simulate", "cfg"];

/// Parse `args` and run the chosen subcommand.
///
/// Returns `0` on success and `2` on any error (bad arguments, invalid
/// configuration, unreadable decks, a failed match). Help and version output
/// go to `out` with exit code `0`.
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match PartydeckCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return output::ERROR;
                    }
                    output::SUCCESS
                }
                _ => {
                    let _ = write_usage(err, &e.to_string());
                    output::ERROR
                }
            };
        }
    };

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out, err),
        Commands::Simulate {
            players,
            rounds,
            bot,
            seed,
            pick_timeout,
            round_delay,
            shuffle,
            questions,
            answers,
            json,
        } => handle_simulate_command(
            SimulateArgs {
                players,
                rounds,
                bot,
                seed,
                pick_timeout,
                round_delay,
                shuffle,
                questions,
                answers,
                json,
            },
            out,
            err,
        ),
    };

    match result {
        Ok(()) => output::SUCCESS,
        Err(CliError::Config(_)) => output::ERROR,
        Err(e) => {
            let _ = output::error(err, &e.to_string());
            output::ERROR
        }
    }
}

fn write_usage(err: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(err, "{}", message)?;
    writeln!(err)?;
    writeln!(err, "Partydeck CLI")?;
    writeln!(err, "Usage: partydeck <command> [options]\n")?;
    writeln!(err, "Commands:")?;
    for c in COMMANDS {
        writeln!(err, "  {}", c)?;
    }
    writeln!(err, "\nFor full help, run: partydeck --help")
}
