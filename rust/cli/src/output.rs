//! Exit codes and the stderr conventions every subcommand follows.

use std::io::Write;

pub const SUCCESS: i32 = 0;

/// Bad arguments, bad configuration, unreadable decks or a failed match.
pub const ERROR: i32 = 2;

pub fn error(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "partydeck: error: {}", msg)
}

pub fn warning(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "partydeck: warning: {}", msg)
}
