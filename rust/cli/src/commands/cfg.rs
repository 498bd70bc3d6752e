//! `cfg`: print the resolved configuration as JSON, each value with its source
//! (`default`, `file` or `env`).

use crate::config;
use crate::error::CliError;
use crate::output;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            output::error(err, &format!("Invalid configuration: {}", e))?;
            return Err(CliError::Config(e.to_string()));
        }
    };

    let config::ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "pick_timeout_secs": {
            "value": config.pick_timeout_secs,
            "source": sources.pick_timeout_secs,
        },
        "round_delay_secs": {
            "value": config.round_delay_secs,
            "source": sources.round_delay_secs,
        },
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "shuffle": {
            "value": config.shuffle,
            "source": sources.shuffle,
        },
        "bot": {
            "value": config.bot,
            "source": sources.bot,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
