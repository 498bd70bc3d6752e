use partydeck_ai::BOT_NAMES;
use partydeck_server::MatchSettings;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub pick_timeout_secs: u64,
    pub round_delay_secs: u64,
    pub seed: Option<u64>,
    pub shuffle: bool,
    pub bot: String,
}

impl Default for Config {
    fn default() -> Self {
        let settings = MatchSettings::default();
        Self {
            pick_timeout_secs: settings.pick_timeout_secs,
            round_delay_secs: settings.round_delay_secs,
            seed: settings.seed,
            shuffle: settings.shuffle_decks,
            bot: "baseline".into(),
        }
    }
}

impl Config {
    pub fn match_settings(&self, rounds: Option<usize>) -> MatchSettings {
        MatchSettings {
            pick_timeout_secs: self.pick_timeout_secs,
            round_delay_secs: self.round_delay_secs,
            rounds,
            shuffle_decks: self.shuffle,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub pick_timeout_secs: ValueSource,
    pub round_delay_secs: ValueSource,
    pub seed: ValueSource,
    pub shuffle: ValueSource,
    pub bot: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            pick_timeout_secs: ValueSource::Default,
            round_delay_secs: ValueSource::Default,
            seed: ValueSource::Default,
            shuffle: ValueSource::Default,
            bot: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

/// Defaults, then the TOML file named by `PARTYDECK_CONFIG`, then
/// `PARTYDECK_*` environment variables.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var("PARTYDECK_CONFIG")
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.pick_timeout_secs {
            cfg.pick_timeout_secs = v;
            sources.pick_timeout_secs = ValueSource::File;
        }
        if let Some(v) = f.round_delay_secs {
            cfg.round_delay_secs = v;
            sources.round_delay_secs = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.shuffle {
            cfg.shuffle = v;
            sources.shuffle = ValueSource::File;
        }
        if let Some(v) = f.bot {
            cfg.bot = v;
            sources.bot = ValueSource::File;
        }
    }

    if let Some(v) = env_value("PARTYDECK_PICK_TIMEOUT") {
        cfg.pick_timeout_secs = v
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid pick timeout".into()))?;
        sources.pick_timeout_secs = ValueSource::Env;
    }
    if let Some(v) = env_value("PARTYDECK_ROUND_DELAY") {
        cfg.round_delay_secs = v
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid round delay".into()))?;
        sources.round_delay_secs = ValueSource::Env;
    }
    if let Some(v) = env_value("PARTYDECK_SEED") {
        cfg.seed = Some(
            v.parse()
                .map_err(|_| ConfigError::Invalid("Invalid seed".into()))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Some(v) = env_value("PARTYDECK_SHUFFLE") {
        cfg.shuffle = parse_bool(&v).ok_or_else(|| ConfigError::Invalid("Invalid shuffle".into()))?;
        sources.shuffle = ValueSource::Env;
    }
    if let Some(v) = env_value("PARTYDECK_BOT") {
        cfg.bot = v;
        sources.bot = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    pick_timeout_secs: Option<u64>,
    #[serde(default)]
    round_delay_secs: Option<u64>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    shuffle: Option<bool>,
    #[serde(default)]
    bot: Option<String>,
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    cfg.match_settings(None)
        .validate()
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    if !BOT_NAMES.contains(&cfg.bot.as_str()) {
        return Err(ConfigError::Invalid(format!(
            "unknown bot '{}' (expected one of: {})",
            cfg.bot,
            BOT_NAMES.join(", ")
        )));
    }
    Ok(())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_match_settings() {
        let cfg = Config::default();
        assert_eq!(cfg.match_settings(Some(2)).rounds, Some(2));
        assert_eq!(cfg.pick_timeout_secs, 30);
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn unknown_bot_is_invalid() {
        let cfg = Config {
            bot: "oracle".into(),
            ..Config::default()
        };
        let err = validate(&cfg).unwrap_err();
        assert!(err.to_string().contains("unknown bot 'oracle'"));
    }

    #[test]
    fn parses_bool_spellings() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
