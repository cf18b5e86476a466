#![forbid(unsafe_code)]

//! Command-line argument parsing for the Post Aid shell.
//!
//! Parses args manually to keep the binary lean. Flags override the config
//! file and `POSTAID_*` environment variables.

use std::fmt;
use std::path::PathBuf;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
Post Aid: unknown-recipient lookup and route notes for postal carriers

USAGE:
    postaid [OPTIONS]

OPTIONS:
    --config=PATH        JSON config file (also POSTAID_CONFIG)
    --store=PATH         JSON resident store (default: in memory)
    --offline            Skip network services; use the seasonal forecast
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    POSTAID_CONFIG              Config file path
    POSTAID_STORE               Override store_path
    POSTAID_KMA_KEY             KMA short-term forecast service key
    POSTAID_KMA_NX, _NY         Forecast grid cell (default 57, 74)
    POSTAID_KAKAO_KEY           Kakao local REST API key
    POSTAID_LOCATION            Location label for the briefing
    POSTAID_BUILDINGS           Canonical building order, ';' separated
    POSTAID_WEATHER_TIMEOUT_MS  Forecast deadline (default 10000)
    POSTAID_GEOCODE_TIMEOUT_MS  Per-address geocode timeout (default 5000)
    RUST_LOG                    Log filter for stderr (default warn)

Type 'help' at the prompt for commands.";

/// Parsed command-line options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opts {
    pub config: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub offline: bool,
}

/// What the process should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Run(Opts),
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    Unknown(String),
    MissingValue(&'static str),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(arg) => write!(f, "unknown argument: {arg}"),
            Self::MissingValue(flag) => write!(f, "{flag} needs a value"),
        }
    }
}

impl std::error::Error for CliError {}

impl Opts {
    /// Parse arguments, excluding the program name.
    pub fn parse_from<I, S>(args: I) -> Result<Action, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = Self::default();
        for arg in args {
            match arg.as_ref() {
                "--help" | "-h" => return Ok(Action::Help),
                "--version" | "-V" => return Ok(Action::Version),
                "--offline" => opts.offline = true,
                other => {
                    if let Some(val) = other.strip_prefix("--config=") {
                        opts.config = Some(path_value("--config", val)?);
                    } else if let Some(val) = other.strip_prefix("--store=") {
                        opts.store = Some(path_value("--store", val)?);
                    } else {
                        return Err(CliError::Unknown(other.to_owned()));
                    }
                }
            }
        }
        Ok(Action::Run(opts))
    }
}

fn path_value(flag: &'static str, val: &str) -> Result<PathBuf, CliError> {
    if val.trim().is_empty() {
        return Err(CliError::MissingValue(flag));
    }
    Ok(PathBuf::from(val))
}
