use std::env;
use std::process::ExitCode;
use anyhow::Context;
use log::{error, info};
use crate::config::load_config;
use crate::logging::setup_logger;

mod alarm;
mod config;
mod departures;
mod errors;
mod layout;
mod logging;
mod manager_bom;
mod manager_darksky;
mod manager_gpio;
mod manager_ptv;
mod manager_sensors;
mod models;
mod renderer;
mod time_correction;
mod weather;
mod worker;

const CONFIG_ENV: &str = "TRAINWX_CONFIG";
const DEFAULT_CONFIG: &str = "./config.toml";
const USAGE: &str = "usage: trainwx <display|moisture-alarm|storm-relay> [config_path]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Display,
    MoistureAlarm,
    StormRelay,
}

impl Mode {
    fn parse(arg: &str) -> Option<Mode> {
        match arg {
            "display" => Some(Mode::Display),
            "moisture-alarm" => Some(Mode::MoistureAlarm),
            "storm-relay" => Some(Mode::StormRelay),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Mode::Display => "display",
            Mode::MoistureAlarm => "moisture-alarm",
            Mode::StormRelay => "storm-relay",
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let Some(mode) = args.first().and_then(|a| Mode::parse(a)) else {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    };
    let config_path = resolve_config_path(args.get(1).cloned(), env::var(CONFIG_ENV).ok());

    match run(mode, &config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("trainwx: {:#}", e);
            ExitCode::FAILURE
        },
    }
}

fn run(mode: Mode, config_path: &str) -> anyhow::Result<()> {
    let config = load_config(config_path)
        .with_context(|| format!("loading configuration from {}", config_path))?;
    let _handle = setup_logger(&config.general).context("setting up logging")?;

    info!("trainwx version: {}", env!("CARGO_PKG_VERSION"));
    info!("starting {} pass", mode.name());

    let result = match mode {
        Mode::Display => worker::run_display(&config),
        Mode::MoistureAlarm => worker::run_moisture_alarm(&config),
        Mode::StormRelay => worker::run_storm_relay(&config),
    };

    result.with_context(|| format!("{} pass failed", mode.name()))
}

/// Argument first, then environment, then the working directory
fn resolve_config_path(arg: Option<String>, env_value: Option<String>) -> String {
    arg.or(env_value).unwrap_or_else(|| DEFAULT_CONFIG.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_modes() {
        assert_eq!(Mode::parse("display"), Some(Mode::Display));
        assert_eq!(Mode::parse("moisture-alarm"), Some(Mode::MoistureAlarm));
        assert_eq!(Mode::parse("storm-relay"), Some(Mode::StormRelay));
        assert_eq!(Mode::parse("Display"), None);
    }

    #[test]
    fn config_path_precedence() {
        assert_eq!(resolve_config_path(Some("a.toml".into()), Some("b.toml".into())), "a.toml");
        assert_eq!(resolve_config_path(None, Some("b.toml".into())), "b.toml");
        assert_eq!(resolve_config_path(None, None), "./config.toml");
    }
}
