use std::io;

use lightlvl_config::{ConfigError, ConfigStore, LoadOutcome};
use lightlvl_geom::ScanShape;
use lightlvl_runtime::{Scanner, ScannerState};
use thiserror::Error;

pub const COMMAND_NAME: &str = "lightlvl";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Help,
    Abort,
    Reload,
    ShowRadius,
    SetRadius(i64),
    ToggleContrast,
    ShowShape,
    SetShape(ScanShape),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0} is not a valid radius. It must be a number.")]
    InvalidRadius(String),
    #[error("{0} is not a shape. Use sphere or cube.")]
    UnknownShape(String),
    #[error("command '{0}' unknown")]
    Unknown(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not start scanning: {0}")]
    Spawn(#[from] io::Error),
}

/// Returns `None` when the line is not addressed to this command.
/// Accepts `.lightlvl`, `/lightlvl` and a bare `lightlvl`.
pub fn parse_line(line: &str) -> Option<Result<Command, CommandError>> {
    let mut words = line.split_whitespace();
    let head = words.next()?.trim_start_matches(['.', '/']);
    if !head.eq_ignore_ascii_case(COMMAND_NAME) {
        return None;
    }
    let args: Vec<&str> = words.collect();
    Some(parse(&args))
}

pub fn parse(args: &[&str]) -> Result<Command, CommandError> {
    let Some(first) = args.first() else {
        return Ok(Command::Toggle);
    };
    let value = args.get(1).copied();
    match first.to_ascii_lowercase().as_str() {
        "h" | "help" => Ok(Command::Help),
        "a" | "abort" => Ok(Command::Abort),
        "u" | "update" => Ok(Command::Reload),
        "r" | "rad" | "radius" => match value {
            None => Ok(Command::ShowRadius),
            Some(v) => v
                .parse::<i64>()
                .map(Command::SetRadius)
                .map_err(|_| CommandError::InvalidRadius(v.to_string())),
        },
        "c" | "contrast" => Ok(Command::ToggleContrast),
        "s" | "shape" => match value {
            None => Ok(Command::ShowShape),
            Some(v) => ScanShape::parse(v)
                .map(Command::SetShape)
                .ok_or_else(|| CommandError::UnknownShape(v.to_string())),
        },
        _ => Err(CommandError::Unknown(first.to_string())),
    }
}

pub fn help_lines() -> Vec<String> {
    [
        ".lightlvl : toggle light level highlighting",
        ".lightlvl h|help : show this help",
        ".lightlvl a|abort : stop scanning and clear stuck highlights",
        ".lightlvl u|update : reload the settings file",
        ".lightlvl r|rad|radius [n] : show or set the scan radius",
        ".lightlvl c|contrast : toggle color-contrast mode",
        ".lightlvl s|shape [sphere|cube] : show or set the scan shape",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn execute(
    cmd: Command,
    store: &mut ConfigStore,
    scanner: &mut Scanner,
) -> Result<Vec<String>, CommandError> {
    let reply = match cmd {
        Command::Toggle => match scanner.toggle()? {
            ScannerState::Scanning => "Light level highlighting on".to_string(),
            ScannerState::Idle => "Light level highlighting off".to_string(),
        },
        Command::Help => return Ok(help_lines()),
        Command::Abort => {
            scanner.abort();
            "Scanning stopped and highlights cleared".to_string()
        }
        Command::Reload => match store.reload() {
            LoadOutcome::Loaded => "Settings reloaded".to_string(),
            LoadOutcome::Missing => "No settings file found, defaults written".to_string(),
            LoadOutcome::Recovered(e) => format!("Settings file had errors ({e}), defaults written"),
        },
        Command::ShowRadius => format!("Current Radius: {}", store.config().radius),
        Command::SetRadius(r) => format!("Radius set to {}", store.set_radius(r)?),
        Command::ToggleContrast => {
            if store.toggle_color_contrast() {
                "Color contrast on".to_string()
            } else {
                "Color contrast off".to_string()
            }
        }
        Command::ShowShape => format!("Current Shape: {}", store.config().shape),
        Command::SetShape(shape) => {
            store.set_shape(shape);
            format!("Shape set to {shape}")
        }
    };
    Ok(vec![reply])
}

/// Parses and runs one input line, turning errors into chat lines.
pub fn dispatch(line: &str, store: &mut ConfigStore, scanner: &mut Scanner) -> Option<Vec<String>> {
    let result = parse_line(line)?.and_then(|cmd| execute(cmd, store, scanner));
    Some(match result {
        Ok(lines) => lines,
        Err(e) => {
            log::debug!("command failed: {:?}", e);
            vec![e.to_string()]
        }
    })
}
