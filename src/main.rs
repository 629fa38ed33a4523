//! FX Lab Engine - command line entry point
//!
//! Usage: `fxlab_engine <bars.json> [config.json]`
//!
//! Reads a JSON array of bar records, runs one chart refresh with the given
//! configuration (defaults when omitted) and prints the result as JSON.

use std::env;
use std::fs;
use std::process::ExitCode;
use tracing::{error, info};

use fxlab_engine::{init_logger, load_config, parse_bars_json, ChartContext, EngineConfig, EngineError, VERSION};

fn read_file(path: &str) -> Result<String, EngineError> {
    fs::read_to_string(path).map_err(|source| EngineError::Read {
        path: path.to_string(),
        source,
    })
}

fn run(bars_path: &str, config_path: Option<&str>) -> Result<String, EngineError> {
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };

    let bars = parse_bars_json(&read_file(bars_path)?)?;
    info!("载入 {} 根K线: {}", bars.len(), bars_path);

    let mut context = ChartContext::new(config)?;
    context.merge(bars);
    let output = context.refresh();

    serde_json::to_string_pretty(&output).map_err(EngineError::Encode)
}

fn main() -> ExitCode {
    init_logger();

    let args: Vec<String> = env::args().skip(1).collect();
    let (bars_path, config_path) = match args.as_slice() {
        [bars] => (bars.as_str(), None),
        [bars, config] => (bars.as_str(), Some(config.as_str())),
        _ => {
            eprintln!("fxlab_engine {VERSION}");
            eprintln!("usage: fxlab_engine <bars.json> [config.json]");
            return ExitCode::from(2);
        }
    };

    match run(bars_path, config_path) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
