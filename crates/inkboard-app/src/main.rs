//! Replay entry point.
//!
//! Usage: `inkboard-replay [config.json] <script.json>`

use inkboard_app::{ReplayError, Script, replay};
use inkboard_core::EngineConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("inkboard-replay: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ReplayError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, script_path) = match args.as_slice() {
        [script] => (EngineConfig::default(), script),
        [config, script] => (EngineConfig::from_file(config)?, script),
        _ => {
            return Err(ReplayError::Usage(
                "usage: inkboard-replay [config.json] <script.json>".to_string(),
            ));
        }
    };
    config.validate()?;

    log::info!("Replaying {script_path}");
    let script = Script::from_file(script_path)?;
    let outcome = replay(config, &script);
    println!("{}", outcome.to_json()?);
    Ok(())
}
