//! Marksheet server entry point.
//!
//! # Responsibility
//! - Load configuration from the environment and initialize logging.
//! - Run the startup hook before the listener accepts requests.

use log::error;
use marksheet_core::{init_logging, AppConfig};
use marksheet_web::{bootstrap_store, serve, AppState};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("marksheet: invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("marksheet: failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    bootstrap_store(&config.store);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(
                "event=server_start module=web status=error error_code=runtime_build_failed error={}",
                err
            );
            return ExitCode::FAILURE;
        }
    };

    let addr = config.listen_addr();
    let state = AppState::new(config.store);
    match runtime.block_on(serve(&addr, state)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(
                "event=server_exit module=web status=error addr={} error={}",
                addr, err
            );
            ExitCode::FAILURE
        }
    }
}
