use std::process::ExitCode;

use env_logger::Env;
use log::{error, info};

fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| sprig::sprig::config::CONFIG_FILE.to_string());

    info!("Growing your site...");
    match sprig::run(&config_path) {
        Ok(_) => {
            info!("Site built successfully.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Build failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}
