//! Binary entry point for the CubeLink voxel world client.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI
//! flags. Run with `cargo run -p cubelink-app -- --server 10.0.0.2` to point
//! at a server, or `-- --offline` to stay in the generated world.

mod platform;

use clap::Parser;
use cubelink_client::Client;
use cubelink_config::{CliArgs, Config};
use platform::PlatformDirs;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    let dirs = match PlatformDirs::resolve_and_create() {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to initialize platform directories: {e}");
            std::process::exit(1);
        }
    };
    let config_dir = args.config.clone().unwrap_or_else(|| dirs.config_dir.clone());

    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_dir.display());
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    cubelink_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.network.host,
        port = config.network.port,
        auto_connect = config.network.auto_connect,
        "cubelink starting"
    );

    let mut client = Client::new(&config);
    tokio::select! {
        _ = client.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(status = client.status().label(), "shutting down");
        }
    }
}
