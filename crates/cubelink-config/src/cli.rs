//! Command-line argument parsing for the CubeLink client.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// CubeLink command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "cubelink", about = "CubeLink voxel world client")]
pub struct CliArgs {
    /// Server hostname or address.
    #[arg(long)]
    pub server: Option<String>,

    /// Server port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Player name sent at login.
    #[arg(long)]
    pub name: Option<String>,

    /// Skip connecting and stay in the offline world.
    #[arg(long)]
    pub offline: bool,

    /// View distance in chunks.
    #[arg(long)]
    pub view_distance: Option<u8>,

    /// Offline terrain seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref host) = args.server {
            self.network.host = host.clone();
        }
        if let Some(port) = args.port {
            self.network.port = port;
        }
        if let Some(ref name) = args.name {
            self.network.player_name = name.clone();
        }
        if args.offline {
            self.network.auto_connect = false;
        }
        if let Some(vd) = args.view_distance {
            self.game.view_distance = vd;
        }
        if let Some(seed) = args.seed {
            self.game.world_seed = seed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
