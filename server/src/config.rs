//! Server configuration. CLI args (positional `[host] [port]`) layered over in-code
//! defaults — the config-file format itself is out of scope (SPEC_FULL.md §6), so there
//! is no file loader here, only the `Config` struct a loader would eventually populate.

use clap::Parser;

/// `server [host] [port]`.
#[derive(Debug, Parser)]
#[command(name = "server", about = "Authoritative game server")]
pub struct Args {
    /// Address to bind to.
    #[arg(default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to.
    #[arg(default_value_t = 9000)]
    pub port: u16,
}

/// Runtime configuration, independent of how it was obtained.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub tick_rate: u32,
    pub player_speed: f32,
}

impl Config {
    pub fn from_args(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            tick_rate: shared::TICK_RATE,
            player_speed: shared::PLAYER_SPEED,
        }
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.tick_rate as f64)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            tick_rate: shared::TICK_RATE,
            player_speed: shared::PLAYER_SPEED,
        }
    }
}
