use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Chat relay server
#[derive(Parser, Serialize, Deserialize, Clone, Debug)]
#[command(name = "relay-server", version, about = "Multi-room chat relay server")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "RELAY_PORT", default_value = "4000")]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "RELAY_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Path to TOML config file
    #[arg(long, default_value = "./relay.toml")]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "RELAY_JSON_LOGS")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    pub generate_config: bool,

    /// Data directory for persistent state (message archive, accounts)
    #[arg(long, env = "RELAY_DATA_DIR", default_value = "./data")]
    pub data_dir: String,

    /// Directory of static frontend assets served at /
    #[arg(long, env = "RELAY_STATIC_DIR", default_value = "./static")]
    pub static_dir: String,

    /// Number of archived messages delivered as history on room join
    #[arg(long, env = "RELAY_HISTORY_LIMIT", default_value = "50")]
    pub history_limit: u32,

    /// Room name catalog (loaded from the `rooms` key in TOML)
    #[arg(skip)]
    #[serde(default = "default_rooms_config")]
    pub rooms: Option<Vec<String>>,
}

/// Built-in catalog used when the config file does not set one.
pub fn default_rooms() -> Vec<String> {
    ["general", "sports", "tech", "random"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_rooms_config() -> Option<Vec<String>> {
    Some(default_rooms())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 4000,
            bind_address: "0.0.0.0".to_string(),
            config: "./relay.toml".to_string(),
            json_logs: false,
            generate_config: false,
            data_dir: "./data".to_string(),
            static_dir: "./static".to_string(),
            history_limit: 50,
            rooms: Some(default_rooms()),
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (RELAY_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        let cli = Config::parse();
        let config_path = cli.config.clone();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("RELAY_"))
            .merge(Serialized::defaults(cli))
            .extract()
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# Chat Relay Server Configuration
# Place this file at ./relay.toml or specify with --config <path>
# All settings can be overridden via environment variables (RELAY_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 4000)
# port = 4000

# Bind address (default: 0.0.0.0 — all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# Data directory for the SQLite message archive and account store
# data_dir = "./data"

# Directory of static frontend assets served at /
# static_dir = "./static"

# Number of archived messages delivered as history on room join (max 100)
# history_limit = 50

# Room name catalog offered to clients via GET /api/rooms.
# Rooms are pure partition keys over live sessions; the relay itself
# accepts any room name on join.
# rooms = ["general", "sports", "tech", "random"]
"#
    .to_string()
}
