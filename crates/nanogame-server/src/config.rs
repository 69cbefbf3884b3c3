use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::error::ServerError;

#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub game: GameSection,
    #[serde(default)]
    pub network: NetworkSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Live connections allowed at once, in any phase.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Player limit advertised in the status response.
    #[serde(default = "default_max_players")]
    pub max_players: u32,
    #[serde(default = "default_motd")]
    pub motd: String,
}

fn default_address() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    6969
}

fn default_max_connections() -> usize {
    64
}

fn default_max_players() -> u32 {
    20
}

fn default_motd() -> String {
    "A nanogame server".into()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            max_connections: default_max_connections(),
            max_players: default_max_players(),
            motd: default_motd(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GameSection {
    /// Ticks between keepalives. 0 = disabled. Default: 200 (10 seconds).
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval_ticks: u64,
    /// Broadcast a chat line when a player joins or leaves.
    #[serde(default = "default_true")]
    pub announce_joins: bool,
}

fn default_keepalive_interval() -> u64 {
    200
}

fn default_true() -> bool {
    true
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            keepalive_interval_ticks: default_keepalive_interval(),
            announce_joins: true,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NetworkSection {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Largest frame a client may send. Capped at 16 KiB.
    #[serde(default = "default_max_frame_length")]
    pub max_frame_length: usize,
    #[serde(default = "default_write_timeout")]
    pub write_timeout_ms: u64,
}

fn default_tick_interval() -> u64 {
    50
}

fn default_max_frame_length() -> usize {
    nanogame_proto::frame::MAX_FRAME_LENGTH
}

fn default_write_timeout() -> u64 {
    5000
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            max_frame_length: default_max_frame_length(),
            write_timeout_ms: default_write_timeout(),
        }
    }
}

impl NetworkSection {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ServerError::Config(format!("{}: {e}", path.display()))),
        };
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ServerError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ServerError> {
        if self.server.max_connections == 0 {
            return Err(ServerError::Config("max_connections must be at least 1".into()));
        }
        if self.network.tick_interval_ms == 0 {
            return Err(ServerError::Config("tick_interval_ms must be at least 1".into()));
        }
        if self.network.max_frame_length > nanogame_proto::frame::MAX_FRAME_LENGTH {
            return Err(ServerError::Config(format!(
                "max_frame_length may not exceed {}",
                nanogame_proto::frame::MAX_FRAME_LENGTH
            )));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.server.address, self.server.port)
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid bind address: {e}")))
    }
}
