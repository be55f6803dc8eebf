use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_PORT: u16 = 3000;

/// Frontecs server - serves the site and persists editor changes
#[derive(Parser, Debug, Clone)]
#[command(name = "frontecs-server")]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Site root containing dist/, __editor__/ and edits.json
    #[arg(env = "ROOT_DIR", default_value = ".")]
    pub root_dir: PathBuf,
}

impl ServerConfig {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}
