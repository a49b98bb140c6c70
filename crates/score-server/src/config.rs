use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::args::Args;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("cannot resolve listen address {0}")]
    InvalidAddr(String),
}

/// Server settings, loadable from TOML. Every key is optional.
///
/// ```toml
/// host = "127.0.0.1"
/// port = 3001
/// database = "/var/lib/2048/scores.db"
/// ```
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::host")]
    pub host: String,
    #[serde(default = "defaults::port")]
    pub port: u16,
    #[serde(default = "defaults::database")]
    pub database: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            database: defaults::database(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = toml::from_str(&contents)?;
        Ok(cfg)
    }

    /// Flags over file over defaults.
    pub fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let mut cfg = match &args.config {
            Some(path) => Self::from_toml(path)?,
            None => Self::default(),
        };
        if let Some(host) = &args.host {
            cfg.host = host.clone();
        }
        if let Some(port) = args.port {
            cfg.port = port;
        }
        if let Some(db) = &args.db {
            cfg.database = db.clone();
        }
        Ok(cfg)
    }

    /// Resolve `host:port`; host names such as `localhost` go through the system resolver.
    pub async fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let invalid = || ConfigError::InvalidAddr(format!("{}:{}", self.host, self.port));
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|_| invalid())?
            .next()
            .ok_or_else(invalid)
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn host() -> String { "0.0.0.0".to_string() }
    pub fn port() -> u16 { 3001 }
    pub fn database() -> PathBuf { PathBuf::from("scores.db") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn defaults_without_file_or_flags() {
        let cfg = ServerConfig::resolve(&Args::default()).unwrap();
        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.port, 3001);
        assert_eq!(cfg.socket_addr().await.unwrap().to_string(), "0.0.0.0:3001");
    }

    #[test]
    fn flags_override_file() {
        let td = tempdir().unwrap();
        let path = td.path().join("server.toml");
        std::fs::write(&path, "port = 8088\ndatabase = \"from-file.db\"\n").unwrap();

        let from_file = ServerConfig::from_toml(&path).unwrap();
        assert_eq!(from_file.port, 8088);
        assert_eq!(from_file.host, "0.0.0.0");
        assert_eq!(from_file.database, PathBuf::from("from-file.db"));

        let args = Args {
            config: Some(path),
            host: Some("127.0.0.1".to_string()),
            db: Some(PathBuf::from("flag.db")),
            ..Args::default()
        };
        let cfg = ServerConfig::resolve(&args).unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8088);
        assert_eq!(cfg.database, PathBuf::from("flag.db"));
    }

    #[test]
    fn bad_inputs_are_reported() {
        let args = Args {
            config: Some(PathBuf::from("/definitely/not/here.toml")),
            ..Args::default()
        };
        assert!(matches!(
            ServerConfig::resolve(&args),
            Err(ConfigError::FileRead { .. })
        ));

        let td = tempdir().unwrap();
        let path = td.path().join("bad.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();
        assert!(matches!(
            ServerConfig::from_toml(&path),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[tokio::test]
    async fn host_names_are_resolved() {
        let cfg = ServerConfig {
            host: "localhost".to_string(),
            port: 4001,
            ..ServerConfig::default()
        };
        let addr = cfg.socket_addr().await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 4001);

        let cfg = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            cfg.socket_addr().await,
            Err(ConfigError::InvalidAddr(_))
        ));
    }
}
