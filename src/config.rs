use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;
use url::Url;

use crate::division::Division;

/// Staging server configuration: server group -> logical name -> URI.
pub type ServerMap = HashMap<String, HashMap<String, String>>;

/// Server configuration file loaded once per invocation.
///
/// The file also carries default service endpoints so operators do not have
/// to repeat them on every run; command-line flags override both.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub servers: ServerMap,
    pub dbcopy_url: Option<String>,
    pub metadata_url: Option<String>,
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<ServerConfig> {
        info!("Reading server configuration from {}", path.display());
        let json = fs::read_to_string(path)
            .with_context(|| format!("Can't read config file {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config file {}", path.display()))
    }
}

/// Resolve a logical server name (e.g. `sta-a`) to a connection URI for the
/// division's server group. An unmapped name is taken to be a literal server
/// address and returned unchanged.
pub fn resolve_server(servers: &ServerMap, division: Division, name: &str) -> String {
    servers
        .get(division.server_group())
        .and_then(|group| group.get(&name.to_lowercase()))
        .cloned()
        .unwrap_or_else(|| name.to_string())
}

/// Reduce a server address to `host:port` form for the host-based copy API.
/// Plain `host:port` strings pass through untouched.
pub fn host_port(server: &str) -> Result<String> {
    if !server.contains("://") {
        return Ok(server.to_string());
    }
    let url = Url::parse(server).with_context(|| format!("Invalid server URI: {server}"))?;
    let host = url
        .host_str()
        .with_context(|| format!("Server URI has no host: {server}"))?;
    match url.port() {
        Some(port) => Ok(format!("{host}:{port}")),
        None => Ok(host.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_map() -> ServerMap {
        serde_json::from_str(
            r#"{
                "vertebrates": {"sta-a": "mysql://user@sta-a-host:4684"},
                "nonvertebrates": {"sta-a": "mysql://user@sta-a-nv-host:4684"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn logical_name_resolves_per_division() {
        let servers = server_map();
        assert_eq!(
            resolve_server(&servers, Division::Vertebrates, "sta-a"),
            "mysql://user@sta-a-host:4684"
        );
        assert_eq!(
            resolve_server(&servers, Division::Plants, "sta-a"),
            "mysql://user@sta-a-nv-host:4684"
        );
    }

    #[test]
    fn unmapped_name_is_literal() {
        let servers = server_map();
        assert_eq!(
            resolve_server(&servers, Division::Vertebrates, "mysql://me@elsewhere:3306"),
            "mysql://me@elsewhere:3306"
        );
    }

    #[test]
    fn host_port_from_uri() {
        assert_eq!(host_port("mysql://user@sta-a-host:4684").unwrap(), "sta-a-host:4684");
        assert_eq!(host_port("sta-a-host:4684").unwrap(), "sta-a-host:4684");
    }
}
