// ABOUTME: Process configuration for the provisioning plugin.
// ABOUTME: Parses flags/environment with clap and validates them into PluginConfig.

use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_UPSTREAM_HOST: &str = "127.0.0.1";
pub const DEFAULT_UPSTREAM_PORT: u16 = 2222;
pub const DEFAULT_UPSTREAM_USER: &str = "hacker";
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/piper-provision.sock";

/// Command-line flags; each one can also be supplied through the environment.
#[derive(Parser)]
#[command(name = "piper-provision")]
#[command(about = "SSH proxy plugin that provisions upstream accounts on demand")]
pub struct PluginArgs {
    /// Provisioning endpoint URL
    #[arg(long, env = "SSHPIPER_PROVISION_ENDPOINT")]
    pub endpoint: String,

    /// Bearer token for the provisioning endpoint
    #[arg(long, env = "SSHPIPER_PROVISION_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Upstream host used when the service does not name one
    #[arg(long, env = "SSHPIPER_UPSTREAM_HOST", default_value = DEFAULT_UPSTREAM_HOST)]
    pub upstream_host: String,

    /// Upstream port used when the service does not name one
    #[arg(
        long,
        env = "SSHPIPER_UPSTREAM_PORT",
        default_value_t = DEFAULT_UPSTREAM_PORT,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub upstream_port: u16,

    /// Upstream user used when the service does not name one
    #[arg(long, env = "SSHPIPER_UPSTREAM_USER", default_value = DEFAULT_UPSTREAM_USER)]
    pub upstream_user: String,

    /// Unix socket the host process connects to
    #[arg(long, env = "SSHPIPER_PLUGIN_SOCKET", default_value = DEFAULT_SOCKET_PATH)]
    pub listen: PathBuf,

    /// Append logs to this file instead of stderr
    #[arg(long, env = "SSHPIPER_PLUGIN_LOG")]
    pub log_file: Option<PathBuf>,
}

/// Static upstream fallbacks applied to partial provisioning responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamDefaults {
    pub host: String,
    pub port: u16,
    pub user: String,
}

impl Default for UpstreamDefaults {
    fn default() -> Self {
        Self {
            host: DEFAULT_UPSTREAM_HOST.to_string(),
            port: DEFAULT_UPSTREAM_PORT,
            user: DEFAULT_UPSTREAM_USER.to_string(),
        }
    }
}

/// Validated plugin configuration.
#[derive(Clone)]
pub struct PluginConfig {
    pub endpoint: Url,
    pub token: String,
    pub defaults: UpstreamDefaults,
    pub listen: PathBuf,
    pub log_file: Option<PathBuf>,
}

impl std::fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &"[REDACTED]")
            .field("defaults", &self.defaults)
            .field("listen", &self.listen)
            .field("log_file", &self.log_file)
            .finish()
    }
}

impl PluginConfig {
    /// Build a config for the given endpoint and token with stock defaults.
    pub fn new(endpoint: &str, token: &str) -> Result<Self, ConfigError> {
        let config = Self {
            endpoint: parse_endpoint(endpoint)?,
            token: token.to_string(),
            defaults: UpstreamDefaults::default(),
            listen: PathBuf::from(DEFAULT_SOCKET_PATH),
            log_file: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Override the upstream defaults.
    pub fn with_defaults(mut self, defaults: UpstreamDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::Empty("token"));
        }
        // Empty host/user defaults are allowed; the service must then supply them.
        Ok(())
    }
}

impl TryFrom<PluginArgs> for PluginConfig {
    type Error = ConfigError;

    fn try_from(args: PluginArgs) -> Result<Self, Self::Error> {
        let config = Self {
            endpoint: parse_endpoint(&args.endpoint)?,
            token: args.token,
            defaults: UpstreamDefaults {
                host: args.upstream_host,
                port: args.upstream_port,
                user: args.upstream_user,
            },
            listen: args.listen,
            log_file: args.log_file,
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(endpoint.trim()).map_err(|source| ConfigError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}
