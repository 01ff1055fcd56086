// ABOUTME: Library root for the piper provisioning plugin.
// ABOUTME: Exports config, provisioning client, banner store, auth callbacks, and host socket.

pub mod auth;
pub mod banner;
pub mod client;
pub mod config;
pub mod error;
pub mod host;
pub mod protocol;

pub use auth::{
    AuthMethod, ConnMetadata, PluginCallbacks, ProvisioningPlugin, Upstream, UpstreamAuth,
};
pub use banner::BannerStore;
pub use client::{ProvisionClient, Provisioned, PROVISION_TIMEOUT};
pub use config::{PluginArgs, PluginConfig, UpstreamDefaults};
pub use error::{ConfigError, ProvisionError, Result};
pub use protocol::{ProvisionRequest, ProvisionResponse, UpstreamSpec};

use std::sync::Arc;
use tracing::info;

/// Run the plugin until the socket server fails or a shutdown signal arrives.
pub async fn run(config: PluginConfig) -> anyhow::Result<()> {
    info!(
        endpoint = %config.endpoint,
        upstream_host = %config.defaults.host,
        upstream_port = config.defaults.port,
        upstream_user = %config.defaults.user,
        "piper-provision starting"
    );

    let client = ProvisionClient::new(&config)?;
    let banners = Arc::new(BannerStore::new());
    let plugin: Arc<dyn PluginCallbacks> = Arc::new(ProvisioningPlugin::new(client, banners));

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let result = tokio::select! {
        result = host::run_socket_server(&config.listen, plugin) => result,
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
            Ok(())
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
            Ok(())
        }
    };

    let _ = std::fs::remove_file(&config.listen);
    info!("piper-provision stopped");
    result
}
