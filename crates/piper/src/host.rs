// ABOUTME: Unix socket callback server the SSH proxy host connects to.
// ABOUTME: Newline-delimited JSON requests map onto the PluginCallbacks surface.

use crate::auth::{AuthMethod, ConnMetadata, PluginCallbacks, Upstream, UpstreamAuth};
use anyhow::{Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;

/// Replies queued per host connection before request tasks wait on the writer.
const REPLY_QUEUE_DEPTH: usize = 64;

/// Connection metadata as sent by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConn {
    pub unique_id: String,
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<String>,
}

impl ConnMetadata for HostConn {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn user(&self) -> &str {
        &self.user
    }

    fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    NextAuthMethods {
        conn: HostConn,
    },
    PublicKey {
        conn: HostConn,
        /// Base64 of the SSH wire-format public key blob.
        key: String,
    },
    Banner {
        conn: HostConn,
    },
}

/// Upstream as serialized back to the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpstreamReply {
    pub host: String,
    pub port: u16,
    pub user_name: String,
    pub private_key: String,
    pub ignore_host_key: bool,
}

impl From<Upstream> for UpstreamReply {
    fn from(upstream: Upstream) -> Self {
        let UpstreamAuth::PrivateKey(private_key) = upstream.auth;
        Self {
            host: upstream.host,
            port: upstream.port,
            user_name: upstream.user_name,
            private_key: String::from_utf8_lossy(&private_key).into_owned(),
            ignore_host_key: upstream.ignore_host_key,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Response {
    /// Echo of the request's `id`, so replies can arrive out of order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<AuthMethod>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream: Option<UpstreamReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

impl Response {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Bind the socket at `path`, replacing any stale one, and serve forever.
pub async fn run_socket_server(path: &Path, callbacks: Arc<dyn PluginCallbacks>) -> Result<()> {
    // Remove existing socket
    let _ = std::fs::remove_file(path);

    let listener = UnixListener::bind(path)
        .with_context(|| format!("Failed to bind socket {}", path.display()))?;
    tracing::info!(path = %path.display(), "Plugin socket listening");

    serve(listener, callbacks).await
}

/// Accept host connections on an already-bound listener.
///
/// Every request runs on its own task, so a slow provisioning call only holds
/// up its own reply, even when the host multiplexes many SSH connections over
/// one socket.
pub async fn serve(listener: UnixListener, callbacks: Arc<dyn PluginCallbacks>) -> Result<()> {
    loop {
        let (stream, _) = listener.accept().await?;
        let callbacks = Arc::clone(&callbacks);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, callbacks).await {
                tracing::warn!(error = %e, "Host connection error");
            }
        });
    }
}

async fn handle_connection(stream: UnixStream, callbacks: Arc<dyn PluginCallbacks>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    let (reply_tx, mut reply_rx) = mpsc::channel::<String>(REPLY_QUEUE_DEPTH);
    let writer_task = tokio::spawn(async move {
        while let Some(reply) = reply_rx.recv().await {
            writer.write_all(reply.as_bytes()).await?;
        }
        anyhow::Ok(())
    });

    while reader.read_line(&mut line).await? > 0 {
        if !line.trim().is_empty() {
            let callbacks = Arc::clone(&callbacks);
            let reply_tx = reply_tx.clone();
            let request = line.clone();
            tokio::spawn(async move {
                let response = dispatch(&request, callbacks.as_ref()).await;
                match serde_json::to_string(&response) {
                    Ok(json) => {
                        let _ = reply_tx.send(json + "\n").await;
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to encode host reply"),
                }
            });
        }
        line.clear();
    }

    // In-flight requests hold their own senders; the writer drains until they finish.
    drop(reply_tx);
    writer_task.await?
}

/// Parse one request line and run it, tagging the reply with the request's id.
async fn dispatch(line: &str, callbacks: &dyn PluginCallbacks) -> Response {
    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => return Response::failure(format!("invalid request: {e}")),
    };
    let id = value.get("id").and_then(serde_json::Value::as_u64);

    let mut response = match serde_json::from_value::<Request>(value) {
        Ok(request) => handle_request(request, callbacks).await,
        Err(e) => Response::failure(format!("invalid request: {e}")),
    };
    response.id = id;
    response
}

async fn handle_request(request: Request, callbacks: &dyn PluginCallbacks) -> Response {
    match request {
        Request::NextAuthMethods { conn } => Response {
            success: true,
            methods: Some(callbacks.next_auth_methods(&conn)),
            ..Default::default()
        },
        Request::PublicKey { conn, key } => {
            let key = match base64::engine::general_purpose::STANDARD.decode(key.trim()) {
                Ok(key) => key,
                Err(e) => return Response::failure(format!("invalid key encoding: {e}")),
            };
            match callbacks.public_key_auth(&conn, &key).await {
                Ok(upstream) => Response {
                    success: true,
                    upstream: Some(upstream.into()),
                    ..Default::default()
                },
                Err(e) => Response::failure(e.to_string()),
            }
        }
        Request::Banner { conn } => Response {
            success: true,
            banner: Some(callbacks.banner(&conn)),
            ..Default::default()
        },
    }
}
