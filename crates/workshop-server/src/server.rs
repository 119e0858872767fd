//! Development server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tower_http::services::ServeDir;

use workshop_static::{BuildConfig, StaticBuilder};

use crate::watcher::{FileWatcher, SourceChange, SourceRoots};
use crate::websocket::{reload_client_script, ReloadHub, ReloadMessage, RELOAD_PATH};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Build settings for the served workshop
    pub build: BuildConfig,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

impl DevServerConfig {
    /// Source directories whose changes trigger a rebuild.
    pub fn source_roots(&self) -> SourceRoots {
        SourceRoots {
            pages: self.build.docs_dir.clone(),
            resources: self.build.resources_dir.clone(),
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Build error: {0}")]
    BuildError(String),
}

/// Shared server state.
struct ServerState {
    builder: StaticBuilder,
    reload: ReloadHub,
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Build the workshop, then serve it and rebuild on every source change.
    pub async fn start(self) -> Result<(), ServerError> {
        let raw_addr = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = raw_addr
            .parse()
            .map_err(|_| ServerError::InvalidAddress(raw_addr.clone()))?;

        let mut build = self.config.build.clone();
        build.reload_script = Some(reload_client_script());
        let output_dir = build.output_dir.clone();

        let builder = StaticBuilder::new(build);
        let result = builder
            .build()
            .await
            .map_err(|e| ServerError::BuildError(e.to_string()))?;
        tracing::info!(
            "Built {} pages in {}ms",
            result.pages,
            result.duration_ms
        );

        let state = Arc::new(ServerState {
            builder,
            reload: ReloadHub::new(),
        });

        let (watcher, mut rx) = FileWatcher::new(self.config.source_roots())
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(change) = rx.recv().await {
                handle_source_change(&state_clone, change).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = router(state, output_dir);

        tracing::info!("Starting dev server at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

fn router(state: Arc<ServerState>, output_dir: PathBuf) -> Router {
    Router::new()
        .route(RELOAD_PATH, get(ws_handler))
        .fallback_service(ServeDir::new(output_dir))
        .with_state(state)
}

/// Rebuild after a source change and tell browsers the outcome.
async fn handle_source_change(state: &ServerState, change: SourceChange) {
    for path in &change.pages {
        tracing::info!("Page changed: {}", path.display());
    }
    if !change.resources.is_empty() {
        tracing::info!("{} resources changed", change.resources.len());
    }

    match state.builder.build().await {
        Ok(result) => {
            tracing::info!("Rebuilt {} pages in {}ms", result.pages, result.duration_ms);
            state.reload.send(ReloadMessage::Reload);
        }
        Err(e) => {
            tracing::warn!("Rebuild failed: {}", e);
            state.reload.send(ReloadMessage::BuildFailed {
                message: e.to_string(),
            });
        }
    }
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.reload.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|e| {
        tracing::warn!("Failed to encode reload message: {}", e);
    })?;
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn state_for(docs: PathBuf, output: PathBuf) -> ServerState {
        ServerState {
            builder: StaticBuilder::new(BuildConfig {
                docs_dir: docs,
                output_dir: output,
                minify: false,
                ..Default::default()
            }),
            reload: ReloadHub::new(),
        }
    }

    #[test]
    fn creates_server_with_default_config() {
        let server = DevServer::new(DevServerConfig::default());
        assert_eq!(server.config.port, 7777);
        assert_eq!(
            server.config.source_roots(),
            SourceRoots {
                pages: PathBuf::from("docs"),
                resources: None,
            }
        );
    }

    #[test]
    fn watches_resources_dir() {
        let mut config = DevServerConfig::default();
        config.build.resources_dir = Some(PathBuf::from("res"));

        assert_eq!(config.source_roots().resources, Some(PathBuf::from("res")));
    }

    #[tokio::test]
    async fn rejects_invalid_address() {
        let server = DevServer::new(DevServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        });

        let err = server.start().await.unwrap_err();

        assert!(matches!(err, ServerError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn rebuilds_and_broadcasts_reload() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        let output = temp.path().join("dist");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("01-intro.md"), "# Intro").unwrap();

        let state = state_for(docs.clone(), output.clone());
        let mut rx = state.reload.subscribe();

        let change = SourceChange {
            pages: vec![docs.join("01-intro.md")],
            ..Default::default()
        };
        handle_source_change(&state, change).await;

        assert_eq!(rx.try_recv().unwrap(), ReloadMessage::Reload);
        assert!(output.join("0.html").exists());
    }

    #[tokio::test]
    async fn reports_failed_rebuild() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("01-broken.md"), "---\ntitle: Broken\n").unwrap();

        let state = state_for(docs.clone(), temp.path().join("dist"));
        let mut rx = state.reload.subscribe();

        let change = SourceChange {
            pages: vec![docs.join("01-broken.md")],
            ..Default::default()
        };
        handle_source_change(&state, change).await;

        match rx.try_recv().unwrap() {
            ReloadMessage::BuildFailed { message } => assert!(message.contains("01-broken.md")),
            other => panic!("Expected BuildFailed, got {:?}", other),
        }
    }
}
