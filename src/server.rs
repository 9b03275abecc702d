//! Short-lived local HTTP server.
//!
//! The PDF renderer reads pages over HTTP rather than from the filesystem, and
//! `docpress serve` previews the HTML output the same way. The server runs on
//! its own tokio runtime so the build pipeline itself stays synchronous.
//! [`LocalServer`] is a guard: dropping it stops the server.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::routing::get;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;

/// Characters escaped inside a URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// How long in-flight requests get to finish once shutdown starts.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("failed to start server runtime: {0}")]
    Runtime(std::io::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

// =============================================================================
// Options
// =============================================================================

/// Where to listen and whether to expose a stop-control listener.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub bind: String,
    /// 0 picks a free port
    pub port: u16,
    pub stop: Option<StopControl>,
}

/// A second listener that shuts the server down on `GET /stop/<key>`.
#[derive(Debug, Clone)]
pub struct StopControl {
    pub port: u16,
    pub key: String,
}

impl ServerOptions {
    /// Options from the `pdf` config section.
    pub fn from_config(pdf: &crate::config::PdfConfig) -> Self {
        let stop = match (pdf.stop_port, &pdf.stop_key) {
            (Some(port), Some(key)) => Some(StopControl {
                port,
                key: key.clone(),
            }),
            _ => None,
        };
        Self {
            bind: pdf.bind.clone(),
            port: pdf.port,
            stop,
        }
    }
}

// =============================================================================
// Server guard
// =============================================================================

/// A running static file server. Stopped on drop.
pub struct LocalServer {
    addr: SocketAddr,
    control_addr: Option<SocketAddr>,
    shutdown: Arc<watch::Sender<bool>>,
    tasks: Vec<JoinHandle<std::io::Result<()>>>,
    runtime: Option<Runtime>,
}

#[derive(Clone)]
struct StopState {
    key: Arc<str>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl LocalServer {
    /// Serve `root` over HTTP until the returned guard is dropped.
    pub fn start(root: &Path, options: &ServerOptions) -> Result<Self, ServerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("docpress-server")
            .enable_all()
            .build()
            .map_err(ServerError::Runtime)?;

        let (shutdown, _) = watch::channel(false);
        let shutdown = Arc::new(shutdown);

        let listener = runtime.block_on(bind(&options.bind, options.port))?;
        let addr = local_addr(&listener, &options.bind)?;

        let serve_dir = ServeDir::new(root).append_index_html_on_directories(true);
        let app = Router::new().fallback_service(serve_dir);
        let mut tasks = vec![runtime.spawn(serve(listener, app, shutdown.subscribe()))];

        let control_addr = match &options.stop {
            Some(control) => {
                let listener = runtime.block_on(bind(&options.bind, control.port))?;
                let control_addr = local_addr(&listener, &options.bind)?;
                let state = StopState {
                    key: Arc::from(control.key.as_str()),
                    shutdown: shutdown.clone(),
                };
                let app = Router::new()
                    .route("/stop/{key}", get(stop_handler))
                    .with_state(state);
                tasks.push(runtime.spawn(serve(listener, app, shutdown.subscribe())));
                tracing::info!(addr = %control_addr, "stop-control listener started");
                Some(control_addr)
            }
            None => None,
        };

        tracing::info!(%addr, root = %root.display(), "local server started");

        Ok(Self {
            addr,
            control_addr,
            shutdown,
            tasks,
            runtime: Some(runtime),
        })
    }

    #[cfg(test)]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn control_addr(&self) -> Option<SocketAddr> {
        self.control_addr
    }

    /// Base URL, e.g. `http://127.0.0.1:8123`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL of a file given by its path relative to the served root.
    pub fn url_for(&self, relative: &Path) -> String {
        let mut url = self.base_url();
        for component in relative.components() {
            url.push('/');
            let segment = component.as_os_str().to_string_lossy();
            url.extend(utf8_percent_encode(&segment, SEGMENT));
        }
        url
    }

    /// Whether a stop has been requested (by the guard or the control port).
    #[cfg(test)]
    pub fn stop_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Block until Ctrl+C or a stop request on the control port, then stop.
    pub fn wait(self) {
        if let Some(runtime) = &self.runtime {
            let mut stop = self.shutdown.subscribe();
            runtime.block_on(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = stop.wait_for(|stopped| *stopped) => {}
                }
            });
        }
    }

    /// Stop the server now. Dropping the guard does the same.
    pub fn stop(mut self) {
        self.shutdown_now();
    }

    fn shutdown_now(&mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };

        self.shutdown.send_replace(true);
        let tasks = std::mem::take(&mut self.tasks);
        runtime.block_on(async move {
            for task in tasks {
                match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                    Ok(Ok(Ok(()))) => {}
                    Ok(Ok(Err(e))) => tracing::warn!(error = %e, "server exited with error"),
                    Ok(Err(e)) => tracing::warn!(error = %e, "server task failed"),
                    Err(_) => tracing::warn!("server did not stop in time"),
                }
            }
        });
        runtime.shutdown_timeout(Duration::from_secs(1));

        tracing::info!(addr = %self.addr, "local server stopped");
    }
}

impl Drop for LocalServer {
    fn drop(&mut self) {
        self.shutdown_now();
    }
}

async fn bind(host: &str, port: u16) -> Result<TcpListener, ServerError> {
    TcpListener::bind((host, port))
        .await
        .map_err(|source| ServerError::Bind {
            addr: format!("{host}:{port}"),
            source,
        })
}

/// The listener's address, with a wildcard host replaced by loopback so the
/// address can be used as a URL.
fn local_addr(listener: &TcpListener, host: &str) -> Result<SocketAddr, ServerError> {
    let mut addr = listener.local_addr().map_err(|source| ServerError::Bind {
        addr: host.to_string(),
        source,
    })?;
    if addr.ip().is_unspecified() {
        addr.set_ip(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
    Ok(addr)
}

async fn serve(
    listener: TcpListener,
    app: Router,
    mut stop: watch::Receiver<bool>,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = stop.wait_for(|stopped| *stopped).await;
        })
        .await
}

async fn stop_handler(State(state): State<StopState>, UrlPath(key): UrlPath<String>) -> StatusCode {
    if key.as_str() == &*state.key {
        tracing::info!("stop requested through control port");
        state.shutdown.send_replace(true);
        StatusCode::OK
    } else {
        tracing::warn!("rejected stop request with wrong key");
        StatusCode::FORBIDDEN
    }
}
