//! Shared utilities for router and server tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use mvc_router::config::{PathsConfig, RouterConfig};
use mvc_router::http::{JsonViewRenderer, Redirect, RenderOptions, RouteResponse, ViewRenderer};
use mvc_router::lifecycle::Shutdown;
use mvc_router::{AppHandle, HttpServer, Router};
use tokio::net::TcpListener;

/// Directory holding the test routes files.
#[allow(dead_code)]
pub fn fixtures(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[allow(dead_code)]
pub fn fixture_paths() -> PathsConfig {
    PathsConfig::new(fixtures(""))
}

/// A response call captured by [`RecordingResponse`].
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Call {
    Render { template: String, options: RenderOptions },
    Redirect(Redirect),
}

/// `RouteResponse` that records every call it receives.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingResponse {
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl RecordingResponse {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn renders(&self) -> Vec<(String, RenderOptions)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Render { template, options } => Some((template, options)),
                Call::Redirect(_) => None,
            })
            .collect()
    }

    pub fn redirects(&self) -> Vec<Redirect> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Redirect(r) => Some(r),
                Call::Render { .. } => None,
            })
            .collect()
    }
}

impl RouteResponse for RecordingResponse {
    fn render(&self, template: &str, options: RenderOptions) {
        self.calls.lock().unwrap().push(Call::Render {
            template: template.to_string(),
            options,
        });
    }

    fn redirect(&self, redirect: Redirect) {
        self.calls.lock().unwrap().push(Call::Redirect(redirect));
    }
}

/// Start an `HttpServer` on an ephemeral port. Returns its address and the
/// shutdown handle keeping it alive.
#[allow(dead_code)]
pub async fn start_server(router: Router, app: AppHandle) -> (SocketAddr, Shutdown) {
    start_server_with_renderer(router, app, Arc::new(JsonViewRenderer)).await
}

#[allow(dead_code)]
pub async fn start_server_with_renderer(
    router: Router,
    app: AppHandle,
    renderer: Arc<dyn ViewRenderer>,
) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = RouterConfig::default();
    config.listener.bind_address = addr.to_string();
    config.timeouts.request_secs = 2;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.signalled();
    let server = HttpServer::with_renderer(config, router, app, renderer);
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
