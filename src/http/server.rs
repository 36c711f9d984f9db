//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router with a catch-all dispatch handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Translate axum requests into `RouteRequest`s and run route handlers
//! - Turn render/redirect/error outcomes into HTTP responses
//! - Observability (metrics, request IDs in log events)

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::dispatch::error::DispatchError;
use crate::dispatch::handler::Next;
use crate::http::request::{decode_captures, parse_query, AppHandle, RouteRequest};
use crate::http::response::{
    JsonViewRenderer, Redirect, RenderOptions, RouteResponse, ViewRenderer,
};
use crate::observability::metrics;
use crate::routing::{RouteTarget, Router as RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub app: AppHandle,
    pub renderer: Arc<dyn ViewRenderer>,
}

/// HTTP server dispatching every request through the route table.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
}

impl HttpServer {
    /// Create a server rendering views with [`JsonViewRenderer`].
    pub fn new(config: RouterConfig, routes: RouteTable, app: AppHandle) -> Self {
        Self::with_renderer(config, routes, app, Arc::new(JsonViewRenderer))
    }

    pub fn with_renderer(
        config: RouterConfig,
        routes: RouteTable,
        app: AppHandle,
        renderer: Arc<dyn ViewRenderer>,
    ) -> Self {
        let state = AppState {
            routes: Arc::new(routes),
            app,
            renderer,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers, outermost first.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// Outcome delivered by a route handler.
enum Reply {
    Render {
        template: String,
        options: RenderOptions,
    },
    Redirect(Redirect),
    Error(DispatchError),
}

/// `RouteResponse` that forwards the first outcome to the waiting request task.
struct ChannelResponse {
    tx: Mutex<Option<oneshot::Sender<Reply>>>,
}

impl ChannelResponse {
    fn new(tx: oneshot::Sender<Reply>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    fn send(&self, reply: Reply) {
        let tx = self.tx.lock().ok().and_then(|mut slot| slot.take());
        match tx {
            Some(tx) => {
                let _ = tx.send(reply);
            }
            None => tracing::warn!("Response already sent, ignoring further output"),
        }
    }
}

impl RouteResponse for ChannelResponse {
    fn render(&self, template: &str, options: RenderOptions) {
        self.send(Reply::Render {
            template: template.to_string(),
            options,
        });
    }

    fn redirect(&self, redirect: Redirect) {
        self.send(Reply::Redirect(redirect));
    }
}

/// Main dispatch handler.
/// Looks up the route, runs its handler and waits for the outcome.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let path = request.uri().path().to_string();
    let query = request.uri().query().map(parse_query).unwrap_or_default();

    let Some(found) = state.routes.resolve(&path) else {
        tracing::warn!(request_id = %request_id, path = %path, "No route matched");
        metrics::record_unmatched();
        return (StatusCode::NOT_FOUND, "No matching route found").into_response();
    };

    let (controller, action) = match found.route.meta.target() {
        RouteTarget::Controller { controller, action } => (controller.clone(), action.clone()),
        RouteTarget::Redirect { .. } => ("redirect".to_string(), "-".to_string()),
    };
    tracing::debug!(
        request_id = %request_id,
        path = %path,
        pattern = %found.pattern,
        target = %found.route.meta.target(),
        "Route matched"
    );

    // Matching runs on the raw path; only capture values are decoded.
    let params = match decode_captures(found.captures) {
        Ok(params) => params,
        Err(e) => {
            tracing::warn!(request_id = %request_id, path = %path, error = %e, "Capture is not valid UTF-8");
            metrics::record_dispatch(&controller, &action, "bad_request", start_time);
            return (StatusCode::BAD_REQUEST, "Malformed path segment").into_response();
        }
    };

    let route_request = RouteRequest {
        path: path.clone(),
        query,
        route_keys: found.pattern.keys(),
        params,
        app: state.app.clone(),
    };
    let handler = found.route.handler.clone();

    let (tx, rx) = oneshot::channel();
    let channel = Arc::new(ChannelResponse::new(tx));
    let error_sink = channel.clone();
    let next = Next::new(move |err| error_sink.send(Reply::Error(err)));
    let response: Arc<dyn RouteResponse> = channel;

    handler(route_request, response, next);

    let (outcome, http_response) = match rx.await {
        Ok(Reply::Render { template, options }) => {
            match state.renderer.render(&template, &options) {
                Ok(body) => (
                    "render",
                    ([(header::CONTENT_TYPE, state.renderer.content_type())], body).into_response(),
                ),
                Err(e) => error_response(&request_id, &path, DispatchError::from(e)),
            }
        }
        Ok(Reply::Redirect(redirect)) => ("redirect", redirect_response(&redirect)),
        Ok(Reply::Error(e)) => error_response(&request_id, &path, e),
        Err(_) => error_response(&request_id, &path, DispatchError::Abandoned),
    };

    metrics::record_dispatch(&controller, &action, outcome, start_time);
    http_response
}

fn redirect_response(redirect: &Redirect) -> Response {
    let status = redirect
        .status
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::FOUND);
    (status, [(header::LOCATION, redirect.path.clone())]).into_response()
}

fn error_response(request_id: &str, path: &str, err: DispatchError) -> (&'static str, Response) {
    tracing::error!(request_id = %request_id, path = %path, error = %err, "Dispatch failed");
    let status = match err {
        DispatchError::UnknownAction { .. } => StatusCode::NOT_IMPLEMENTED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = status.canonical_reason().unwrap_or("Error");
    ("error", (status, body).into_response())
}
