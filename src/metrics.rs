use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use once_cell::sync::{Lazy, OnceCell};
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::{net::TcpListener, task::JoinHandle};
use tracing::{error, info};

use zerowaste_scheduler::metrics as scheduler_metrics;

static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
static REGISTER_ONCE: OnceCell<()> = OnceCell::new();

pub fn global_registry() -> &'static Registry {
    &GLOBAL_REGISTRY
}

pub fn register_metrics() {
    REGISTER_ONCE.get_or_init(|| {
        scheduler_metrics::register_metrics(global_registry());
    });
}

/// Serve `GET /metrics` on `port`; `0` disables the endpoint.
pub fn spawn_metrics_server(port: u16) -> Option<JoinHandle<()>> {
    if port == 0 {
        return None;
    }

    register_metrics();
    let registry = Arc::new(global_registry().clone());
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(registry);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!(%addr, "metrics server listening");
    Some(tokio::spawn(async move {
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                if let Err(err) = axum::serve(listener, app.into_make_service()).await {
                    error!(?err, "metrics server exited with error");
                }
            }
            Err(err) => {
                error!(?err, "failed to bind metrics listener");
            }
        }
    }))
}

/// Text exposition of everything in `registry`.
pub fn render(registry: &Registry) -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
}

async fn metrics_handler(State(registry): State<Arc<Registry>>) -> Response {
    let format_type = TextEncoder::new().format_type().to_string();
    let body = match render(&registry) {
        Ok(body) => body,
        Err(err) => {
            error!(?err, "failed to encode prometheus metrics");
            return (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "metric encode error",
            )
                .into_response();
        }
    };

    match HeaderValue::from_str(&format_type) {
        Ok(value) => ([(axum::http::header::CONTENT_TYPE, value)], body).into_response(),
        Err(err) => {
            error!(?err, "failed to build content-type header");
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "metric encode error",
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_port_spawns_nothing() {
        assert!(spawn_metrics_server(0).is_none());
    }

    #[test]
    fn rendered_registry_lists_scheduler_metrics() {
        register_metrics();
        scheduler_metrics::set_queue_depth(3);
        let text = render(global_registry()).unwrap();
        assert!(text.contains("zerowaste_queue_depth"));
    }
}
