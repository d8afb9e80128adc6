use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod handlers;
mod state;
mod upstream;

use crate::handlers::{ping_handler, predict_handler};
use crate::state::{AppState, MAX_UPLOAD_BYTES};
use crate::upstream::{UpstreamClassifier, DEFAULT_CLASSIFIER_URL};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding index.html and the wasm bundle.
    #[arg(long)]
    public_dir: Option<PathBuf>,
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
    /// Base URL of the digit classifier that `/ping` and `/predict` forward to.
    #[arg(long, env = "DIGITPAD_CLASSIFIER_URL", default_value = DEFAULT_CLASSIFIER_URL)]
    classifier_url: String,
    #[arg(long, requires = "tls_key")]
    tls_cert: Option<PathBuf>,
    #[arg(long, requires = "tls_cert")]
    tls_key: Option<PathBuf>,
}

fn app(state: AppState, public_dir: PathBuf) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route(
            "/predict",
            post(predict_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("digitpad_server=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let public_dir = args
        .public_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));
    let upstream = UpstreamClassifier::new(&args.classifier_url)
        .context("failed to build the classifier HTTP client")?;
    tracing::info!(classifier = upstream.base(), public_dir = %public_dir.display(), "starting");

    let router = app(AppState::new(upstream), public_dir);
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    match (args.tls_cert, args.tls_key) {
        (Some(cert), Some(key)) => {
            let config = RustlsConfig::from_pem_file(&cert, &key)
                .await
                .with_context(|| format!("failed to load TLS material from {}", cert.display()))?;
            tracing::info!("digitpad running at https://localhost:{}", args.port);
            axum_server::bind_rustls(addr, config)
                .serve(router.into_make_service())
                .await
                .context("server crashed")?;
        }
        _ => {
            tracing::info!("digitpad running at http://localhost:{}", args.port);
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            axum::serve(listener, router)
                .await
                .context("server crashed")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_fall_back_to_defaults() {
        let args = Args::try_parse_from(["digitpad_server"]).unwrap();
        assert_eq!(args.classifier_url, DEFAULT_CLASSIFIER_URL);
        assert!(args.tls_cert.is_none());
    }

    #[test]
    fn tls_flags_come_in_pairs() {
        assert!(Args::try_parse_from(["digitpad_server", "--tls-cert", "cert.pem"]).is_err());
        let args = Args::try_parse_from([
            "digitpad_server",
            "--tls-cert",
            "cert.pem",
            "--tls-key",
            "key.pem",
            "--port",
            "8443",
        ])
        .unwrap();
        assert_eq!(args.port, 8443);
    }
}
