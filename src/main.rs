//! Serves simplestreams metadata and the artifacts it describes.

mod error;
mod server;
mod throttle;

use crate::error::{ErrorKind, Result};
use crate::server::AppState;
use clap::Parser;
use exn::ResultExt;
use simplestreams_catalog::Generator;
use simplestreams_config::Config;
use simplestreams_storage::BackendHandle;
use simplestreams_storage::backend::LocalBackend;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "simplestreams=info,tower_http=info";

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(long, env = "SIMPLESTREAMS_CONFIG")]
    config: Option<PathBuf>,
    /// Address to listen on [default: 0.0.0.0:9999].
    #[arg(long)]
    listen: Option<String>,
    /// Directory containing one subdirectory per stream [default: current directory].
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Download rate limit in KiB/s, 0 for unlimited [default: unlimited].
    #[arg(long)]
    rate: Option<u64>,
}
impl Cli {
    /// Loads the layered configuration and applies the flags on top.
    fn config(&self) -> Result<Config> {
        let file = self.config.clone().or_else(Config::default_file);
        let mut config = Config::load(file.as_deref()).or_raise(|| ErrorKind::Config)?;
        if let Some(listen) = &self.listen {
            config.server.listen = listen.clone();
        }
        if let Some(dir) = &self.dir {
            config.storage.root = dir.clone();
        }
        if let Some(rate) = self.rate {
            config.server.rate_limit = Some(rate);
        }
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config()?;
    let root = std::path::absolute(&config.storage.root).or_raise(|| ErrorKind::Storage)?;
    let backend: BackendHandle = Arc::new(LocalBackend::new("local", &root).or_raise(|| ErrorKind::Storage)?);
    let generator = Arc::new(Generator::new(&config, backend).or_raise(|| ErrorKind::Config)?);
    let state = AppState::new(generator.clone(), config.server.rate_limit_bytes());

    let listen = &config.server.listen;
    let listener = TcpListener::bind(listen.as_str()).await.or_raise(|| ErrorKind::Bind(listen.clone()))?;
    info!(
        listen = %listen,
        backend = generator.backend().name(),
        root = %root.display(),
        rate_limit = ?config.server.rate_limit,
        streams = config.streams.len(),
        "Serving simplestreams"
    );
    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .or_raise(|| ErrorKind::Serve)
}

/// Resolves on Ctrl-C, or on SIGTERM where available. The SIGTERM handler is
/// registered before this returns so no signal is lost while serving starts.
fn shutdown_signal() -> impl Future<Output = ()> {
    #[cfg(unix)]
    let terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate());
    async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };
        #[cfg(unix)]
        let terminate = async move {
            match terminate {
                Ok(mut signal) => {
                    signal.recv().await;
                },
                Err(e) => {
                    warn!(error = %e, "Cannot listen for SIGTERM");
                    std::future::pending::<()>().await;
                },
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }
        info!("Shutting down");
    }
}
