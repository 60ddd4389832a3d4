//! baseurl-rewriter
//!
//! # Architecture Overview
//!
//! ```text
//!   outgoing request ──▶ pipeline::UrlManager ──▶ rewritten request
//!                            │        │
//!                            │        ├── registry (name → base url, global slot)
//!                            │        ├── rewrite (Domain / Advanced / Super + caches)
//!                            │        └── listeners (before-resolve, after-rewrite)
//!                            │
//!        config file ──▶ config::watcher ──▶ apply_config
//!        admin API   ──▶ admin::handlers ──▶ registry / flags
//! ```
//!
//! `serve` runs the admin API and config hot reload around a shared manager.
//! `rewrite` and `check` are one-shot helpers for trying out a config file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use reqwest::header::HeaderValue;
use tokio::net::TcpListener;
use url::Url;

use baseurl_rewriter::admin::{serve_admin, AdminState};
use baseurl_rewriter::config::{load_config, watcher, ConfigError, ConfigWatcher, RewriterConfig};
use baseurl_rewriter::observability::{logging, metrics};
use baseurl_rewriter::{HostRequest, RewriteError, UrlManager, DOMAIN_NAME_HEADER};

#[derive(Parser)]
#[command(name = "baseurl-rewriter", version)]
#[command(about = "Swap the base url of outgoing requests at runtime", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the admin API with config hot reload
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print what each url would be rewritten to
    Rewrite {
        #[arg(short, long)]
        config: PathBuf,
        /// Domain name hint, as carried by the Domain-Name header
        #[arg(short, long)]
        domain: Option<String>,
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Validate a config file and report every problem
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(&config).await,
        Commands::Rewrite { config, domain, urls } => {
            let config = load_or_exit(&config);
            logging::init_logging(&config.observability.log_level);
            let manager = UrlManager::from_config(&config)?;
            for url in urls {
                match rewrite_one(&manager, &url, domain.as_deref()) {
                    Ok(rewritten) => println!("{rewritten}"),
                    Err(e) => eprintln!("{url}: {e}"),
                }
            }
            Ok(())
        }
        Commands::Check { config } => {
            let config = load_or_exit(&config);
            println!(
                "ok: {} domain(s), global domain {}, advanced mode {}",
                config.domains.len(),
                if config.rewrite.global_domain.is_some() { "set" } else { "unset" },
                if config.rewrite.advanced_base_url.is_some() { "on" } else { "off" },
            );
            Ok(())
        }
    }
}

async fn serve(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_or_exit(path);
    logging::init_logging(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "baseurl-rewriter starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to install metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let manager = Arc::new(UrlManager::from_config(&config)?);

    let (config_watcher, updates) = ConfigWatcher::new(path);
    let _watcher = config_watcher.run()?;
    tokio::spawn(watcher::apply_updates(manager.clone(), updates));

    if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = AdminState::new(manager, config.admin.api_key.as_str());
        serve_admin(listener, state, shutdown_signal()).await?;
    } else {
        tracing::info!("Admin API disabled, watching config only");
        shutdown_signal().await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn load_or_exit(path: &Path) -> RewriterConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(ConfigError::Validation(errors)) => {
            eprintln!("{}: {} problem(s)", path.display(), errors.len());
            for err in errors {
                eprintln!("  {err}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

fn rewrite_one(manager: &UrlManager, url: &str, domain: Option<&str>) -> Result<String, RewriteError> {
    let target = Url::parse(url).map_err(|e| RewriteError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let mut request = reqwest::Request::new(reqwest::Method::GET, target);
    if let Some(domain) = domain {
        let value = HeaderValue::from_str(domain)
            .map_err(|_| RewriteError::Configuration(format!("`{domain}` is not a valid header value")))?;
        request.headers_mut().insert(DOMAIN_NAME_HEADER, value);
    }
    let request = manager.process_request(request)?;
    Ok(request.target().to_string())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Shutdown signal received");
}
