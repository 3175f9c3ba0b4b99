// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use tendo::certificate::TencentCertificateServiceFactory;
use tendo::config::Config;
use tendo::kubernetes::{create_client, KubeSecretGateway};
use tendo::sync::{Scheduler, TargetReconciler};
use tendo::tencent::credentials::process_env;
use tendo::{server, telemetry};

const DEFAULT_CONFIG_PATH: &str = "./config/config.yaml";

#[derive(Parser)]
#[command(
    name = "tendo",
    version,
    about = "Keeps Kubernetes TLS secrets in sync with Tencent Cloud SSL certificates"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the certificate sync loop and the health listener
    Server {
        /// Kubeconfig to use instead of the inferred cluster configuration
        #[arg(long)]
        kubeconfig: Option<PathBuf>,

        /// Configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Server { kubeconfig, config } => run_server(kubeconfig.as_deref(), &config).await,
    }
}

async fn run_server(kubeconfig: Option<&Path>, config_path: &Path) -> Result<()> {
    let config = Config::from_file(config_path)?;
    telemetry::init(config.is_production());

    info!(
        "Starting {} in {} mode with {} watch target(s)",
        config.app_name,
        config.app_mode,
        config.watch_targets.len()
    );

    let client = create_client(kubeconfig)
        .await
        .context("unable to create Kubernetes client")?;
    info!("Connected to Kubernetes cluster");

    let secrets = Arc::new(KubeSecretGateway::new(client));
    let certificates = Arc::new(TencentCertificateServiceFactory::new(
        reqwest::Client::new(),
        process_env(),
    ));
    let reconciler = Arc::new(TargetReconciler::new(
        secrets,
        certificates,
        config.deployment.clone(),
    ));

    let listener = server::bind(&config.listen_address())
        .await
        .with_context(|| format!("unable to listen on {}", config.listen_address()))?;

    let cancel = CancellationToken::new();
    let mut server_task = tokio::spawn(server::serve(listener, cancel.clone()));

    // Sync only starts once the listener is up
    let scheduler = Scheduler::new(
        config.watch_interval(),
        config.watch_targets.clone(),
        reconciler,
    );
    let scheduler_task = tokio::spawn(scheduler.run(cancel.clone()));

    let reason = tokio::select! {
        signal = shutdown_signal() => signal?,
        served = &mut server_task => match served {
            Ok(Ok(())) => anyhow!("server stopped"),
            Ok(Err(e)) => anyhow!(e).context("server failed"),
            Err(e) => anyhow!(e).context("server task panicked"),
        },
    };

    cancel.cancel();
    if let Err(e) = scheduler_task.await {
        error!("Scheduler task failed: {}", e);
    }

    Err(reason.context("received unrecoverable error"))
}

/// Resolves once SIGINT or SIGTERM arrives, naming the signal
async fn shutdown_signal() -> Result<anyhow::Error> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate()).context("unable to watch SIGTERM")?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("unable to watch SIGINT")?;
                Ok(anyhow!("interrupt"))
            }
            _ = terminate.recv() => Ok(anyhow!("terminated")),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("unable to watch ctrl-c")?;
        Ok(anyhow!("interrupt"))
    }
}
