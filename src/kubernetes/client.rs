// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation

use crate::error::{Result, TendoError};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config as KConfig};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Create a Kubernetes client.
///
/// An explicit kubeconfig path takes precedence; otherwise the configuration is
/// inferred from `KUBECONFIG`, `~/.kube/config` or the in-cluster service account.
#[instrument]
pub async fn create_client(kubeconfig: Option<&Path>) -> Result<Client> {
    let config = match kubeconfig {
        Some(path) => config_from_kubeconfig(path).await?,
        None => {
            debug!("No kubeconfig given, inferring cluster configuration");
            KConfig::infer().await.map_err(|e| {
                TendoError::KubeconfigError(format!("Failed to infer config: {}", e))
            })?
        }
    };

    info!("Using Kubernetes API server {}", config.cluster_url);

    Client::try_from(config)
        .map_err(|e| TendoError::KubeconfigError(format!("Failed to create client: {}", e)))
}

/// Load a client configuration from a kubeconfig file
async fn config_from_kubeconfig(path: &Path) -> Result<KConfig> {
    let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
        TendoError::KubeconfigError(format!(
            "Failed to read kubeconfig {}: {}",
            path.display(),
            e
        ))
    })?;

    KConfig::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| TendoError::KubeconfigError(format!("Failed to create config: {}", e)))
}
