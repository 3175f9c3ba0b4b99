// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! One sync cycle of a watch target: TLS secret in, cloud certificate out.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::certificate::{CertificateManager, CertificateServiceFactory, DeploymentPoller};
use crate::config::{DeploymentSettings, WatchTarget};
use crate::constants::secret_keys;
use crate::error::Result;
use crate::kubernetes::SecretGateway;

/// What a successful cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The cloud certificate already matched the secret
    InSync { certificate_id: String },
    /// The certificate was updated and redeployed
    Updated {
        certificate_id: String,
        records: usize,
        failed_cleanups: usize,
    },
}

/// Runs one cycle for a watch target
#[async_trait]
pub trait Reconcile: Send + Sync {
    async fn reconcile(&self, target: &WatchTarget) -> Result<ReconcileOutcome>;
}

/// Reconciler wired to a secret gateway and a certificate service factory.
///
/// Holds no per-target state, so overlapping cycles of the same target are independent.
pub struct TargetReconciler {
    secrets: Arc<dyn SecretGateway>,
    certificates: Arc<dyn CertificateServiceFactory>,
    deployment: DeploymentSettings,
}

impl TargetReconciler {
    pub fn new(
        secrets: Arc<dyn SecretGateway>,
        certificates: Arc<dyn CertificateServiceFactory>,
        deployment: DeploymentSettings,
    ) -> Self {
        Self {
            secrets,
            certificates,
            deployment,
        }
    }
}

#[async_trait]
impl Reconcile for TargetReconciler {
    #[instrument(
        skip(self, target),
        fields(secret = %target.secret_ref(), certificate = %target.certificate_name)
    )]
    async fn reconcile(&self, target: &WatchTarget) -> Result<ReconcileOutcome> {
        let material = self
            .secrets
            .get_secret_material(&target.secret_namespace, &target.secret_name)
            .await?;

        let service = self.certificates.connect(&target.certificate_region).await?;
        let mut manager = CertificateManager::new(service.clone(), target, material);

        let certificate_id = manager.ensure_certificate().await?;
        let remote = manager.fetch_detail(&certificate_id).await?;

        let payload = BTreeMap::from([(
            secret_keys::CERTIFICATE_ID.to_string(),
            certificate_id.clone(),
        )]);
        self.secrets
            .ensure_opaque_secret(&target.secret_namespace, &target.opaque_secret_name, payload)
            .await?;

        if !manager.has_drifted(&remote) {
            debug!("Certificate {} matches secret {}", certificate_id, target.secret_ref());
            return Ok(ReconcileOutcome::InSync { certificate_id });
        }

        info!(
            "Secret {} differs from certificate {}, updating",
            target.secret_ref(),
            certificate_id
        );
        manager.update(&certificate_id).await?;

        let poller = DeploymentPoller::new(service, self.deployment.clone());
        let records = poller.wait_for_convergence(&certificate_id).await?;
        let failed_cleanups = manager.retire_all(&records).await;

        Ok(ReconcileOutcome::Updated {
            certificate_id,
            records: records.len(),
            failed_cleanups,
        })
    }
}
