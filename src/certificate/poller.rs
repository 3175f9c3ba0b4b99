// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Wait for a certificate swap to reach every attached resource

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use crate::certificate::CertificateService;
use crate::config::DeploymentSettings;
use crate::constants::ssl::DEPLOY_SUCCESS;
use crate::error::{Result, TendoError};
use crate::types::DeployRecord;

pub struct DeploymentPoller {
    service: Arc<dyn CertificateService>,
    settings: DeploymentSettings,
}

impl DeploymentPoller {
    pub fn new(service: Arc<dyn CertificateService>, settings: DeploymentSettings) -> Self {
        Self { service, settings }
    }

    /// Poll the deploy records of `certificate_id` until all of them succeeded.
    ///
    /// Returns the converged records. Stops early on a failed status query, an
    /// empty record list, or once `max_attempts` queries did not converge.
    #[instrument(skip(self))]
    pub async fn wait_for_convergence(&self, certificate_id: &str) -> Result<Vec<DeployRecord>> {
        tokio::time::sleep(self.settings.settle_delay()).await;

        let mut attempts: u32 = 0;
        loop {
            attempts += 1;

            let records = self.service.deploy_records(certificate_id).await?;
            if records.is_empty() {
                return Err(TendoError::DeployStatusNotFound(certificate_id.to_string()));
            }

            let statuses = collect_statuses(&records).await;
            if all_converged(&statuses) {
                info!(
                    "Deployment of certificate {} completed on {} record(s)",
                    certificate_id,
                    records.len()
                );
                return Ok(records);
            }

            if self
                .settings
                .max_attempts
                .is_some_and(|max| attempts >= max)
            {
                return Err(TendoError::DeploymentTimedOut {
                    certificate_id: certificate_id.to_string(),
                    attempts,
                });
            }

            info!(
                "Deployment of certificate {} still in progress, checking again in {}s",
                certificate_id, self.settings.poll_interval_seconds
            );
            tokio::time::sleep(self.settings.poll_interval()).await;
        }
    }
}

/// Check every record on its own task and gather the statuses over a channel
async fn collect_statuses(records: &[DeployRecord]) -> Vec<i64> {
    let (tx, mut rx) = mpsc::channel(records.len().max(1));

    for record in records {
        let tx = tx.clone();
        let record = record.clone();
        tokio::spawn(async move {
            debug!(
                "Deploy record {} for {} has status {}",
                record.id, record.cert_id, record.status
            );
            // The receiver outlives every sender
            let _ = tx.send(record.status).await;
        });
    }
    drop(tx);

    let mut statuses = Vec::with_capacity(records.len());
    while let Some(status) = rx.recv().await {
        statuses.push(status);
    }
    statuses
}

/// True iff there is at least one status and every status is a success
pub fn all_converged(statuses: &[i64]) -> bool {
    !statuses.is_empty() && statuses.iter().all(|s| *s == DEPLOY_SUCCESS)
}
