// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resolve, create, compare, update and retire the cloud certificate of one watch target

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::certificate::CertificateService;
use crate::config::{ResourceBinding, WatchTarget};
use crate::error::{Result, TendoError};
use crate::types::{DeployRecord, SecretMaterial};

/// Handle on the cloud certificate backing one watch target for a single cycle.
///
/// The certificate id starts out as the configured one (if any) and is cached
/// once resolved or created. Nothing is shared between cycles.
pub struct CertificateManager {
    service: Arc<dyn CertificateService>,
    name: String,
    certificate_id: Option<String>,
    bindings: Vec<ResourceBinding>,
    material: SecretMaterial,
}

impl CertificateManager {
    pub fn new(
        service: Arc<dyn CertificateService>,
        target: &WatchTarget,
        material: SecretMaterial,
    ) -> Self {
        Self {
            service,
            name: target.certificate_name.clone(),
            certificate_id: target.known_certificate_id().map(str::to_string),
            bindings: target.certificate_resource_types.clone(),
            material,
        }
    }

    pub fn certificate_id(&self) -> Option<&str> {
        self.certificate_id.as_deref()
    }

    /// Look up an issued certificate by display name.
    ///
    /// Returns `TendoError::CertificateNotFound` when nothing matches; callers
    /// create the certificate in that case.
    #[instrument(skip(self), fields(certificate = %self.name))]
    pub async fn resolve(&self) -> Result<String> {
        let certificates = self.service.find_certificates(&self.name).await?;

        match certificates.into_iter().next() {
            Some(summary) => {
                debug!(
                    "Found certificate {} for {}",
                    summary.certificate_id, self.name
                );
                Ok(summary.certificate_id)
            }
            None => Err(TendoError::CertificateNotFound(self.name.clone())),
        }
    }

    /// Upload the local material as a new certificate
    #[instrument(skip(self), fields(certificate = %self.name))]
    pub async fn create(&self) -> Result<String> {
        let (public_key, private_key) = self.material.decode()?;

        let certificate_id = self
            .service
            .upload_certificate(&self.name, &public_key, &private_key)
            .await?;

        info!("Created certificate {} as {}", self.name, certificate_id);
        Ok(certificate_id)
    }

    /// Resolve the certificate id, creating the certificate when none exists
    pub async fn ensure_certificate(&mut self) -> Result<String> {
        if let Some(id) = &self.certificate_id {
            return Ok(id.clone());
        }

        let certificate_id = match self.resolve().await {
            Ok(id) => id,
            Err(err) if err.is_not_found() => {
                info!(
                    "No certificate named {} found, uploading a new one",
                    self.name
                );
                self.create().await?
            }
            Err(err) => return Err(err),
        };

        self.certificate_id = Some(certificate_id.clone());
        Ok(certificate_id)
    }

    /// Remote key material, base64-encoded like the local secret
    #[instrument(skip(self), fields(certificate = %self.name))]
    pub async fn fetch_detail(&self, certificate_id: &str) -> Result<SecretMaterial> {
        let (public_key, private_key) = self.service.certificate_keys(certificate_id).await?;
        Ok(SecretMaterial::from_raw(
            public_key.as_bytes(),
            private_key.as_bytes(),
        ))
    }

    /// Whether the remote material differs from the local secret
    pub fn has_drifted(&self, remote: &SecretMaterial) -> bool {
        &self.material != remote
    }

    /// Replace the certificate's material in place and redeploy it to every binding
    #[instrument(skip(self), fields(certificate = %self.name))]
    pub async fn update(&self, certificate_id: &str) -> Result<()> {
        let (public_key, private_key) = self.material.decode()?;

        self.service
            .update_certificate(certificate_id, &public_key, &private_key, &self.bindings)
            .await?;

        info!(
            "Requested update of certificate {} ({}) on {} resource type(s)",
            self.name,
            certificate_id,
            self.bindings.len()
        );
        Ok(())
    }

    /// Delete the superseded certificate and give its replacement the canonical name.
    ///
    /// Both steps are attempted; the first failure is returned.
    #[instrument(skip(self), fields(certificate = %self.name))]
    pub async fn retire_and_rename(&self, old_id: &str, new_id: &str) -> Result<()> {
        // An in-place record has nothing to retire
        let deleted = if old_id == new_id {
            debug!("Record for {} was updated in place, nothing to delete", old_id);
            Ok(())
        } else {
            self.service.delete_certificate(old_id).await
        };

        let renamed = self.service.rename_certificate(new_id, &self.name).await;

        match (deleted, renamed) {
            (Ok(()), Ok(())) => {
                info!(
                    "Retired certificate {} in favour of {} ({})",
                    old_id, new_id, self.name
                );
                Ok(())
            }
            (Err(err), _) | (Ok(()), Err(err)) => Err(err),
        }
    }

    /// Retire every record of a converged swap, continuing past failures.
    ///
    /// Returns the number of records whose cleanup failed.
    pub async fn retire_all(&self, records: &[DeployRecord]) -> usize {
        let mut failed = 0;

        for record in records {
            if let Err(err) = self
                .retire_and_rename(&record.old_cert_id, &record.cert_id)
                .await
            {
                warn!(
                    "Cleanup of deploy record {} ({} -> {}) failed: {}",
                    record.id, record.old_cert_id, record.cert_id, err
                );
                failed += 1;
            }
        }

        failed
    }
}
