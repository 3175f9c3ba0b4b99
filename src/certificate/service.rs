// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The cloud certificate service as seen by the lifecycle manager

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use crate::config::ResourceBinding;
use crate::error::Result;
use crate::tencent::credentials::{resolve_credentials, EnvLookup};
use crate::tencent::SslClient;
use crate::types::{CertificateSummary, DeployRecord};

/// Certificate operations of the cloud provider.
///
/// Key material crosses this boundary as raw PEM strings.
#[async_trait]
pub trait CertificateService: Send + Sync {
    /// Issued certificates matching `name`, best match first
    async fn find_certificates(&self, name: &str) -> Result<Vec<CertificateSummary>>;

    /// Public and private key held for a certificate
    async fn certificate_keys(&self, certificate_id: &str) -> Result<(String, String)>;

    /// Upload a new certificate and return its id
    async fn upload_certificate(
        &self,
        name: &str,
        public_key: &str,
        private_key: &str,
    ) -> Result<String>;

    /// Replace the material of a certificate and redeploy it to `bindings`
    async fn update_certificate(
        &self,
        certificate_id: &str,
        public_key: &str,
        private_key: &str,
        bindings: &[ResourceBinding],
    ) -> Result<()>;

    /// Redeploy progress of a certificate swap, one record per resource attachment
    async fn deploy_records(&self, old_certificate_id: &str) -> Result<Vec<DeployRecord>>;

    async fn delete_certificate(&self, certificate_id: &str) -> Result<()>;

    async fn rename_certificate(&self, certificate_id: &str, name: &str) -> Result<()>;
}

/// Builds a `CertificateService` bound to one region
#[async_trait]
pub trait CertificateServiceFactory: Send + Sync {
    async fn connect(&self, region: &str) -> Result<Arc<dyn CertificateService>>;
}

/// Resolves credentials on every connect and talks to the Tencent Cloud SSL API
pub struct TencentCertificateServiceFactory {
    http: reqwest::Client,
    env: EnvLookup,
    endpoint: Option<String>,
}

impl TencentCertificateServiceFactory {
    pub fn new(http: reqwest::Client, env: EnvLookup) -> Self {
        Self {
            http,
            env,
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

#[async_trait]
impl CertificateServiceFactory for TencentCertificateServiceFactory {
    #[instrument(skip(self))]
    async fn connect(&self, region: &str) -> Result<Arc<dyn CertificateService>> {
        let credential = resolve_credentials(&self.http, &self.env).await?;

        let mut client = SslClient::new(self.http.clone(), credential, region);
        if let Some(endpoint) = &self.endpoint {
            client = client.with_endpoint(endpoint)?;
        }

        Ok(Arc::new(client))
    }
}
