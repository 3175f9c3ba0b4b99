// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TendoError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Secret {name} not found in namespace {namespace}")]
    SecretNotFound { namespace: String, name: String },

    #[error("Secret {namespace}/{name} has no '{key}' data key")]
    MissingSecretKey {
        namespace: String,
        name: String,
        key: String,
    },

    #[error("Failed to decode certificate material: {0}")]
    Decode(String),

    /// No active certificate matches the display name. Callers create one instead.
    #[error("Certificate with name {0} not found")]
    CertificateNotFound(String),

    #[error("Tencent Cloud {action} failed with {code}: {message} (request id {request_id})")]
    Api {
        action: String,
        code: String,
        message: String,
        request_id: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unable to build credentials for Tencent Cloud: {0}")]
    Credentials(String),

    #[error("Certificate {0} update status is not found")]
    DeployStatusNotFound(String),

    #[error("Deployment of certificate {certificate_id} did not converge after {attempts} attempts")]
    DeploymentTimedOut {
        certificate_id: String,
        attempts: u32,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TendoError {
    /// True for the "no certificate with this name" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TendoError::CertificateNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, TendoError>;
